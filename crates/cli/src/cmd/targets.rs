//! Implementation of the `rtmake targets` command.

use anyhow::Result;

use rtmake_lib::target::TargetRegistry;

/// List every registered build target with its description.
pub fn cmd_targets() -> Result<()> {
  let registry = TargetRegistry::builtin();
  for target in registry.iter() {
    println!("  {:<12} {}", target.name(), target.description());
  }
  Ok(())
}
