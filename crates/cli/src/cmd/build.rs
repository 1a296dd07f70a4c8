//! Implementation of the `rtmake build` command.
//!
//! Resolves the platform, loads the hash store, dispatches the target
//! and reports the outcome. The store is persisted for any completed
//! pass (partial failures included, since each recorded digest is
//! independently valid) while hard errors leave the on-disk store
//! untouched.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use rtmake_lib::config::BuildConfig;
use rtmake_lib::execute::{self, BuildReport};
use rtmake_lib::platform::Platform;
use rtmake_lib::store::HashStore;
use rtmake_lib::target::TargetRegistry;

use crate::output;

/// Execute the build command.
pub fn cmd_build(
  target: &str,
  threaded: bool,
  unix: bool,
  win: bool,
  hash_store: Option<PathBuf>,
  root: &Path,
  json: bool,
) -> Result<()> {
  let platform = resolve_platform(unix, win)?;

  let mut config = BuildConfig::new(root);
  if let Some(path) = hash_store {
    config = config.with_store_path(path);
  }

  let registry = TargetRegistry::builtin();
  let mut store = HashStore::load(&config.store_path)?;

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt.block_on(execute::dispatch(
    &registry, target, &config, platform, threaded, &mut store,
  ))?;

  store.save(&config.store_path)?;
  info!(path = %config.store_path.display(), "hash store saved");

  if json {
    output::print_json(&report)?;
  } else {
    print_report(&report);
  }

  if !report.is_success() {
    bail!("{} unit(s) failed", report.failures.len());
  }
  Ok(())
}

fn resolve_platform(unix: bool, win: bool) -> Result<Platform> {
  if unix {
    return Ok(Platform::Unix);
  }
  if win {
    return Ok(Platform::Windows);
  }
  Platform::detect().with_context(|| format!("unsupported operating system '{}'", std::env::consts::OS))
}

fn print_report(report: &BuildReport) {
  println!();
  if report.is_success() {
    output::print_success("Build complete");
  } else {
    output::print_error("Build finished with failures");
  }
  output::print_stat("Compiled", &report.compiled.len().to_string());
  output::print_stat("Up to date", &report.up_to_date.len().to_string());
  output::print_stat("Artifacts", &report.artifacts.len().to_string());

  for failure in &report.failures {
    println!();
    output::print_error(&format!("failed: {}", failure.unit.display()));
    for line in failure.diagnostic.lines() {
      eprintln!("    {line}");
    }
  }
  for skipped in &report.skipped {
    output::print_warning(&format!(
      "skipped {} ({} failed)",
      skipped.artifact.display(),
      skipped.failed_unit.display()
    ));
  }
}
