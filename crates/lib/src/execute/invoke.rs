//! Compiler invocation.
//!
//! Translates the toolchain template plus a unit into concrete command
//! lines and runs them as external processes. Stdin is unused,
//! stdout/stderr are captured for diagnostics, and the exit code is the
//! sole success signal.

use std::path::{Path, PathBuf};
use std::process::Output;

use tokio::process::Command;
use tracing::debug;

use super::types::ExecuteError;
use crate::config::Toolchain;

/// A fully constructed tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub bin: String,
  pub args: Vec<String>,
}

impl Invocation {
  /// Render for logs and diagnostics.
  pub fn render(&self) -> String {
    let mut rendered = self.bin.clone();
    for arg in &self.args {
      rendered.push(' ');
      rendered.push_str(arg);
    }
    rendered
  }
}

/// Result of one tool invocation. Ephemeral, never persisted.
#[derive(Debug)]
pub enum CompileResult {
  /// The tool exited zero; the artifact is at the given path.
  Success(PathBuf),
  /// The tool exited nonzero; the diagnostic carries the exit status and
  /// captured output.
  Failure(String),
}

/// Command compiling one unit to an object file.
pub fn compile_command(toolchain: &Toolchain, threaded: bool, unit: &Path, object: &Path) -> Invocation {
  let mut args = toolchain.compile_args.clone();
  if threaded {
    args.extend(toolchain.threaded_args.iter().cloned());
  }
  args.push("-c".to_string());
  args.push(unit.display().to_string());
  args.push("-o".to_string());
  args.push(object.display().to_string());
  Invocation {
    bin: toolchain.compiler.clone(),
    args,
  }
}

/// Command combining member objects into an archive.
pub fn archive_command(toolchain: &Toolchain, objects: &[PathBuf], archive: &Path) -> Invocation {
  let mut args = toolchain.archiver_args.clone();
  args.push(archive.display().to_string());
  args.extend(objects.iter().map(|o| o.display().to_string()));
  Invocation {
    bin: toolchain.archiver.clone(),
    args,
  }
}

/// Command compiling-and-linking a program source with objects and
/// archives into an executable.
pub fn link_command(
  toolchain: &Toolchain,
  threaded: bool,
  main: &Path,
  objects: &[PathBuf],
  archives: &[PathBuf],
  output: &Path,
) -> Invocation {
  let mut args = toolchain.compile_args.clone();
  if threaded {
    args.extend(toolchain.threaded_args.iter().cloned());
  }
  args.push(main.display().to_string());
  args.extend(objects.iter().map(|o| o.display().to_string()));
  args.extend(archives.iter().map(|a| a.display().to_string()));
  args.push("-o".to_string());
  args.push(output.display().to_string());
  Invocation {
    bin: toolchain.compiler.clone(),
    args,
  }
}

/// Run an invocation that produces `output_path`.
///
/// The output's parent directory is created first. A spawn failure (tool
/// binary missing) aborts the build; a nonzero exit is a per-unit
/// failure carried in [`CompileResult::Failure`].
pub async fn run(invocation: &Invocation, output_path: &Path) -> Result<CompileResult, ExecuteError> {
  if let Some(parent) = output_path.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }

  debug!(bin = %invocation.bin, args = ?invocation.args, "spawning tool");

  let output = Command::new(&invocation.bin)
    .args(&invocation.args)
    .output()
    .await
    .map_err(|e| ExecuteError::Spawn {
      bin: invocation.bin.clone(),
      source: e,
    })?;

  if output.status.success() {
    Ok(CompileResult::Success(output_path.to_path_buf()))
  } else {
    Ok(CompileResult::Failure(render_diagnostic(invocation, &output)))
  }
}

/// Exit status plus whatever the tool printed.
fn render_diagnostic(invocation: &Invocation, output: &Output) -> String {
  let mut diagnostic = match output.status.code() {
    Some(code) => format!("{} exited with code {}", invocation.bin, code),
    None => format!("{} was terminated by a signal", invocation.bin),
  };
  let stderr = String::from_utf8_lossy(&output.stderr);
  if !stderr.trim().is_empty() {
    diagnostic.push('\n');
    diagnostic.push_str(stderr.trim());
  }
  let stdout = String::from_utf8_lossy(&output.stdout);
  if !stdout.trim().is_empty() {
    diagnostic.push('\n');
    diagnostic.push_str(stdout.trim());
  }
  diagnostic
}
