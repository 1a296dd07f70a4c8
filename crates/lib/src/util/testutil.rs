//! Test helpers for driving builds without a real toolchain.
//!
//! The fake tools are small shell scripts that append one line per
//! invocation to a log file, so tests can assert exactly which commands
//! ran. Sources containing the `FAIL_COMPILE` marker make the fake
//! compiler exit nonzero.

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join(name);
  fs::write(&path, body).unwrap();
  let mut perms = fs::metadata(&path).unwrap().permissions();
  perms.set_mode(0o755);
  fs::set_permissions(&path, perms).unwrap();
  path
}

/// Fake compiler: logs its arguments, fails for sources containing
/// `FAIL_COMPILE`, and otherwise creates the `-o` output.
#[cfg(unix)]
pub fn fake_compiler(dir: &Path, log: &Path) -> PathBuf {
  let body = format!(
    r#"#!/bin/sh
echo "cc $*" >> "{log}"
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
for a in "$@"; do
  case "$a" in
    *.cpp)
      if grep -q FAIL_COMPILE "$a" 2>/dev/null; then
        echo "error: bad unit $a" >&2
        exit 1
      fi
      ;;
  esac
done
if [ -n "$out" ]; then : > "$out"; fi
exit 0
"#,
    log = log.display()
  );
  write_script(dir, "fake-cc", &body)
}

/// Fake archiver: logs its arguments and creates the archive file, which
/// follows the flag arguments.
#[cfg(unix)]
pub fn fake_archiver(dir: &Path, log: &Path) -> PathBuf {
  let body = format!(
    r#"#!/bin/sh
echo "ar $*" >> "{log}"
shift
: > "$1"
exit 0
"#,
    log = log.display()
  );
  write_script(dir, "fake-ar", &body)
}

/// Invocation lines logged so far; empty when nothing ran.
pub fn log_lines(log: &Path) -> Vec<String> {
  match fs::read_to_string(log) {
    Ok(content) => content.lines().map(str::to_string).collect(),
    Err(_) => Vec::new(),
  }
}

/// Compile invocations (`-c`) among the logged lines.
pub fn compile_lines(log: &Path) -> Vec<String> {
  log_lines(log)
    .into_iter()
    .filter(|line| line.starts_with("cc ") && line.contains(" -c "))
    .collect()
}

/// Link invocations (compiler runs without `-c`) among the logged lines.
pub fn link_lines(log: &Path) -> Vec<String> {
  log_lines(log)
    .into_iter()
    .filter(|line| line.starts_with("cc ") && !line.contains(" -c "))
    .collect()
}
