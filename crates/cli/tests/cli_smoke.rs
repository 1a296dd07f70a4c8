//! CLI smoke tests for rtmake.
//!
//! These tests verify that all CLI commands run without panicking and
//! return appropriate exit codes. Build tests run against fake
//! compiler/archiver scripts supplied via `RTMAKE_CC`/`RTMAKE_AR`, so no
//! real toolchain is required.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the rtmake binary.
fn rtmake_cmd() -> Command {
  Command::cargo_bin("rtmake").unwrap()
}

/// Create a temp directory holding a minimal raytracer tree.
fn temp_project() -> TempDir {
  let temp = TempDir::new().unwrap();
  for (file, content) in [
    ("src/RayTracer.cpp", "int main() { return render(); }\n"),
    ("src/lib/Ray.cpp", "ray v1\n"),
    ("src/lib/Vec3.cpp", "vec3 v1\n"),
    ("src/lib/materials/Metal.cpp", "metal v1\n"),
  ] {
    let path = temp.path().join(file);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
  }
  temp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  rtmake_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  rtmake_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("rtmake"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["build", "targets", "status"] {
    rtmake_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// Configuration errors
// =============================================================================

#[test]
fn conflicting_platform_flags_are_rejected() {
  let temp = temp_project();
  rtmake_cmd()
    .args(["build", "--unix", "--win"])
    .arg("-C")
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn unknown_target_fails_without_side_effects() {
  let temp = temp_project();
  rtmake_cmd()
    .args(["build", "warp-drive", "--unix"])
    .arg("-C")
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown build target 'warp-drive'"));

  // No store was written and no outputs appeared.
  assert!(!temp.path().join("make_hash.json").exists());
  assert!(!temp.path().join("bin").exists());
}

// =============================================================================
// targets & status
// =============================================================================

#[test]
fn targets_lists_builtins() {
  rtmake_cmd()
    .arg("targets")
    .assert()
    .success()
    .stdout(predicate::str::contains("raytracer").and(predicate::str::contains("tests")));
}

#[test]
fn status_reports_platform_and_store() {
  let temp = temp_project();
  rtmake_cmd()
    .arg("status")
    .arg("-C")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("Platform").and(predicate::str::contains("Hash store")));
}

// =============================================================================
// build (fake toolchain)
// =============================================================================

#[cfg(unix)]
mod build {
  use super::*;
  use std::path::{Path, PathBuf};

  fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
  }

  /// Fake compiler honoring `-o` and failing on `FAIL_COMPILE` sources.
  fn fake_cc(dir: &Path) -> PathBuf {
    write_script(
      dir,
      "fake-cc",
      r#"#!/bin/sh
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
    )
  }

  fn fake_ar(dir: &Path) -> PathBuf {
    write_script(
      dir,
      "fake-ar",
      r#"#!/bin/sh
shift
: > "$1"
exit 0
"#,
    )
  }

  fn build_cmd(temp: &TempDir) -> Command {
    let mut cmd = rtmake_cmd();
    cmd
      .arg("build")
      .arg("-C")
      .arg(temp.path())
      .env("RTMAKE_CC", fake_cc(temp.path()))
      .env("RTMAKE_AR", fake_ar(temp.path()));
    cmd
  }

  #[test]
  fn build_compiles_and_persists_the_store() {
    let temp = temp_project();

    build_cmd(&temp)
      .assert()
      .success()
      .stdout(predicate::str::contains("Build complete"));

    assert!(temp.path().join("make_hash.json").exists());
    assert!(temp.path().join("bin/RayTracer.out").exists());
    assert!(temp.path().join("bin/archives/materials.a").exists());

    let store = std::fs::read_to_string(temp.path().join("make_hash.json")).unwrap();
    assert!(store.contains("src/lib/Vec3.cpp"));
  }

  #[test]
  fn second_build_is_all_up_to_date() {
    let temp = temp_project();

    build_cmd(&temp).assert().success();
    build_cmd(&temp)
      .assert()
      .success()
      .stdout(predicate::str::contains("Compiled: 0"));
  }

  #[test]
  fn failing_unit_exits_nonzero_but_persists_siblings() {
    let temp = temp_project();
    std::fs::write(temp.path().join("src/lib/Ray.cpp"), "// FAIL_COMPILE\n").unwrap();

    build_cmd(&temp)
      .assert()
      .failure()
      .stderr(predicate::str::contains("failed: ").and(predicate::str::contains("Ray.cpp")));

    // Successes are persisted even though the pass partially failed.
    let store = std::fs::read_to_string(temp.path().join("make_hash.json")).unwrap();
    assert!(store.contains("src/lib/Vec3.cpp"));
    assert!(!store.contains("src/lib/Ray.cpp"));
  }

  #[test]
  fn corrupt_store_aborts_and_is_left_untouched() {
    let temp = temp_project();
    let store_path = temp.path().join("make_hash.json");
    let content = r#"{"src/lib/Ray.cpp": 42}"#;
    std::fs::write(&store_path, content).unwrap();

    build_cmd(&temp)
      .assert()
      .failure()
      .stderr(predicate::str::contains("corrupt hash store"));

    assert_eq!(std::fs::read_to_string(&store_path).unwrap(), content);
    assert!(!temp.path().join("bin").exists());
  }

  #[test]
  fn json_report_is_emitted() {
    let temp = temp_project();

    build_cmd(&temp)
      .arg("--json")
      .assert()
      .success()
      .stdout(predicate::str::contains("\"compiled\"").and(predicate::str::contains("\"failures\"")));
  }

  #[test]
  fn custom_store_path_is_respected() {
    let temp = temp_project();
    let store_path = temp.path().join("state/hashes.json");

    build_cmd(&temp).arg("--hash-store").arg(&store_path).assert().success();

    assert!(store_path.exists());
    assert!(!temp.path().join("make_hash.json").exists());
  }
}
