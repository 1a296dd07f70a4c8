//! Built-in targets.
//!
//! `raytracer` builds the main executables from `src/*.cpp`; `tests`
//! builds one executable per `tests/src/*.cpp`. Both share the library
//! tree: loose sources directly under `src/lib/` become standalone
//! objects, and each direct subdirectory becomes one archive named after
//! it.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{ArchiveSpec, ProgramSpec, Target, TargetError};
use crate::config::BuildConfig;
use crate::consts::SOURCE_EXT;

/// Builds the raytracer executables.
pub struct RaytracerTarget;

impl Target for RaytracerTarget {
  fn name(&self) -> &'static str {
    "raytracer"
  }

  fn description(&self) -> &'static str {
    "Build the raytracer executables"
  }

  fn units(&self, config: &BuildConfig) -> Result<Vec<PathBuf>, TargetError> {
    scan_sources(&config.lib_src_dir, false)
  }

  fn archives(&self, config: &BuildConfig) -> Result<Vec<ArchiveSpec>, TargetError> {
    lib_archives(config)
  }

  fn programs(&self, config: &BuildConfig) -> Result<Vec<ProgramSpec>, TargetError> {
    let mains = scan_sources(&config.src_dir, false)?;
    Ok(
      mains
        .into_iter()
        .map(|main| ProgramSpec {
          name: stem_of(&main),
          main,
          out_dir: config.bin_dir.clone(),
        })
        .collect(),
    )
  }
}

/// Builds one test executable per test source.
pub struct TestsTarget;

impl Target for TestsTarget {
  fn name(&self) -> &'static str {
    "tests"
  }

  fn description(&self) -> &'static str {
    "Build the test executables"
  }

  fn units(&self, config: &BuildConfig) -> Result<Vec<PathBuf>, TargetError> {
    scan_sources(&config.lib_src_dir, false)
  }

  fn archives(&self, config: &BuildConfig) -> Result<Vec<ArchiveSpec>, TargetError> {
    lib_archives(config)
  }

  fn programs(&self, config: &BuildConfig) -> Result<Vec<ProgramSpec>, TargetError> {
    let mains = scan_sources(&config.tests_src_dir, false)?;
    Ok(
      mains
        .into_iter()
        .map(|main| ProgramSpec {
          name: stem_of(&main),
          main,
          out_dir: config.tests_bin_dir.clone(),
        })
        .collect(),
    )
  }
}

/// Each direct subdirectory of `src/lib/` is one archive; members are
/// the sources beneath it, recursively.
fn lib_archives(config: &BuildConfig) -> Result<Vec<ArchiveSpec>, TargetError> {
  let dir = &config.lib_src_dir;
  if !dir.is_dir() {
    return Err(TargetError::SourceDirMissing(dir.clone()));
  }

  let entries = fs::read_dir(dir).map_err(|e| TargetError::Scan {
    path: dir.clone(),
    message: e.to_string(),
  })?;

  let mut subdirs = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|e| TargetError::Scan {
      path: dir.clone(),
      message: e.to_string(),
    })?;
    if entry.path().is_dir() {
      subdirs.push(entry.path());
    }
  }
  subdirs.sort();

  let mut archives = Vec::new();
  for sub in subdirs {
    let units = scan_sources(&sub, true)?;
    if units.is_empty() {
      continue;
    }
    archives.push(ArchiveSpec {
      name: file_name_of(&sub),
      units,
    });
  }
  Ok(archives)
}

/// Scan a directory for source units in sorted order.
///
/// A missing directory is an error: a target's declared source tree is
/// authoritative.
fn scan_sources(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, TargetError> {
  if !dir.is_dir() {
    return Err(TargetError::SourceDirMissing(dir.to_path_buf()));
  }

  let mut walker = WalkDir::new(dir).sort_by_file_name();
  if !recursive {
    walker = walker.max_depth(1);
  }

  let mut units = Vec::new();
  for entry in walker {
    let entry = entry.map_err(|e| TargetError::Scan {
      path: dir.to_path_buf(),
      message: e.to_string(),
    })?;
    if !entry.file_type().is_file() {
      continue;
    }
    let path = entry.into_path();
    if path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXT) {
      units.push(path);
    }
  }
  Ok(units)
}

fn stem_of(path: &Path) -> String {
  path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default()
}

fn file_name_of(path: &Path) -> String {
  path
    .file_name()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default()
}
