//! Build configuration.
//!
//! One immutable [`BuildConfig`] is constructed at process start and
//! passed by reference into every component. Environment overrides are
//! read here, once; nothing reads configuration ambiently afterwards.

use std::env;
use std::path::{Path, PathBuf};

use crate::consts;
use crate::platform::Platform;

/// Compiler and archiver template for one platform.
///
/// Templates are independent per platform, never inferred from each
/// other. An empty compiler means the platform is unconfigured, which is
/// a configuration error surfaced before any compile is attempted.
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
  /// Compiler binary.
  pub compiler: String,
  /// Flags passed to every compile and link invocation.
  pub compile_args: Vec<String>,
  /// Extra flags appended when building with threading support.
  pub threaded_args: Vec<String>,
  /// Archiver binary combining grouped objects.
  pub archiver: String,
  /// Flags passed to every archive invocation.
  pub archiver_args: Vec<String>,
}

impl Toolchain {
  /// True when no compiler is configured for the platform.
  pub fn is_unconfigured(&self) -> bool {
    self.compiler.is_empty()
  }
}

/// Immutable build settings resolved once at startup.
#[derive(Debug, Clone)]
pub struct BuildConfig {
  /// Root of the project tree containing `src/` and `bin/`.
  pub project_root: PathBuf,
  /// Location of the persisted hash store.
  pub store_path: PathBuf,
  /// Program sources.
  pub src_dir: PathBuf,
  /// Library units; subdirectories become archives.
  pub lib_src_dir: PathBuf,
  /// Build output root.
  pub bin_dir: PathBuf,
  /// Combined archives.
  pub archives_dir: PathBuf,
  /// Test program sources.
  pub tests_src_dir: PathBuf,
  /// Test executables.
  pub tests_bin_dir: PathBuf,
  pub unix: Toolchain,
  pub windows: Toolchain,
}

impl BuildConfig {
  /// Default configuration for a project root.
  ///
  /// `RTMAKE_CC` and `RTMAKE_AR` override the toolchain binaries for
  /// both platforms; they are read here and never again. The Windows
  /// toolchain ships unconfigured until a compiler is supplied.
  pub fn new(project_root: impl Into<PathBuf>) -> Self {
    let project_root = project_root.into();

    let mut unix = Toolchain {
      compiler: consts::UNIX_CC.to_string(),
      compile_args: to_strings(consts::UNIX_CC_ARGS),
      threaded_args: to_strings(consts::UNIX_THREADED_ARGS),
      archiver: consts::UNIX_AR.to_string(),
      archiver_args: to_strings(consts::UNIX_AR_ARGS),
    };
    let mut windows = Toolchain::default();

    if let Ok(cc) = env::var("RTMAKE_CC") {
      unix.compiler = cc.clone();
      windows.compiler = cc;
    }
    if let Ok(ar) = env::var("RTMAKE_AR") {
      unix.archiver = ar.clone();
      windows.archiver = ar;
    }

    Self {
      store_path: project_root.join(consts::DEFAULT_STORE_FILE),
      src_dir: project_root.join(consts::SRC_DIR),
      lib_src_dir: project_root.join(consts::LIB_SRC_DIR),
      bin_dir: project_root.join(consts::BIN_DIR),
      archives_dir: project_root.join(consts::ARCHIVES_DIR),
      tests_src_dir: project_root.join(consts::TESTS_SRC_DIR),
      tests_bin_dir: project_root.join(consts::TESTS_BIN_DIR),
      unix,
      windows,
      project_root,
    }
  }

  /// Replace the hash store location.
  pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.store_path = path.into();
    self
  }

  /// Toolchain template for a platform.
  pub fn toolchain(&self, platform: Platform) -> &Toolchain {
    match platform {
      Platform::Unix => &self.unix,
      Platform::Windows => &self.windows,
    }
  }

  /// Object file path for a source unit: the unit's project-relative
  /// path mirrored under `bin/` with the platform object extension.
  pub fn object_path(&self, unit: &Path, platform: Platform) -> PathBuf {
    let rel = unit.strip_prefix(&self.project_root).unwrap_or(unit);
    self.bin_dir.join(rel).with_extension(platform.object_extension())
  }
}

fn to_strings(args: &[&str]) -> Vec<String> {
  args.iter().map(|s| s.to_string()).collect()
}
