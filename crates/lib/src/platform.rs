//! Build platform resolution.

use std::fmt;

/// Platforms a build can target.
///
/// The platform selects the toolchain template and the artifact
/// extensions; it is resolved once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
  Unix,
  Windows,
}

impl Platform {
  /// Detect the platform from the running operating system.
  ///
  /// Returns `None` on operating systems the build knows nothing about.
  pub fn detect() -> Option<Self> {
    match std::env::consts::OS {
      "linux" | "macos" => Some(Self::Unix),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Returns the lowercase string identifier for this platform
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Unix => "unix",
      Self::Windows => "windows",
    }
  }

  /// Extension of compiled object files.
  pub fn object_extension(&self) -> &'static str {
    match self {
      Self::Unix => "o",
      Self::Windows => "obj",
    }
  }

  /// Extension of linked executables.
  pub fn executable_extension(&self) -> &'static str {
    match self {
      Self::Unix => "out",
      Self::Windows => "exe",
    }
  }

  /// Extension of combined archives.
  pub fn archive_extension(&self) -> &'static str {
    match self {
      Self::Unix => "a",
      Self::Windows => "lib",
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
