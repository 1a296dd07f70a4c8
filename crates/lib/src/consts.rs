//! Project layout and toolchain defaults.

/// Default persisted hash store file, relative to the project root.
pub const DEFAULT_STORE_FILE: &str = "make_hash.json";

/// Extension of compilable source units.
pub const SOURCE_EXT: &str = "cpp";

/// Program sources live directly in this directory.
pub const SRC_DIR: &str = "src";

/// Library units; each direct subdirectory becomes one archive.
pub const LIB_SRC_DIR: &str = "src/lib";

/// Build output root. Object files mirror the source tree beneath it.
pub const BIN_DIR: &str = "bin";

/// Combined archives.
pub const ARCHIVES_DIR: &str = "bin/archives";

/// Test program sources.
pub const TESTS_SRC_DIR: &str = "tests/src";

/// Test executables.
pub const TESTS_BIN_DIR: &str = "tests/bin";

/// Unix toolchain defaults.
pub const UNIX_CC: &str = "g++";
pub const UNIX_CC_ARGS: &[&str] = &["-std=c++17", "-O2", "-Wall", "-Wextra"];
pub const UNIX_THREADED_ARGS: &[&str] = &["-pthread"];
pub const UNIX_AR: &str = "ar";
pub const UNIX_AR_ARGS: &[&str] = &["rcs"];
