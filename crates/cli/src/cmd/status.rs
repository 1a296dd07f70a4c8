//! Implementation of the `rtmake status` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use rtmake_lib::config::BuildConfig;
use rtmake_lib::platform::Platform;
use rtmake_lib::store::HashStore;

use crate::output;

/// Show version, resolved platform, layout and hash store statistics.
pub fn cmd_status(root: &Path, hash_store: Option<PathBuf>) -> Result<()> {
  let mut config = BuildConfig::new(root);
  if let Some(path) = hash_store {
    config = config.with_store_path(path);
  }

  println!("rtmake v{}", env!("CARGO_PKG_VERSION"));
  println!();
  match Platform::detect() {
    Some(platform) => output::print_stat("Platform", platform.as_str()),
    None => output::print_stat("Platform", "unsupported"),
  }
  output::print_stat("Project root", &config.project_root.display().to_string());
  output::print_stat("Sources", &config.src_dir.display().to_string());
  output::print_stat("Binaries", &config.bin_dir.display().to_string());
  output::print_stat("Hash store", &config.store_path.display().to_string());

  match HashStore::load(&config.store_path) {
    Ok(store) => output::print_stat("Tracked units", &store.len().to_string()),
    Err(e) => output::print_warning(&format!("hash store unreadable: {e}")),
  }

  Ok(())
}
