//! rtmake-lib: incremental build orchestration for the raytracer tree.
//!
//! This crate provides the change-detection and build-action engine:
//! - `hash`: content digests, the staleness oracle
//! - `store`: the persisted path→digest mapping consulted across runs
//! - `target`: named build targets and their registry
//! - `execute`: the build driver and compiler invoker
//! - `config`/`platform`: immutable settings and platform resolution

pub mod config;
pub mod consts;
pub mod execute;
pub mod hash;
pub mod platform;
pub mod store;
pub mod target;
pub mod util;
