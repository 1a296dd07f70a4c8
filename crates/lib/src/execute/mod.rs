//! Build driver.
//!
//! Resolves a target, decides which units are stale, invokes the
//! compiler for exactly those, combines archive groups, links programs,
//! and aggregates the outcome:
//!
//! 1. Plan: enumerate every owned unit and compute every digest up
//!    front. A declared unit that is missing aborts the whole action
//!    here, before anything is compiled.
//! 2. Compile: stale units only, one at a time, in declaration order. A
//!    failing unit is recorded and its siblings continue.
//! 3. Archive: groups whose members are healthy are combined when a
//!    member was recompiled or the archive file is missing.
//! 4. Link: programs are compiled-and-linked when their source is stale,
//!    something they consume was rebuilt, or the output is missing.
//!
//! Digest mismatches are never errors: they are the signal driving
//! recompilation. The caller persists the hash store for any returned
//! report and leaves it untouched on a hard error.

pub mod invoke;
pub mod types;

pub use types::{BuildReport, ExecuteError, SkippedArtifact, UnitFailure};

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::{BuildConfig, Toolchain};
use crate::hash::{self, Digest, DigestError};
use crate::platform::Platform;
use crate::store::{self, HashStore};
use crate::target::{Target, TargetRegistry};

use invoke::CompileResult;

/// One unit's planned work.
#[derive(Debug)]
struct UnitPlan {
  unit: PathBuf,
  key: String,
  digest: Digest,
  /// Content digest differs from (or is absent from) the store.
  stale: bool,
}

/// What happened to one unit during the compile pass.
enum UnitState {
  Compiled(PathBuf),
  Fresh(PathBuf),
  Failed,
}

/// Dispatch a named target.
///
/// Fails with [`ExecuteError::UnknownTarget`] before any filesystem or
/// process side effect. The returned report carries per-unit failures;
/// persisting `store` is the caller's decision.
pub async fn dispatch(
  registry: &TargetRegistry,
  name: &str,
  config: &BuildConfig,
  platform: Platform,
  threaded: bool,
  store: &mut HashStore,
) -> Result<BuildReport, ExecuteError> {
  let target = registry
    .get(name)
    .ok_or_else(|| ExecuteError::UnknownTarget(name.to_string()))?;
  run_target(target, config, platform, threaded, store).await
}

/// Run one target: plan, compile, archive, link.
pub async fn run_target(
  target: &dyn Target,
  config: &BuildConfig,
  platform: Platform,
  threaded: bool,
  store: &mut HashStore,
) -> Result<BuildReport, ExecuteError> {
  let toolchain = config.toolchain(platform);
  if toolchain.is_unconfigured() {
    return Err(ExecuteError::UnconfiguredToolchain(platform));
  }

  info!(name = target.name(), platform = %platform, threaded, "building target");

  // Plan everything before compiling anything: a vanished declared unit
  // must abort while the tree is still untouched.
  let loose = plan_units(target.units(config)?, config, store)?;
  let mut archive_plans = Vec::new();
  for spec in target.archives(config)? {
    let members = plan_units(spec.units.clone(), config, store)?;
    archive_plans.push((spec, members));
  }
  let mut program_plans = Vec::new();
  for spec in target.programs(config)? {
    let main = plan_unit(spec.main.clone(), config, store)?;
    program_plans.push((spec, main));
  }

  let mut report = BuildReport::default();

  // First unit whose failure blocks downstream artifacts.
  let mut blocking: Option<PathBuf> = None;
  // Whether anything consumed by the link step was rebuilt.
  let mut rebuilt = false;

  // Standalone library units.
  let mut objects = Vec::new();
  for plan in &loose {
    let object = config.object_path(&plan.unit, platform);
    match build_object(plan, object, toolchain, threaded, store, &mut report).await? {
      UnitState::Compiled(object) => {
        rebuilt = true;
        objects.push(object);
      }
      UnitState::Fresh(object) => objects.push(object),
      UnitState::Failed => blocking = blocking.or_else(|| Some(plan.unit.clone())),
    }
  }

  // Archive groups.
  let mut archive_files = Vec::new();
  for (spec, members) in &archive_plans {
    let archive_path = config
      .archives_dir
      .join(&spec.name)
      .with_extension(platform.archive_extension());

    let mut member_objects = Vec::new();
    let mut member_rebuilt = false;
    let mut member_failed: Option<PathBuf> = None;
    for plan in members {
      let object = config.object_path(&plan.unit, platform);
      match build_object(plan, object, toolchain, threaded, store, &mut report).await? {
        UnitState::Compiled(object) => {
          member_rebuilt = true;
          member_objects.push(object);
        }
        UnitState::Fresh(object) => member_objects.push(object),
        UnitState::Failed => member_failed = member_failed.or_else(|| Some(plan.unit.clone())),
      }
    }

    if let Some(failed) = member_failed {
      report.skipped.push(SkippedArtifact {
        artifact: archive_path,
        failed_unit: failed.clone(),
      });
      blocking = blocking.or(Some(failed));
      continue;
    }

    if member_rebuilt || !archive_path.exists() {
      let invocation = invoke::archive_command(toolchain, &member_objects, &archive_path);
      info!(archive = %archive_path.display(), "combining archive");
      match invoke::run(&invocation, &archive_path).await? {
        CompileResult::Success(archive) => {
          rebuilt = true;
          report.artifacts.push(archive.clone());
          archive_files.push(archive);
        }
        CompileResult::Failure(diagnostic) => {
          warn!(archive = %archive_path.display(), "archiver failed");
          blocking = blocking.or_else(|| Some(archive_path.clone()));
          report.failures.push(UnitFailure {
            unit: archive_path,
            diagnostic,
          });
        }
      }
    } else {
      debug!(archive = %archive_path.display(), "archive up to date");
      archive_files.push(archive_path);
    }
  }

  // Program executables.
  for (spec, main) in &program_plans {
    let output = spec
      .out_dir
      .join(&spec.name)
      .with_extension(platform.executable_extension());

    if let Some(failed) = &blocking {
      report.skipped.push(SkippedArtifact {
        artifact: output,
        failed_unit: failed.clone(),
      });
      continue;
    }

    if !main.stale && !rebuilt && output.exists() {
      debug!(program = %output.display(), "up to date");
      report.up_to_date.push(main.unit.clone());
      continue;
    }

    let invocation = invoke::link_command(toolchain, threaded, &main.unit, &objects, &archive_files, &output);
    info!(program = %output.display(), "linking");
    match invoke::run(&invocation, &output).await? {
      CompileResult::Success(artifact) => {
        if main.stale {
          store.set(main.key.clone(), main.digest.clone());
          report.compiled.push(main.unit.clone());
        } else {
          report.up_to_date.push(main.unit.clone());
        }
        report.artifacts.push(artifact);
      }
      CompileResult::Failure(diagnostic) => {
        warn!(unit = %main.unit.display(), "link failed");
        report.failures.push(UnitFailure {
          unit: main.unit.clone(),
          diagnostic,
        });
      }
    }
  }

  info!(
    name = target.name(),
    compiled = report.compiled.len(),
    up_to_date = report.up_to_date.len(),
    failed = report.failures.len(),
    "build pass finished"
  );
  Ok(report)
}

/// Compile one unit if its content or object is out of date.
///
/// A successful compile updates the unit's store entry in memory; a
/// nonzero exit records the failure and lets siblings continue.
async fn build_object(
  plan: &UnitPlan,
  object: PathBuf,
  toolchain: &Toolchain,
  threaded: bool,
  store: &mut HashStore,
  report: &mut BuildReport,
) -> Result<UnitState, ExecuteError> {
  if !plan.stale && object.exists() {
    debug!(unit = %plan.unit.display(), "up to date");
    report.up_to_date.push(plan.unit.clone());
    return Ok(UnitState::Fresh(object));
  }

  let invocation = invoke::compile_command(toolchain, threaded, &plan.unit, &object);
  info!(unit = %plan.unit.display(), "compiling");
  match invoke::run(&invocation, &object).await? {
    CompileResult::Success(object) => {
      store.set(plan.key.clone(), plan.digest.clone());
      report.compiled.push(plan.unit.clone());
      Ok(UnitState::Compiled(object))
    }
    CompileResult::Failure(diagnostic) => {
      warn!(unit = %plan.unit.display(), "compile failed");
      report.failures.push(UnitFailure {
        unit: plan.unit.clone(),
        diagnostic,
      });
      Ok(UnitState::Failed)
    }
  }
}

fn plan_units(
  units: Vec<PathBuf>,
  config: &BuildConfig,
  store: &HashStore,
) -> Result<Vec<UnitPlan>, ExecuteError> {
  units.into_iter().map(|unit| plan_unit(unit, config, store)).collect()
}

fn plan_unit(unit: PathBuf, config: &BuildConfig, store: &HashStore) -> Result<UnitPlan, ExecuteError> {
  let digest = match hash::digest_file(&unit) {
    Ok(digest) => digest,
    Err(DigestError::NotFound(path)) => return Err(ExecuteError::UnitNotFound(path)),
    Err(e) => return Err(e.into()),
  };
  let key = store::unit_key(&config.project_root, &unit);
  let stale = store.get(&key) != Some(&digest);
  Ok(UnitPlan {
    unit,
    key,
    digest,
    stale,
  })
}
