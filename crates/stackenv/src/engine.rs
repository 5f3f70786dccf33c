// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! One resolution run, from tier roots to a written activation script.

use std::path::PathBuf;

use crate::assemble::assemble_environment;
use crate::cache::{CacheRecord, cache_record_path};
use crate::context::Context;
use crate::discovery::discover;
use crate::environment::ResolvedEnvironment;
use crate::log::LogLevel;
use crate::resolve::{TierRecords, resolve};
use crate::script::{ScriptOptions, serialize};
use crate::tier::Tier;
use crate::Error;

#[cfg(test)]
#[path = "./engine_test.rs"]
mod engine_test;

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub artifact_path: PathBuf,
    /// The artifact of an earlier run was reused as is.
    pub reused: bool,
}

/// Discover, resolve and assemble the environment of `ctx`.
pub fn build_environment(ctx: &Context) -> crate::Result<ResolvedEnvironment> {
    let mut records = TierRecords::new();
    for tier in Tier::PACKAGE_TIERS {
        let Some(root) = ctx.locations.tier_root(tier) else {
            continue;
        };
        let found = discover(Some(root), tier.kind(), &ctx.log, |path| {
            ctx.callbacks().should_admit_package(ctx, path)
        })?;
        tracing::debug!("{tier}: {} package(s) discovered", found.len());
        records.insert(tier, found);
    }

    let resolved = resolve(records);
    assemble_environment(ctx, &resolved)
}

/// Write the activation script of `ctx` and return where it is.
///
/// The run log is written to the configured log file whether or not the
/// run succeeds.
pub fn run(ctx: &Context) -> crate::Result<RunOutcome> {
    let outcome = execute(ctx);
    let Some(log_file) = ctx.locations.log_file.as_deref() else {
        return outcome;
    };
    match (ctx.log.write_to(log_file, LogLevel::Info), outcome) {
        (Err(log_err), Ok(_)) => Err(log_err),
        (Err(log_err), Err(run_err)) => {
            tracing::warn!("could not write {}: {log_err}", log_file.display());
            Err(run_err)
        }
        (Ok(()), outcome) => outcome,
    }
}

fn execute(ctx: &Context) -> crate::Result<RunOutcome> {
    let artifact_path = ctx.locations.script_file.clone();

    if ctx.request.last {
        if !artifact_path.is_file() {
            return Err(Error::NoPreviousArtifact(artifact_path));
        }
        ctx.log.info(format!("reusing {}", artifact_path.display()));
        return Ok(RunOutcome {
            artifact_path,
            reused: true,
        });
    }

    let record_path = cache_record_path(&artifact_path);
    let environment = if ctx.request.cache_read {
        ctx.log.info(format!("reading cached environment {}", record_path.display()));
        CacheRecord::load(&record_path)?.environment
    } else {
        build_environment(ctx)?
    };

    let artifact = serialize(&environment, &ScriptOptions::for_context(ctx), &ctx.log);
    artifact.write(&artifact_path)?;
    ctx.log.info(format!("wrote {}", artifact_path.display()));

    if ctx.request.cache_write {
        CacheRecord::generate(&environment)?.write(&record_path)?;
        ctx.log.info(format!("wrote {}", record_path.display()));
    }

    Ok(RunOutcome {
        artifact_path,
        reused: false,
    })
}
