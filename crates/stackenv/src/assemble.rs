// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Turning resolved packages and build phases into entry containers.

use std::path::Path;

#[cfg(test)]
#[path = "./assemble_test.rs"]
mod assemble_test;

use crate::context::Context;
use crate::discovery::PackageRecord;
use crate::entry::EnvEntryContainer;
use crate::environment::{AppLaunch, ResolvedEnvironment};
use crate::hooks::{DEFAULT_TEMPLATE_CLASS, HookOutcome, template_class_name};
use crate::resolve::TierRecords;
use crate::tier::Tier;
use crate::Error;

/// Replaced by the application's `folder_name`.
pub const FOLDER_NAME_PLACEHOLDER: &str = "FOLDER_NAME";
/// Replaced by the application's `version`.
pub const VERSION_PLACEHOLDER: &str = "VERSION";

/// Build the container of one resolved package.
///
/// `Ok(None)` means the package hook vetoed the package.
pub fn assemble(
    ctx: &Context,
    record: &PackageRecord,
    tier: Tier,
) -> crate::Result<Option<EnvEntryContainer>> {
    let identity = record.identity();
    let mut container = EnvEntryContainer::for_package(tier, identity.clone());

    if let Some(hook) = ctx.registry().resolve(&identity)? {
        if hook.set_environment(ctx, &mut container)? == HookOutcome::Veto {
            ctx.log.info(format!("{} excluded by its package hook", identity.name));
            return Ok(None);
        }
    }

    merge_global_template(ctx, &mut container, DEFAULT_TEMPLATE_CLASS)?;
    if let Some(app) = &ctx.app {
        match app.global_env_class_name.as_deref() {
            Some(class_name) if !class_name.is_empty() => {
                merge_global_template(ctx, &mut container, class_name)?;
            }
            _ => ctx.log.warning(format!(
                "app file {} has no global_env_class_name, only {DEFAULT_TEMPLATE_CLASS} is applied",
                app.path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            )),
        }
    }

    container.sort();
    Ok(Some(container))
}

/// Build the container of a pre or post build phase.
///
/// `Ok(None)` when the request skips the phase.
pub fn assemble_phase(ctx: &Context, tier: Tier) -> crate::Result<Option<EnvEntryContainer>> {
    let skipped = match tier {
        Tier::PreBuild => ctx.request.ignore_pre,
        Tier::PostBuild => ctx.request.ignore_post,
        other => {
            return Err(Error::ValidationFailed(format!("{other} is not a build phase")));
        }
    };
    if skipped {
        return Ok(None);
    }

    let mut container = EnvEntryContainer::for_phase(tier);
    if tier == Tier::PreBuild {
        ctx.callbacks().pre_build(ctx, &mut container)?;
    } else {
        ctx.callbacks().post_build(ctx, &mut container)?;
    }
    container.sort();
    Ok(Some(container))
}

/// Assemble every phase and resolved package.
///
/// A failing package or phase is recorded on the run log and skipped,
/// unless the request raises exceptions.
pub fn assemble_environment(
    ctx: &Context,
    resolved: &TierRecords,
) -> crate::Result<ResolvedEnvironment> {
    let mut env = ResolvedEnvironment::new(ctx.locations.selection(&ctx.request));

    add_phase(ctx, &mut env, Tier::PreBuild)?;
    for (tier, records) in resolved.iter() {
        for record in records {
            match assemble(ctx, record, tier) {
                Ok(Some(container)) => env.insert(container),
                Ok(None) => {}
                Err(err) => ctx.fail(err)?,
            }
        }
    }
    add_phase(ctx, &mut env, Tier::PostBuild)?;

    env.set_app(app_launch(ctx));
    Ok(env)
}

fn add_phase(ctx: &Context, env: &mut ResolvedEnvironment, tier: Tier) -> crate::Result<()> {
    match assemble_phase(ctx, tier) {
        Ok(Some(container)) => env.insert(container),
        Ok(None) => tracing::debug!("{tier} skipped"),
        Err(err) => ctx.fail(err)?,
    }
    Ok(())
}

fn app_launch(ctx: &Context) -> Option<AppLaunch> {
    let app = ctx.app.as_ref()?;
    let file = app
        .path
        .clone()
        .or_else(|| ctx.locations.app_file.clone())?;
    Some(AppLaunch {
        file,
        descriptor: app.clone(),
        executable: app.executable_for(ctx.request.platform).map(str::to_string),
        flags: ctx.callbacks().app_executable_flags(ctx),
    })
}

/// Add a Multi entry for every template folder that exists in the package.
fn merge_global_template(
    ctx: &Context,
    container: &mut EnvEntryContainer,
    base_class: &str,
) -> crate::Result<()> {
    let class_name = template_class_name(base_class, ctx.request.platform);
    let Some(template) = ctx.templates().lookup_template(&class_name) else {
        ctx.log.warning(format!("global env class {class_name} not found, skipped"));
        return Ok(());
    };
    let Some(root) = container.root_path().map(Path::to_path_buf) else {
        return Ok(());
    };

    for (attribute, patterns) in template.iter() {
        for pattern in patterns {
            let folder = substitute_app_placeholders(ctx, &class_name, pattern)?;
            let candidate = root.join(&folder);
            if candidate.is_dir() {
                container.add_multi(attribute, candidate.to_string_lossy());
            }
        }
    }
    Ok(())
}

fn substitute_app_placeholders(
    ctx: &Context,
    class_name: &str,
    pattern: &str,
) -> crate::Result<String> {
    let mut folder = pattern.to_string();
    let fields = [
        (FOLDER_NAME_PLACEHOLDER, ctx.app.as_ref().map(|a| &a.folder_name), "folder_name"),
        (VERSION_PLACEHOLDER, ctx.app.as_ref().map(|a| &a.version), "version"),
    ];
    for (placeholder, value, field) in fields {
        if !folder.contains(placeholder) {
            continue;
        }
        let value = match value {
            Some(Some(value)) => value,
            Some(None) => {
                return Err(Error::MissingAppContext {
                    class_name: class_name.to_string(),
                    pattern: pattern.to_string(),
                    placeholder,
                    reason: format!("the app file has no {field}"),
                });
            }
            None => {
                return Err(Error::MissingAppContext {
                    class_name: class_name.to_string(),
                    pattern: pattern.to_string(),
                    placeholder,
                    reason: "no application is active".to_string(),
                });
            }
        };
        folder = folder.replace(placeholder, value);
    }
    Ok(folder)
}
