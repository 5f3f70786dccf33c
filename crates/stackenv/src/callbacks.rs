// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Run callbacks driven by the `callbacks:` block of the settings.

use std::path::Path;

use glob::Pattern;

use crate::context::Context;
use crate::entry::EnvEntryContainer;
use crate::hooks::Callbacks;
use crate::package_env::EnvOp;
use crate::settings::CallbackSettings;
use crate::Error;

#[cfg(test)]
#[path = "./callbacks_test.rs"]
mod callbacks_test;

#[derive(Debug, Clone, Default)]
pub struct SettingsCallbacks {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    settings: CallbackSettings,
}

fn compile(patterns: &[String]) -> crate::Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| {
                Error::ValidationFailed(format!("invalid admission pattern '{p}': {e}"))
            })
        })
        .collect()
}

impl SettingsCallbacks {
    pub fn new(settings: &CallbackSettings) -> crate::Result<Self> {
        Ok(Self {
            include: compile(&settings.admission.include)?,
            exclude: compile(&settings.admission.exclude)?,
            settings: settings.clone(),
        })
    }

    fn apply_phase(ops: &[EnvOp], ctx: &Context, container: &mut EnvEntryContainer) {
        let request = &ctx.request;
        let tokens = [
            ("project", ctx.locations.project.as_str()),
            ("master_project", ctx.locations.master_project.as_str()),
            ("developer", request.developer.as_str()),
            ("development", request.development.as_deref().unwrap_or_default()),
            ("stage", request.stage.as_deref().unwrap_or_default()),
            ("app", request.app.as_deref().unwrap_or_default()),
            ("platform", request.platform.lowercase()),
        ];
        for op in ops {
            op.apply(container, &tokens, None);
        }
    }
}

impl Callbacks for SettingsCallbacks {
    fn should_admit_package(&self, _ctx: &Context, package_root: &Path) -> bool {
        if self.exclude.iter().any(|p| p.matches_path(package_root)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.matches_path(package_root))
    }

    fn pre_build(&self, ctx: &Context, container: &mut EnvEntryContainer) -> crate::Result<()> {
        Self::apply_phase(&self.settings.pre_build, ctx, container);
        Ok(())
    }

    fn post_build(&self, ctx: &Context, container: &mut EnvEntryContainer) -> crate::Result<()> {
        Self::apply_phase(&self.settings.post_build, ctx, container);
        Ok(())
    }

    fn app_executable_flags(&self, ctx: &Context) -> Option<String> {
        let app = ctx
            .app
            .as_ref()
            .and_then(|a| a.application.as_deref())
            .or(ctx.request.app.as_deref())?;
        self.settings.app_executable_flags.get(app).cloned()
    }
}
