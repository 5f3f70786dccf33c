// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! The per-run context handed to every component and hook.

use crate::app::AppDescriptor;
use crate::callbacks::SettingsCallbacks;
use crate::dialect::Palette;
use crate::hooks::{Callbacks, GlobalTemplates, HookRegistry, NoCallbacks, TemplateProvider};
use crate::log::RunLog;
use crate::package_env::EnvFileRegistry;
use crate::request::Request;
use crate::settings::{Locations, Settings};
use crate::Error;

/// Everything one resolution run shares. Built once, passed by reference.
#[derive(Debug)]
pub struct Context {
    pub request: Request,
    pub locations: Locations,
    pub app: Option<AppDescriptor>,
    pub palette: Palette,
    pub log: RunLog,
    callbacks: Box<dyn Callbacks>,
    registry: Box<dyn HookRegistry>,
    templates: Box<dyn TemplateProvider>,
}

impl Context {
    /// A context with no callbacks, package hooks from `package.env.yaml`
    /// files and no global templates.
    pub fn new(request: Request, locations: Locations) -> Self {
        Self {
            request: request.normalized(),
            locations,
            app: None,
            palette: Palette::default(),
            log: RunLog::new(),
            callbacks: Box::new(NoCallbacks),
            registry: Box::new(EnvFileRegistry),
            templates: Box::new(GlobalTemplates::default()),
        }
    }

    /// Resolve locations and collaborators from the settings.
    pub fn from_settings(settings: &Settings, request: Request) -> crate::Result<Self> {
        let request = request.normalized();
        let locations = settings.locations(&request)?;
        let app = locations
            .app_file
            .as_deref()
            .map(AppDescriptor::load)
            .transpose()?;
        let callbacks = SettingsCallbacks::new(&settings.callbacks)?;
        let palette = settings.display.palette()?;
        Ok(Self::new(request, locations)
            .with_app(app)
            .with_palette(palette)
            .with_callbacks(callbacks)
            .with_templates(settings.global_env.clone()))
    }

    pub fn with_app(mut self, app: Option<AppDescriptor>) -> Self {
        self.app = app;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_callbacks(mut self, callbacks: impl Callbacks + 'static) -> Self {
        self.callbacks = Box::new(callbacks);
        self
    }

    pub fn with_registry(mut self, registry: impl HookRegistry + 'static) -> Self {
        self.registry = Box::new(registry);
        self
    }

    pub fn with_templates(mut self, templates: impl TemplateProvider + 'static) -> Self {
        self.templates = Box::new(templates);
        self
    }

    pub fn callbacks(&self) -> &dyn Callbacks {
        self.callbacks.as_ref()
    }

    pub fn registry(&self) -> &dyn HookRegistry {
        self.registry.as_ref()
    }

    pub fn templates(&self) -> &dyn TemplateProvider {
        self.templates.as_ref()
    }

    /// Record a failure. In strict mode it comes straight back as an error,
    /// otherwise the run carries on.
    pub fn fail(&self, error: Error) -> crate::Result<()> {
        self.log.failure(error.to_string());
        if self.request.raise_exceptions {
            return Err(error);
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        use crate::dialect::Shell;
        use crate::request::Platform;

        let request = Request {
            developer: "tester".to_string(),
            platform: Platform::Linux,
            shell: Shell::Posix,
            ..Default::default()
        };
        let locations = Locations {
            master_project: "main".to_string(),
            project: "main".to_string(),
            tier_roots: Default::default(),
            app_file: None,
            script_file: std::env::temp_dir().join("stackenv-test.sh"),
            log_file: None,
        };
        Self::new(request, locations)
            .with_palette(Palette::plain())
            .with_registry(crate::hooks::NoHooks)
    }
}
