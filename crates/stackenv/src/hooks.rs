// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Collaborator interfaces the engine calls into.
//!
//! Hooks run inline on the resolving thread with no timeout. Registries
//! decide what a hook is allowed to do; the ones in this crate only read
//! declarative files.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::entry::{EnvEntryContainer, PackageIdentity};
use crate::request::Platform;

#[cfg(test)]
#[path = "./hooks_test.rs"]
mod hooks_test;

/// Class name used for the global environment template of every package.
pub const DEFAULT_TEMPLATE_CLASS: &str = "Package";

/// What a package hook decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// Keep the package, with whatever entries the hook added.
    Proceed,
    /// Drop the package from the environment.
    Veto,
}

/// Per-package customization.
pub trait PackageHook: Debug {
    fn set_environment(
        &self,
        ctx: &Context,
        container: &mut EnvEntryContainer,
    ) -> crate::Result<HookOutcome>;
}

/// Finds the hook of a package, if it has one.
pub trait HookRegistry: Debug {
    fn resolve(&self, package: &PackageIdentity) -> crate::Result<Option<Arc<dyn PackageHook>>>;
}

/// Run-wide callbacks. Every method has a neutral default.
pub trait Callbacks: Debug {
    /// Whether a discovered package root may take part in the run.
    fn should_admit_package(&self, _ctx: &Context, _package_root: &Path) -> bool {
        true
    }

    fn pre_build(&self, _ctx: &Context, _container: &mut EnvEntryContainer) -> crate::Result<()> {
        Ok(())
    }

    fn post_build(&self, _ctx: &Context, _container: &mut EnvEntryContainer) -> crate::Result<()> {
        Ok(())
    }

    /// Extra flags for the application executable.
    fn app_executable_flags(&self, _ctx: &Context) -> Option<String> {
        None
    }
}

/// Callbacks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallbacks;

impl Callbacks for NoCallbacks {}

/// A registry with no hooks at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl HookRegistry for NoHooks {
    fn resolve(&self, _package: &PackageIdentity) -> crate::Result<Option<Arc<dyn PackageHook>>> {
        Ok(None)
    }
}

/// Hooks registered in code, keyed by package name.
#[derive(Debug, Default, Clone)]
pub struct StaticRegistry {
    hooks: HashMap<String, Arc<dyn PackageHook>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, package: impl Into<String>, hook: impl PackageHook + 'static) {
        self.hooks.insert(package.into(), Arc::new(hook));
    }

    pub fn with(mut self, package: impl Into<String>, hook: impl PackageHook + 'static) -> Self {
        self.register(package, hook);
        self
    }
}

impl HookRegistry for StaticRegistry {
    fn resolve(&self, package: &PackageIdentity) -> crate::Result<Option<Arc<dyn PackageHook>>> {
        Ok(self.hooks.get(&package.name).cloned())
    }
}

/// A global environment template: attribute name to folder patterns.
///
/// Attributes are kept sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalTemplate {
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl GlobalTemplate {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.attributes
            .iter()
            .map(|(name, patterns)| (name.as_str(), patterns.as_slice()))
    }
}

/// Looks up global environment templates by class name.
pub trait TemplateProvider: Debug {
    fn lookup_template(&self, class_name: &str) -> Option<GlobalTemplate>;
}

/// Templates declared under `global_env:` in the settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalTemplates {
    pub classes: BTreeMap<String, GlobalTemplate>,
}

impl GlobalTemplates {
    pub fn insert(&mut self, class_name: impl Into<String>, template: GlobalTemplate) {
        self.classes.insert(class_name.into(), template);
    }

    /// Overlay `other` on top of these templates, attribute by attribute.
    pub fn merge(&mut self, other: GlobalTemplates) {
        for (class_name, template) in other.classes {
            self.classes
                .entry(class_name)
                .or_default()
                .attributes
                .extend(template.attributes);
        }
    }
}

impl TemplateProvider for GlobalTemplates {
    fn lookup_template(&self, class_name: &str) -> Option<GlobalTemplate> {
        self.classes.get(class_name).cloned()
    }
}

/// Title-cased base plus platform: `maya` on Linux is `MayaLinux`.
pub fn template_class_name(base: &str, platform: Platform) -> String {
    let mut name = String::with_capacity(base.len() + 7);
    let mut word_start = true;
    for c in base.chars() {
        if c.is_alphabetic() {
            if word_start {
                name.extend(c.to_uppercase());
            } else {
                name.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            name.push(c);
            word_start = true;
        }
    }
    name.push_str(platform.name());
    name
}
