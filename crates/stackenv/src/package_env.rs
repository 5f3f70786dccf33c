// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Declarative per-package hooks read from `package.env.yaml`.
//!
//! ```yaml
//! api: stackenv/v0
//! platforms: [linux]
//! applications: [all]
//! environment:
//!   - set: FOO_ROOT
//!     value: "{root}"
//!   - prepend: PATH
//!     value: tools/bin
//!   - source: setup.sh
//!   - command: "alias foo='{root}/bin/foo --verbose'"
//! ```
//!
//! Relative `prepend` and `source` values are taken from the package root.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::entry::{EnvEntryContainer, PackageIdentity};
use crate::hooks::{HookOutcome, HookRegistry, PackageHook};
use crate::settings::{ApiVersion, expand_placeholders, parse_versioned_yaml};
use crate::{Error, PACKAGE_ENV_FILENAME};

#[cfg(test)]
#[path = "./package_env_test.rs"]
mod package_env_test;

/// Matches every platform or application in a filter list.
pub const MATCH_ALL: &str = "all";

/// Set a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetEnv {
    pub set: String,
    pub value: String,
}

/// Prepend a path to a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrependEnv {
    pub prepend: String,
    pub value: String,
}

/// Source a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceScript {
    pub source: String,
}

/// Run a literal statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCommand {
    pub command: String,
}

/// One environment operation, as written in a package or settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvOp {
    Set(SetEnv),
    Prepend(PrependEnv),
    Source(SourceScript),
    Command(RunCommand),
}

impl EnvOp {
    /// Add this operation to `container`.
    ///
    /// `tokens` are substituted in every value; with a `root`, relative
    /// prepend and source values are joined onto it.
    pub fn apply(&self, container: &mut EnvEntryContainer, tokens: &[(&str, &str)], root: Option<&Path>) {
        let expand = |value: &str| expand_placeholders(value, tokens);
        let rooted = |value: &str| {
            let value = expand(value);
            match root {
                Some(root) if Path::new(&value).is_relative() => {
                    root.join(&value).to_string_lossy().into_owned()
                }
                _ => value,
            }
        };
        match self {
            EnvOp::Set(op) => container.add_single(&op.set, expand(&op.value)),
            EnvOp::Prepend(op) => container.add_multi(&op.prepend, rooted(&op.value)),
            EnvOp::Source(op) => container.add_script(rooted(&op.source)),
            EnvOp::Command(op) => container.add_command(expand(&op.command)),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Contents of a `package.env.yaml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageEnvFile {
    #[serde(default)]
    pub api: ApiVersion,

    /// A disabled package is vetoed.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Lowercase platform names; empty means every platform.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,

    /// Application names; only checked while an application is active.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<EnvOp>,

    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl PackageEnvFile {
    pub fn from_yaml<S: Into<String>>(yaml: S) -> crate::Result<Self> {
        parse_versioned_yaml(yaml.into())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;
        let mut file = Self::from_yaml(yaml)?;
        file.source_path = Some(path.to_path_buf());
        Ok(file)
    }

    fn allows(list: &[String], name: &str) -> bool {
        list.is_empty()
            || list
                .iter()
                .any(|item| item == MATCH_ALL || item.eq_ignore_ascii_case(name))
    }
}

impl PackageHook for PackageEnvFile {
    fn set_environment(
        &self,
        ctx: &Context,
        container: &mut EnvEntryContainer,
    ) -> crate::Result<HookOutcome> {
        let name = container.package_name().unwrap_or_default().to_string();
        if !self.enabled {
            ctx.log.info(format!("{name} is disabled in {PACKAGE_ENV_FILENAME}"));
            return Ok(HookOutcome::Veto);
        }
        let platform = ctx.request.platform.lowercase();
        if !Self::allows(&self.platforms, platform) {
            ctx.log.info(format!("{name} is not enabled for {platform}"));
            return Ok(HookOutcome::Veto);
        }
        if let Some(app) = ctx.app.as_ref().and_then(|a| a.application.as_deref()) {
            if !Self::allows(&self.applications, app) {
                ctx.log.info(format!("{name} is not enabled for {app}"));
                return Ok(HookOutcome::Veto);
            }
        }

        let root = container
            .root_path()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let root_text = root.to_string_lossy().into_owned();
        let version = container
            .version()
            .map(|v| v.to_string())
            .unwrap_or_default();
        let tokens = [
            ("root", root_text.as_str()),
            ("name", name.as_str()),
            ("version", version.as_str()),
            ("platform", platform),
        ];
        for op in &self.environment {
            op.apply(container, &tokens, Some(&root));
        }
        Ok(HookOutcome::Proceed)
    }
}

/// Resolves a package's hook from the `package.env.yaml` in its root.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvFileRegistry;

impl HookRegistry for EnvFileRegistry {
    fn resolve(&self, package: &PackageIdentity) -> crate::Result<Option<Arc<dyn PackageHook>>> {
        let path = package.root_path.join(PACKAGE_ENV_FILENAME);
        if !path.is_file() {
            return Ok(None);
        }
        let file = PackageEnvFile::load(&path).map_err(|err| Error::PackageHookFailed {
            package: package.name.clone(),
            message: format!("{}: {err}", path.display()),
        })?;
        Ok(Some(Arc::new(file)))
    }
}
