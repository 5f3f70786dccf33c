// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Settings file parsing and resolution of where every tier lives.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dialect::{Palette, parse_color};
use crate::environment::Selection;
use crate::hooks::GlobalTemplates;
use crate::package_env::EnvOp;
use crate::request::Request;
use crate::tier::Tier;
use crate::{Error, SETTINGS_FILENAME};

#[cfg(test)]
#[path = "./settings_test.rs"]
mod settings_test;

/// Environment variable naming a settings file.
pub const SETTINGS_ENV_VAR: &str = "STACKENV_SETTINGS";

/// API version for stackenv documents.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ApiVersion {
    #[default]
    #[serde(rename = "stackenv/v0")]
    V0,
}

/// Helper for two-stage deserialization to determine API version first.
#[derive(Deserialize)]
struct ApiVersionMapping {
    #[serde(default)]
    api: ApiVersion,
}

/// Parse a YAML document after checking its `api` version.
pub(crate) fn parse_versioned_yaml<T: DeserializeOwned>(yaml: String) -> crate::Result<T> {
    // Stage 1: Parse to get API version
    let value: serde_yaml::Value = serde_yaml::from_str(&yaml).map_err(|e| Error::InvalidYaml {
        error: e,
        yaml_content: yaml.clone(),
    })?;

    let with_version: ApiVersionMapping =
        serde_yaml::from_value(value.clone()).map_err(|e| Error::InvalidYaml {
            error: e,
            yaml_content: yaml.clone(),
        })?;

    // Stage 2: Deserialize based on version
    match with_version.api {
        ApiVersion::V0 => serde_yaml::from_value(value).map_err(|e| Error::InvalidYaml {
            error: e,
            yaml_content: yaml,
        }),
    }
}

/// Replace every `{key}` in `template` with its value. Unknown keys are
/// left alone.
pub fn expand_placeholders(template: &str, tokens: &[(&str, &str)]) -> String {
    let mut expanded = template.to_string();
    for (key, value) in tokens {
        let pattern = format!("{{{key}}}");
        if expanded.contains(&pattern) {
            expanded = expanded.replace(&pattern, value);
        }
    }
    expanded
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> crate::Result<PathBuf> {
    if path == "~" || path.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| {
            Error::ValidationFailed("Cannot resolve ~ without HOME".to_string())
        })?;
        let rel = path.strip_prefix("~/").unwrap_or_default();
        return Ok(home.join(rel));
    }
    Ok(PathBuf::from(path))
}

/// Path templates, one per tier plus the run's files.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PathTemplates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_internal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_external: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_project_internal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_project_external: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl PathTemplates {
    pub fn tier(&self, tier: Tier) -> Option<&str> {
        match tier {
            Tier::Reserved => self.reserved.as_deref(),
            Tier::Development => self.development.as_deref(),
            Tier::Stage => self.stage.as_deref(),
            Tier::ProjectInternal => self.project_internal.as_deref(),
            Tier::ProjectExternal => self.project_external.as_deref(),
            Tier::MasterProjectInternal => self.master_project_internal.as_deref(),
            Tier::MasterProjectExternal => self.master_project_external.as_deref(),
            Tier::PreBuild | Tier::PostBuild => None,
        }
    }

    fn overlay(&mut self, other: PathTemplates) {
        let fields = [
            (&mut self.reserved, other.reserved),
            (&mut self.development, other.development),
            (&mut self.stage, other.stage),
            (&mut self.project_internal, other.project_internal),
            (&mut self.project_external, other.project_external),
            (&mut self.master_project_internal, other.master_project_internal),
            (&mut self.master_project_external, other.master_project_external),
            (&mut self.app_file, other.app_file),
            (&mut self.script_file, other.script_file),
            (&mut self.log_file, other.log_file),
        ];
        for (mine, theirs) in fields {
            if theirs.is_some() {
                *mine = theirs;
            }
        }
    }
}

/// Which discovered package roots take part in a run.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AdmissionRules {
    /// When not empty, a package root must match one of these globs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    /// A package root matching any of these globs is rejected.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

/// Declarative run callbacks.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CallbackSettings {
    #[serde(default)]
    pub admission: AdmissionRules,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_build: Vec<EnvOp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_build: Vec<EnvOp>,
    /// Application name to executable flags.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub app_executable_flags: BTreeMap<String, String>,
}

impl CallbackSettings {
    fn overlay(&mut self, other: CallbackSettings) {
        self.admission.include.extend(other.admission.include);
        self.admission.exclude.extend(other.admission.exclude);
        self.pre_build.extend(other.pre_build);
        self.post_build.extend(other.post_build);
        self.app_executable_flags.extend(other.app_executable_flags);
    }
}

/// Display colours, by `colored` colour name.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DisplaySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

impl DisplaySettings {
    fn overlay(&mut self, other: DisplaySettings) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        let fields = [
            (&mut self.header, other.header),
            (&mut self.title, other.title),
            (&mut self.package, other.package),
            (&mut self.value, other.value),
            (&mut self.variable, other.variable),
            (&mut self.script, other.script),
            (&mut self.command, other.command),
            (&mut self.separator, other.separator),
        ];
        for (mine, theirs) in fields {
            if theirs.is_some() {
                *mine = theirs;
            }
        }
    }

    /// Build the palette, starting from the default colours.
    pub fn palette(&self) -> crate::Result<Palette> {
        if self.enabled == Some(false) {
            return Ok(Palette::plain());
        }
        let mut palette = Palette::default();
        let slots = [
            (&mut palette.header, &self.header),
            (&mut palette.title, &self.title),
            (&mut palette.package, &self.package),
            (&mut palette.value, &self.value),
            (&mut palette.variable, &self.variable),
            (&mut palette.script, &self.script),
            (&mut palette.command, &self.command),
            (&mut palette.separator, &self.separator),
        ];
        for (slot, name) in slots {
            if let Some(name) = name {
                *slot = Some(parse_color(name)?);
            }
        }
        Ok(palette)
    }
}

/// Contents of a `stackenv.yaml` file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiVersion,

    /// Name of the master project. Required once includes are merged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_project: Option<String>,

    /// Other settings files merged underneath this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,

    #[serde(default)]
    pub paths: PathTemplates,

    #[serde(default)]
    pub global_env: GlobalTemplates,

    #[serde(default)]
    pub callbacks: CallbackSettings,

    #[serde(default)]
    pub display: DisplaySettings,

    /// Path to the file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from YAML string.
    pub fn from_yaml<S: Into<String>>(yaml: S) -> crate::Result<Self> {
        parse_versioned_yaml(yaml.into())
    }

    /// Load settings from file path, without following includes.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;

        let mut settings = Self::from_yaml(yaml)?;
        settings.source_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Load settings from file path and merge its includes underneath it.
    pub fn load_with_includes<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = dunce::canonicalize(path.as_ref())
            .map_err(|_| Error::NotFoundAtPath(path.as_ref().to_path_buf()))?;
        let mut seen = HashSet::new();
        let settings = load_recursive(&path, &mut seen)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> crate::Result<()> {
        match self.master_project.as_deref() {
            Some(name) if !name.trim().is_empty() => {}
            _ => {
                return Err(Error::ValidationFailed(
                    "master_project must be set".to_string(),
                ));
            }
        }
        for tier in [Tier::MasterProjectInternal, Tier::MasterProjectExternal] {
            if self.paths.tier(tier).is_none() {
                return Err(Error::TierNotConfigured(tier));
            }
        }
        self.display.palette()?;
        Ok(())
    }

    pub fn master_project(&self) -> &str {
        self.master_project.as_deref().unwrap_or_default()
    }

    /// Layer `other` on top of these settings.
    pub fn overlay(&mut self, other: Settings) {
        if other.master_project.is_some() {
            self.master_project = other.master_project;
        }
        self.paths.overlay(other.paths);
        self.global_env.merge(other.global_env);
        self.callbacks.overlay(other.callbacks);
        self.display.overlay(other.display);
        self.source_path = other.source_path;
    }

    /// Work out every location the request needs.
    pub fn locations(&self, request: &Request) -> crate::Result<Locations> {
        Locations::resolve(self, request)
    }

    /// Where `tier` lives for `request`, whether or not it exists yet.
    pub fn tier_path(&self, tier: Tier, request: &Request) -> crate::Result<PathBuf> {
        let template = self.paths.tier(tier).ok_or(Error::TierNotConfigured(tier))?;
        Tokens::new(self, request).expand(template)
    }
}

/// Values of the `{placeholder}` tokens of one request.
struct Tokens {
    values: Vec<(&'static str, String)>,
}

impl Tokens {
    fn new(settings: &Settings, request: &Request) -> Self {
        let master_project = settings.master_project();
        let values = vec![
            ("project", request.project_or(master_project).to_string()),
            ("master_project", master_project.to_string()),
            ("developer", request.developer.clone()),
            ("development", request.development.clone().unwrap_or_default()),
            ("stage", request.stage.clone().unwrap_or_default()),
            ("app", request.app.clone().unwrap_or_default()),
            ("platform", request.platform.lowercase().to_string()),
            ("fingerprint", request.fingerprint(master_project)),
        ];
        Self { values }
    }

    fn expand(&self, template: &str) -> crate::Result<PathBuf> {
        let tokens: Vec<(&str, &str)> = self
            .values
            .iter()
            .map(|(key, value)| (*key, value.as_str()))
            .collect();
        expand_home(&expand_placeholders(template, &tokens))
    }
}

fn load_recursive(path: &Path, seen: &mut HashSet<PathBuf>) -> crate::Result<Settings> {
    if !seen.insert(path.to_path_buf()) {
        return Err(Error::CircularInclude(path.to_path_buf()));
    }
    let settings = Settings::load(path)?;
    let base_dir = path.parent();

    let mut merged = Settings::default();
    for include in &settings.includes {
        let include_path = resolve_include_path(include, base_dir)?;
        merged.overlay(load_recursive(&include_path, seen)?);
    }
    merged.overlay(settings);
    seen.remove(path);
    Ok(merged)
}

/// Resolve include path to absolute canonical path.
fn resolve_include_path(include: &str, base_dir: Option<&Path>) -> crate::Result<PathBuf> {
    let path = expand_home(include)?;
    let path = if path.is_absolute() {
        path
    } else {
        let base = base_dir.ok_or_else(|| {
            Error::ValidationFailed(format!(
                "Cannot resolve relative include '{include}' without base directory"
            ))
        })?;
        base.join(path)
    };

    dunce::canonicalize(&path).map_err(|e| Error::IncludeNotFound {
        path: path.clone(),
        error: e,
    })
}

/// Where to look for the settings file.
#[derive(Debug, Clone, Default)]
pub struct SettingsDiscovery {
    /// From `--settings`.
    pub explicit: Option<PathBuf>,
    /// From `STACKENV_SETTINGS`.
    pub env: Option<PathBuf>,
    /// Directory to walk up from.
    pub start_dir: PathBuf,
    /// Falls back to `<config dir>/stackenv` when unset.
    pub config_dir: Option<PathBuf>,
}

impl SettingsDiscovery {
    /// Discovery rooted at the working directory, honouring
    /// `STACKENV_SETTINGS`.
    pub fn from_env(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            env: std::env::var_os(SETTINGS_ENV_VAR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            start_dir: resolve_start_path(Path::new(".")),
            config_dir: None,
        }
    }

    /// The settings file to use, if any is found.
    pub fn find(&self) -> crate::Result<PathBuf> {
        if let Some(path) = self.explicit.as_ref().or(self.env.as_ref()) {
            if path.is_file() {
                return Ok(path.clone());
            }
            return Err(Error::NotFoundAtPath(path.clone()));
        }

        let mut current = self.start_dir.clone();
        loop {
            let candidate = current.join(SETTINGS_FILENAME);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                break;
            }
        }

        let config_dir = self
            .config_dir
            .clone()
            .or_else(|| dirs::config_dir().map(|d| d.join("stackenv")));
        if let Some(candidate) = config_dir.map(|d| d.join(SETTINGS_FILENAME)) {
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        Err(Error::SettingsNotFound(self.start_dir.clone()))
    }
}

/// Resolve starting path, preferring $PWD to preserve symlinks.
fn resolve_start_path(start_path: &Path) -> PathBuf {
    if start_path.is_absolute() {
        start_path.to_owned()
    } else {
        match std::env::var("PWD").ok() {
            Some(pwd) => PathBuf::from(pwd).join(start_path),
            None => std::env::current_dir()
                .unwrap_or_default()
                .join(start_path),
        }
    }
}

/// Find and load the settings file, merging its includes.
pub fn discover_settings(discovery: &SettingsDiscovery) -> crate::Result<Settings> {
    let path = discovery.find()?;
    tracing::debug!(?path, "using settings");
    Settings::load_with_includes(path)
}

/// Every filesystem location one run uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    pub master_project: String,
    /// The requested project, or the master project.
    pub project: String,
    /// Root of every tier that takes part in the run.
    pub tier_roots: BTreeMap<Tier, PathBuf>,
    pub app_file: Option<PathBuf>,
    pub script_file: PathBuf,
    pub log_file: Option<PathBuf>,
}

impl Locations {
    pub fn resolve(settings: &Settings, request: &Request) -> crate::Result<Self> {
        let master_project = settings.master_project().to_string();
        let project = request.project_or(&master_project).to_string();
        let fingerprint = request.fingerprint(&master_project);
        let tokens = Tokens::new(settings, request);
        let expand = |template: &str| tokens.expand(template);

        let mut tier_roots = BTreeMap::new();
        for tier in Tier::PACKAGE_TIERS {
            let required = match tier {
                Tier::Reserved => false,
                Tier::Development => request.development.is_some(),
                Tier::Stage => request.stage.is_some(),
                Tier::ProjectInternal | Tier::ProjectExternal => project != master_project,
                _ => true,
            };
            let template = settings.paths.tier(tier);
            let path = match (template, required) {
                (Some(template), _) => expand(template)?,
                (None, true) => return Err(Error::TierNotConfigured(tier)),
                (None, false) => continue,
            };
            if tier == Tier::Reserved {
                if path.is_dir() {
                    tier_roots.insert(tier, path);
                } else {
                    tracing::debug!(?path, "reserved packages disabled");
                }
                continue;
            }
            if !required {
                continue;
            }
            if !path.is_dir() {
                return Err(Error::TierRootMissing { tier, path });
            }
            tier_roots.insert(tier, path);
        }

        let app_file = match &request.app {
            Some(app) => {
                let template = settings.paths.app_file.as_deref().ok_or_else(|| {
                    Error::ValidationFailed(format!(
                        "application '{app}' requested but 'paths.app_file' is not set"
                    ))
                })?;
                let path = expand(template)?;
                if !path.is_file() {
                    return Err(Error::AppFileNotFound(path));
                }
                Some(path)
            }
            None => None,
        };

        let script_file = match settings.paths.script_file.as_deref() {
            Some(template) => expand(template)?,
            None => dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("stackenv")
                .join(&project)
                .join(format!("{fingerprint}.{}", request.shell.extension())),
        };

        let log_file = settings
            .paths
            .log_file
            .as_deref()
            .map(expand)
            .transpose()?;

        Ok(Self {
            master_project,
            project,
            tier_roots,
            app_file,
            script_file,
            log_file,
        })
    }

    pub fn tier_root(&self, tier: Tier) -> Option<&Path> {
        self.tier_roots.get(&tier).map(PathBuf::as_path)
    }

    /// Names the info section labels its counts with.
    pub fn selection(&self, request: &Request) -> Selection {
        Selection {
            project: self.project.clone(),
            master_project: self.master_project.clone(),
            stage: request.stage.clone(),
        }
    }
}
