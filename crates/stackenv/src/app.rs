// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Application descriptors: the app being launched into the environment.
//!
//! Descriptors are YAML or JSON; keys are snake_case, camelCase is
//! accepted as well.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::Error;
use crate::request::Platform;

#[cfg(test)]
#[path = "./app_test.rs"]
mod app_test;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,

    /// Substituted for `FOLDER_NAME` in global env patterns.
    #[serde(
        default,
        alias = "folderName",
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub folder_name: Option<String>,

    /// Substituted for `VERSION` in global env patterns.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,

    /// Base of the app specific global env class, e.g. `maya`.
    #[serde(
        default,
        alias = "globalEnvClassName",
        skip_serializing_if = "Option::is_none"
    )]
    pub global_env_class_name: Option<String>,

    #[serde(default, alias = "linuxExecutable", skip_serializing_if = "Option::is_none")]
    pub linux_executable: Option<String>,

    #[serde(default, alias = "darwinExecutable", skip_serializing_if = "Option::is_none")]
    pub darwin_executable: Option<String>,

    #[serde(default, alias = "windowsExecutable", skip_serializing_if = "Option::is_none")]
    pub windows_executable: Option<String>,

    /// Informational list of the packages the app expects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,

    /// Path to the file this was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl AppDescriptor {
    pub fn from_yaml<S: Into<String>>(yaml: S) -> crate::Result<Self> {
        let yaml = yaml.into();
        serde_yaml::from_str(&yaml).map_err(|e| Error::InvalidYaml {
            error: e,
            yaml_content: yaml.clone(),
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::AppFileNotFound(path.to_path_buf()));
        }
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;
        let mut app = Self::from_yaml(yaml)?;
        app.path = Some(path.to_path_buf());
        Ok(app)
    }

    pub fn executable_for(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Linux => self.linux_executable.as_deref(),
            Platform::Darwin => self.darwin_executable.as_deref(),
            Platform::Windows => self.windows_executable.as_deref(),
        }
        .filter(|exe| !exe.is_empty())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other:?}"
        ))),
    }
}
