// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! What the caller asked for: the environment selection and the run options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::dialect::Shell;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./request_test.rs"]
mod request_test;

pub const DEFAULT_VERBOSE: u8 = 2;
pub const MAX_VERBOSE: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Darwin,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Darwin
        } else {
            Platform::Linux
        }
    }

    /// Title case name used to build global env class names.
    pub fn name(self) -> &'static str {
        match self {
            Platform::Linux => "Linux",
            Platform::Darwin => "Darwin",
            Platform::Windows => "Windows",
        }
    }

    pub fn lowercase(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Darwin => "darwin",
            Platform::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lowercase())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "darwin" | "macos" => Ok(Platform::Darwin),
            "windows" => Ok(Platform::Windows),
            other => Err(Error::ValidationFailed(format!("unknown platform '{other}'"))),
        }
    }
}

/// A single resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub project: Option<String>,
    pub developer: String,
    pub development: Option<String>,
    pub stage: Option<String>,
    pub app: Option<String>,
    pub app_args: Option<String>,
    pub platform: Platform,
    pub shell: Shell,

    pub ignore_pre: bool,
    pub ignore_post: bool,
    pub ignore_env_scripts: bool,
    pub ignore_env_commands: bool,
    pub ignore_app_exec: bool,
    pub display_only: bool,
    pub set_only: bool,
    pub verbose: u8,
    pub last: bool,
    pub raise_exceptions: bool,
    pub cache_write: bool,
    pub cache_read: bool,
}

impl Default for Request {
    fn default() -> Self {
        let platform = Platform::current();
        Self {
            project: None,
            developer: whoami::username(),
            development: None,
            stage: None,
            app: None,
            app_args: None,
            platform,
            shell: Shell::for_platform(platform),
            ignore_pre: false,
            ignore_post: false,
            ignore_env_scripts: false,
            ignore_env_commands: false,
            ignore_app_exec: false,
            display_only: false,
            set_only: false,
            verbose: DEFAULT_VERBOSE,
            last: false,
            raise_exceptions: false,
            cache_write: false,
            cache_read: false,
        }
    }
}

impl Request {
    /// Apply the option rules: development wins over stage, set-only wins
    /// over display-only, verbosity stays within 1 to 4.
    pub fn normalized(mut self) -> Self {
        if self.development.is_some() && self.stage.take().is_some() {
            tracing::debug!("development selected, stage ignored");
        }
        if self.set_only && self.display_only {
            tracing::debug!("set only selected, display only ignored");
            self.display_only = false;
        }
        self.verbose = self.verbose.clamp(1, MAX_VERBOSE);
        self.project = self.project.filter(|p| !p.is_empty());
        self.app = self.app.filter(|a| !a.is_empty());
        self
    }

    /// The project in use, falling back to the master project.
    pub fn project_or<'a>(&'a self, master_project: &'a str) -> &'a str {
        self.project.as_deref().unwrap_or(master_project)
    }

    /// Short stable digest of everything that picks the environment.
    ///
    /// Run options are left out so repeat-last finds the artifact written by
    /// any earlier run of the same selection.
    pub fn fingerprint(&self, master_project: &str) -> String {
        let mut hasher = Sha256::new();
        let fields = [
            self.project_or(master_project),
            self.developer.as_str(),
            self.development.as_deref().unwrap_or_default(),
            self.stage.as_deref().unwrap_or_default(),
            self.app.as_deref().unwrap_or_default(),
            self.platform.lowercase(),
            self.shell.name(),
        ];
        for field in fields {
            hasher.update(field.as_bytes());
            hasher.update([0u8]);
        }
        let digest = hasher.finalize();
        digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
    }
}
