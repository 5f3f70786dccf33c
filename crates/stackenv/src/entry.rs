// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Environment contributions of a package or build phase.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::tier::Tier;
use crate::version::Version;

#[cfg(test)]
#[path = "./entry_test.rs"]
mod entry_test;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Single,
    Multi,
    Script,
    Command,
}

/// One environment contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnvEntry {
    /// Overwrite `variable` with `value`.
    Single { variable: String, value: String },
    /// Prepend `value` to `variable`, keeping whatever was there.
    Multi { variable: String, value: String },
    /// A script to source.
    Script { value: String },
    /// A literal statement to execute.
    Command { value: String },
}

impl EnvEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            EnvEntry::Single { .. } => EntryKind::Single,
            EnvEntry::Multi { .. } => EntryKind::Multi,
            EnvEntry::Script { .. } => EntryKind::Script,
            EnvEntry::Command { .. } => EntryKind::Command,
        }
    }

    pub fn variable(&self) -> Option<&str> {
        match self {
            EnvEntry::Single { variable, .. } | EnvEntry::Multi { variable, .. } => {
                Some(variable)
            }
            EnvEntry::Script { .. } | EnvEntry::Command { .. } => None,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            EnvEntry::Single { value, .. }
            | EnvEntry::Multi { value, .. }
            | EnvEntry::Script { value }
            | EnvEntry::Command { value } => value,
        }
    }

    /// The variable name if there is one, else the value.
    pub fn sort_key(&self) -> &str {
        self.variable().unwrap_or_else(|| self.value())
    }
}

/// Identity of the package a container was built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageIdentity {
    pub name: String,
    /// Directory holding `package.yaml`.
    pub root_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

impl PackageIdentity {
    pub fn new(name: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root_path: root_path.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: Option<Version>) -> Self {
        self.version = version;
        self
    }
}

/// The ordered entries contributed by one package or phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvEntryContainer {
    tier: Tier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    package: Option<PackageIdentity>,
    #[serde(default)]
    entries: Vec<EnvEntry>,
}

impl EnvEntryContainer {
    pub fn for_package(tier: Tier, package: PackageIdentity) -> Self {
        Self {
            tier,
            package: Some(package),
            entries: Vec::new(),
        }
    }

    /// A container not bound to any package, used by the build phases.
    pub fn for_phase(tier: Tier) -> Self {
        debug_assert!(tier.is_phase(), "{tier} is not a build phase");
        Self {
            tier,
            package: None,
            entries: Vec::new(),
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn package(&self) -> Option<&PackageIdentity> {
        self.package.as_ref()
    }

    pub fn package_name(&self) -> Option<&str> {
        self.package.as_ref().map(|p| p.name.as_str())
    }

    pub fn root_path(&self) -> Option<&Path> {
        self.package.as_ref().map(|p| p.root_path.as_path())
    }

    pub fn version(&self) -> Option<&Version> {
        self.package.as_ref().and_then(|p| p.version.as_ref())
    }

    pub fn entries(&self) -> &[EnvEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: EnvEntry) {
        self.entries.push(entry);
    }

    pub fn add_single(&mut self, variable: impl Into<String>, value: impl Into<String>) {
        self.push(EnvEntry::Single {
            variable: variable.into(),
            value: value.into(),
        });
    }

    pub fn add_multi(&mut self, variable: impl Into<String>, value: impl Into<String>) {
        self.push(EnvEntry::Multi {
            variable: variable.into(),
            value: value.into(),
        });
    }

    pub fn add_script(&mut self, path: impl Into<String>) {
        self.push(EnvEntry::Script { value: path.into() });
    }

    pub fn add_command(&mut self, command: impl Into<String>) {
        self.push(EnvEntry::Command {
            value: command.into(),
        });
    }

    /// Stable sort by variable, falling back to value. Several Multi
    /// entries on one variable keep their insertion order.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
    }

    pub fn is_sorted(&self) -> bool {
        self.entries
            .windows(2)
            .all(|pair| pair[0].sort_key() <= pair[1].sort_key())
    }
}
