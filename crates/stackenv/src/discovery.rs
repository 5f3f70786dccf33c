// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Enumerating the candidate packages of a tier.
//!
//! A package is a directory holding a [`PACKAGE_DESCRIPTOR_FILENAME`] file.
//! Non-versioned tiers keep packages at `<tier>/<name>`, versioned tiers at
//! `<tier>/<name>/<MAJOR.MINOR.PATCH>/<name>`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "./discovery_test.rs"]
mod discovery_test;

use crate::entry::PackageIdentity;
use crate::log::RunLog;
use crate::tier::TierKind;
use crate::version::Version;
use crate::{Error, PACKAGE_DESCRIPTOR_FILENAME};

/// A discovered package and, for versioned tiers, its admitted versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    /// `<tier>/<name>`
    pub root_path: PathBuf,
    /// Ascending; empty for non-versioned tiers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<Version>,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root_path: root_path.into(),
            versions: Vec::new(),
        }
    }

    pub fn with_versions(mut self, mut versions: Vec<Version>) -> Self {
        versions.sort();
        self.versions = versions;
        self
    }

    pub fn is_versioned(&self) -> bool {
        !self.versions.is_empty()
    }

    pub fn latest(&self) -> Option<&Version> {
        self.versions.iter().max()
    }

    /// The directory holding the descriptor for `version`.
    pub fn package_root(&self, version: Option<&Version>) -> PathBuf {
        match version {
            Some(version) => self.root_path.join(version.as_str()).join(&self.name),
            None => self.root_path.clone(),
        }
    }

    /// Identity of the latest version of this package.
    pub fn identity(&self) -> PackageIdentity {
        let version = self.latest().cloned();
        PackageIdentity::new(&self.name, self.package_root(version.as_ref())).with_version(version)
    }
}

/// True when `root` holds a package descriptor.
pub fn is_package(root: &Path) -> bool {
    root.join(PACKAGE_DESCRIPTOR_FILENAME).is_file()
}

/// List the packages under a tier root.
///
/// An absent or missing root contributes nothing. `admit` is consulted for
/// every package root that carries a descriptor; for versioned tiers it is
/// asked once per version.
pub fn discover(
    root: Option<&Path>,
    kind: TierKind,
    log: &RunLog,
    mut admit: impl FnMut(&Path) -> bool,
) -> crate::Result<Vec<PackageRecord>> {
    let Some(root) = root else {
        return Ok(Vec::new());
    };
    if kind == TierKind::Phase || !root.is_dir() {
        tracing::debug!(?root, "nothing to discover");
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for (name, package_dir) in sub_directories(root)? {
        match kind {
            TierKind::NonVersioned => {
                if !is_package(&package_dir) {
                    log.warning(format!(
                        "{name} excluded, {PACKAGE_DESCRIPTOR_FILENAME} not found in {}",
                        package_dir.display()
                    ));
                    continue;
                }
                if !admit(&package_dir) {
                    log.info(format!("{name} not admitted from {}", package_dir.display()));
                    continue;
                }
                records.push(PackageRecord::new(name, package_dir));
            }
            TierKind::Versioned => {
                let versions = admitted_versions(&name, &package_dir, log, &mut admit)?;
                if versions.is_empty() {
                    log.debug(format!("{name} has no admitted version, dropped"));
                    continue;
                }
                records.push(PackageRecord::new(name, package_dir).with_versions(versions));
            }
            TierKind::Phase => {}
        }
    }
    Ok(records)
}

fn admitted_versions(
    name: &str,
    package_dir: &Path,
    log: &RunLog,
    admit: &mut impl FnMut(&Path) -> bool,
) -> crate::Result<Vec<Version>> {
    let mut versions = Vec::new();
    for (folder, version_dir) in sub_directories(package_dir)? {
        let version: Version = match folder.parse() {
            Ok(v) => v,
            Err(_) => {
                log.warning(format!(
                    "{name}: skipping '{folder}', version folders must be MAJOR.MINOR.PATCH"
                ));
                continue;
            }
        };
        let package_root = version_dir.join(name);
        if !is_package(&package_root) {
            log.warning(format!(
                "{name} {version} excluded, {PACKAGE_DESCRIPTOR_FILENAME} not found in {}",
                package_root.display()
            ));
            continue;
        }
        if !admit(&package_root) {
            log.info(format!("{name} {version} not admitted"));
            continue;
        }
        versions.push(version);
    }
    versions.sort();
    Ok(versions)
}

/// Non-hidden sub directories of `dir`, sorted by name.
fn sub_directories(dir: &Path) -> crate::Result<Vec<(String, PathBuf)>> {
    let read_failed = |error| Error::ReadFailed {
        path: dir.to_path_buf(),
        error,
    };
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(?path, "skipping non UTF-8 directory name");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        found.push((name, path));
    }
    found.sort();
    Ok(found)
}
