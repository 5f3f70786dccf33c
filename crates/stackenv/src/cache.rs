// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Resolution cache records written beside an activation script.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::environment::ResolvedEnvironment;
use crate::{Error, PACKAGE_DESCRIPTOR_FILENAME};

#[cfg(test)]
#[path = "./cache_test.rs"]
mod cache_test;

/// Suffix appended to the artifact path to name its cache record.
pub const CACHE_RECORD_SUFFIX: &str = ".cache.yaml";

/// Cache record API version.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum CacheApiVersion {
    #[default]
    #[serde(rename = "stackenv/v0/cache")]
    V0,
}

/// A resolved environment and the package descriptors it came from.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CacheRecord {
    pub api: CacheApiVersion,
    pub generated: GenerationMetadata,
    pub descriptors: Vec<DescriptorDigest>,
    pub environment: ResolvedEnvironment,
}

/// When and where a record was generated.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GenerationMetadata {
    pub timestamp: DateTime<Utc>,
    pub stackenv_version: String,
    pub hostname: String,
}

/// Package descriptor tracked by a record.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DescriptorDigest {
    pub path: PathBuf,
    pub sha256: String,
}

impl CacheRecord {
    /// Record `environment` along with the digest of every package descriptor
    /// it contains.
    pub fn generate(environment: &ResolvedEnvironment) -> crate::Result<Self> {
        let mut descriptors = Vec::new();
        for (_, containers) in environment.iter() {
            for package in containers.iter().filter_map(|c| c.package()) {
                let path = package.root_path.join(PACKAGE_DESCRIPTOR_FILENAME);
                if !path.is_file() {
                    tracing::debug!(?path, "descriptor missing, not tracked");
                    continue;
                }
                let sha256 = file_digest(&path)?;
                descriptors.push(DescriptorDigest { path, sha256 });
            }
        }

        Ok(Self {
            api: CacheApiVersion::V0,
            generated: GenerationMetadata {
                timestamp: Utc::now(),
                stackenv_version: env!("CARGO_PKG_VERSION").to_string(),
                hostname: hostname::get()
                    .ok()
                    .and_then(|h| h.into_string().ok())
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            descriptors,
            environment: environment.clone(),
        })
    }

    pub fn from_yaml<S: Into<String>>(yaml: S) -> crate::Result<Self> {
        let yaml = yaml.into();
        serde_yaml::from_str(&yaml).map_err(|error| Error::InvalidYaml {
            error,
            yaml_content: yaml.clone(),
        })
    }

    /// Load a record. A missing file is [`Error::CacheRecordNotFound`].
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::CacheRecordNotFound(path.to_path_buf()));
        }
        let yaml = std::fs::read_to_string(path).map_err(|error| Error::ReadFailed {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_yaml(yaml)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).map_err(|error| Error::InvalidYaml {
            error,
            yaml_content: String::new(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| Error::WriteFailed {
                path: parent.to_path_buf(),
                error,
            })?;
        }
        std::fs::write(path, yaml).map_err(|error| Error::WriteFailed {
            path: path.to_path_buf(),
            error,
        })
    }
}

/// Path of the cache record that belongs to an artifact.
pub fn cache_record_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.as_os_str().to_os_string();
    name.push(CACHE_RECORD_SUFFIX);
    PathBuf::from(name)
}

/// Compare the recorded descriptor digests with the files on disk.
pub fn verify_cache(record: &CacheRecord) -> crate::Result<Vec<CacheChange>> {
    let mut changes = Vec::new();
    for descriptor in &record.descriptors {
        if !descriptor.path.is_file() {
            changes.push(CacheChange {
                kind: CacheChangeKind::DescriptorRemoved,
                path: descriptor.path.clone(),
                expected: descriptor.sha256.clone(),
                actual: None,
            });
            continue;
        }
        let actual = file_digest(&descriptor.path)?;
        if actual != descriptor.sha256 {
            changes.push(CacheChange {
                kind: CacheChangeKind::DescriptorChanged,
                path: descriptor.path.clone(),
                expected: descriptor.sha256.clone(),
                actual: Some(actual),
            });
        }
    }
    Ok(changes)
}

fn file_digest(path: &Path) -> crate::Result<String> {
    let content = std::fs::read(path).map_err(|error| Error::ReadFailed {
        path: path.to_path_buf(),
        error,
    })?;
    Ok(format!("{:x}", Sha256::digest(&content)))
}

/// A single difference between a record and the current package files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheChange {
    pub kind: CacheChangeKind,
    pub path: PathBuf,
    pub expected: String,
    pub actual: Option<String>,
}

/// Kinds of cache mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheChangeKind {
    DescriptorChanged,
    DescriptorRemoved,
}

impl std::fmt::Display for CacheChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheChangeKind::DescriptorChanged => f.write_str("changed"),
            CacheChangeKind::DescriptorRemoved => f.write_str("removed"),
        }
    }
}
