// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Creating new package areas on disk.
//!
//! Every area lives where the settings' path templates put it for the
//! given request. Nothing is created over an existing directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::discovery::is_package;
use crate::request::Request;
use crate::settings::Settings;
use crate::tier::Tier;
use crate::Error;

#[cfg(test)]
#[path = "./create_test.rs"]
mod create_test;

/// Extensions of files left behind when a development area is staged.
pub const STAGE_IGNORED_EXTENSIONS: &[&str] = &["pyc"];

/// A stage created from a development area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedArea {
    pub path: PathBuf,
    /// Names of the packages copied, in copy order.
    pub packages: Vec<String>,
}

/// Create the internal and external package roots of project `name`.
pub fn create_project(
    settings: &Settings,
    request: &Request,
    name: &str,
) -> crate::Result<Vec<PathBuf>> {
    let request = Request {
        project: Some(name.to_string()),
        ..request.clone()
    };
    let roots = [Tier::ProjectInternal, Tier::ProjectExternal]
        .into_iter()
        .map(|tier| settings.tier_path(tier, &request))
        .collect::<crate::Result<Vec<_>>>()?;

    if let Some(existing) = roots.iter().find(|root| root.exists()) {
        return Err(Error::AreaExists {
            what: "Project",
            path: existing.clone(),
        });
    }
    for root in &roots {
        create_dir(root)?;
    }
    tracing::info!("created project {name}");
    Ok(roots)
}

/// Create development area `name` of the requested project and developer.
pub fn create_development(
    settings: &Settings,
    request: &Request,
    name: &str,
) -> crate::Result<PathBuf> {
    let request = Request {
        development: Some(name.to_string()),
        stage: None,
        ..request.clone()
    };
    let path = settings.tier_path(Tier::Development, &request)?;
    if path.exists() {
        return Err(Error::AreaExists {
            what: "Development environment",
            path,
        });
    }
    create_dir(&path)?;
    Ok(path)
}

/// Create the reserved area of the requested developer.
pub fn create_reserved(settings: &Settings, request: &Request) -> crate::Result<PathBuf> {
    let path = settings.tier_path(Tier::Reserved, request)?;
    if path.exists() {
        return Err(Error::AreaExists {
            what: "Reserved environment",
            path,
        });
    }
    create_dir(&path)?;
    Ok(path)
}

/// Copy every package of development area `development` into a new stage
/// `name`.
///
/// Packages land in `<stage>/<package name>`. Packages without any file to
/// copy are skipped.
pub fn create_stage(
    settings: &Settings,
    request: &Request,
    name: &str,
    development: &str,
) -> crate::Result<StagedArea> {
    let development_request = Request {
        development: Some(development.to_string()),
        stage: None,
        ..request.clone()
    };
    let development_path = settings.tier_path(Tier::Development, &development_request)?;
    if !development_path.is_dir() {
        return Err(Error::AreaNotFound {
            what: "Development environment",
            path: development_path,
        });
    }

    let stage_request = Request {
        development: None,
        stage: Some(name.to_string()),
        ..request.clone()
    };
    let stage_path = settings.tier_path(Tier::Stage, &stage_request)?;
    if stage_path.exists() {
        return Err(Error::AreaExists {
            what: "Stage environment",
            path: stage_path,
        });
    }

    let candidates = package_dirs(&development_path)?;
    if candidates.is_empty() {
        return Err(Error::NothingToStage(development_path));
    }

    create_dir(&stage_path)?;
    let mut packages = Vec::new();
    for (package, root) in candidates {
        if copy_package(&root, &stage_path.join(&package))? == 0 {
            tracing::debug!("{package} has no files to stage");
            continue;
        }
        tracing::info!("stage package created: {package}");
        packages.push(package);
    }

    Ok(StagedArea {
        path: stage_path,
        packages,
    })
}

/// Packages directly under `root`, sorted by name.
fn package_dirs(root: &Path) -> crate::Result<Vec<(String, PathBuf)>> {
    let entries = std::fs::read_dir(root).map_err(|error| Error::ReadFailed {
        path: root.to_path_buf(),
        error,
    })?;
    let mut found = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_dir() || !is_package(&path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            tracing::warn!(?path, "skipping non UTF-8 directory name");
            continue;
        };
        found.push((name.to_string(), path));
    }
    found.sort();
    Ok(found)
}

/// Copy the files of a package tree, returning how many were copied.
fn copy_package(from: &Path, to: &Path) -> crate::Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(from).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() || is_ignored(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);
        if let Some(parent) = target.parent() {
            create_dir(parent)?;
        }
        std::fs::copy(entry.path(), &target).map_err(|error| Error::WriteFailed {
            path: target.clone(),
            error,
        })?;
        copied += 1;
    }
    Ok(copied)
}

fn is_ignored(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| STAGE_IGNORED_EXTENSIONS.contains(&ext))
}

fn create_dir(path: &Path) -> crate::Result<()> {
    std::fs::create_dir_all(path).map_err(|error| Error::WriteFailed {
        path: path.to_path_buf(),
        error,
    })
}
