// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! The assembled environment, ready to be serialized.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app::AppDescriptor;
use crate::entry::EnvEntryContainer;
use crate::tier::Tier;

#[cfg(test)]
#[path = "./environment_test.rs"]
mod environment_test;

/// Names the info section labels its counts with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub project: String,
    pub master_project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl Selection {
    pub fn label_for(&self, tier: Tier) -> &str {
        match tier {
            Tier::Stage => self.stage.as_deref().unwrap_or(&self.project),
            Tier::MasterProjectInternal | Tier::MasterProjectExternal => &self.master_project,
            _ => &self.project,
        }
    }
}

/// The application an environment was assembled for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppLaunch {
    pub file: PathBuf,
    pub descriptor: AppDescriptor,
    /// Executable for the target platform, if the descriptor has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
}

/// Containers grouped by tier, iterated in serialization order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEnvironment {
    #[serde(default)]
    tiers: BTreeMap<Tier, Vec<EnvEntryContainer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    app: Option<AppLaunch>,
    #[serde(default)]
    selection: Selection,
}

impl ResolvedEnvironment {
    pub fn new(selection: Selection) -> Self {
        Self {
            tiers: BTreeMap::new(),
            app: None,
            selection,
        }
    }

    /// Add a container to its tier, keeping package containers ordered by
    /// package name.
    pub fn insert(&mut self, container: EnvEntryContainer) {
        let list = self.tiers.entry(container.tier()).or_default();
        let name = container.package_name().map(str::to_string);
        let index = list.partition_point(|c| c.package_name() <= name.as_deref());
        list.insert(index, container);
    }

    pub fn set_app(&mut self, app: Option<AppLaunch>) {
        self.app = app;
    }

    pub fn app(&self) -> Option<&AppLaunch> {
        self.app.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn containers(&self, tier: Tier) -> &[EnvEntryContainer] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or_default()
    }

    /// Non-empty tiers in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &[EnvEntryContainer])> {
        self.tiers
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(tier, list)| (*tier, list.as_slice()))
    }

    pub fn has_tier(&self, tier: Tier) -> bool {
        !self.containers(tier).is_empty()
    }

    /// Number of package containers in `tier`.
    pub fn package_count(&self, tier: Tier) -> usize {
        self.containers(tier)
            .iter()
            .filter(|c| c.package().is_some())
            .count()
    }

    /// Every tier a package name is bound in.
    pub fn tiers_of(&self, name: &str) -> Vec<Tier> {
        self.iter()
            .filter(|(_, list)| list.iter().any(|c| c.package_name() == Some(name)))
            .map(|(tier, _)| tier)
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<&EnvEntryContainer> {
        self.tiers
            .values()
            .flatten()
            .find(|c| c.package_name() == Some(name))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}
