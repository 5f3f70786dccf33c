// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! The fixed catalog of package tiers.
//!
//! Variants are declared in serialization order, so the derived `Ord`
//! is the order sections appear in a generated script.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "./tier_test.rs"]
mod tier_test;

/// How packages are laid out inside a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierKind {
    /// `<tier>/<name>/package.yaml`
    NonVersioned,
    /// `<tier>/<name>/<N.N.N>/<name>/package.yaml`
    Versioned,
    /// Not a directory of packages; filled by a build callback.
    Phase,
}

/// Which half of a project a versioned tier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Internal,
    External,
}

/// A ranked source of packages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    PreBuild,
    Reserved,
    Development,
    Stage,
    ProjectInternal,
    ProjectExternal,
    MasterProjectInternal,
    MasterProjectExternal,
    PostBuild,
}

impl Tier {
    /// Every tier in serialization order.
    pub const ALL: [Tier; 9] = [
        Tier::PreBuild,
        Tier::Reserved,
        Tier::Development,
        Tier::Stage,
        Tier::ProjectInternal,
        Tier::ProjectExternal,
        Tier::MasterProjectInternal,
        Tier::MasterProjectExternal,
        Tier::PostBuild,
    ];

    /// Tiers that hold packages on disk, in discovery order.
    pub const PACKAGE_TIERS: [Tier; 7] = [
        Tier::Reserved,
        Tier::Development,
        Tier::Stage,
        Tier::ProjectInternal,
        Tier::ProjectExternal,
        Tier::MasterProjectInternal,
        Tier::MasterProjectExternal,
    ];

    pub fn kind(self) -> TierKind {
        match self {
            Tier::PreBuild | Tier::PostBuild => TierKind::Phase,
            Tier::Reserved | Tier::Development | Tier::Stage => TierKind::NonVersioned,
            _ => TierKind::Versioned,
        }
    }

    pub fn is_phase(self) -> bool {
        self.kind() == TierKind::Phase
    }

    pub fn is_versioned(self) -> bool {
        self.kind() == TierKind::Versioned
    }

    /// Override precedence; higher wins. Reserved and the phases don't
    /// take part in cross-tier removal.
    pub fn precedence(self) -> Option<u8> {
        match self {
            Tier::Development | Tier::Stage => Some(3),
            Tier::ProjectInternal | Tier::ProjectExternal => Some(2),
            Tier::MasterProjectInternal | Tier::MasterProjectExternal => Some(1),
            _ => None,
        }
    }

    pub fn variant(self) -> Option<Variant> {
        match self {
            Tier::ProjectInternal | Tier::MasterProjectInternal => Some(Variant::Internal),
            Tier::ProjectExternal | Tier::MasterProjectExternal => Some(Variant::External),
            _ => None,
        }
    }

    /// Human readable name, used in script headers and diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Tier::PreBuild => "Pre Build",
            Tier::Reserved => "Reserved",
            Tier::Development => "Development",
            Tier::Stage => "Stage",
            Tier::ProjectInternal => "Project Internal",
            Tier::ProjectExternal => "Project External",
            Tier::MasterProjectInternal => "Master Project Internal",
            Tier::MasterProjectExternal => "Master Project External",
            Tier::PostBuild => "Post Build",
        }
    }

    /// Key of this tier's path template under `paths:` in stackenv.yaml.
    pub fn settings_key(self) -> &'static str {
        match self {
            Tier::PreBuild => "pre_build",
            Tier::Reserved => "reserved",
            Tier::Development => "development",
            Tier::Stage => "stage",
            Tier::ProjectInternal => "project_internal",
            Tier::ProjectExternal => "project_external",
            Tier::MasterProjectInternal => "master_project_internal",
            Tier::MasterProjectExternal => "master_project_external",
            Tier::PostBuild => "post_build",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
