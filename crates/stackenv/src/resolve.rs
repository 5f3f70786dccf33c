// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Cross-tier override rules and version selection.
//!
//! Order matters and mirrors the precedence of the tiers:
//!
//! 1. a project package hides the master project package of the same name,
//! 2. a development (or stage) package hides both,
//! 3. the same two steps again for the external half,
//! 4. every versioned package keeps only its latest version.
//!
//! Reserved packages are never removed.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

#[cfg(test)]
#[path = "./resolve_test.rs"]
mod resolve_test;

use crate::discovery::PackageRecord;
use crate::tier::{Tier, Variant};

/// Discovered packages per tier. A tier without a key was never configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierRecords {
    tiers: BTreeMap<Tier, Vec<PackageRecord>>,
}

impl TierRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `tier` as configured with the given packages.
    pub fn insert(&mut self, tier: Tier, records: Vec<PackageRecord>) {
        self.tiers.insert(tier, records);
    }

    pub fn with(mut self, tier: Tier, records: Vec<PackageRecord>) -> Self {
        self.insert(tier, records);
        self
    }

    pub fn is_configured(&self, tier: Tier) -> bool {
        self.tiers.contains_key(&tier)
    }

    pub fn get(&self, tier: Tier) -> &[PackageRecord] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or_default()
    }

    /// Configured tiers in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &[PackageRecord])> {
        self.tiers.iter().map(|(tier, records)| (*tier, records.as_slice()))
    }

    pub fn package_count(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    fn remove_shadowed(&mut self, target: Tier, shadowing: Tier) {
        let hidden: HashSet<String> = self.get(shadowing).iter().map(|r| r.name.clone()).collect();
        if hidden.is_empty() {
            return;
        }
        if let Some(records) = self.tiers.get_mut(&target) {
            records.retain(|record| {
                let keep = !hidden.contains(&record.name);
                if !keep {
                    tracing::debug!(
                        package = %record.name,
                        "{target} package overridden by {shadowing}"
                    );
                }
                keep
            });
        }
    }
}

/// The non-versioned tier that overrides the project tiers, if any.
///
/// Development and stage are mutually exclusive; development is looked at
/// first.
fn active_non_versioned(records: &TierRecords) -> Option<Tier> {
    Tier::PACKAGE_TIERS
        .into_iter()
        .filter(|tier| tier.variant().is_none() && tier.precedence().is_some())
        .find(|tier| records.is_configured(*tier))
}

/// The versioned tiers of one variant, highest precedence first.
fn ranked(variant: Variant) -> Vec<Tier> {
    let mut tiers: Vec<Tier> = Tier::PACKAGE_TIERS
        .into_iter()
        .filter(|tier| tier.variant() == Some(variant))
        .collect();
    tiers.sort_by_key(|tier| Reverse(tier.precedence()));
    tiers
}

/// Prune the discovered packages down to one binding per visible name.
pub fn resolve(mut records: TierRecords) -> TierRecords {
    let active = active_non_versioned(&records);

    for variant in [Variant::Internal, Variant::External] {
        let ranked = ranked(variant);
        for (i, higher) in ranked.iter().enumerate() {
            for lower in &ranked[i + 1..] {
                records.remove_shadowed(*lower, *higher);
            }
        }
        if let Some(active) = active {
            for tier in &ranked {
                records.remove_shadowed(*tier, active);
            }
        }
    }

    for tier in Tier::PACKAGE_TIERS.into_iter().filter(|t| t.is_versioned()) {
        if let Some(list) = records.tiers.get_mut(&tier) {
            for record in list.iter_mut() {
                if let Some(latest) = record.latest().cloned() {
                    record.versions = vec![latest];
                }
            }
        }
    }

    records
}
