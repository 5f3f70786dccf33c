// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

fn versioned(name: &str, versions: &[&str]) -> PackageRecord {
    PackageRecord::new(name, format!("/tier/{name}"))
        .with_versions(versions.iter().map(|v| v.parse().unwrap()).collect())
}

fn plain(name: &str) -> PackageRecord {
    PackageRecord::new(name, format!("/dev/{name}"))
}

fn names(records: &TierRecords, tier: Tier) -> Vec<&str> {
    records.get(tier).iter().map(|r| r.name.as_str()).collect()
}

fn versions_of<'a>(records: &'a TierRecords, tier: Tier, name: &str) -> Vec<&'a str> {
    records
        .get(tier)
        .iter()
        .find(|r| r.name == name)
        .map(|r| r.versions.iter().map(|v| v.as_str()).collect())
        .unwrap_or_default()
}

#[rstest]
fn test_project_overrides_master_and_latest_wins() {
    let records = TierRecords::new()
        .with(Tier::ProjectInternal, vec![versioned("foo", &["1.2.0", "1.3.0"])])
        .with(Tier::MasterProjectInternal, vec![versioned("foo", &["1.0.0"])]);

    let resolved = resolve(records);

    assert!(resolved.get(Tier::MasterProjectInternal).is_empty());
    assert_eq!(versions_of(&resolved, Tier::ProjectInternal, "foo"), vec!["1.3.0"]);
}

#[rstest]
fn test_development_overrides_versioned() {
    let records = TierRecords::new()
        .with(Tier::Development, vec![plain("bar")])
        .with(Tier::ProjectExternal, vec![versioned("bar", &["9.9.9", "1.0.0"])])
        .with(Tier::MasterProjectExternal, vec![versioned("bar", &["1.0.0"])]);

    let resolved = resolve(records);

    assert_eq!(names(&resolved, Tier::Development), vec!["bar"]);
    assert!(resolved.get(Tier::ProjectExternal).is_empty());
    assert!(resolved.get(Tier::MasterProjectExternal).is_empty());
}

#[rstest]
fn test_stage_overrides_when_no_development() {
    let records = TierRecords::new()
        .with(Tier::Stage, vec![plain("baz")])
        .with(Tier::ProjectInternal, vec![versioned("baz", &["1.0.0"])])
        .with(Tier::MasterProjectInternal, vec![versioned("qux", &["1.0.0"])]);

    let resolved = resolve(records);

    assert!(resolved.get(Tier::ProjectInternal).is_empty());
    assert_eq!(names(&resolved, Tier::MasterProjectInternal), vec!["qux"]);
}

#[rstest]
fn test_internal_and_external_are_independent() {
    let records = TierRecords::new()
        .with(Tier::ProjectInternal, vec![versioned("foo", &["1.0.0"])])
        .with(Tier::MasterProjectExternal, vec![versioned("foo", &["2.0.0"])]);

    let resolved = resolve(records);

    assert_eq!(names(&resolved, Tier::ProjectInternal), vec!["foo"]);
    assert_eq!(names(&resolved, Tier::MasterProjectExternal), vec!["foo"]);
}

#[rstest]
fn test_reserved_is_never_pruned() {
    let records = TierRecords::new()
        .with(Tier::Reserved, vec![plain("core")])
        .with(Tier::Development, vec![plain("core")])
        .with(Tier::MasterProjectInternal, vec![versioned("core", &["1.0.0"])]);

    let resolved = resolve(records);

    assert_eq!(names(&resolved, Tier::Reserved), vec!["core"]);
    assert_eq!(names(&resolved, Tier::Development), vec!["core"]);
    assert!(resolved.get(Tier::MasterProjectInternal).is_empty());
}

#[rstest]
fn test_unconfigured_tiers_are_ignored() {
    let records =
        TierRecords::new().with(Tier::MasterProjectInternal, vec![versioned("a", &["1.0.0", "0.1.0"])]);

    let resolved = resolve(records);

    assert!(!resolved.is_configured(Tier::ProjectInternal));
    assert_eq!(versions_of(&resolved, Tier::MasterProjectInternal, "a"), vec!["1.0.0"]);
}

#[rstest]
fn test_every_visible_name_has_single_binding() {
    let records = TierRecords::new()
        .with(Tier::Development, vec![plain("a"), plain("b")])
        .with(
            Tier::ProjectInternal,
            vec![versioned("a", &["1.0.0"]), versioned("c", &["1.0.0", "1.0.10", "1.0.9"])],
        )
        .with(Tier::ProjectExternal, vec![versioned("d", &["0.0.1"])])
        .with(
            Tier::MasterProjectInternal,
            vec![versioned("b", &["1.0.0"]), versioned("c", &["3.0.0"]), versioned("e", &["1.0.0"])],
        )
        .with(Tier::MasterProjectExternal, vec![versioned("d", &["1.0.0"])]);

    let resolved = resolve(records);

    let mut seen = HashSet::new();
    for (tier, list) in resolved.iter() {
        for record in list {
            assert!(seen.insert(record.name.clone()), "{} bound twice", record.name);
            if tier.is_versioned() {
                assert_eq!(record.versions.len(), 1);
            }
        }
    }
    assert_eq!(versions_of(&resolved, Tier::ProjectInternal, "c"), vec!["1.0.10"]);
    assert_eq!(names(&resolved, Tier::MasterProjectInternal), vec!["e"]);
    assert_eq!(resolved.package_count(), 5);
}

#[rstest]
#[case(Variant::Internal, [Tier::ProjectInternal, Tier::MasterProjectInternal])]
#[case(Variant::External, [Tier::ProjectExternal, Tier::MasterProjectExternal])]
fn test_variant_tiers_ranked_by_precedence(#[case] variant: Variant, #[case] expected: [Tier; 2]) {
    assert_eq!(ranked(variant), expected);
}
