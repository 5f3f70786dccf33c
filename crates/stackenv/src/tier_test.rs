// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

#[rstest]
fn test_all_is_sorted_by_ord() {
    let mut sorted = Tier::ALL.to_vec();
    sorted.sort();
    assert_eq!(sorted, Tier::ALL.to_vec());
}

#[rstest]
#[case(Tier::PreBuild, TierKind::Phase)]
#[case(Tier::Reserved, TierKind::NonVersioned)]
#[case(Tier::Development, TierKind::NonVersioned)]
#[case(Tier::Stage, TierKind::NonVersioned)]
#[case(Tier::ProjectInternal, TierKind::Versioned)]
#[case(Tier::MasterProjectExternal, TierKind::Versioned)]
#[case(Tier::PostBuild, TierKind::Phase)]
fn test_kind(#[case] tier: Tier, #[case] expected: TierKind) {
    assert_eq!(tier.kind(), expected);
}

#[rstest]
fn test_precedence_ranks() {
    assert!(Tier::Development.precedence() > Tier::ProjectInternal.precedence());
    assert!(Tier::ProjectExternal.precedence() > Tier::MasterProjectExternal.precedence());
    assert_eq!(Tier::Development.precedence(), Tier::Stage.precedence());
    assert_eq!(Tier::Reserved.precedence(), None);
    assert_eq!(Tier::PostBuild.precedence(), None);
}

#[rstest]
fn test_package_tiers_exclude_phases() {
    assert!(Tier::PACKAGE_TIERS.iter().all(|t| !t.is_phase()));
    assert_eq!(Tier::PACKAGE_TIERS.len(), 7);
}

#[rstest]
fn test_serde_names_match_settings_keys() {
    for tier in Tier::ALL {
        let yaml = serde_yaml::to_string(&tier).unwrap();
        assert_eq!(yaml.trim(), tier.settings_key());
    }
}
