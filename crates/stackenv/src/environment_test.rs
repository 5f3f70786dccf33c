// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;
use crate::entry::PackageIdentity;

fn package(tier: Tier, name: &str) -> EnvEntryContainer {
    let mut container =
        EnvEntryContainer::for_package(tier, PackageIdentity::new(name, format!("/pkgs/{name}")));
    container.add_single(format!("{}_ROOT", name.to_uppercase()), format!("/pkgs/{name}"));
    container
}

#[rstest]
fn test_containers_sorted_by_package_name() {
    let mut env = ResolvedEnvironment::default();
    env.insert(package(Tier::ProjectInternal, "zlib"));
    env.insert(package(Tier::ProjectInternal, "alembic"));
    env.insert(package(Tier::ProjectInternal, "openexr"));

    let names: Vec<_> = env
        .containers(Tier::ProjectInternal)
        .iter()
        .filter_map(|c| c.package_name())
        .collect();
    assert_eq!(names, vec!["alembic", "openexr", "zlib"]);
}

#[rstest]
fn test_iter_follows_serialization_order() {
    let mut env = ResolvedEnvironment::default();
    env.insert(EnvEntryContainer::for_phase(Tier::PostBuild));
    env.insert(package(Tier::MasterProjectExternal, "b"));
    env.insert(package(Tier::Reserved, "a"));
    env.insert(EnvEntryContainer::for_phase(Tier::PreBuild));

    let tiers: Vec<_> = env.iter().map(|(tier, _)| tier).collect();
    assert_eq!(
        tiers,
        vec![
            Tier::PreBuild,
            Tier::Reserved,
            Tier::MasterProjectExternal,
            Tier::PostBuild
        ]
    );
}

#[rstest]
fn test_counts_and_lookup() {
    let mut env = ResolvedEnvironment::default();
    env.insert(package(Tier::Development, "foo"));
    env.insert(package(Tier::Development, "bar"));
    env.insert(EnvEntryContainer::for_phase(Tier::PreBuild));

    assert_eq!(env.package_count(Tier::Development), 2);
    assert_eq!(env.package_count(Tier::PreBuild), 0);
    assert_eq!(env.tiers_of("foo"), vec![Tier::Development]);
    assert!(env.find("bar").is_some());
    assert!(env.find("baz").is_none());
    assert!(!env.has_tier(Tier::Stage));
}

#[rstest]
fn test_selection_labels() {
    let selection = Selection {
        project: "show".into(),
        master_project: "main".into(),
        stage: Some("rc1".into()),
    };
    assert_eq!(selection.label_for(Tier::ProjectInternal), "show");
    assert_eq!(selection.label_for(Tier::MasterProjectExternal), "main");
    assert_eq!(selection.label_for(Tier::Stage), "rc1");
    assert_eq!(selection.label_for(Tier::Reserved), "show");
}

#[rstest]
fn test_yaml_round_trip_keeps_order() {
    let mut env = ResolvedEnvironment::new(Selection {
        project: "show".into(),
        master_project: "main".into(),
        stage: None,
    });
    env.insert(package(Tier::ProjectInternal, "b"));
    env.insert(package(Tier::ProjectInternal, "a"));

    let yaml = serde_yaml::to_string(&env).unwrap();
    assert!(yaml.contains("project_internal:"));
    let back: ResolvedEnvironment = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, env);
}
