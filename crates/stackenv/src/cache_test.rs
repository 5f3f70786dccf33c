// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use rstest::rstest;
use tempfile::TempDir;

use super::*;
use crate::entry::{EnvEntryContainer, PackageIdentity};
use crate::tier::Tier;

fn environment(root: &Path, names: &[&str]) -> ResolvedEnvironment {
    let mut env = ResolvedEnvironment::default();
    for name in names {
        let package_root = root.join(name);
        std::fs::create_dir_all(&package_root).unwrap();
        std::fs::write(package_root.join("package.yaml"), format!("name: {name}\n")).unwrap();
        let mut container =
            EnvEntryContainer::for_package(Tier::Development, PackageIdentity::new(*name, package_root));
        container.add_single(format!("{}_ROOT", name.to_uppercase()), "x");
        env.insert(container);
    }
    env
}

#[rstest]
fn test_record_path_appends_suffix() {
    assert_eq!(
        cache_record_path(Path::new("/cache/main/abc.sh")),
        Path::new("/cache/main/abc.sh.cache.yaml")
    );
}

#[rstest]
fn test_generate_tracks_descriptors() {
    let tmp = TempDir::new().unwrap();
    let env = environment(tmp.path(), &["bar", "foo"]);

    let record = CacheRecord::generate(&env).unwrap();

    assert_eq!(record.api, CacheApiVersion::V0);
    assert_eq!(record.generated.stackenv_version, env!("CARGO_PKG_VERSION"));
    let paths: Vec<_> = record.descriptors.iter().map(|d| d.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            tmp.path().join("bar").join("package.yaml"),
            tmp.path().join("foo").join("package.yaml"),
        ]
    );
    assert!(record.descriptors.iter().all(|d| d.sha256.len() == 64));
}

#[rstest]
fn test_write_then_load() {
    let tmp = TempDir::new().unwrap();
    let env = environment(tmp.path(), &["foo"]);
    let record = CacheRecord::generate(&env).unwrap();
    let path = tmp.path().join("out").join("env.sh.cache.yaml");

    record.write(&path).unwrap();
    let loaded = CacheRecord::load(&path).unwrap();

    assert_eq!(loaded, record);
    assert!(std::fs::read_to_string(&path).unwrap().contains("api: stackenv/v0/cache"));
}

#[rstest]
fn test_load_missing_record() {
    let tmp = TempDir::new().unwrap();
    let err = CacheRecord::load(tmp.path().join("nope.cache.yaml")).unwrap_err();
    assert!(matches!(err, Error::CacheRecordNotFound(_)));
}

#[rstest]
fn test_verify_reports_changes() {
    let tmp = TempDir::new().unwrap();
    let env = environment(tmp.path(), &["bar", "baz", "foo"]);
    let record = CacheRecord::generate(&env).unwrap();
    assert!(verify_cache(&record).unwrap().is_empty());

    std::fs::write(tmp.path().join("foo").join("package.yaml"), "name: foo\nv: 2\n").unwrap();
    std::fs::remove_file(tmp.path().join("bar").join("package.yaml")).unwrap();

    let changes = verify_cache(&record).unwrap();
    let kinds: Vec<_> = changes.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![CacheChangeKind::DescriptorRemoved, CacheChangeKind::DescriptorChanged]
    );
    assert!(changes[0].actual.is_none());
    assert!(changes[1].actual.is_some());
}
