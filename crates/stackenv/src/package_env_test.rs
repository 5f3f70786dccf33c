// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;
use crate::app::AppDescriptor;
use crate::entry::EnvEntry;
use crate::tier::Tier;
use crate::version::Version;

fn container(root: &Path) -> EnvEntryContainer {
    let version: Version = "1.2.0".parse().unwrap();
    EnvEntryContainer::for_package(
        Tier::ProjectInternal,
        PackageIdentity::new("foo", root).with_version(Some(version)),
    )
}

#[rstest]
fn test_parse_ops() {
    let file = PackageEnvFile::from_yaml(
        r#"
api: stackenv/v0
environment:
  - set: FOO_ROOT
    value: "{root}"
  - prepend: PATH
    value: bin
  - source: setup.sh
  - command: "alias foo=bar"
"#,
    )
    .unwrap();

    assert!(file.enabled);
    assert_eq!(file.environment.len(), 4);
    assert!(matches!(file.environment[0], EnvOp::Set(_)));
    assert!(matches!(file.environment[1], EnvOp::Prepend(_)));
    assert!(matches!(file.environment[2], EnvOp::Source(_)));
    assert!(matches!(file.environment[3], EnvOp::Command(_)));
}

#[rstest]
fn test_wrong_api_is_rejected() {
    let result = PackageEnvFile::from_yaml("api: other/v9\n");
    assert!(matches!(result, Err(Error::InvalidYaml { .. })));
}

#[rstest]
fn test_hook_adds_entries_with_tokens() {
    let file = PackageEnvFile::from_yaml(
        r#"
environment:
  - set: FOO_VERSION
    value: "{name}-{version}"
  - prepend: PATH
    value: bin
  - prepend: LD_LIBRARY_PATH
    value: /opt/{platform}/lib
  - source: "{root}/setup.sh"
"#,
    )
    .unwrap();

    let ctx = Context::for_tests();
    let root = Path::new("/pkgs/foo/1.2.0/foo");
    let mut container = container(root);
    let outcome = file.set_environment(&ctx, &mut container).unwrap();

    assert_eq!(outcome, HookOutcome::Proceed);
    assert_eq!(
        container.entries(),
        &[
            EnvEntry::Single {
                variable: "FOO_VERSION".into(),
                value: "foo-1.2.0".into()
            },
            EnvEntry::Multi {
                variable: "PATH".into(),
                value: "/pkgs/foo/1.2.0/foo/bin".into()
            },
            EnvEntry::Multi {
                variable: "LD_LIBRARY_PATH".into(),
                value: "/opt/linux/lib".into()
            },
            EnvEntry::Script {
                value: "/pkgs/foo/1.2.0/foo/setup.sh".into()
            },
        ]
    );
}

#[rstest]
#[case("enabled: false\n")]
#[case("platforms: [windows]\n")]
fn test_veto(#[case] yaml: &str) {
    let file = PackageEnvFile::from_yaml(yaml).unwrap();
    let ctx = Context::for_tests();
    let mut container = container(Path::new("/pkgs/foo"));
    assert_eq!(
        file.set_environment(&ctx, &mut container).unwrap(),
        HookOutcome::Veto
    );
}

#[rstest]
#[case("platforms: [all]\n")]
#[case("platforms: [Linux, darwin]\n")]
#[case("applications: [nuke]\n")]
fn test_proceed_when_filters_match(#[case] yaml: &str) {
    let file = PackageEnvFile::from_yaml(yaml).unwrap();
    let ctx = Context::for_tests();
    let mut container = container(Path::new("/pkgs/foo"));
    assert_eq!(
        file.set_environment(&ctx, &mut container).unwrap(),
        HookOutcome::Proceed
    );
}

#[rstest]
fn test_applications_filter_with_active_app() {
    let file = PackageEnvFile::from_yaml("applications: [nuke]\n").unwrap();
    let ctx = Context::for_tests().with_app(Some(AppDescriptor {
        application: Some("maya".into()),
        ..Default::default()
    }));
    let mut container = container(Path::new("/pkgs/foo"));
    assert_eq!(
        file.set_environment(&ctx, &mut container).unwrap(),
        HookOutcome::Veto
    );
}

#[rstest]
fn test_registry_reads_env_file() {
    let tmp = TempDir::new().unwrap();
    let with_hook = tmp.path().join("with");
    let without_hook = tmp.path().join("without");
    std::fs::create_dir_all(&with_hook).unwrap();
    std::fs::create_dir_all(&without_hook).unwrap();
    std::fs::write(
        with_hook.join(PACKAGE_ENV_FILENAME),
        "environment:\n  - set: A\n    value: b\n",
    )
    .unwrap();

    let registry = EnvFileRegistry;
    assert!(
        registry
            .resolve(&PackageIdentity::new("with", &with_hook))
            .unwrap()
            .is_some()
    );
    assert!(
        registry
            .resolve(&PackageIdentity::new("without", &without_hook))
            .unwrap()
            .is_none()
    );
}

#[rstest]
fn test_registry_reports_broken_file() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(PACKAGE_ENV_FILENAME), "environment: [unclosed\n").unwrap();

    let result = EnvFileRegistry.resolve(&PackageIdentity::new("broken", tmp.path()));
    assert!(matches!(result, Err(Error::PackageHookFailed { .. })));
}
