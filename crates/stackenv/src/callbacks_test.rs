// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use rstest::rstest;

use super::*;
use crate::app::AppDescriptor;
use crate::entry::EnvEntry;
use crate::tier::Tier;

fn callbacks(yaml: &str) -> SettingsCallbacks {
    let settings: CallbackSettings = serde_yaml::from_str(yaml).unwrap();
    SettingsCallbacks::new(&settings).unwrap()
}

#[rstest]
#[case("/tier/foo", true)]
#[case("/tier/legacy_tools", false)]
#[case("/tier/foo/1.0.0/foo", true)]
fn test_exclude_patterns(#[case] root: &str, #[case] admitted: bool) {
    let callbacks = callbacks(
        r#"
admission:
  exclude: ["*/legacy_*"]
"#,
    );
    let ctx = Context::for_tests();
    assert_eq!(
        callbacks.should_admit_package(&ctx, &PathBuf::from(root)),
        admitted
    );
}

#[rstest]
fn test_include_patterns_must_match() {
    let callbacks = callbacks(
        r#"
admission:
  include: ["/studio/*"]
  exclude: ["/studio/broken"]
"#,
    );
    let ctx = Context::for_tests();
    assert!(callbacks.should_admit_package(&ctx, Path::new("/studio/foo")));
    assert!(!callbacks.should_admit_package(&ctx, Path::new("/studio/broken")));
    assert!(!callbacks.should_admit_package(&ctx, Path::new("/elsewhere/foo")));
}

#[rstest]
fn test_invalid_pattern_is_rejected() {
    let settings: CallbackSettings = serde_yaml::from_str(
        r#"
admission:
  exclude: ["[unclosed"]
"#,
    )
    .unwrap();
    assert!(matches!(
        SettingsCallbacks::new(&settings),
        Err(Error::ValidationFailed(_))
    ));
}

#[rstest]
fn test_phases_expand_tokens() {
    let callbacks = callbacks(
        r#"
pre_build:
  - set: STACKENV_PROJECT
    value: "{project}"
  - prepend: PATH
    value: /studio/{platform}/bin
post_build:
  - command: echo {developer}
"#,
    );
    let ctx = Context::for_tests();

    let mut pre = EnvEntryContainer::for_phase(Tier::PreBuild);
    callbacks.pre_build(&ctx, &mut pre).unwrap();
    assert_eq!(
        pre.entries(),
        &[
            EnvEntry::Single {
                variable: "STACKENV_PROJECT".into(),
                value: "main".into()
            },
            EnvEntry::Multi {
                variable: "PATH".into(),
                value: "/studio/linux/bin".into()
            },
        ]
    );

    let mut post = EnvEntryContainer::for_phase(Tier::PostBuild);
    callbacks.post_build(&ctx, &mut post).unwrap();
    assert_eq!(post.entries()[0].value(), "echo tester");
}

#[rstest]
fn test_app_executable_flags() {
    let callbacks = callbacks(
        r#"
app_executable_flags:
  maya: -noAutoloadPlugins
"#,
    );
    let ctx = Context::for_tests();
    assert_eq!(callbacks.app_executable_flags(&ctx), None);

    let ctx = Context::for_tests().with_app(Some(AppDescriptor {
        application: Some("maya".into()),
        ..Default::default()
    }));
    assert_eq!(
        callbacks.app_executable_flags(&ctx).as_deref(),
        Some("-noAutoloadPlugins")
    );
}
