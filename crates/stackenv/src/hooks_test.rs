// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

#[derive(Debug)]
struct Marker(&'static str);

impl PackageHook for Marker {
    fn set_environment(
        &self,
        _ctx: &Context,
        container: &mut EnvEntryContainer,
    ) -> crate::Result<HookOutcome> {
        container.add_single("MARKER", self.0);
        Ok(HookOutcome::Proceed)
    }
}

#[rstest]
#[case("Package", Platform::Linux, "PackageLinux")]
#[case("package", Platform::Windows, "PackageWindows")]
#[case("maya", Platform::Darwin, "MayaDarwin")]
#[case("MAYA", Platform::Linux, "MayaLinux")]
#[case("my_app", Platform::Linux, "My_AppLinux")]
#[case("", Platform::Linux, "Linux")]
fn test_template_class_name(#[case] base: &str, #[case] platform: Platform, #[case] expected: &str) {
    assert_eq!(template_class_name(base, platform), expected);
}

#[rstest]
fn test_static_registry_by_name() {
    let registry = StaticRegistry::new().with("foo", Marker("foo"));

    let found = registry
        .resolve(&PackageIdentity::new("foo", "/x/foo"))
        .unwrap();
    assert!(found.is_some());
    let missing = registry
        .resolve(&PackageIdentity::new("bar", "/x/bar"))
        .unwrap();
    assert!(missing.is_none());
}

#[rstest]
fn test_global_templates_yaml_and_merge() {
    let mut base: GlobalTemplates = serde_yaml::from_str(
        r#"
PackageLinux:
  PYTHONPATH: [python]
  PATH: [bin]
"#,
    )
    .unwrap();
    let overlay: GlobalTemplates = serde_yaml::from_str(
        r#"
PackageLinux:
  PATH: [bin, scripts]
MayaLinux:
  MAYA_SCRIPT_PATH: [maya/FOLDER_NAME/scripts]
"#,
    )
    .unwrap();
    base.merge(overlay);

    let package = base.lookup_template("PackageLinux").unwrap();
    let names: Vec<_> = package.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["PATH", "PYTHONPATH"]);
    assert_eq!(package.attributes["PATH"], vec!["bin", "scripts"]);
    assert!(base.lookup_template("MayaLinux").is_some());
    assert!(base.lookup_template("NukeLinux").is_none());
}
