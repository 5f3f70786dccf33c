// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;

#[rstest]
fn test_load_yaml() {
    let app = AppDescriptor::from_yaml(
        r#"
application: maya
description: Autodesk Maya
folder_name: maya2024
version: 2024
global_env_class_name: maya
linux_executable: /apps/maya2024/bin/maya
"#,
    )
    .unwrap();

    assert_eq!(app.application.as_deref(), Some("maya"));
    assert_eq!(app.version.as_deref(), Some("2024"));
    assert_eq!(app.executable_for(Platform::Linux), Some("/apps/maya2024/bin/maya"));
    assert_eq!(app.executable_for(Platform::Windows), None);
}

#[rstest]
fn test_load_json_with_camel_case_keys() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nuke.json");
    std::fs::write(
        &path,
        r#"{
    "application": "nuke",
    "folderName": "nuke13",
    "version": "13.2.1",
    "globalEnvClassName": "nuke",
    "windowsExecutable": "C:/Nuke13/Nuke13.exe",
    "packages": ["ocio", "gizmos"]
}"#,
    )
    .unwrap();

    let app = AppDescriptor::load(&path).unwrap();
    assert_eq!(app.folder_name.as_deref(), Some("nuke13"));
    assert_eq!(app.global_env_class_name.as_deref(), Some("nuke"));
    assert_eq!(app.executable_for(Platform::Windows), Some("C:/Nuke13/Nuke13.exe"));
    assert_eq!(app.packages.len(), 2);
    assert_eq!(app.path.as_deref(), Some(path.as_path()));
}

#[rstest]
fn test_missing_file() {
    let tmp = TempDir::new().unwrap();
    let result = AppDescriptor::load(tmp.path().join("nope.yaml"));
    assert!(matches!(result, Err(Error::AppFileNotFound(_))));
}

#[rstest]
fn test_empty_executable_is_none() {
    let app = AppDescriptor::from_yaml("linux_executable: ''\n").unwrap();
    assert_eq!(app.executable_for(Platform::Linux), None);
}
