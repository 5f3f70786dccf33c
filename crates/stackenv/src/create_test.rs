// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;
use crate::dialect::Shell;
use crate::request::Platform;

struct Studio {
    tmp: TempDir,
    settings: Settings,
}

impl Studio {
    fn root(&self) -> &Path {
        self.tmp.path()
    }

    fn development(&self, name: &str) -> PathBuf {
        self.root().join("show/dev/alice").join(name)
    }
}

#[fixture]
fn studio() -> Studio {
    let tmp = TempDir::new().unwrap();
    let settings = Settings::from_yaml(format!(
        r#"
api: stackenv/v0
master_project: main
paths:
  reserved: {root}/reserved/{{developer}}
  development: {root}/{{project}}/dev/{{developer}}/{{development}}
  stage: {root}/{{project}}/stage/{{stage}}
  project_internal: {root}/{{project}}/internal
  project_external: {root}/{{project}}/external
  master_project_internal: {root}/{{master_project}}/internal
  master_project_external: {root}/{{master_project}}/external
"#,
        root = tmp.path().display()
    ))
    .unwrap();
    Studio { tmp, settings }
}

fn request() -> Request {
    Request {
        project: Some("show".into()),
        developer: "alice".into(),
        platform: Platform::Linux,
        shell: Shell::Posix,
        ..Default::default()
    }
}

fn package(dir: &Path, files: &[&str]) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("package.yaml"), "description: test\n").unwrap();
    for file in files {
        let path = dir.join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, file).unwrap();
    }
}

#[rstest]
fn test_create_project(studio: Studio) {
    let roots = create_project(&studio.settings, &request(), "newshow").unwrap();

    assert_eq!(
        roots,
        vec![
            studio.root().join("newshow/internal"),
            studio.root().join("newshow/external"),
        ]
    );
    assert!(roots.iter().all(|root| root.is_dir()));
}

#[rstest]
fn test_create_project_refuses_existing(studio: Studio) {
    std::fs::create_dir_all(studio.root().join("newshow/external")).unwrap();

    let err = create_project(&studio.settings, &request(), "newshow").unwrap_err();

    assert!(matches!(err, Error::AreaExists { what: "Project", .. }));
    assert!(!studio.root().join("newshow/internal").exists());
}

#[rstest]
fn test_create_development_then_refuse_again(studio: Studio) {
    let path = create_development(&studio.settings, &request(), "feature").unwrap();
    assert_eq!(path, studio.development("feature"));
    assert!(path.is_dir());

    let err = create_development(&studio.settings, &request(), "feature").unwrap_err();
    assert!(matches!(err, Error::AreaExists { .. }));
}

#[rstest]
fn test_create_reserved_per_developer(studio: Studio) {
    let path = create_reserved(&studio.settings, &request()).unwrap();
    assert_eq!(path, studio.root().join("reserved/alice"));

    let err = create_reserved(&studio.settings, &request()).unwrap_err();
    assert!(matches!(err, Error::AreaExists { .. }));
}

#[rstest]
fn test_create_reserved_needs_template() {
    let settings = Settings::from_yaml(
        "master_project: main\npaths:\n  master_project_internal: /a\n  master_project_external: /b\n",
    )
    .unwrap();
    let err = create_reserved(&settings, &request()).unwrap_err();
    assert!(matches!(err, Error::TierNotConfigured(Tier::Reserved)));
}

#[rstest]
fn test_create_stage_copies_packages(studio: Studio) {
    let dev = studio.development("feature");
    package(&dev.join("foo"), &["bin/foo", "python/foo.py", "python/foo.pyc"]);
    package(&dev.join("bar"), &[]);
    std::fs::create_dir_all(dev.join("scratch")).unwrap();

    let staged = create_stage(&studio.settings, &request(), "review", "feature").unwrap();

    let stage = studio.root().join("show/stage/review");
    assert_eq!(staged.path, stage);
    assert_eq!(staged.packages, vec!["bar", "foo"]);
    assert!(stage.join("foo/package.yaml").is_file());
    assert_eq!(std::fs::read_to_string(stage.join("foo/bin/foo")).unwrap(), "bin/foo");
    assert!(stage.join("foo/python/foo.py").is_file());
    assert!(!stage.join("foo/python/foo.pyc").exists());
    assert!(!stage.join("scratch").exists());
}

#[rstest]
fn test_create_stage_refuses_existing_stage(studio: Studio) {
    package(&studio.development("feature").join("foo"), &["bin/foo"]);
    std::fs::create_dir_all(studio.root().join("show/stage/review")).unwrap();

    let err = create_stage(&studio.settings, &request(), "review", "feature").unwrap_err();

    assert!(matches!(err, Error::AreaExists { what: "Stage environment", .. }));
}

#[rstest]
fn test_create_stage_refuses_empty_development(studio: Studio) {
    let dev = studio.development("feature");
    std::fs::create_dir_all(dev.join("not-a-package")).unwrap();

    let err = create_stage(&studio.settings, &request(), "review", "feature").unwrap_err();

    assert!(matches!(err, Error::NothingToStage(path) if path == dev));
    assert!(!studio.root().join("show/stage/review").exists());
}

#[rstest]
fn test_create_stage_needs_development(studio: Studio) {
    let err = create_stage(&studio.settings, &request(), "review", "missing").unwrap_err();
    assert!(matches!(err, Error::AreaNotFound { .. }));
}
