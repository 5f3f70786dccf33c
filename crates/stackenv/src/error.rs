// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for stackenv operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::tier::Tier;

/// Convenience Result type with stackenv Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during stackenv operations.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// No settings file found in any of the searched locations
    #[error("No stackenv.yaml found in {0:?}, any parent directory or the user config directory")]
    #[diagnostic(
        code(stackenv::settings_not_found),
        help("Create a settings file with 'stackenv init' or point STACKENV_SETTINGS at one")
    )]
    SettingsNotFound(PathBuf),

    /// Settings file not found at specified path
    #[error("Settings file not found at {0:?}")]
    #[diagnostic(code(stackenv::not_found_at_path))]
    NotFoundAtPath(PathBuf),

    /// Invalid YAML in a settings, app or package file
    #[error("Invalid YAML document: {error}")]
    #[diagnostic(
        code(stackenv::invalid_yaml),
        help("Check YAML syntax and ensure 'api: stackenv/v0' is present where required")
    )]
    InvalidYaml {
        #[source]
        error: serde_yaml::Error,
        yaml_content: String,
    },

    /// Failed to read file
    #[error("Failed to read file: {path:?}")]
    #[diagnostic(code(stackenv::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to write file
    #[error("Failed to write file: {path:?}")]
    #[diagnostic(code(stackenv::write_failed))]
    WriteFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Include file not found
    #[error("Include file not found: {path:?}")]
    #[diagnostic(
        code(stackenv::include_not_found),
        help("Check that the include path is correct and the file exists")
    )]
    IncludeNotFound {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Circular include detected
    #[error("Circular include detected: {0:?}")]
    #[diagnostic(
        code(stackenv::circular_include),
        help("Remove the circular reference in your includes")
    )]
    CircularInclude(PathBuf),

    /// Validation error
    #[error("Validation failed: {0}")]
    #[diagnostic(code(stackenv::validation_failed))]
    ValidationFailed(String),

    /// A tier that must be configured has no directory on disk
    #[error("{tier} packages path doesn't exist: {path:?}")]
    #[diagnostic(
        code(stackenv::tier_root_missing),
        help("Check the tier path templates under 'paths:' in stackenv.yaml")
    )]
    TierRootMissing { tier: Tier, path: PathBuf },

    /// A tier that must be configured has no path template
    #[error("No path template 'paths.{key}' configured for {0} packages", key = .0.settings_key())]
    #[diagnostic(
        code(stackenv::tier_not_configured),
        help("Add the missing template under 'paths:' in stackenv.yaml")
    )]
    TierNotConfigured(Tier),

    /// App file missing
    #[error("App file doesn't exist: {0:?}")]
    #[diagnostic(code(stackenv::app_file_not_found))]
    AppFileNotFound(PathBuf),

    /// Global env pattern needs application data that isn't available
    #[error("Global env class '{class_name}' uses {placeholder} in '{pattern}' but {reason}")]
    #[diagnostic(
        code(stackenv::missing_app_context),
        help("Launch with --app and make sure the app file declares folder_name and version")
    )]
    MissingAppContext {
        class_name: String,
        pattern: String,
        placeholder: &'static str,
        reason: String,
    },

    /// Version folder name is not a numeric triple
    #[error("Invalid version '{0}', expected MAJOR.MINOR.PATCH")]
    #[diagnostic(code(stackenv::invalid_version))]
    InvalidVersion(String),

    /// A package hook could not be loaded or failed while running
    #[error("Package hook failed for {package}: {message}")]
    #[diagnostic(code(stackenv::package_hook_failed))]
    PackageHookFailed { package: String, message: String },

    /// Repeat-last requested but nothing was written before
    #[error("Script file doesn't exist for this env configuration, --last ignored: {0:?}")]
    #[diagnostic(
        code(stackenv::no_previous_artifact),
        help("Run once without --last to create the script")
    )]
    NoPreviousArtifact(PathBuf),

    /// Cache record missing or unusable
    #[error("Cache record not found: {0:?}")]
    #[diagnostic(
        code(stackenv::cache_record_not_found),
        help("Run with --cache-write first")
    )]
    CacheRecordNotFound(PathBuf),

    /// An area to be created is already on disk
    #[error("{what} already exists: {path:?}")]
    #[diagnostic(code(stackenv::area_exists))]
    AreaExists { what: &'static str, path: PathBuf },

    /// An area to copy from is not on disk
    #[error("{what} doesn't exist: {path:?}")]
    #[diagnostic(code(stackenv::area_not_found))]
    AreaNotFound { what: &'static str, path: PathBuf },

    /// A development area without packages can't become a stage
    #[error("No package found in development environment: {0:?}")]
    #[diagnostic(
        code(stackenv::nothing_to_stage),
        help("Add at least one package with a package.yaml before staging")
    )]
    NothingToStage(PathBuf),

    /// IO error passthrough
    #[error(transparent)]
    #[diagnostic(code(stackenv::io_error))]
    Io(#[from] std::io::Error),
}
