// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! stackenv - Layered Package Environment Resolver
//!
//! This crate resolves packages from up to seven ranked package sources
//! ("tiers") into one deterministic environment and writes that environment
//! out as a shell activation script.
//!
//! # Overview
//!
//! A run is a single sequential pass:
//!
//! 1. [`discovery`] lists the candidate packages of every configured tier.
//! 2. [`resolve`] applies the cross-tier override rules and keeps only the
//!    latest version of each versioned package.
//! 3. [`assemble`] turns every surviving package (and the pre/post build
//!    phases) into an [`EnvEntryContainer`] by running the package hooks and
//!    the global environment templates.
//! 4. [`script`] renders the [`ResolvedEnvironment`] into an idempotent
//!    script with a mutation channel and a display channel.
//!
//! # Example
//!
//! ```yaml
//! # stackenv.yaml
//! api: stackenv/v0
//! master_project: main
//!
//! paths:
//!   development: /studio/{project}/developers/{developer}/{development}
//!   project_internal: /studio/{project}/internal
//!   project_external: /studio/{project}/external
//!   master_project_internal: /studio/main/internal
//!   master_project_external: /studio/main/external
//!
//! global_env:
//!   PackageLinux:
//!     PATH: [bin]
//!     PYTHONPATH: [python]
//! ```

pub mod app;
pub mod assemble;
pub mod cache;
pub mod callbacks;
pub mod context;
pub mod create;
pub mod dialect;
pub mod discovery;
pub mod engine;
pub mod entry;
pub mod environment;
pub mod error;
pub mod hooks;
pub mod log;
pub mod package_env;
pub mod request;
pub mod resolve;
pub mod script;
pub mod settings;
pub mod tier;
pub mod version;

pub use app::AppDescriptor;
pub use assemble::{assemble, assemble_environment, assemble_phase};
pub use cache::{CacheChange, CacheChangeKind, CacheRecord, verify_cache};
pub use callbacks::SettingsCallbacks;
pub use context::Context;
pub use create::{StagedArea, create_development, create_project, create_reserved, create_stage};
pub use dialect::{Palette, Shell};
pub use discovery::{PackageRecord, discover};
pub use engine::{RunOutcome, build_environment, run};
pub use entry::{EntryKind, EnvEntry, EnvEntryContainer, PackageIdentity};
pub use environment::ResolvedEnvironment;
pub use error::{Error, Result};
pub use hooks::{
    Callbacks, GlobalTemplate, HookOutcome, HookRegistry, PackageHook, StaticRegistry,
    TemplateProvider,
};
pub use log::{LogLevel, LogRecord, RunLog};
pub use request::{Platform, Request};
pub use resolve::{TierRecords, resolve};
pub use script::{ScriptArtifact, ScriptOptions, serialize};
pub use settings::{Locations, Settings, SettingsDiscovery, discover_settings};
pub use tier::{Tier, TierKind};
pub use version::Version;

/// Well-known filename for settings files.
pub const SETTINGS_FILENAME: &str = "stackenv.yaml";

/// Well-known filename that marks a directory as a package.
pub const PACKAGE_DESCRIPTOR_FILENAME: &str = "package.yaml";

/// Well-known filename of the per-package environment hook.
pub const PACKAGE_ENV_FILENAME: &str = "package.env.yaml";

/// Environment variable set by an activation script; its presence means the
/// current shell has already been initialized.
pub const INITIALIZED_MARKER_VAR: &str = "STACKENV_VERSION";

/// Product name shown in the product info section of a script.
pub const PRODUCT_NAME: &str = "STACKENV";
