// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Rendering a [`ResolvedEnvironment`] into an activation script.
//!
//! A script has two channels. The display channel prints a summary of the
//! environment, gated by verbosity; the mutation channel changes the shell
//! environment. Every display statement is written before the first
//! mutation statement, and both sit inside an initialization function that
//! refuses to run twice in one shell.

use std::path::Path;

use colored::Color;

use crate::context::Context;
use crate::dialect::{Palette, Shell};
use crate::entry::{EnvEntry, EnvEntryContainer};
use crate::environment::{AppLaunch, ResolvedEnvironment};
use crate::log::RunLog;
use crate::request::Request;
use crate::tier::Tier;
use crate::{Error, INITIALIZED_MARKER_VAR, PRODUCT_NAME};

#[cfg(test)]
#[path = "./script_test.rs"]
mod script_test;

const SEPARATOR_WIDTH: usize = 100;
const PACKAGE_LABEL_WIDTH: usize = 30;
const PHASE_LABEL_WIDTH: usize = 42;
const APP_LABEL_WIDTH: usize = 35;
const INFO_LABEL_WIDTH: usize = 42;
const INDENT: &str = "    ";
const NOT_AVAILABLE: &str = "N/A";

/// Verbosity from which variables are displayed.
const SHOW_VARIABLES: u8 = 2;
/// Verbosity from which scripts and commands are displayed.
const SHOW_STATEMENTS: u8 = 3;
/// Verbosity from which build phases are displayed.
const SHOW_PHASES: u8 = 4;

/// How a script is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOptions {
    pub shell: Shell,
    /// 1 to 4
    pub verbose: u8,
    /// Write the display channel only.
    pub display_only: bool,
    /// Write the mutation channel only.
    pub set_only: bool,
    pub ignore_env_scripts: bool,
    pub ignore_env_commands: bool,
    pub ignore_app_exec: bool,
    pub app_args: Option<String>,
    pub palette: Palette,
}

impl ScriptOptions {
    pub fn from_request(request: &Request, palette: Palette) -> Self {
        Self {
            shell: request.shell,
            verbose: request.verbose,
            display_only: request.display_only,
            set_only: request.set_only,
            ignore_env_scripts: request.ignore_env_scripts,
            ignore_env_commands: request.ignore_env_commands,
            ignore_app_exec: request.ignore_app_exec,
            app_args: request.app_args.clone(),
            palette,
        }
    }

    pub fn for_context(ctx: &Context) -> Self {
        Self::from_request(&ctx.request, ctx.palette)
    }

    fn show_display(&self) -> bool {
        !self.set_only
    }

    /// Set-only wins when both channels are switched off.
    fn show_mutation(&self) -> bool {
        !self.display_only || self.set_only
    }
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self::from_request(&Request::default(), Palette::default())
    }
}

/// A rendered activation script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptArtifact {
    pub shell: Shell,
    pub content: String,
}

impl ScriptArtifact {
    /// Write the script, creating its parent directory.
    pub fn write(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| Error::WriteFailed {
                path: parent.to_path_buf(),
                error,
            })?;
        }
        std::fs::write(path, &self.content).map_err(|error| Error::WriteFailed {
            path: path.to_path_buf(),
            error,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.lines()
    }
}

/// Render `env` as a script.
///
/// Scripts and commands suppressed by the options are reported on `log`
/// and left out of both channels.
pub fn serialize(env: &ResolvedEnvironment, options: &ScriptOptions, log: &RunLog) -> ScriptArtifact {
    let mut writer = Writer::new(options, log);
    for (tier, containers) in env.iter() {
        writer.tier(tier, containers);
    }
    if let Some(app) = env.app() {
        writer.app(app);
    }
    writer.info(env);
    writer.product_info();
    writer.marker();
    if let Some(app) = env.app() {
        writer.launch(app);
    }

    let shell = options.shell;
    let mut content = shell.guard_open(INITIALIZED_MARKER_VAR);
    for line in writer.display.iter().chain(writer.mutation.iter()) {
        content.push_str(INDENT);
        content.push_str(line);
        content.push('\n');
    }
    content.push_str(&shell.guard_close());
    ScriptArtifact { shell, content }
}

struct Writer<'a> {
    options: &'a ScriptOptions,
    log: &'a RunLog,
    display: Vec<String>,
    mutation: Vec<String>,
}

impl<'a> Writer<'a> {
    fn new(options: &'a ScriptOptions, log: &'a RunLog) -> Self {
        Self {
            options,
            log,
            display: Vec::new(),
            mutation: Vec::new(),
        }
    }

    fn palette(&self) -> &Palette {
        &self.options.palette
    }

    fn show(&mut self, segments: &[(&str, Option<Color>)]) {
        if self.options.show_display() {
            self.display.push(self.options.shell.display_line(segments));
        }
    }

    fn blank(&mut self) {
        if self.options.show_display() {
            self.display.push(self.options.shell.blank_line());
        }
    }

    fn mutate(&mut self, statement: String) {
        if self.options.show_mutation() {
            self.mutation.push(statement);
        }
    }

    fn section(&mut self, title: &str) {
        let rule = "-".repeat(SEPARATOR_WIDTH);
        let title = title.to_uppercase();
        let palette = *self.palette();
        self.blank();
        self.show(&[(rule.as_str(), palette.separator)]);
        self.show(&[(title.as_str(), palette.header)]);
        self.show(&[(rule.as_str(), palette.separator)]);
    }

    /// A `label : value` row of a package or phase.
    fn row(&mut self, label: &str, width: usize, value: &str, color: Option<Color>) {
        let palette = *self.palette();
        let label = format!("{label:<width$}");
        self.show(&[(label.as_str(), palette.variable), (": ", None), (value, color)]);
    }

    /// A `label : value` row of the app, info and product sections.
    fn field(&mut self, label: &str, width: usize, value: &str) {
        let palette = *self.palette();
        let label = format!("{label:<width$}");
        self.show(&[(label.as_str(), palette.title), (": ", None), (value, palette.value)]);
    }

    fn tier(&mut self, tier: Tier, containers: &[EnvEntryContainer]) {
        let containers: Vec<_> = containers.iter().filter(|c| !c.is_empty()).collect();
        if containers.is_empty() {
            return;
        }
        let displayed = !tier.is_phase() || self.options.verbose >= SHOW_PHASES;
        if displayed {
            self.section(tier.label());
        }
        for container in containers {
            self.container(container, displayed);
        }
    }

    fn container(&mut self, container: &EnvEntryContainer, displayed: bool) {
        let shell = self.options.shell;
        let verbose = self.options.verbose;
        let palette = *self.palette();
        let width = match container.package() {
            Some(_) => PACKAGE_LABEL_WIDTH,
            None => PHASE_LABEL_WIDTH,
        };

        if displayed {
            if let Some(package) = container.package() {
                let title = match &package.version {
                    Some(version) => format!("{} - {version}", package.name),
                    None => package.name.clone(),
                };
                let title = format!("{title:<PACKAGE_LABEL_WIDTH$}");
                let root = package.root_path.display().to_string();
                self.show(&[
                    (title.as_str(), palette.package),
                    (" > ", palette.separator),
                    (root.as_str(), palette.value),
                ]);
            }
        }

        for entry in container.entries() {
            match entry {
                EnvEntry::Single { variable, value } => {
                    if displayed && verbose >= SHOW_VARIABLES {
                        self.row(variable, width, value, palette.value);
                    }
                    self.mutate(shell.single(variable, value));
                }
                EnvEntry::Multi { variable, value } => {
                    if displayed && verbose >= SHOW_VARIABLES {
                        self.row(variable, width, value, palette.value);
                    }
                    self.mutate(shell.multi(variable, value));
                }
                EnvEntry::Script { value } => {
                    if self.options.ignore_env_scripts {
                        self.suppressed(container, "script", value);
                        continue;
                    }
                    if displayed && verbose >= SHOW_STATEMENTS {
                        self.row("SOURCE", width, value, palette.script);
                    }
                    self.mutate(shell.script(value));
                }
                EnvEntry::Command { value } => {
                    if self.options.ignore_env_commands {
                        self.suppressed(container, "command", value);
                        continue;
                    }
                    if displayed && verbose >= SHOW_STATEMENTS {
                        self.row("COMMAND", width, value, palette.command);
                    }
                    self.mutate(shell.command(value));
                }
            }
        }

        if displayed && verbose > 1 {
            self.blank();
        }
    }

    fn suppressed(&self, container: &EnvEntryContainer, what: &str, value: &str) {
        let owner = container
            .package_name()
            .map(str::to_string)
            .unwrap_or_else(|| container.tier().label().to_string());
        self.log.warning(format!("{owner}: {what} ignored: {value}"));
    }

    fn app(&mut self, app: &AppLaunch) {
        let descriptor = &app.descriptor;
        let suffix = if self.options.ignore_app_exec {
            " (App executable is ignored)"
        } else if app.executable.is_some() {
            " (Launching...)"
        } else {
            ""
        };
        let description = format!(
            "{}{suffix}",
            descriptor.description.as_deref().unwrap_or(NOT_AVAILABLE)
        );
        let file = app.file.display().to_string();

        self.section("App/Env");
        let rows = [
            ("App File", file.as_str()),
            ("Description", description.as_str()),
            (
                "Global Env Class Name",
                descriptor.global_env_class_name.as_deref().unwrap_or(NOT_AVAILABLE),
            ),
            ("Application", descriptor.application.as_deref().unwrap_or(NOT_AVAILABLE)),
            ("Folder Name", descriptor.folder_name.as_deref().unwrap_or(NOT_AVAILABLE)),
            ("Version", descriptor.version.as_deref().unwrap_or(NOT_AVAILABLE)),
        ];
        for (label, value) in rows {
            self.field(label, APP_LABEL_WIDTH, value);
        }
        if self.options.verbose > 1 {
            self.blank();
        }
    }

    fn info(&mut self, env: &ResolvedEnvironment) {
        let selection = env.selection();
        let counts: Vec<_> = Tier::PACKAGE_TIERS
            .into_iter()
            .map(|tier| (tier, env.package_count(tier)))
            .filter(|(_, count)| *count > 0)
            .collect();
        if counts.is_empty() {
            return;
        }
        self.section("Info");
        for (tier, count) in counts {
            let label = format!("{} Packages ({})", tier.label(), selection.label_for(tier));
            self.field(&label, INFO_LABEL_WIDTH, &count.to_string());
        }
    }

    fn product_info(&mut self) {
        self.section("Product Info");
        self.field(PRODUCT_NAME, INFO_LABEL_WIDTH, env!("CARGO_PKG_VERSION"));
        self.blank();
        self.blank();
    }

    fn marker(&mut self) {
        let statement = self
            .options
            .shell
            .single(INITIALIZED_MARKER_VAR, env!("CARGO_PKG_VERSION"));
        self.mutate(statement);
    }

    fn launch(&mut self, app: &AppLaunch) {
        if self.options.ignore_app_exec {
            return;
        }
        let Some(executable) = app.executable.as_deref() else {
            return;
        };
        let statement = self.options.shell.launch(
            executable,
            app.flags.as_deref().unwrap_or_default(),
            self.options.app_args.as_deref().unwrap_or_default(),
        );
        self.mutate(statement);
    }
}
