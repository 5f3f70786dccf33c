// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `stackenv show` command.

use clap::{Args, ValueEnum};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use stackenv::{EnvEntry, ResolvedEnvironment, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Yaml,
    Json,
}

/// Display the resolved environment
#[derive(Debug, Args)]
pub struct CmdShow {
    #[clap(flatten)]
    pub selection: crate::SelectionFlags,

    /// Skip the pre build phase
    #[clap(long)]
    pub ignore_pre: bool,

    /// Skip the post build phase
    #[clap(long)]
    pub ignore_post: bool,

    /// Output format
    #[clap(long, value_enum, default_value_t = Format::Table)]
    pub format: Format,
}

impl CmdShow {
    pub fn run(&mut self) -> Result<i32> {
        let mut request = self.selection.request();
        request.ignore_pre = self.ignore_pre;
        request.ignore_post = self.ignore_post;
        let ctx = self.selection.context(request)?;

        let env = stackenv::build_environment(&ctx)?;

        match self.format {
            Format::Yaml => print!("{}", serde_yaml::to_string(&env).into_diagnostic()?),
            Format::Json => println!("{}", serde_json::to_string_pretty(&env).into_diagnostic()?),
            Format::Table => show_table(&env),
        }

        for warning in ctx.log.warnings() {
            eprintln!("{} {warning}", "warning:".yellow());
        }
        if let Some(failure) = ctx.log.last_failure() {
            eprintln!("{} {failure}", "error:".red().bold());
            return Ok(1);
        }
        Ok(0)
    }
}

fn show_table(env: &ResolvedEnvironment) {
    if env.is_empty() {
        println!("  {}", "(no packages)".dimmed());
    }
    for (tier, containers) in env.iter() {
        println!("{}", format!("{tier}:").bold());
        for container in containers {
            if let Some(package) = container.package() {
                let version = package
                    .version
                    .as_ref()
                    .map(|v| format!(" {v}"))
                    .unwrap_or_default();
                println!(
                    "  {}{} {}",
                    package.name.green(),
                    version.yellow(),
                    package.root_path.display().to_string().dimmed()
                );
            }
            let indent = if tier.is_phase() { "  " } else { "    " };
            for entry in container.entries() {
                match entry {
                    EnvEntry::Single { variable, value } => {
                        println!("{indent}{} = {}", variable.cyan(), value);
                    }
                    EnvEntry::Multi { variable, value } => {
                        println!("{indent}{} = {} + ${variable}", variable.cyan(), value);
                    }
                    EnvEntry::Script { value } => {
                        println!("{indent}{} {}", "source".magenta(), value);
                    }
                    EnvEntry::Command { value } => {
                        println!("{indent}{} {}", "run".magenta(), value);
                    }
                }
            }
        }
        println!();
    }

    let total: usize = Tier::PACKAGE_TIERS
        .into_iter()
        .map(|tier| env.package_count(tier))
        .sum();
    println!("Total: {total} package(s)");
    if let Some(app) = env.app() {
        let name = app.descriptor.application.as_deref().unwrap_or("app");
        match &app.executable {
            Some(exe) => println!("App: {} ({exe})", name.green()),
            None => println!("App: {} (no executable)", name.green()),
        }
    }
}
