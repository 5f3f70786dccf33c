// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `stackenv env` command.

use clap::Args;
use colored::Colorize;
use miette::Result;
use stackenv::{Palette, Request};

/// Resolve the environment and write its activation script
#[derive(Debug, Args)]
pub struct CmdEnv {
    #[clap(flatten)]
    pub selection: crate::SelectionFlags,

    /// Arguments passed to the application executable
    #[clap(long, allow_hyphen_values = true)]
    pub app_args: Option<String>,

    /// Skip the pre build phase
    #[clap(long)]
    pub ignore_pre: bool,

    /// Skip the post build phase
    #[clap(long)]
    pub ignore_post: bool,

    /// Do not source package scripts
    #[clap(long)]
    pub ignore_env_scripts: bool,

    /// Do not run package commands
    #[clap(long)]
    pub ignore_env_commands: bool,

    /// Set up the environment without launching the application
    #[clap(long)]
    pub ignore_app_exec: bool,

    /// Only print the environment summary, change nothing
    #[clap(long)]
    pub display_only: bool,

    /// Only change the environment, print no summary
    #[clap(long)]
    pub set_only: bool,

    /// Detail of the printed summary, 1 to 4
    #[clap(
        long = "detail",
        default_value_t = 2,
        value_parser = clap::value_parser!(u8).range(1..=4)
    )]
    pub detail: u8,

    /// Reuse the script written by the last run of this selection
    #[clap(long)]
    pub last: bool,

    /// Store the resolved environment beside the script
    #[clap(long)]
    pub cache_write: bool,

    /// Serialize the stored environment instead of resolving
    #[clap(long, conflicts_with = "cache_write")]
    pub cache_read: bool,

    /// Disable colours in the printed summary
    #[clap(long)]
    pub no_color: bool,
}

impl CmdEnv {
    pub fn request(&self) -> Request {
        Request {
            app_args: self.app_args.clone(),
            ignore_pre: self.ignore_pre,
            ignore_post: self.ignore_post,
            ignore_env_scripts: self.ignore_env_scripts,
            ignore_env_commands: self.ignore_env_commands,
            ignore_app_exec: self.ignore_app_exec,
            display_only: self.display_only,
            set_only: self.set_only,
            verbose: self.detail,
            last: self.last,
            cache_write: self.cache_write,
            cache_read: self.cache_read,
            ..self.selection.request()
        }
    }

    pub fn run(&mut self) -> Result<i32> {
        let mut ctx = self.selection.context(self.request())?;
        if self.no_color {
            ctx = ctx.with_palette(Palette::plain());
        }

        let outcome = stackenv::run(&ctx)?;

        if let Some(failure) = ctx.log.last_failure() {
            eprintln!("{} {failure}", "error:".red().bold());
            return Ok(1);
        }
        println!("{}", outcome.artifact_path.display());
        Ok(0)
    }
}
