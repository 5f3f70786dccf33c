// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! stackenv - Layered Package Environment Resolver CLI

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;
use stackenv::{Context, Platform, Request, Settings, SettingsDiscovery, Shell};

mod cmd_check;
mod cmd_create;
mod cmd_env;
mod cmd_init;
mod cmd_show;

use cmd_check::CmdCheck;
use cmd_create::CmdCreate;
use cmd_env::CmdEnv;
use cmd_init::CmdInit;
use cmd_show::CmdShow;


#[derive(Parser)]
#[clap(
    name = "stackenv",
    about = "Layered Package Environment Resolver",
    version,
    long_about = "Resolve layered package sources into a shell activation script"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

impl Logging {
    fn level(&self) -> tracing::Level {
        match (self.quiet, self.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        }
    }
}

/// Flags that pick the environment to resolve.
#[derive(Parser, Clone, Debug, Default)]
pub struct SelectionFlags {
    /// Settings file to use instead of searching for stackenv.yaml
    #[clap(long)]
    pub settings: Option<PathBuf>,

    /// Project to resolve (defaults to the master project)
    #[clap(long, short = 'p', env = "STACKENV_PROJECT")]
    pub project: Option<String>,

    /// Developer whose development area is used (defaults to the current user)
    #[clap(long, env = "STACKENV_DEVELOPER")]
    pub developer: Option<String>,

    /// Development area to layer on top of the project
    #[clap(long, short = 'd', env = "STACKENV_DEVELOPMENT")]
    pub development: Option<String>,

    /// Stage to layer on top of the project, ignored with --development
    #[clap(long, short = 's', env = "STACKENV_STAGE")]
    pub stage: Option<String>,

    /// Application descriptor to load
    #[clap(long, short = 'a', env = "STACKENV_APP")]
    pub app: Option<String>,

    /// Target platform: linux, darwin, windows
    #[clap(long, env = "STACKENV_PLATFORM")]
    pub platform: Option<Platform>,

    /// Target shell: posix, powershell
    #[clap(long, env = "STACKENV_SHELL")]
    pub shell: Option<Shell>,

    /// Stop at the first package failure
    #[clap(long, env = "STACKENV_RAISE_EXCEPTIONS")]
    pub raise_exceptions: bool,
}

impl SelectionFlags {
    pub fn request(&self) -> Request {
        let mut request = Request {
            project: self.project.clone(),
            development: self.development.clone(),
            stage: self.stage.clone(),
            app: self.app.clone(),
            raise_exceptions: self.raise_exceptions,
            ..Default::default()
        };
        if let Some(developer) = &self.developer {
            request.developer = developer.clone();
        }
        if let Some(platform) = self.platform {
            request.platform = platform;
            request.shell = Shell::for_platform(platform);
        }
        if let Some(shell) = self.shell {
            request.shell = shell;
        }
        request
    }

    pub fn settings(&self) -> Result<Settings> {
        let discovery = SettingsDiscovery::from_env(self.settings.clone());
        Ok(stackenv::discover_settings(&discovery)?)
    }

    /// Load the settings and build the run context for `request`.
    pub fn context(&self, request: Request) -> Result<Context> {
        let settings = self.settings()?;
        Ok(Context::from_settings(&settings, request)?)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Create a new stackenv.yaml file
    Init(CmdInit),

    /// Create a project, development, reserved or stage area
    Create(CmdCreate),

    /// Resolve the environment and write its activation script
    Env(CmdEnv),

    /// Display the resolved environment
    Show(CmdShow),

    /// Verify an environment's cache record against the package files
    Check(CmdCheck),
}

impl Opt {
    fn run(self) -> Result<i32> {
        tracing_subscriber::fmt()
            .with_max_level(self.logging.level())
            .with_writer(std::io::stderr)
            .init();

        match self.cmd {
            Command::Init(mut cmd) => cmd.run(),
            Command::Create(mut cmd) => cmd.run(),
            Command::Env(mut cmd) => cmd.run(),
            Command::Show(mut cmd) => cmd.run(),
            Command::Check(mut cmd) => cmd.run(),
        }
    }
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run()?;
    std::process::exit(code);
}
