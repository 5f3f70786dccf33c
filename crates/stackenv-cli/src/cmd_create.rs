// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `stackenv create` command.

use clap::{Args, Subcommand};
use colored::Colorize;
use miette::Result;

/// Create a project, development, reserved or stage area
#[derive(Debug, Args)]
pub struct CmdCreate {
    #[clap(flatten)]
    pub selection: crate::SelectionFlags,

    #[clap(subcommand)]
    pub area: Area,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Area {
    /// Create the package roots of a new project
    Project {
        /// Name of the project to create
        name: String,
    },

    /// Create a development area for the selected project and developer
    Development {
        /// Name of the development area to create
        name: String,
    },

    /// Create the reserved area of the selected developer
    Reserved,

    /// Copy the selected development area into a new stage
    Stage {
        /// Name of the stage (defaults to the development area's name)
        #[clap(long, short = 'n')]
        name: Option<String>,
    },
}

impl CmdCreate {
    pub fn run(&mut self) -> Result<i32> {
        let settings = self.selection.settings()?;
        let request = self.selection.request();
        let project = request.project_or(settings.master_project()).to_string();

        match &self.area {
            Area::Project { name } => {
                let roots = stackenv::create_project(&settings, &request, name)?;
                println!("{}", "Project has been created:".green());
                for root in &roots {
                    println!("  {}", root.display());
                }
                hint(&format!("stackenv env --project {name}"));
            }
            Area::Development { name } => {
                let path = stackenv::create_development(&settings, &request, name)?;
                success("Development environment has been created", &path.display().to_string());
                hint(&format!("stackenv env --project {project} --development {name}"));
            }
            Area::Reserved => {
                let path = stackenv::create_reserved(&settings, &request)?;
                success("Reserved environment has been created", &path.display().to_string());
            }
            Area::Stage { name } => {
                let Some(development) = self.selection.development.as_deref() else {
                    return Err(miette::miette!(
                        "You must select a development area (--development) to create a stage"
                    ));
                };
                let name = name.as_deref().unwrap_or(development);
                let staged = stackenv::create_stage(&settings, &request, name, development)?;
                for package in &staged.packages {
                    println!("{} {package}", "Stage Package Created:".green());
                }
                success("Stage environment has been created", &staged.path.display().to_string());
                hint(&format!(
                    "stackenv env --project {project} --developer {} --stage {name}",
                    request.developer
                ));
            }
        }
        Ok(0)
    }
}

fn success(message: &str, path: &str) {
    println!("{} {path}", format!("{message}:").green());
}

fn hint(command: &str) {
    println!();
    println!("Initialize it with:");
    println!("  {command}");
}
