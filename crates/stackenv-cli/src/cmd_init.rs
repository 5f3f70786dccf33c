// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `stackenv init` command.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use miette::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Template {
    Minimal,
    Standard,
}

/// Create a new stackenv.yaml file
#[derive(Debug, Args)]
pub struct CmdInit {
    /// Directory to create file in
    #[clap(default_value = ".")]
    pub path: PathBuf,

    /// Name of the master project
    #[clap(long, default_value = "main")]
    pub master_project: String,

    /// Root directory holding the project trees
    #[clap(long, default_value = "/studio")]
    pub root: String,

    /// Template to use
    #[clap(long, value_enum, default_value_t = Template::Standard)]
    pub template: Template,
}

impl CmdInit {
    pub fn run(&mut self) -> Result<i32> {
        let settings_path = self.path.join(stackenv::SETTINGS_FILENAME);

        if settings_path.exists() {
            return Err(miette::miette!(
                "stackenv.yaml already exists at {:?}",
                settings_path
            ));
        }

        let content = self.render();

        std::fs::write(&settings_path, content)
            .map_err(|e| miette::miette!("Failed to write stackenv.yaml: {}", e))?;

        println!("Created stackenv.yaml at {:?}", settings_path);
        println!();
        println!("Next steps:");
        println!("  1. Point the paths at your package trees");
        println!("  2. Run 'stackenv show' to preview the environment");
        println!("  3. Source the script printed by 'stackenv env'");

        Ok(0)
    }

    pub fn render(&self) -> String {
        match self.template {
            Template::Minimal => self.generate_minimal_template(),
            Template::Standard => self.generate_standard_template(),
        }
    }

    fn generate_minimal_template(&self) -> String {
        format!(
            "api: stackenv/v0\n\
            master_project: {master}\n\
            \n\
            paths:\n\
            \x20 master_project_internal: {root}/{{master_project}}/internal\n\
            \x20 master_project_external: {root}/{{master_project}}/external\n",
            master = self.master_project,
            root = self.root,
        )
    }

    fn generate_standard_template(&self) -> String {
        format!(
            "# stackenv settings\n\
            \n\
            api: stackenv/v0\n\
            \n\
            # Project every other project falls back to\n\
            master_project: {master}\n\
            \n\
            # Settings files merged before this one\n\
            # includes:\n\
            #   - ~/.config/stackenv/local.yaml\n\
            \n\
            # Tier roots and output locations. Available placeholders:\n\
            # {{project}} {{master_project}} {{developer}} {{development}}\n\
            # {{stage}} {{app}} {{platform}} {{fingerprint}}\n\
            paths:\n\
            \x20 reserved: {root}/reserved\n\
            \x20 development: {root}/{{project}}/dev/{{developer}}/{{development}}\n\
            \x20 stage: {root}/{{project}}/stage/{{stage}}\n\
            \x20 project_internal: {root}/{{project}}/internal\n\
            \x20 project_external: {root}/{{project}}/external\n\
            \x20 master_project_internal: {root}/{{master_project}}/internal\n\
            \x20 master_project_external: {root}/{{master_project}}/external\n\
            \x20 app_file: {root}/apps/{{app}}.yaml\n\
            \x20 # script_file: ~/.cache/stackenv/{{project}}/{{fingerprint}}.sh\n\
            \x20 # log_file: ~/.cache/stackenv/{{project}}.log\n\
            \n\
            # Folders added to a variable when they exist in a package.\n\
            # FOLDER_NAME and VERSION come from the active app file.\n\
            global_env:\n\
            \x20 PackageLinux:\n\
            \x20   PATH: [bin]\n\
            \x20   LD_LIBRARY_PATH: [lib]\n\
            \x20   PYTHONPATH: [python]\n\
            \x20 # MayaLinux:\n\
            \x20 #   MAYA_SCRIPT_PATH: [maya/FOLDER_NAME/scripts]\n\
            \n\
            # callbacks:\n\
            #   admission:\n\
            #     exclude: [\"*/deprecated/*\"]\n\
            #   pre_build:\n\
            #     - set: STACK_PROJECT\n\
            #       value: \"{{project}}\"\n\
            #   app_executable_flags:\n\
            #     maya: -noAutoloadPlugins\n\
            \n\
            # display:\n\
            #   enabled: true\n\
            #   package: green\n",
            master = self.master_project,
            root = self.root,
        )
    }
}
