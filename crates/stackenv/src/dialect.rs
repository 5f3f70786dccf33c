// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Shell specific rendering of single statements.
//!
//! Everything about ordering and gating lives in [`crate::script`]; this
//! module only knows how one statement looks in a given shell.

use std::fmt;
use std::str::FromStr;

use colored::Color;
use serde::{Deserialize, Serialize};

use crate::request::Platform;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./dialect_test.rs"]
mod dialect_test;

/// Name of the function wrapping every generated script.
pub const INIT_FUNCTION: &str = "_stackenv_initialize_env";

const ALREADY_INITIALIZED: &str = "stackenv environment has already been initialized on this shell, \
     please start a new shell or exit first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    /// bash, zsh and other POSIX shells
    Posix,
    PowerShell,
}

impl Shell {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Windows => Shell::PowerShell,
            Platform::Linux | Platform::Darwin => Shell::Posix,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Shell::Posix => "posix",
            Shell::PowerShell => "powershell",
        }
    }

    /// File extension of a script for this shell.
    pub fn extension(self) -> &'static str {
        match self {
            Shell::Posix => "sh",
            Shell::PowerShell => "ps1",
        }
    }

    /// Opening of the initialization function, including the guard that
    /// refuses to run twice in one shell.
    pub fn guard_open(self, marker: &str) -> String {
        match self {
            Shell::Posix => format!(
                "{INIT_FUNCTION}() {{\n    \
                 if [ -n \"${{{marker}:-}}\" ]; then\n        \
                 printf \"%b\\n\" \"{ALREADY_INITIALIZED}\";\n        \
                 return 1;\n    \
                 fi\n\n"
            ),
            Shell::PowerShell => format!(
                "function script:{INIT_FUNCTION}()\n{{\n    \
                 if($env:{marker})\n    {{\n        \
                 Write-Host \"{ALREADY_INITIALIZED}\";\n        \
                 return 1;\n    }}\n\n"
            ),
        }
    }

    /// Close the initialization function and call it.
    pub fn guard_close(self) -> String {
        format!("\n}}\n{INIT_FUNCTION}\n")
    }

    /// Overwrite `variable`.
    pub fn single(self, variable: &str, value: &str) -> String {
        match self {
            Shell::Posix => format!("export {variable}=\"{}\";", posix_quote(value, true)),
            Shell::PowerShell => format!("$env:{variable}=\"{}\";", pwsh_quote(value, true)),
        }
    }

    /// Prepend to `variable`, keeping the existing value.
    pub fn multi(self, variable: &str, value: &str) -> String {
        match self {
            Shell::Posix => format!(
                "export {variable}=\"{}${{{variable}:+:${variable}}}\";",
                posix_quote(value, true)
            ),
            Shell::PowerShell => {
                let value = pwsh_quote(value, true);
                format!(
                    "$env:{variable}=if($env:{variable}){{\"{value};$env:{variable}\"}}else{{\"{value}\"}};"
                )
            }
        }
    }

    pub fn script(self, path: &str) -> String {
        match self {
            Shell::Posix => format!(". \"{}\";", posix_quote(path, true)),
            Shell::PowerShell => format!(". \"{}\";", pwsh_quote(path, true)),
        }
    }

    /// A literal statement, terminated if it isn't already.
    pub fn command(self, command: &str) -> String {
        let command = command.trim_end();
        if command.ends_with(';') {
            command.to_string()
        } else {
            format!("{command};")
        }
    }

    /// Launch an application executable.
    pub fn launch(self, executable: &str, flags: &str, args: &str) -> String {
        let mut statement = match self {
            Shell::Posix => format!("\"{}\"", posix_quote(executable, false)),
            Shell::PowerShell => format!("& \"{}\"", pwsh_quote(executable, false)),
        };
        for part in [flags.trim(), args.trim()] {
            if !part.is_empty() {
                statement.push(' ');
                statement.push_str(part);
            }
        }
        statement.push(';');
        statement
    }

    /// One line of display output made of coloured segments.
    pub fn display_line(self, segments: &[(&str, Option<Color>)]) -> String {
        match self {
            Shell::Posix => {
                let mut text = String::new();
                for (segment, color) in segments {
                    let segment = posix_display_escape(segment);
                    match color {
                        Some(color) => {
                            text.push_str(&format!("\\033[{}m{segment}\\033[0m", color.to_fg_str()))
                        }
                        None => text.push_str(&segment),
                    }
                }
                format!("printf \"%b\\n\" \"{text}\";")
            }
            Shell::PowerShell => {
                let mut line = String::new();
                for (segment, color) in segments {
                    line.push_str(&format!("Write-Host \"{}\" -NoNewline", pwsh_quote(segment, false)));
                    if let Some(color) = color {
                        line.push_str(" -ForegroundColor ");
                        line.push_str(console_color(*color));
                    }
                    line.push(';');
                }
                line.push_str("Write-Host \"\";");
                line
            }
        }
    }

    pub fn blank_line(self) -> String {
        match self {
            Shell::Posix => "echo \"\";".to_string(),
            Shell::PowerShell => "Write-Host \"\";".to_string(),
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shell {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "posix" | "sh" | "bash" | "zsh" => Ok(Shell::Posix),
            "powershell" | "pwsh" | "ps1" => Ok(Shell::PowerShell),
            other => Err(Error::ValidationFailed(format!("unknown shell '{other}'"))),
        }
    }
}

/// Escape for a POSIX double quoted string. `$` stays live when `expand`
/// is set so values can reference other variables.
fn posix_quote(value: &str, expand: bool) -> String {
    let mut quoted = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' | '`' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '$' if !expand => quoted.push_str("\\$"),
            _ => quoted.push(c),
        }
    }
    quoted
}

/// Display text goes through `printf %b`, so backslashes are doubled once
/// more on top of the shell quoting.
fn posix_display_escape(value: &str) -> String {
    posix_quote(&value.replace('\\', "\\\\"), false)
}

fn pwsh_quote(value: &str, expand: bool) -> String {
    let mut quoted = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '`' => {
                quoted.push('`');
                quoted.push(c);
            }
            '$' if !expand => quoted.push_str("`$"),
            _ => quoted.push(c),
        }
    }
    quoted
}

/// Closest PowerShell console colour for an ANSI colour.
fn console_color(color: Color) -> &'static str {
    match color {
        Color::Black => "Black",
        Color::Red => "DarkRed",
        Color::Green => "DarkGreen",
        Color::Yellow => "DarkYellow",
        Color::Blue => "DarkBlue",
        Color::Magenta => "DarkMagenta",
        Color::Cyan => "DarkCyan",
        Color::White => "Gray",
        Color::BrightBlack => "DarkGray",
        Color::BrightRed => "Red",
        Color::BrightGreen => "Green",
        Color::BrightYellow => "Yellow",
        Color::BrightBlue => "Blue",
        Color::BrightMagenta => "Magenta",
        Color::BrightCyan => "Cyan",
        Color::BrightWhite | Color::TrueColor { .. } => "White",
    }
}

/// Colours of the display channel. `None` everywhere when colours are
/// disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Section titles.
    pub header: Option<Color>,
    /// Labels of the app, info and product rows.
    pub title: Option<Color>,
    pub package: Option<Color>,
    pub value: Option<Color>,
    pub variable: Option<Color>,
    pub script: Option<Color>,
    pub command: Option<Color>,
    pub separator: Option<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            header: Some(Color::Cyan),
            title: Some(Color::BrightWhite),
            package: Some(Color::Green),
            value: Some(Color::White),
            variable: Some(Color::Yellow),
            script: Some(Color::Magenta),
            command: Some(Color::Magenta),
            separator: Some(Color::Cyan),
        }
    }
}

impl Palette {
    pub fn plain() -> Self {
        Self {
            header: None,
            title: None,
            package: None,
            value: None,
            variable: None,
            script: None,
            command: None,
            separator: None,
        }
    }
}

/// Parse a colour name the way `colored` spells them.
pub fn parse_color(name: &str) -> Result<Color> {
    Color::from_str(name)
        .map_err(|_| Error::ValidationFailed(format!("unknown display colour '{name}'")))
}
