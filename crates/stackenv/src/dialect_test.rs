// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

#[rstest]
#[case(Shell::Posix, "export FOO=\"bar\";")]
#[case(Shell::PowerShell, "$env:FOO=\"bar\";")]
fn test_single(#[case] shell: Shell, #[case] expected: &str) {
    assert_eq!(shell.single("FOO", "bar"), expected);
}

#[rstest]
#[case(Shell::Posix, "export PATH=\"/opt/bin${PATH:+:$PATH}\";")]
#[case(Shell::PowerShell, "$env:PATH=if($env:PATH){\"/opt/bin;$env:PATH\"}else{\"/opt/bin\"};")]
fn test_multi_keeps_existing(#[case] shell: Shell, #[case] expected: &str) {
    assert_eq!(shell.multi("PATH", "/opt/bin"), expected);
}

#[rstest]
#[case(Shell::Posix, ". \"/pkg/setup.sh\";")]
#[case(Shell::PowerShell, ". \"/pkg/setup.sh\";")]
fn test_script(#[case] shell: Shell, #[case] expected: &str) {
    assert_eq!(shell.script("/pkg/setup.sh"), expected);
}

#[rstest]
#[case("alias ll='ls -l'", "alias ll='ls -l';")]
#[case("umask 002;", "umask 002;")]
#[case("ulimit -n 4096  ", "ulimit -n 4096;")]
fn test_command_terminated_once(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(Shell::Posix.command(input), expected);
}

#[rstest]
fn test_posix_value_quoting() {
    assert_eq!(
        Shell::Posix.single("MSG", "say \"hi\" to $USER"),
        "export MSG=\"say \\\"hi\\\" to $USER\";"
    );
}

#[rstest]
fn test_powershell_value_quoting() {
    assert_eq!(
        Shell::PowerShell.single("MSG", "say \"hi\""),
        "$env:MSG=\"say `\"hi`\"\";"
    );
}

#[rstest]
fn test_launch() {
    assert_eq!(
        Shell::Posix.launch("/apps/maya/bin/maya", "-proj x", ""),
        "\"/apps/maya/bin/maya\" -proj x;"
    );
    assert_eq!(
        Shell::PowerShell.launch("C:/maya/maya.exe", "", "-batch"),
        "& \"C:/maya/maya.exe\" -batch;"
    );
}

#[rstest]
fn test_posix_display_line() {
    let line = Shell::Posix.display_line(&[("PATH", Some(Color::Yellow)), (": ", None), ("$HOME", None)]);
    assert_eq!(line, "printf \"%b\\n\" \"\\033[33mPATH\\033[0m: \\$HOME\";");
}

#[rstest]
fn test_powershell_display_line() {
    let line = Shell::PowerShell.display_line(&[("PATH", Some(Color::Yellow)), (": ", None)]);
    assert_eq!(
        line,
        "Write-Host \"PATH\" -NoNewline -ForegroundColor DarkYellow;Write-Host \": \" -NoNewline;Write-Host \"\";"
    );
}

#[rstest]
#[case(Shell::Posix)]
#[case(Shell::PowerShell)]
fn test_guard_wraps_and_invokes(#[case] shell: Shell) {
    let open = shell.guard_open("STACKENV_VERSION");
    assert!(open.contains("STACKENV_VERSION"));
    assert!(open.contains("return 1;"));
    assert!(open.contains(INIT_FUNCTION));
    assert!(shell.guard_close().ends_with(&format!("{INIT_FUNCTION}\n")));
}

#[rstest]
fn test_posix_guard_checks_marker() {
    let open = Shell::Posix.guard_open("STACKENV_VERSION");
    assert!(open.starts_with("_stackenv_initialize_env() {\n"));
    assert!(open.contains("    if [ -n \"${STACKENV_VERSION:-}\" ]; then\n"));
}

#[rstest]
#[case("posix", Shell::Posix)]
#[case("bash", Shell::Posix)]
#[case("pwsh", Shell::PowerShell)]
#[case("PowerShell", Shell::PowerShell)]
fn test_shell_parse(#[case] input: &str, #[case] expected: Shell) {
    assert_eq!(input.parse::<Shell>().unwrap(), expected);
}

#[rstest]
fn test_parse_color() {
    assert_eq!(parse_color("cyan").unwrap(), Color::Cyan);
    assert!(parse_color("not-a-colour").is_err());
}
