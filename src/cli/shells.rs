//! The `shells` command: startup-file metadata lookup

use anyhow::Result;

use super::output::Output;
use crate::shell::ShellKind;

pub fn run(output: &Output) -> Result<()> {
    let shells = [ShellKind::Zsh, ShellKind::Bash, ShellKind::Fish];

    if output.is_json() {
        let items: Vec<_> = shells
            .iter()
            .map(|shell| {
                serde_json::json!({
                    "shell": shell.as_str(),
                    "startup_files": shell.startup_files(),
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    for shell in shells {
        output.row(&[shell.as_str()]);
        for file in shell.startup_files() {
            output.row(&["", file.file_name, file.role.label(), file.read_when]);
        }
        output.blank();
    }

    Ok(())
}
