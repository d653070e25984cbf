// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pott completions <shell>` prints a completion script for the CLI.

use clap::Command;
use clap_complete::Shell;
use std::io::Write;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell: bash, zsh, fish, powershell or elvish
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `cmd`, named after the command itself
pub fn write_completions(cmd: &mut Command, shell: Shell, out: &mut dyn Write) {
    let bin_name = cmd.get_name().to_string();
    clap_complete::generate(shell, cmd, bin_name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_command() -> Command {
        Command::new("pott")
            .subcommand(Command::new("stat"))
            .subcommand(Command::new("compact"))
    }

    #[test]
    fn bash_script_lists_subcommands() {
        let mut out = Vec::new();
        write_completions(&mut sample_command(), Shell::Bash, &mut out);

        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("_pott()"));
        assert!(script.contains("stat"));
        assert!(script.contains("compact"));
    }

    #[test]
    fn fish_script_uses_command_name() {
        let mut out = Vec::new();
        write_completions(&mut sample_command(), Shell::Fish, &mut out);
        assert!(String::from_utf8(out).unwrap().contains("complete -c pott"));
    }
}
