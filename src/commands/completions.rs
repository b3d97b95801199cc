//! # Completions Command Implementation
//!
//! Prints a completion script for the whole `shared-resources` command tree,
//! including every subcommand and the global `--global-config`, `--color`
//! and `--log-level` flags.
//!
//! ```bash
//! shared-resources completions bash > ~/.local/share/bash-completion/completions/shared-resources
//! ```

use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` to `out`.
fn render(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut stdout = io::stdout().lock();
    render(args.shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}
