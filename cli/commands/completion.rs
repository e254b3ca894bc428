use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

use crate::cli_args::Cli;

/// Writes the completion script for `shell` to stdout.
pub fn handle_completion_command(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    log::debug!("Generating {} completions for {}", shell, bin_name);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    generate(shell, &mut command, bin_name, &mut handle);
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
