mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use log;
use std::process;

use cli_args::Cli;
use tsbarrels_core::{AppError, EXIT_FATAL, EXIT_PARTIAL_FAILURE, EXIT_SUCCESS};

const EXIT_CONFIG: i32 = 3;
const EXIT_INVALID_ARGUMENT: i32 = 5;

fn main() {
    let cli_args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() {
                EXIT_INVALID_ARGUMENT
            } else {
                EXIT_SUCCESS
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    setup_logging(cli_args.quiet, cli_args.verbose);
    if cli_args.output.no_color {
        colored::control::set_override(false);
    }
    log::debug!("CLI args parsed: {:?}", cli_args);

    let quiet = cli_args.quiet;
    let exit_code = match run_app(cli_args) {
        Ok(code) => {
            log::info!("Application finished with code {}.", code);
            code
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);
            if !quiet || exit_code == EXIT_CONFIG || exit_code == EXIT_INVALID_ARGUMENT {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(AppError::Config(_)) | Some(AppError::TomlParse(_)) | Some(AppError::Glob(_)) => {
            EXIT_CONFIG
        }
        Some(AppError::InvalidArgument(_)) => EXIT_INVALID_ARGUMENT,
        Some(AppError::NotFound { .. })
        | Some(AppError::Permission { .. })
        | Some(AppError::FileRead { .. })
        | Some(AppError::Write { .. })
        | Some(AppError::Io(_))
        | Some(AppError::TreeSitter(_)) => EXIT_FATAL,
        Some(_) => EXIT_PARTIAL_FAILURE,
        None => EXIT_PARTIAL_FAILURE,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli) -> Result<i32> {
    if let Some(shell) = cli.completions {
        log::debug!("Printing completions for {}", shell);
        commands::completion::handle_completion_command(shell)?;
        return Ok(EXIT_SUCCESS);
    }

    if let Some(jobs) = cli.output.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(usize::from(jobs))
            .build_global()
            .context("Failed to configure the worker pool")?;
        log::debug!("Worker pool sized to {} threads", jobs);
    }

    commands::generate::handle_generate_command(&cli)
}
