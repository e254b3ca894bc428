use crate::cli_args::{Cli, SummaryFormat};
use crate::output::{self, TerminalReporter};
use anyhow::{Context, Result};
use log;
use std::path::{Path, PathBuf};
use tsbarrels_core::{Config, GenerationOptions, Generator, validate_barrel_name};

/// Runs generation for the parsed command line and returns the exit code
/// derived from the summary.
pub fn handle_generate_command(cli: &Cli) -> Result<i32> {
    let target = resolve_target(cli.target.as_ref())?;
    log::info!("Target directory: {}", target.display());

    let config = load_config_for_target(&target, cli).context("Failed to load configuration")?;
    let options = generation_options(&config, cli);
    log::debug!("Generation options: {:?}", options);

    let json = cli.output.format == SummaryFormat::Json;
    let reporter = TerminalReporter::new(&target, cli.quiet || json);
    let summary = Generator::new(config, options)
        .run(&target, &reporter)
        .with_context(|| format!("Failed to generate barrels for {}", target.display()))?;

    if json || !cli.quiet {
        output::print_summary(&summary, cli.output.format)?;
    }
    Ok(summary.exit_code())
}

/// Canonical target directory; a file argument selects its parent.
pub fn resolve_target(arg: Option<&PathBuf>) -> Result<PathBuf> {
    let path = Config::determine_project_root(arg).context("Failed to determine target directory")?;
    if path.is_file() {
        let parent = path
            .parent()
            .map(Path::to_path_buf)
            .with_context(|| format!("File '{}' has no parent directory", path.display()))?;
        log::debug!(
            "Target {} is a file; using {}",
            path.display(),
            parent.display()
        );
        return Ok(parent);
    }
    Ok(path)
}

pub fn load_config_for_target(target: &Path, cli: &Cli) -> Result<Config> {
    let config_path = Config::resolve_config_path(
        target,
        cli.config_opts.config.as_ref(),
        cli.config_opts.no_config,
    )
    .context("Failed to resolve configuration path")?;

    let config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    apply_cli_overrides(config, cli)
}

fn apply_cli_overrides(mut config: Config, cli: &Cli) -> Result<Config> {
    log::trace!("Applying CLI overrides to config...");
    if let Some(name) = &cli.name {
        config.general.barrel_name = validate_barrel_name(name, &config.scan.extensions)?;
    }
    if cli.fail_fast {
        config.general.stop_on_failure = true;
    }
    if cli.filters.no_gitignore {
        config.general.use_gitignore = false;
    }
    if cli.filters.no_builtin_ignore {
        config.general.enable_builtin_ignore = false;
    }
    config
        .scan
        .exclude
        .extend(cli.filters.exclude.iter().cloned());
    log::trace!("Config after CLI overrides: {:?}", config);
    Ok(config)
}

fn generation_options(config: &Config, cli: &Cli) -> GenerationOptions {
    GenerationOptions {
        recursive: cli.all,
        force: cli.force,
        ..GenerationOptions::from_config(config)
    }
}
