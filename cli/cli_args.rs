use clap::{Args, Parser, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOpts {
    #[arg(
        long,
        help = "Specify path/filename of the TOML config file (default: <TARGET>/ts-barrels.toml).",
        value_name = "FILE",
        conflicts_with = "no_config",
        help_heading = "Configuration"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config",
        help_heading = "Configuration"
    )]
    pub no_config: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterOpts {
    #[arg(
        short = 'e',
        long = "exclude",
        value_name = "GLOB",
        help = "Exclude files/directories matching GLOB (relative to TARGET). Repeatable.",
        help_heading = "Filtering"
    )]
    pub exclude: Vec<String>,

    #[arg(
        long,
        help = "Do not honour .gitignore/.ignore files.",
        help_heading = "Filtering"
    )]
    pub no_gitignore: bool,

    #[arg(
        long,
        help = "Disable the built-in excludes (*.d.ts, *.test.*, *.spec.*, node_modules, ...).",
        help_heading = "Filtering"
    )]
    pub no_builtin_ignore: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputOpts {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value_t = SummaryFormat::Text,
        help = "Format of the run summary.",
        help_heading = "Output"
    )]
    pub format: SummaryFormat,

    #[arg(
        short = 'j',
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u16).range(1..),
        help = "Number of worker threads (default: one per CPU).",
        help_heading = "Output"
    )]
    pub jobs: Option<u16>,

    #[arg(long, help = "Disable colored output.", help_heading = "Output")]
    pub no_color: bool,
}

#[derive(Parser, Debug)]
#[command(
    name = "ts-barrels",
    author,
    version,
    about = "Generate TypeScript barrel (index.ts) files.",
    long_about = "ts-barrels scans a directory for TypeScript modules and writes a barrel file \nre-exporting them. With --all every sub-directory gets its own barrel, \ngenerated leaf-to-root so each parent re-exports its children's barrels.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  ts-barrels src/components\n  ts-barrels --all --force src\n  ts-barrels --name barrel.ts -f json ."
)]
pub struct Cli {
    #[arg(
        value_name = "TARGET",
        help = "Directory to generate the barrel for (default: $PROJECT_ROOT or the current directory). A file selects its parent directory. Symbolic links inside it are not followed."
    )]
    pub target: Option<PathBuf>,

    #[arg(
        long,
        help = "Generate barrels recursively, from the deepest directories up to TARGET.",
        help_heading = "Generation"
    )]
    pub all: bool,

    #[arg(
        long,
        help = "Overwrite existing barrel files.",
        help_heading = "Generation"
    )]
    pub force: bool,

    #[arg(
        short = 'n',
        long,
        value_name = "FILENAME",
        help = "Barrel file name (default: index.ts).",
        help_heading = "Generation"
    )]
    pub name: Option<String>,

    #[arg(
        long,
        help = "Stop starting new directories after the first failure.",
        help_heading = "Generation"
    )]
    pub fail_fast: bool,

    #[clap(flatten)]
    pub config_opts: ConfigOpts,

    #[clap(flatten)]
    pub filters: FilterOpts,

    #[clap(flatten)]
    pub output: OutputOpts,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase message verbosity (-v, -vv, -vvv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        conflicts_with = "verbose",
        help = "Silence progress output, warnings and logging."
    )]
    pub quiet: bool,

    #[arg(
        long,
        value_name = "SHELL",
        value_enum,
        help = "Print a shell completion script and exit."
    )]
    pub completions: Option<Shell>,
}
