pub mod barrel;
pub mod config;
pub mod error;
pub mod extract;
pub mod generate;
pub mod report;
pub mod scanner;

pub use barrel::{BarrelPlan, Child, RenderSettings, SubBarrel, WriteOutcome, compose, write_barrel};
pub use config::{
    Config, DefaultExports, ExportStyle, GenerationOptions, QuoteStyle, SpecifierExtension,
    validate_barrel_name,
};
pub use error::{AppError, Result};
pub use extract::{ExportDescriptor, SymbolKind, SymbolTable, extract_exports, extract_file};
pub use generate::Generator;
pub use report::{
    DirectoryReport, EXIT_FATAL, EXIT_PARTIAL_FAILURE, EXIT_SUCCESS, GenerationSummary, Issue,
    IssueKind, Outcome, Reporter, SilentReporter, SkipReason,
};
pub use scanner::{DirectoryNode, ScanRules, ScanTree, Subtree, scan_directory, snapshot_tree};
