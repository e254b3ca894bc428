use anyhow::{Context, Result};
use colored::*;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tsbarrels_core::{DirectoryReport, GenerationSummary, Issue, Outcome, Reporter, SkipReason};

use crate::cli_args::SummaryFormat;

/// Prints one line per finished directory. Progress goes to stderr so stdout
/// carries only the summary.
pub struct TerminalReporter<W: Write + Send = io::Stderr> {
    root: PathBuf,
    quiet: bool,
    sink: Mutex<W>,
}

impl TerminalReporter {
    pub fn new(root: &Path, quiet: bool) -> Self {
        Self::with_sink(root, quiet, io::stderr())
    }
}

impl<W: Write + Send> TerminalReporter<W> {
    pub fn with_sink(root: &Path, quiet: bool, sink: W) -> Self {
        Self {
            root: root.to_path_buf(),
            quiet,
            sink: Mutex::new(sink),
        }
    }

    #[cfg(test)]
    fn into_sink(self) -> W {
        match self.sink.into_inner() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> Reporter for TerminalReporter<W> {
    fn report_progress(&self, directory: &Path) {
        log::debug!("Processing {}", display_path(directory, &self.root));
    }

    fn report_result(&self, report: &DirectoryReport) {
        if self.quiet {
            return;
        }
        let barrel = display_path(&report.barrel, &self.root);
        let line = match &report.outcome {
            Outcome::Written => format!("{} {}", "written".green(), barrel),
            Outcome::Skipped(reason) => format!(
                "{} {} {}",
                "skipped".yellow(),
                barrel,
                skip_note(*reason).dimmed()
            ),
            Outcome::Empty => format!(
                "{} {} {}",
                "empty  ".dimmed(),
                display_path(&report.directory, &self.root),
                "(nothing to export)".dimmed()
            ),
            Outcome::Failed(_) => format!("{} {}", "failed ".red().bold(), barrel),
        };
        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(sink, "{}", line) {
            log::debug!("Cannot write progress line: {}", e);
        }
    }
}

fn skip_note(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::Exists => "(exists, use --force to overwrite)",
        SkipReason::UpToDate => "(up to date)",
    }
}

/// Path relative to the run's target, `.` for the target itself.
pub fn display_path(path: &Path, root: &Path) -> String {
    match pathdiff::diff_paths(path, root) {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => rel.display().to_string(),
        None => path.display().to_string(),
    }
}

pub fn print_summary(summary: &GenerationSummary, format: SummaryFormat) -> Result<()> {
    let content = match format {
        SummaryFormat::Text => render_summary_text(summary),
        SummaryFormat::Json => {
            let mut json = serde_json::to_string_pretty(summary)
                .context("Failed to serialize summary to JSON")?;
            json.push('\n');
            json
        }
    };
    write_to_stdout(&content)
}

pub fn render_summary_text(summary: &GenerationSummary) -> String {
    let root = &summary.root;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {} written, {} skipped, {} failed ({} errors, {} warnings)",
        "Summary:".bold(),
        summary.written().count().to_string().green(),
        summary.skipped().count().to_string().yellow(),
        summary.failed().count().to_string().red(),
        summary.error_count(),
        summary.warning_count()
    );

    for report in summary.failed() {
        if let Outcome::Failed(reason) = &report.outcome {
            let _ = writeln!(
                out,
                "  {} {}: {}",
                "failed".red(),
                display_path(&report.directory, root),
                reason
            );
        }
    }
    for issue in summary.issues() {
        let _ = writeln!(out, "  {}", render_issue(issue, root));
    }
    if summary.aborted {
        let _ = writeln!(
            out,
            "{}",
            "Stopped after the first failure (--fail-fast); some directories were not processed."
                .yellow()
        );
    }
    out
}

fn render_issue(issue: &Issue, root: &Path) -> String {
    let label = if issue.kind.is_error() {
        issue.kind.label().red()
    } else {
        issue.kind.label().yellow()
    };
    format!(
        "{} {}: {}",
        label,
        display_path(&issue.path, root),
        issue.message
    )
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
