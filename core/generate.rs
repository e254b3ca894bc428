//! Orchestrator: walks a scanned tree leaf-to-root, extracting exports and
//! writing one barrel per directory.

use crate::barrel::{self, Child, RenderSettings, SubBarrel, WriteOutcome};
use crate::config::{Config, GenerationOptions};
use crate::error::{AppError, Result};
use crate::extract::{self, ExportDescriptor};
use crate::report::{DirectoryReport, GenerationSummary, Issue, Outcome, Reporter, SkipReason};
use crate::scanner::{self, DirectoryNode, ScanRules, ScanTree, Subtree};
use log;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Runs barrel generation for one target with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Generator {
    config: Config,
    options: GenerationOptions,
    settings: RenderSettings,
}

/// Shared state of one run, borrowed by every worker.
struct RunState<'a> {
    reporter: &'a dyn Reporter,
    stop_on_failure: bool,
    failed: AtomicBool,
    aborted: AtomicBool,
    reports: Mutex<Vec<DirectoryReport>>,
}

impl RunState<'_> {
    /// True when a failure has been recorded and the run must not start
    /// anything new.
    fn should_stop(&self) -> bool {
        if self.stop_on_failure && self.failed.load(Ordering::SeqCst) {
            self.aborted.store(true, Ordering::SeqCst);
            return true;
        }
        false
    }

    fn record(&self, report: DirectoryReport) {
        if report.has_errors() {
            self.failed.store(true, Ordering::SeqCst);
        }
        self.reporter.report_result(&report);
        match self.reports.lock() {
            Ok(mut reports) => reports.push(report),
            Err(poisoned) => poisoned.into_inner().push(report),
        }
    }
}

impl Generator {
    pub fn new(config: Config, options: GenerationOptions) -> Self {
        let settings = RenderSettings::new(&config.output, &options);
        Self {
            config,
            options,
            settings,
        }
    }

    /// Generates the barrel of `target` (and of every directory below it in
    /// recursive mode).
    ///
    /// Fails only when the target itself cannot be scanned or the rules are
    /// invalid; every other problem is recorded in the summary.
    pub fn run(&self, target: &Path, reporter: &dyn Reporter) -> Result<GenerationSummary> {
        let start = Instant::now();
        let rules = ScanRules::new(target, &self.config, &self.options)?;
        let tree = scanner::snapshot_tree(target, &rules, self.options.recursive)?;
        log::debug!(
            "Snapshot of {} taken: {} directories",
            target.display(),
            tree.directory_count()
        );

        let state = RunState {
            reporter,
            stop_on_failure: self.options.stop_on_failure,
            failed: AtomicBool::new(false),
            aborted: AtomicBool::new(false),
            reports: Mutex::new(Vec::new()),
        };
        self.process_tree(&tree, &state);

        let directories = match state.reports.into_inner() {
            Ok(reports) => reports,
            Err(poisoned) => poisoned.into_inner(),
        };
        let summary = GenerationSummary {
            root: target.to_path_buf(),
            recursive: self.options.recursive,
            forced: self.options.force,
            directories,
            aborted: state.aborted.load(Ordering::SeqCst),
        };
        log::info!(
            "Processed {} directories in {:?}: {} written, {} skipped, {} failed",
            summary.directories.len(),
            start.elapsed(),
            summary.written().count(),
            summary.skipped().count(),
            summary.failed().count()
        );
        Ok(summary)
    }

    /// Post-order: sibling subtrees in parallel, then the directory itself.
    /// Returns what the parent should re-export, if anything.
    fn process_tree(&self, tree: &ScanTree, state: &RunState) -> Option<SubBarrel> {
        if state.should_stop() {
            log::debug!("Not starting {}", tree.node.path.display());
            return None;
        }

        let resolved: Vec<Option<SubBarrel>> = tree
            .children
            .par_iter()
            .map(|child| match child {
                Subtree::Scanned(subtree) => self.process_tree(subtree, state),
                Subtree::Unreadable { path, error } => {
                    self.record_unreadable(path, error, state);
                    None
                }
            })
            .collect();

        if state.should_stop() {
            log::debug!("Not starting {}", tree.node.path.display());
            return None;
        }

        let mut issues = Vec::new();
        let sub_barrels = if self.options.recursive {
            resolved.into_iter().flatten().collect()
        } else {
            self.existing_sub_barrels(&tree.node, &mut issues)
        };
        self.process_directory(&tree.node, sub_barrels, issues, state)
    }

    fn process_directory(
        &self,
        node: &DirectoryNode,
        sub_barrels: Vec<SubBarrel>,
        mut issues: Vec<Issue>,
        state: &RunState,
    ) -> Option<SubBarrel> {
        state.reporter.report_progress(&node.path);
        log::info!("Generating barrel for {}", node.path.display());
        issues.extend(node.entry_issues.iter().cloned());

        let extracted: Vec<Result<ExportDescriptor>> = node
            .modules
            .par_iter()
            .map(|module| extract::extract_file(module))
            .collect();

        let mut children = Vec::with_capacity(extracted.len() + sub_barrels.len());
        for (module, result) in node.modules.iter().zip(extracted) {
            match result {
                Ok(descriptor) => children.push(Child::Module(descriptor)),
                Err(e) => {
                    log::warn!("Skipping {}: {}", module.display(), e);
                    issues.push(Issue::from_error(&e, module));
                }
            }
        }
        children.extend(sub_barrels.into_iter().map(Child::Directory));

        let plan = barrel::compose(&children, &self.settings);
        issues.extend(plan.warnings.iter().cloned());

        let (outcome, exported) = if plan.is_empty() {
            log::debug!("Nothing to export from {}", node.path.display());
            (Outcome::Empty, None)
        } else {
            let content = plan.render(&self.settings);
            match barrel::write_barrel(&node.barrel_path, &content, self.options.force) {
                Ok(WriteOutcome::Written) => (Outcome::Written, Some(plan.as_sub_barrel(&node.path))),
                Ok(WriteOutcome::Skipped(SkipReason::UpToDate)) => (
                    Outcome::Skipped(SkipReason::UpToDate),
                    Some(plan.as_sub_barrel(&node.path)),
                ),
                Ok(WriteOutcome::Skipped(SkipReason::Exists)) => {
                    // The parent re-exports what is actually on disk.
                    let existing = read_sub_barrel(&node.path, &node.barrel_path)
                        .map_err(|e| {
                            log::warn!("Cannot read existing barrel: {}", e);
                            issues.push(Issue::from_error(&e, &node.barrel_path));
                        })
                        .ok();
                    (Outcome::Skipped(SkipReason::Exists), existing)
                }
                Err(e) => {
                    log::warn!("Failed to write {}: {}", node.barrel_path.display(), e);
                    issues.push(Issue::from_error(&e, &node.barrel_path));
                    (Outcome::Failed(e.to_string()), None)
                }
            }
        };

        state.record(DirectoryReport {
            directory: node.path.clone(),
            barrel: node.barrel_path.clone(),
            outcome,
            issues,
        });
        exported
    }

    fn record_unreadable(&self, path: &Path, error: &AppError, state: &RunState) {
        state.record(DirectoryReport {
            directory: path.to_path_buf(),
            barrel: path.join(&self.options.barrel_name),
            outcome: Outcome::Failed(error.to_string()),
            issues: vec![Issue::from_error(error, path)],
        });
    }

    /// Sub-directories that already carry a barrel, for non-recursive runs.
    fn existing_sub_barrels(&self, node: &DirectoryNode, issues: &mut Vec<Issue>) -> Vec<SubBarrel> {
        let candidates: Vec<(PathBuf, PathBuf)> = node
            .subdirectories
            .iter()
            .map(|dir| (dir.clone(), dir.join(&self.options.barrel_name)))
            .filter(|(_, barrel)| barrel.is_file())
            .collect();

        let results: Vec<Result<SubBarrel>> = candidates
            .par_iter()
            .map(|(dir, barrel)| read_sub_barrel(dir, barrel))
            .collect();

        let mut found = Vec::with_capacity(results.len());
        for ((_, barrel), result) in candidates.iter().zip(results) {
            match result {
                Ok(sub) => found.push(sub),
                Err(e) => {
                    log::warn!("Skipping sub-barrel {}: {}", barrel.display(), e);
                    issues.push(Issue::from_error(&e, barrel));
                }
            }
        }
        found
    }
}

fn read_sub_barrel(directory: &Path, barrel: &Path) -> Result<SubBarrel> {
    let descriptor = extract::extract_file(barrel)?;
    Ok(SubBarrel {
        directory: directory.to_path_buf(),
        opaque: descriptor.is_opaque(),
        symbols: descriptor.symbols,
    })
}
