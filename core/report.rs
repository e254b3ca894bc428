//! Per-directory results, the run summary and the progress capability a host
//! implements to observe a run.

use crate::error::AppError;
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL_FAILURE: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub enum IssueKind {
    NotFound,
    Permission,
    Parse,
    Write,
    Collision,
}

impl IssueKind {
    pub fn is_error(self) -> bool {
        !matches!(self, IssueKind::Collision)
    }

    pub fn label(self) -> &'static str {
        match self {
            IssueKind::NotFound => "not found",
            IssueKind::Permission => "permission denied",
            IssueKind::Parse => "parse error",
            IssueKind::Write => "write error",
            IssueKind::Collision => "collision",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub struct Issue {
    pub kind: IssueKind,
    pub path: PathBuf,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn collision(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(IssueKind::Collision, path, message)
    }

    /// Converts a per-item error into an issue. Errors outside the per-item
    /// taxonomy are reported as read failures of `fallback_path`.
    pub fn from_error(err: &AppError, fallback_path: &Path) -> Self {
        match err {
            AppError::NotFound { path } => Self::new(IssueKind::NotFound, path, err.to_string()),
            AppError::Permission { path, .. } => {
                Self::new(IssueKind::Permission, path, err.to_string())
            }
            AppError::Parse { path, .. } => Self::new(IssueKind::Parse, path, err.to_string()),
            AppError::Write { path, .. } => Self::new(IssueKind::Write, path, err.to_string()),
            AppError::FileRead { path, .. } => {
                Self::new(IssueKind::Permission, path, err.to_string())
            }
            _ => Self::new(IssueKind::Permission, fallback_path, err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub enum SkipReason {
    /// A barrel exists and differs from the computed content.
    Exists,
    /// A barrel exists with exactly the computed content.
    UpToDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(
    feature = "serde_support",
    serde(rename_all = "camelCase", tag = "status", content = "detail")
)]
pub enum Outcome {
    Written,
    Skipped(SkipReason),
    /// Nothing to export; no barrel was written.
    Empty,
    Failed(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Written => "written",
            Outcome::Skipped(_) => "skipped",
            Outcome::Empty => "empty",
            Outcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub struct DirectoryReport {
    pub directory: PathBuf,
    pub barrel: PathBuf,
    pub outcome: Outcome,
    pub issues: Vec<Issue>,
}

impl DirectoryReport {
    pub fn has_errors(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_)) || self.issues.iter().any(|i| i.kind.is_error())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub struct GenerationSummary {
    pub root: PathBuf,
    pub recursive: bool,
    pub forced: bool,
    /// Reports in processing order: children always precede their parent.
    pub directories: Vec<DirectoryReport>,
    /// Set when `stop_on_failure` cut the run short.
    pub aborted: bool,
}

impl GenerationSummary {
    pub fn written(&self) -> impl Iterator<Item = &DirectoryReport> {
        self.with_outcome(|o| matches!(o, Outcome::Written))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &DirectoryReport> {
        self.with_outcome(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> impl Iterator<Item = &DirectoryReport> {
        self.with_outcome(|o| matches!(o, Outcome::Failed(_)))
    }

    fn with_outcome<F>(&self, pred: F) -> impl Iterator<Item = &DirectoryReport>
    where
        F: Fn(&Outcome) -> bool,
    {
        self.directories.iter().filter(move |r| pred(&r.outcome))
    }

    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.directories.iter().flat_map(|r| r.issues.iter())
    }

    pub fn error_count(&self) -> usize {
        self.issues().filter(|i| i.kind.is_error()).count()
            + self
                .failed()
                .filter(|r| r.issues.iter().all(|i| !i.kind.is_error()))
                .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues().filter(|i| !i.kind.is_error()).count()
    }

    pub fn is_success(&self) -> bool {
        !self.aborted && !self.directories.iter().any(DirectoryReport::has_errors)
    }

    /// A failed root barrel is fatal; any other failure is partial.
    pub fn exit_code(&self) -> i32 {
        let root_failed = self
            .directories
            .iter()
            .any(|r| r.directory == self.root && matches!(r.outcome, Outcome::Failed(_)));
        if root_failed {
            EXIT_FATAL
        } else if self.is_success() {
            EXIT_SUCCESS
        } else {
            EXIT_PARTIAL_FAILURE
        }
    }

    pub fn report_for(&self, directory: &Path) -> Option<&DirectoryReport> {
        self.directories.iter().find(|r| r.directory == directory)
    }
}

/// Capability through which a host observes a run. The orchestrator calls it
/// from worker threads, hence `Sync`.
pub trait Reporter: Sync {
    /// A directory is about to be processed.
    fn report_progress(&self, _directory: &Path) {}

    /// A directory finished; called in completion order.
    fn report_result(&self, _report: &DirectoryReport) {}
}

/// Reporter that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {}
