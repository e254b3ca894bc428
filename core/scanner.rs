//! Module Scanner: lists the candidate modules and sub-directories of a
//! directory, applying gitignore, built-in and user glob rules.

use crate::config::{Config, GenerationOptions};
use crate::error::{AppError, Result};
use crate::report::{Issue, IssueKind};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use log;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Patterns excluded unless `enable_builtin_ignore = false`.
pub const BUILTIN_EXCLUDES: &[&str] = &[
    "*.d.ts",
    "*.d.mts",
    "*.d.cts",
    "*.test.*",
    "*.spec.*",
    "*.stories.*",
    "**/__tests__",
    "**/__mocks__",
    "**/node_modules",
];

/// Compiled filtering rules for one run. Glob patterns are matched against
/// paths relative to `root`.
#[derive(Debug, Clone)]
pub struct ScanRules {
    root: PathBuf,
    barrel_name: String,
    barrel_stem: String,
    extensions: Vec<String>,
    include_set: GlobSet,
    has_includes: bool,
    exclude_set: GlobSet,
    builtin_exclude_set: GlobSet,
    use_builtin_ignores: bool,
    use_gitignore: bool,
    include_hidden: bool,
}

impl ScanRules {
    pub fn new(root: &Path, config: &Config, options: &GenerationOptions) -> Result<Self> {
        log::trace!("Building glob sets for filtering...");
        let include_set = build_glob_set_from_vec(&config.scan.include)?;
        let exclude_set = build_glob_set_from_vec(&config.scan.exclude)?;
        let builtin: Vec<String> = BUILTIN_EXCLUDES.iter().map(|p| p.to_string()).collect();
        let builtin_exclude_set = build_glob_set_from_vec(&builtin)?;
        log::trace!("Glob sets built successfully.");

        Ok(Self {
            root: root.to_path_buf(),
            barrel_name: options.barrel_name.clone(),
            barrel_stem: options.barrel_stem().to_string(),
            extensions: config.scan.extensions.clone(),
            include_set,
            has_includes: !config.scan.include.is_empty(),
            exclude_set,
            builtin_exclude_set,
            use_builtin_ignores: config.general.enable_builtin_ignore,
            use_gitignore: config.general.use_gitignore,
            include_hidden: config.general.include_hidden,
        })
    }

    fn relative(&self, path: &Path) -> PathBuf {
        pathdiff::diff_paths(path, &self.root).unwrap_or_else(|| path.to_path_buf())
    }

    fn is_excluded(&self, relative_path: &Path, is_dir: bool) -> bool {
        if matches_set(&self.exclude_set, relative_path, is_dir) {
            log::trace!(
                "Path excluded by explicit exclude set: {}",
                relative_path.display()
            );
            return true;
        }
        if self.use_builtin_ignores && matches_set(&self.builtin_exclude_set, relative_path, is_dir)
        {
            log::trace!(
                "Path excluded by built-in ignores: {}",
                relative_path.display()
            );
            return true;
        }
        false
    }

    fn accepts_module(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if file_name == self.barrel_name {
            return false;
        }
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !self.extensions.iter().any(|e| e == extension) {
            return false;
        }
        // `index.tsx` next to an `index.ts` barrel resolves to the same specifier.
        if path.file_stem().and_then(|s| s.to_str()) == Some(self.barrel_stem.as_str()) {
            log::trace!("Skipping module shadowed by barrel: {}", path.display());
            return false;
        }
        let relative_path = self.relative(path);
        if self.is_excluded(&relative_path, false) {
            return false;
        }
        if self.has_includes && !self.include_set.is_match(&relative_path) {
            log::trace!(
                "Path not included by explicit include set: {}",
                relative_path.display()
            );
            return false;
        }
        true
    }

    fn accepts_directory(&self, path: &Path) -> bool {
        !self.is_excluded(&self.relative(path), true)
    }
}

/// One directory as seen at scan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    pub path: PathBuf,
    /// Candidate module files, sorted by file name.
    pub modules: Vec<PathBuf>,
    /// Sub-directories, sorted by name.
    pub subdirectories: Vec<PathBuf>,
    pub barrel_path: PathBuf,
    pub has_barrel: bool,
    /// Entries that could not be inspected during the listing.
    pub entry_issues: Vec<Issue>,
}

/// Snapshot of a directory and, in recursive mode, everything below it.
#[derive(Debug)]
pub struct ScanTree {
    pub node: DirectoryNode,
    pub children: Vec<Subtree>,
}

#[derive(Debug)]
pub enum Subtree {
    Scanned(ScanTree),
    Unreadable { path: PathBuf, error: AppError },
}

impl ScanTree {
    /// Number of directories in the snapshot, unreadable ones included.
    pub fn directory_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| match child {
                Subtree::Scanned(tree) => tree.directory_count(),
                Subtree::Unreadable { .. } => 1,
            })
            .sum::<usize>()
    }
}

/// Lists `dir` one level deep.
///
/// Fails with `NotFound` when `dir` is missing and `Permission` when it cannot
/// be listed. Unreadable entries inside it are recorded on the node instead.
pub fn scan_directory(dir: &Path, rules: &ScanRules) -> Result<DirectoryNode> {
    let metadata = fs::metadata(dir).map_err(|e| AppError::from_read(dir, e))?;
    if !metadata.is_dir() {
        return Err(AppError::InvalidArgument(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }
    // Surface an unreadable directory as a whole rather than as a walk entry error.
    fs::read_dir(dir).map_err(|e| AppError::from_read(dir, e))?;

    let mut builder = WalkBuilder::new(dir);
    builder.max_depth(Some(1));
    builder.follow_links(false);
    builder.hidden(!rules.include_hidden);
    builder.ignore(rules.use_gitignore);
    builder.git_ignore(rules.use_gitignore);
    builder.git_exclude(rules.use_gitignore);
    builder.git_global(rules.use_gitignore);
    builder.require_git(false);

    let mut modules = Vec::new();
    let mut subdirectories = Vec::new();
    let mut entry_issues = Vec::new();

    for entry_result in builder.build() {
        match entry_result {
            Ok(entry) => {
                if entry.depth() == 0 {
                    continue;
                }
                let path = entry.path();
                match entry.file_type() {
                    Some(ft) if ft.is_dir() => {
                        if rules.accepts_directory(path) {
                            log::trace!("Including directory: {}", path.display());
                            subdirectories.push(path.to_path_buf());
                        }
                    }
                    Some(ft) if ft.is_file() => {
                        if rules.accepts_module(path) {
                            log::trace!("Including module: {}", path.display());
                            modules.push(path.to_path_buf());
                        }
                    }
                    Some(ft) if ft.is_symlink() => {
                        log::debug!("Skipping symbolic link (links are not followed): {}", path.display())
                    }
                    _ => log::debug!("Skipping non-regular entry: {}", path.display()),
                }
            }
            Err(e) => {
                log::warn!("Error walking directory {}: {}", dir.display(), e);
                let path = walk_error_path(&e).unwrap_or(dir).to_path_buf();
                let kind = match walk_error_kind(&e) {
                    Some(io::ErrorKind::NotFound) => IssueKind::NotFound,
                    _ => IssueKind::Permission,
                };
                entry_issues.push(Issue::new(kind, path, e.to_string()));
            }
        }
    }

    modules.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    subdirectories.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let barrel_path = dir.join(&rules.barrel_name);
    let has_barrel = barrel_path.is_file();
    log::debug!(
        "Scanned {}: {} modules, {} sub-directories, barrel present: {}",
        dir.display(),
        modules.len(),
        subdirectories.len(),
        has_barrel
    );

    Ok(DirectoryNode {
        path: dir.to_path_buf(),
        modules,
        subdirectories,
        barrel_path,
        has_barrel,
        entry_issues,
    })
}

/// Captures the tree rooted at `root` before anything is written. Only the
/// root itself is scanned unless `recursive` is set. A missing or unreadable
/// root is an error; unreadable sub-directories become `Subtree::Unreadable`.
pub fn snapshot_tree(root: &Path, rules: &ScanRules, recursive: bool) -> Result<ScanTree> {
    let node = scan_directory(root, rules)?;
    let children = if recursive {
        node.subdirectories
            .iter()
            .map(|sub| match snapshot_tree(sub, rules, true) {
                Ok(tree) => Subtree::Scanned(tree),
                Err(error) => {
                    log::warn!("Cannot scan {}: {}", sub.display(), error);
                    Subtree::Unreadable {
                        path: sub.clone(),
                        error,
                    }
                }
            })
            .collect()
    } else {
        Vec::new()
    };
    Ok(ScanTree { node, children })
}

fn matches_set(set: &GlobSet, relative_path: &Path, is_dir: bool) -> bool {
    set.is_match(relative_path)
        || (is_dir && set.is_match(relative_path.join("dummy_file_for_dir_match")))
}

fn walk_error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err)
        }
        _ => None,
    }
}

fn walk_error_kind(err: &ignore::Error) -> Option<io::ErrorKind> {
    err.io_error().map(|e| e.kind())
}

fn build_glob_set_from_vec(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern_str in patterns {
        let mut processed_pattern = pattern_str.trim().to_string();
        if processed_pattern.ends_with('/') && processed_pattern.len() > 1 {
            processed_pattern.push_str("**");
        }
        match Glob::new(&processed_pattern) {
            Ok(glob) => {
                log::trace!(
                    "Adding glob pattern: {} (processed as {})",
                    pattern_str,
                    processed_pattern
                );
                builder.add(glob);
            }
            Err(e) => {
                log::error!("Invalid glob pattern \"{}\": {}", pattern_str, e);
                return Err(AppError::Glob(format!(
                    "Invalid glob pattern \"{}\" (processed as \"{}\"): {}",
                    pattern_str, processed_pattern, e
                )));
            }
        }
    }
    builder.build().map_err(|e| {
        log::error!("Error building glob set: {}", e);
        AppError::Glob(e.to_string())
    })
}
