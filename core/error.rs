use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("TOML Parsing Error: {0}")]
    TomlParse(String),

    #[error("Filesystem Error: {0}")]
    Io(#[from] io::Error),

    #[error("Not Found: Path '{}' does not exist", .path.display())]
    NotFound { path: PathBuf },

    #[error("Permission Denied: Path '{}', Error: {}", .path.display(), .source)]
    Permission {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File Read Error: Path '{}', Error: {}", .path.display(), .source)]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Parse Error: Path '{}' line {}, column {}: {}", .path.display(), .line, .column, .message)]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("File Write Error: Path '{}', Error: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Glob Pattern Error: {0}")]
    Glob(String),

    #[error("Tree-sitter Error: {0}")]
    TreeSitter(String),

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),
}

impl AppError {
    /// Classifies an I/O failure on `path` into the not-found / permission /
    /// generic read buckets used for per-item reporting.
    pub fn from_read(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => AppError::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => AppError::Permission {
                path: path.to_path_buf(),
                source,
            },
            _ => AppError::FileRead {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

impl From<globset::Error> for AppError {
    fn from(err: globset::Error) -> Self {
        AppError::Glob(format!("Globset error: {}", err))
    }
}

impl From<tree_sitter::LanguageError> for AppError {
    fn from(err: tree_sitter::LanguageError) -> Self {
        AppError::TreeSitter(err.to_string())
    }
}
