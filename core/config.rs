use crate::error::{AppError, Result};
use log;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = "ts-barrels.toml";
pub const DEFAULT_BARREL_NAME: &str = "index.ts";
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["ts", "tsx", "mts", "cts"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default = "default_barrel_name")]
    pub barrel_name: String,
    #[serde(default = "default_true")]
    pub use_gitignore: bool,
    #[serde(default = "default_true")]
    pub enable_builtin_ignore: bool,
    #[serde(default = "default_false")]
    pub include_hidden: bool,
    #[serde(default = "default_false")]
    pub stop_on_failure: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub style: ExportStyle,
    #[serde(default)]
    pub quote: QuoteStyle,
    #[serde(default = "default_true")]
    pub semicolons: bool,
    #[serde(default)]
    pub extension: SpecifierExtension,
    #[serde(default)]
    pub default_exports: DefaultExports,
    #[serde(default)]
    pub header: Option<String>,
}

/// How each child is re-exported when no collision forces explicit names.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportStyle {
    #[default]
    Star,
    Named,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    #[default]
    Single,
    Double,
}

/// Extension written into module specifiers.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpecifierExtension {
    #[default]
    None,
    Js,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefaultExports {
    #[default]
    Alias,
    Ignore,
}

fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_barrel_name() -> String {
    DEFAULT_BARREL_NAME.to_string()
}
fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            barrel_name: default_barrel_name(),
            use_gitignore: default_true(),
            enable_builtin_ignore: default_true(),
            include_hidden: default_false(),
            stop_on_failure: default_false(),
        }
    }
}
impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            style: ExportStyle::default(),
            quote: QuoteStyle::default(),
            semicolons: default_true(),
            extension: SpecifierExtension::default(),
            default_exports: DefaultExports::default(),
            header: None,
        }
    }
}

/// Per-invocation switches. Built once from config plus CLI flags and never
/// mutated during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub recursive: bool,
    pub force: bool,
    pub barrel_name: String,
    pub stop_on_failure: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            force: false,
            barrel_name: default_barrel_name(),
            stop_on_failure: false,
        }
    }
}

impl GenerationOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            recursive: false,
            force: false,
            barrel_name: config.general.barrel_name.clone(),
            stop_on_failure: config.general.stop_on_failure,
        }
    }

    /// The barrel file name without its extension (`index` for `index.ts`).
    pub fn barrel_stem(&self) -> &str {
        Path::new(&self.barrel_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.barrel_name)
    }
}

/// Checks a user-supplied barrel file name. A blank name falls back to
/// `index.ts`; anything with a path component or an unknown extension is
/// rejected.
pub fn validate_barrel_name(name: &str, extensions: &[String]) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Ok(default_barrel_name());
    }
    let path = Path::new(trimmed);
    if path.components().count() != 1 || trimmed.contains(['/', '\\']) {
        return Err(AppError::InvalidArgument(format!(
            "Barrel name must be a plain file name, got '{}'",
            trimmed
        )));
    }
    let mut accepted: Vec<&str> = extensions.iter().map(String::as_str).collect();
    for ext in DEFAULT_EXTENSIONS {
        if !accepted.contains(&ext) {
            accepted.push(ext);
        }
    }
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !accepted.contains(&extension) || path.file_stem().is_none_or(|s| s.is_empty()) {
        return Err(AppError::InvalidArgument(format!(
            "Barrel name '{}' must end with one of: {}",
            trimmed,
            accepted
                .iter()
                .map(|e| format!(".{}", e))
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }
    Ok(trimmed.to_string())
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve.canonicalize().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::NotFound {
                path: path_to_resolve.clone(),
            },
            _ => AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize path '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            )),
        })
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p_str) => {
                let mut path = PathBuf::from(shellexpand::tilde(p_str).as_ref());
                if !path.exists() && path.extension().is_none() {
                    path.set_extension("toml");
                }
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = project_root.join(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(content).map_err(|e| {
            AppError::TomlParse(format!("{}. Check TOML syntax and structure.", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.extensions.is_empty() {
            return Err(AppError::Config(
                "[scan].extensions must list at least one extension".to_string(),
            ));
        }
        if let Some(bad) = self
            .scan
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(AppError::Config(format!(
                "Invalid extension '{}' in [scan].extensions (write 'ts', not '.ts')",
                bad
            )));
        }
        validate_barrel_name(&self.general.barrel_name, &self.scan.extensions)?;
        Ok(())
    }
}
