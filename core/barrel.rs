//! Barrel Writer: turns the children of a directory into re-export
//! statements and writes the barrel file atomically.

use crate::config::{
    DefaultExports, ExportStyle, GenerationOptions, OutputConfig, QuoteStyle, SpecifierExtension,
};
use crate::error::{AppError, Result};
use crate::extract::{ExportDescriptor, SymbolKind, SymbolTable};
use crate::report::{Issue, SkipReason};
use log;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Exports of an already-resolved sub-directory barrel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubBarrel {
    pub directory: PathBuf,
    pub symbols: SymbolTable,
    /// The barrel forwards `export *` sources whose names are unknown.
    pub opaque: bool,
}

/// One child of the directory being processed, in scan order.
#[derive(Debug, Clone)]
pub enum Child {
    Module(ExportDescriptor),
    Directory(SubBarrel),
}

impl Child {
    fn path(&self) -> &Path {
        match self {
            Child::Module(d) => &d.module,
            Child::Directory(b) => &b.directory,
        }
    }
}

/// Formatting choices for one run.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub style: ExportStyle,
    pub quote: QuoteStyle,
    pub semicolons: bool,
    pub extension: SpecifierExtension,
    pub default_exports: DefaultExports,
    pub header: Option<String>,
    pub barrel_name: String,
    pub barrel_stem: String,
}

impl RenderSettings {
    pub fn new(output: &OutputConfig, options: &GenerationOptions) -> Self {
        Self {
            style: output.style,
            quote: output.quote,
            semicolons: output.semicolons,
            extension: output.extension,
            default_exports: output.default_exports,
            header: output.header.clone().filter(|h| !h.trim().is_empty()),
            barrel_name: options.barrel_name.clone(),
            barrel_stem: options.barrel_stem().to_string(),
        }
    }

    fn quote(&self, specifier: &str) -> String {
        match self.quote {
            QuoteStyle::Single => format!("'{}'", specifier),
            QuoteStyle::Double => format!("\"{}\"", specifier),
        }
    }

    fn terminator(&self) -> &'static str {
        if self.semicolons { ";" } else { "" }
    }

    pub fn module_specifier(&self, module: &Path) -> String {
        let stem = module
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.extension {
            SpecifierExtension::None => format!("./{}", stem),
            SpecifierExtension::Js => format!("./{}{}", stem, emitted_extension(module)),
        }
    }

    /// Specifier of a sub-directory's barrel. `shadowed` is set when a
    /// sibling module has the directory's name, since `./name` would resolve
    /// to that module.
    pub fn directory_specifier(&self, directory: &Path, shadowed: bool) -> String {
        let name = directory
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.extension {
            SpecifierExtension::None if self.barrel_stem == "index" && !shadowed => {
                format!("./{}", name)
            }
            SpecifierExtension::None => format!("./{}/{}", name, self.barrel_stem),
            SpecifierExtension::Js => format!(
                "./{}/{}{}",
                name,
                self.barrel_stem,
                emitted_extension(Path::new(&self.barrel_name))
            ),
        }
    }
}

/// JavaScript extension a TypeScript module compiles to.
fn emitted_extension(module: &Path) -> &'static str {
    match module.extension().and_then(|e| e.to_str()) {
        Some("mts") | Some("mjs") => ".mjs",
        Some("cts") | Some("cjs") => ".cjs",
        _ => ".js",
    }
}

/// Extensions tried before a directory when resolving `./name`.
const SHADOWING_EXTENSIONS: &[&str] = &["ts", "tsx", "d.ts", "js", "jsx"];

/// True when a file next to `directory` wins resolution of `./<name>`,
/// whether or not that file is part of the barrel.
fn has_shadowing_file(directory: &Path) -> bool {
    let (Some(parent), Some(name)) = (directory.parent(), directory.file_name()) else {
        return false;
    };
    let name = name.to_string_lossy();
    SHADOWING_EXTENSIONS
        .iter()
        .any(|ext| parent.join(format!("{}.{}", name, ext)).is_file())
}

/// Identifier for a default export without a declared name, derived from the
/// file stem: `my-util` becomes `myUtil`, `Button` stays `Button`.
pub fn default_alias_for(module: &Path) -> String {
    let stem = module
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut ident = String::with_capacity(stem.len());
    let mut upper_next = false;
    for c in stem.chars() {
        if c.is_alphanumeric() || c == '_' || c == '$' {
            if upper_next && !ident.is_empty() {
                ident.extend(c.to_uppercase());
            } else {
                ident.push(c);
            }
            upper_next = false;
        } else {
            upper_next = true;
        }
    }
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Name under which a module's default export is re-exported.
struct DefaultAlias {
    name: String,
    /// Taken from the declaration rather than derived from the file stem.
    declared: bool,
}

impl DefaultAlias {
    fn for_descriptor(d: &ExportDescriptor) -> Self {
        match &d.default_name {
            Some(name) => Self {
                name: name.clone(),
                declared: true,
            },
            None => Self {
                name: default_alias_for(&d.module),
                declared: false,
            },
        }
    }
}

/// Statements for one barrel plus what the barrel exports as a whole.
#[derive(Debug, Clone, Default)]
pub struct BarrelPlan {
    pub statements: Vec<String>,
    pub exports: SymbolTable,
    pub opaque: bool,
    pub warnings: Vec<Issue>,
}

impl BarrelPlan {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn render(&self, settings: &RenderSettings) -> String {
        let mut out = String::new();
        if let Some(header) = &settings.header {
            for line in header.lines() {
                out.push_str(line.trim_end());
                out.push('\n');
            }
            out.push('\n');
        }
        for statement in &self.statements {
            out.push_str(statement);
            out.push('\n');
        }
        out
    }

    pub fn as_sub_barrel(&self, directory: &Path) -> SubBarrel {
        SubBarrel {
            directory: directory.to_path_buf(),
            symbols: self.exports.clone(),
            opaque: self.opaque,
        }
    }
}

/// Builds the re-export statements for `children`, in order.
///
/// Names are claimed first-come in scan order. A child that would re-export
/// an already claimed name is emitted as an explicit clause without it, and a
/// collision warning is recorded for every dropped name.
pub fn compose(children: &[Child], settings: &RenderSettings) -> BarrelPlan {
    let mut plan = BarrelPlan::default();
    let mut owners: HashMap<String, PathBuf> = HashMap::new();
    let semi = settings.terminator();
    let module_stems: HashSet<String> = children
        .iter()
        .filter_map(|child| match child {
            Child::Module(d) => d.module.file_stem().map(|s| s.to_string_lossy().into_owned()),
            Child::Directory(_) => None,
        })
        .collect();

    for child in children {
        let path = child.path();
        let (specifier, symbols, default_alias, opaque) = match child {
            Child::Module(d) => {
                let alias = (d.has_default && settings.default_exports == DefaultExports::Alias)
                    .then(|| DefaultAlias::for_descriptor(d));
                (
                    settings.module_specifier(&d.module),
                    &d.symbols,
                    alias,
                    d.is_opaque(),
                )
            }
            Child::Directory(b) => {
                let shadowed = b
                    .directory
                    .file_name()
                    .is_some_and(|n| module_stems.contains(n.to_string_lossy().as_ref()))
                    || has_shadowing_file(&b.directory);
                (
                    settings.directory_specifier(&b.directory, shadowed),
                    &b.symbols,
                    None,
                    b.opaque,
                )
            }
        };

        if symbols.is_empty() && default_alias.is_none() && !opaque {
            log::debug!("Nothing to re-export from {}", path.display());
            continue;
        }

        let mut kept = SymbolTable::new();
        let mut dropped = 0usize;
        for (name, kind) in symbols.iter() {
            match owners.get(name) {
                Some(owner) => {
                    dropped += 1;
                    log::warn!(
                        "Export `{}` of {} collides with {}; keeping the first",
                        name,
                        path.display(),
                        owner.display()
                    );
                    plan.warnings.push(Issue::collision(
                        path,
                        format!(
                            "`{}` is already exported from {}; skipped",
                            name,
                            owner.display()
                        ),
                    ));
                }
                None => kept.insert(name, kind),
            }
        }
        // `export *` never forwards `default`, so a skipped alias does not
        // force the explicit form.
        let default_alias = match default_alias {
            // `export { x as default }` next to `export { x }`.
            Some(alias) if alias.declared && symbols.contains(&alias.name) => None,
            Some(alias) if owners.contains_key(&alias.name) || symbols.contains(&alias.name) => {
                let owner = owners.get(&alias.name).map(PathBuf::as_path).unwrap_or(path);
                log::warn!(
                    "Default export of {} cannot be aliased as `{}`; skipped",
                    path.display(),
                    alias.name
                );
                plan.warnings.push(Issue::collision(
                    path,
                    format!(
                        "default export alias `{}` is already exported from {}; skipped",
                        alias.name,
                        owner.display()
                    ),
                ));
                None
            }
            other => other.map(|alias| alias.name),
        };

        let explicit = dropped > 0 || (settings.style == ExportStyle::Named && !opaque);
        let from = settings.quote(&specifier);
        if explicit {
            if opaque {
                plan.warnings.push(Issue::collision(
                    path,
                    "`export *` re-exports cannot be forwarded through an explicit clause; skipped",
                ));
            }
            let mut values: Vec<String> = Vec::new();
            if let Some(alias) = &default_alias {
                values.push(format!("default as {}", alias));
            }
            values.extend(
                kept.iter()
                    .filter(|(_, k)| *k == SymbolKind::Value)
                    .map(|(n, _)| n.to_string()),
            );
            let types: Vec<&str> = kept
                .iter()
                .filter(|(_, k)| *k == SymbolKind::Type)
                .map(|(n, _)| n)
                .collect();
            if !values.is_empty() {
                plan.statements
                    .push(format!("export {{ {} }} from {}{}", values.join(", "), from, semi));
            }
            if !types.is_empty() {
                plan.statements.push(format!(
                    "export type {{ {} }} from {}{}",
                    types.join(", "),
                    from,
                    semi
                ));
            }
        } else {
            plan.statements.push(format!("export * from {}{}", from, semi));
            if let Some(alias) = &default_alias {
                plan.statements
                    .push(format!("export {{ default as {} }} from {}{}", alias, from, semi));
            }
            plan.opaque |= opaque;
        }

        for (name, kind) in kept.iter() {
            owners.insert(name.to_string(), path.to_path_buf());
            plan.exports.insert(name, kind);
        }
        if let Some(alias) = default_alias {
            owners.insert(alias.clone(), path.to_path_buf());
            plan.exports.insert(alias, SymbolKind::Value);
        }
    }
    plan
}

/// Result of applying the overwrite policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Skipped(SkipReason),
}

/// Writes `content` to `path` unless a barrel already exists and `force` is
/// off. With `force` the file is replaced even when identical.
pub fn write_barrel(path: &Path, content: &str, force: bool) -> Result<WriteOutcome> {
    let existing = match fs::read(path) {
        Ok(bytes) => Some(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            log::debug!("Existing barrel {} is unreadable: {}", path.display(), e);
            Some(None)
        }
    };

    if let Some(existing) = existing {
        if !force {
            let reason = match existing {
                Some(bytes) if bytes == content.as_bytes() => SkipReason::UpToDate,
                _ => SkipReason::Exists,
            };
            log::info!("Skipping existing barrel {} ({:?})", path.display(), reason);
            return Ok(WriteOutcome::Skipped(reason));
        }
    }

    atomic_write(path, content.as_bytes())?;
    log::info!("Wrote barrel {}", path.display());
    Ok(WriteOutcome::Written)
}

/// Writes through a temporary file in the same directory, fsyncs it and
/// renames it over `path`, so readers see either the old or the new content.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let write_err = |source: io::Error| AppError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = target_permissions(path);

    let mut tmp = tempfile::Builder::new()
        .prefix(".ts-barrels-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions).map_err(write_err)?;
    }
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Permissions for the replacement file: the current file's, or the usual
/// `0644` for new files (temporary files are created `0600`).
fn target_permissions(path: &Path) -> Option<fs::Permissions> {
    if let Ok(meta) = fs::metadata(path) {
        return Some(meta.permissions());
    }
    default_permissions()
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn settings() -> RenderSettings {
        RenderSettings::new(&OutputConfig::default(), &GenerationOptions::default())
    }

    fn module(path: &str, values: &[&str], types: &[&str]) -> ExportDescriptor {
        let mut d = ExportDescriptor::empty(path);
        for v in values {
            d.symbols.insert(*v, SymbolKind::Value);
        }
        for t in types {
            d.symbols.insert(*t, SymbolKind::Type);
        }
        d
    }

    fn render(children: &[Child], settings: &RenderSettings) -> String {
        compose(children, settings).render(settings)
    }

    #[test]
    fn star_style_emits_one_statement_per_module() {
        let children = vec![
            Child::Module(module("/p/a.ts", &["a"], &[])),
            Child::Module(module("/p/b.tsx", &["B"], &["BProps"])),
        ];
        assert_eq!(
            render(&children, &settings()),
            "export * from './a';\nexport * from './b';\n"
        );
    }

    #[test]
    fn named_style_splits_values_and_types() {
        let mut s = settings();
        s.style = ExportStyle::Named;
        let children = vec![Child::Module(module("/p/b.ts", &["B", "make"], &["BProps"]))];
        assert_eq!(
            render(&children, &s),
            "export { B, make } from './b';\nexport type { BProps } from './b';\n"
        );
    }

    #[test]
    fn collisions_keep_first_and_warn() {
        let children = vec![
            Child::Module(module("/p/a.ts", &["shared", "a"], &[])),
            Child::Module(module("/p/b.ts", &["shared", "b"], &["T"])),
            Child::Module(module("/p/c.ts", &["a"], &[])),
        ];
        let s = settings();
        let plan = compose(&children, &s);
        assert_eq!(
            plan.render(&s),
            "export * from './a';\n\
             export { b } from './b';\n\
             export type { T } from './b';\n"
        );
        assert_eq!(plan.warnings.len(), 2);
        assert!(plan.warnings.iter().all(|w| !w.kind.is_error()));
        assert_eq!(plan.warnings[0].path, PathBuf::from("/p/b.ts"));
        assert_eq!(plan.warnings[1].path, PathBuf::from("/p/c.ts"));
        let names: Vec<&str> = plan.exports.names().collect();
        assert_eq!(names, vec!["shared", "a", "b", "T"]);
    }

    #[test]
    fn default_exports_are_aliased() {
        let mut named = ExportDescriptor::empty("/p/Panel.tsx");
        named.has_default = true;
        named.default_name = Some("Panel".to_string());
        let mut anonymous = module("/p/my-util.ts", &["helper"], &[]);
        anonymous.has_default = true;

        let s = settings();
        let children = vec![Child::Module(named.clone()), Child::Module(anonymous.clone())];
        assert_eq!(
            render(&children, &s),
            "export * from './Panel';\n\
             export { default as Panel } from './Panel';\n\
             export * from './my-util';\n\
             export { default as myUtil } from './my-util';\n"
        );

        let mut named_style = settings();
        named_style.style = ExportStyle::Named;
        assert_eq!(
            render(&[Child::Module(anonymous.clone())], &named_style),
            "export { default as myUtil, helper } from './my-util';\n"
        );

        let mut same_name = module("/p/store.ts", &["store"], &[]);
        same_name.has_default = true;
        same_name.default_name = Some("store".to_string());
        let plan = compose(&[Child::Module(same_name)], &named_style);
        assert_eq!(plan.statements, vec!["export { store } from './store';"]);
        assert!(plan.warnings.is_empty());

        let mut ignore = settings();
        ignore.default_exports = DefaultExports::Ignore;
        assert_eq!(render(&[Child::Module(named)], &ignore), "");
    }

    #[test]
    fn empty_modules_are_left_out() {
        let children = vec![Child::Module(ExportDescriptor::empty("/p/side.ts"))];
        let plan = compose(&children, &settings());
        assert!(plan.is_empty());
        assert_eq!(plan.render(&settings()), "");
    }

    #[test]
    fn opaque_children_stay_star_exports() {
        let mut d = module("/p/all.ts", &["x"], &[]);
        d.star_sources.push("./deep".to_string());
        let mut s = settings();
        s.style = ExportStyle::Named;
        let plan = compose(&[Child::Module(d)], &s);
        assert_eq!(plan.statements, vec!["export * from './all';"]);
        assert!(plan.opaque);
    }

    #[test]
    fn sub_barrels_use_directory_specifiers() {
        let mut symbols = SymbolTable::new();
        symbols.insert("nested", SymbolKind::Value);
        let child = Child::Directory(SubBarrel {
            directory: PathBuf::from("/p/components"),
            symbols,
            opaque: false,
        });

        assert_eq!(
            render(&[child.clone()], &settings()),
            "export * from './components';\n"
        );

        let custom = RenderSettings::new(
            &OutputConfig::default(),
            &GenerationOptions {
                barrel_name: "barrel.ts".to_string(),
                ..GenerationOptions::default()
            },
        );
        assert_eq!(
            render(&[child.clone()], &custom),
            "export * from './components/barrel';\n"
        );

        let mut js = settings();
        js.extension = SpecifierExtension::Js;
        assert_eq!(
            render(&[child], &js),
            "export * from './components/index.js';\n"
        );
    }

    #[test]
    fn sibling_module_with_directory_name_keeps_both_reachable() {
        let mut symbols = SymbolTable::new();
        symbols.insert("button", SymbolKind::Value);
        let children = vec![
            Child::Module(module("/p/ui.ts", &["theme"], &[])),
            Child::Directory(SubBarrel {
                directory: PathBuf::from("/p/ui"),
                symbols,
                opaque: false,
            }),
        ];
        let plan = compose(&children, &settings());
        assert_eq!(
            plan.statements,
            vec!["export * from './ui';", "export * from './ui/index';"]
        );
        let names: Vec<&str> = plan.exports.names().collect();
        assert_eq!(names, vec!["theme", "button"]);
    }

    #[test]
    fn shadowing_file_outside_the_barrel_is_detected() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("ui")).unwrap();
        assert!(!has_shadowing_file(&temp.path().join("ui")));
        fs::write(temp.path().join("ui.tsx"), "export const = ;\n").unwrap();
        assert!(has_shadowing_file(&temp.path().join("ui")));
    }

    #[test]
    fn anonymous_default_named_like_an_export_is_reported() {
        let mut panel = module("/p/Panel.ts", &["Panel"], &[]);
        panel.has_default = true;
        let plan = compose(&[Child::Module(panel)], &settings());
        assert_eq!(plan.statements, vec!["export * from './Panel';"]);
        assert_eq!(plan.warnings.len(), 1);
        assert_eq!(plan.warnings[0].kind, crate::report::IssueKind::Collision);
        assert!(plan.warnings[0].message.contains("`Panel`"));
    }

    #[test]
    fn default_alias_taken_by_an_earlier_module_is_reported() {
        let first = module("/p/a.ts", &["myUtil"], &[]);
        let mut second = module("/p/my-util.ts", &["helper"], &[]);
        second.has_default = true;
        let plan = compose(
            &[Child::Module(first), Child::Module(second)],
            &settings(),
        );
        assert_eq!(
            plan.statements,
            vec!["export * from './a';", "export * from './my-util';"]
        );
        assert_eq!(plan.warnings.len(), 1);
        assert_eq!(plan.warnings[0].path, PathBuf::from("/p/my-util.ts"));
    }

    #[test]
    fn js_extension_maps_module_kinds() {
        let mut s = settings();
        s.extension = SpecifierExtension::Js;
        assert_eq!(s.module_specifier(Path::new("/p/a.ts")), "./a.js");
        assert_eq!(s.module_specifier(Path::new("/p/b.tsx")), "./b.js");
        assert_eq!(s.module_specifier(Path::new("/p/c.mts")), "./c.mjs");
        assert_eq!(s.module_specifier(Path::new("/p/d.cts")), "./d.cjs");
    }

    #[test]
    fn formatting_options() {
        let mut config = Config::default();
        config.output.quote = QuoteStyle::Double;
        config.output.semicolons = false;
        config.output.header = Some("// Generated by ts-barrels".to_string());
        let s = RenderSettings::new(&config.output, &GenerationOptions::default());
        let children = vec![Child::Module(module("/p/a.ts", &["a"], &[]))];
        assert_eq!(
            render(&children, &s),
            "// Generated by ts-barrels\n\nexport * from \"./a\"\n"
        );
    }

    #[test]
    fn default_alias_identifiers() {
        assert_eq!(default_alias_for(Path::new("my-util.ts")), "myUtil");
        assert_eq!(default_alias_for(Path::new("Button.tsx")), "Button");
        assert_eq!(default_alias_for(Path::new("use.fetch.ts")), "useFetch");
        assert_eq!(default_alias_for(Path::new("404-page.ts")), "_404Page");
        assert_eq!(default_alias_for(Path::new("snake_case.ts")), "snake_case");
    }

    #[test]
    fn write_policy() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.ts");

        assert_eq!(
            write_barrel(&path, "export * from './a';\n", false).unwrap(),
            WriteOutcome::Written
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "export * from './a';\n");

        assert_eq!(
            write_barrel(&path, "export * from './a';\n", false).unwrap(),
            WriteOutcome::Skipped(SkipReason::UpToDate)
        );
        assert_eq!(
            write_barrel(&path, "export * from './b';\n", false).unwrap(),
            WriteOutcome::Skipped(SkipReason::Exists)
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "export * from './a';\n");

        assert_eq!(
            write_barrel(&path, "export * from './b';\n", true).unwrap(),
            WriteOutcome::Written
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "export * from './b';\n");
    }

    #[cfg(unix)]
    #[test]
    fn force_replaces_identical_files() {
        use std::os::unix::fs::{MetadataExt, PermissionsExt};
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.ts");
        write_barrel(&path, "export * from './a';\n", false).unwrap();
        let before = fs::metadata(&path).unwrap();
        assert_eq!(before.permissions().mode() & 0o777, 0o644);

        write_barrel(&path, "export * from './a';\n", true).unwrap();
        let after = fs::metadata(&path).unwrap();
        assert_ne!(before.ino(), after.ino());
        assert_eq!(after.permissions().mode() & 0o777, 0o644);
    }

    #[test]
    fn atomic_write_leaves_no_temporaries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.ts");
        atomic_write(&path, b"x").unwrap();
        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gone").join("index.ts");
        let err = write_barrel(&path, "x", false).unwrap_err();
        assert!(matches!(err, AppError::Write { .. }));
    }
}
