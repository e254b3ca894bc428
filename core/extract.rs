//! Export Extractor: static analysis of a module's top-level `export`
//! statements using the tree-sitter TypeScript grammars.

use crate::error::{AppError, Result};
use indexmap::IndexMap;
use log;
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub enum SymbolKind {
    Value,
    Type,
}

/// Ordered, de-duplicated export names. A name declared both as a type and a
/// value (declaration merging) is kept as a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
pub struct SymbolTable(IndexMap<String, SymbolKind>);

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, kind: SymbolKind) {
        let entry = self.0.entry(name.into()).or_insert(kind);
        if kind == SymbolKind::Value {
            *entry = SymbolKind::Value;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn kind(&self, name: &str) -> Option<SymbolKind> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolKind)> {
        self.0.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// What one module file makes available for re-export.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub struct ExportDescriptor {
    pub module: PathBuf,
    pub symbols: SymbolTable,
    pub has_default: bool,
    /// Name of the default export's declaration, when it has one.
    pub default_name: Option<String>,
    /// Specifiers of `export * from '…'` statements; their names are unknown.
    pub star_sources: Vec<String>,
}

impl ExportDescriptor {
    pub fn empty(module: impl Into<PathBuf>) -> Self {
        Self {
            module: module.into(),
            symbols: SymbolTable::new(),
            has_default: false,
            default_name: None,
            star_sources: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && !self.has_default && self.star_sources.is_empty()
    }

    pub fn is_opaque(&self) -> bool {
        !self.star_sources.is_empty()
    }
}

/// Reads `path` and extracts its exports.
pub fn extract_file(path: &Path) -> Result<ExportDescriptor> {
    let bytes = fs::read(path).map_err(|e| AppError::from_read(path, e))?;
    let source = String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let (line, column) = position_after(valid);
        AppError::Parse {
            path: path.to_path_buf(),
            line,
            column,
            message: "file is not valid UTF-8".to_string(),
        }
    })?;
    extract_exports(path, &source)
}

/// Extracts the exports of `source`; `module` selects the grammar (`.tsx` and
/// `.jsx` use the TSX grammar) and is recorded in the descriptor.
pub fn extract_exports(module: &Path, source: &str) -> Result<ExportDescriptor> {
    let mut parser = parser_for(module)?;
    let tree = parser.parse(source, None).ok_or_else(|| {
        AppError::TreeSitter(format!("Parser produced no tree for {}", module.display()))
    })?;
    let root = tree.root_node();
    let bytes = source.as_bytes();

    if root.has_error() {
        let (line, column, message) = first_error(root, bytes)
            .unwrap_or((1, 1, "syntax error".to_string()));
        return Err(AppError::Parse {
            path: module.to_path_buf(),
            line,
            column,
            message,
        });
    }

    let local_types = collect_local_types(root, bytes);
    let mut descriptor = ExportDescriptor::empty(module);
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() == "export_statement" {
            collect_export(child, bytes, &local_types, &mut descriptor);
        }
    }
    log::trace!(
        "Extracted {} symbols from {} (default: {}, star sources: {})",
        descriptor.symbols.len(),
        module.display(),
        descriptor.has_default,
        descriptor.star_sources.len()
    );
    Ok(descriptor)
}

fn parser_for(module: &Path) -> Result<Parser> {
    let mut parser = Parser::new();
    let lang = match module.extension().and_then(|e| e.to_str()) {
        Some("tsx") | Some("jsx") => &tree_sitter_typescript::LANGUAGE_TSX,
        _ => &tree_sitter_typescript::LANGUAGE_TYPESCRIPT,
    };
    parser.set_language(&(*lang).into())?;
    Ok(parser)
}

fn text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn unquote(raw: &str) -> &str {
    raw.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

fn position_after(bytes: &[u8]) -> (usize, usize) {
    let line = bytes.iter().filter(|b| **b == b'\n').count() + 1;
    let column = bytes.iter().rev().take_while(|b| **b != b'\n').count() + 1;
    (line, column)
}

/// Location and description of the first ERROR or MISSING node.
fn first_error(node: Node, source: &[u8]) -> Option<(usize, usize, String)> {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        let message = if node.is_missing() {
            format!("missing `{}`", node.kind())
        } else {
            let snippet: String = text(node, source).chars().take(40).collect();
            format!("unexpected `{}`", snippet.trim())
        };
        return Some((pos.row + 1, pos.column + 1, message));
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = first_error(child, source) {
                return Some(found);
            }
        }
    }
    None
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

/// Names declared as types at the top level (interfaces, aliases, type-only
/// imports), used to classify `export { … }` clauses without a source.
fn collect_local_types(root: Node, source: &[u8]) -> HashSet<String> {
    let mut types = HashSet::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "interface_declaration" | "type_alias_declaration" => {
                if let Some(name) = child.child_by_field_name("name") {
                    types.insert(text(name, source).to_string());
                }
            }
            "import_statement" => {
                let whole_import_is_type = has_token(child, "type");
                let mut inner = child.walk();
                for clause in child.named_children(&mut inner) {
                    if clause.kind() == "import_clause" {
                        collect_import_types(clause, source, whole_import_is_type, &mut types);
                    }
                }
            }
            _ => {}
        }
    }
    types
}

fn collect_import_types(
    clause: Node,
    source: &[u8],
    whole_import_is_type: bool,
    types: &mut HashSet<String>,
) {
    let mut cursor = clause.walk();
    for part in clause.named_children(&mut cursor) {
        match part.kind() {
            "identifier" if whole_import_is_type => {
                types.insert(text(part, source).to_string());
            }
            "named_imports" => {
                let mut inner = part.walk();
                for spec in part.named_children(&mut inner) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    if !(whole_import_is_type || has_token(spec, "type")) {
                        continue;
                    }
                    let local = spec
                        .child_by_field_name("alias")
                        .or_else(|| spec.child_by_field_name("name"));
                    if let Some(local) = local {
                        types.insert(unquote(text(local, source)).to_string());
                    }
                }
            }
            _ => {}
        }
    }
}

fn collect_export(
    node: Node,
    source: &[u8],
    local_types: &HashSet<String>,
    descriptor: &mut ExportDescriptor,
) {
    let module_source = node
        .child_by_field_name("source")
        .map(|s| unquote(text(s, source)).to_string());
    let declaration = node.child_by_field_name("declaration");
    let value = node.child_by_field_name("value");

    if has_token(node, "default") {
        descriptor.has_default = true;
        let named = declaration
            .or(value)
            .and_then(|n| match n.kind() {
                "identifier" => Some(n),
                _ => n.child_by_field_name("name"),
            })
            .map(|n| text(n, source).to_string());
        if descriptor.default_name.is_none() {
            descriptor.default_name = named;
        }
        return;
    }
    if has_token(node, "=") || (has_token(node, "namespace") && has_token(node, "as")) {
        log::debug!(
            "Ignoring CommonJS/UMD export form: {}",
            text(node, source).lines().next().unwrap_or("")
        );
        return;
    }
    if let Some(decl) = declaration {
        collect_declaration(decl, source, &mut descriptor.symbols);
        return;
    }

    let type_only = has_token(node, "type");
    let mut star = false;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "*" => star = true,
            "namespace_export" => {
                let mut inner = child.walk();
                let alias = child
                    .named_children(&mut inner)
                    .last()
                    .map(|n| unquote(text(n, source)).to_string());
                if let Some(alias) = alias {
                    descriptor.symbols.insert(alias, SymbolKind::Value);
                }
            }
            "export_clause" => collect_clause(
                child,
                source,
                type_only,
                module_source.is_some(),
                local_types,
                descriptor,
            ),
            "import_alias" => collect_declaration(child, source, &mut descriptor.symbols),
            _ => {}
        }
    }
    if star {
        if let Some(from) = module_source {
            descriptor.star_sources.push(from);
        }
    }
}

fn collect_clause(
    clause: Node,
    source: &[u8],
    type_only: bool,
    is_reexport: bool,
    local_types: &HashSet<String>,
    descriptor: &mut ExportDescriptor,
) {
    let mut cursor = clause.walk();
    for spec in clause.named_children(&mut cursor) {
        if spec.kind() != "export_specifier" {
            continue;
        }
        let Some(name_node) = spec.child_by_field_name("name") else {
            continue;
        };
        let local = unquote(text(name_node, source));
        let exported = spec
            .child_by_field_name("alias")
            .map(|a| unquote(text(a, source)))
            .unwrap_or(local);

        if exported == "default" {
            descriptor.has_default = true;
            if descriptor.default_name.is_none() && local != "default" {
                descriptor.default_name = Some(local.to_string());
            }
            continue;
        }
        let kind = if type_only || has_token(spec, "type") {
            SymbolKind::Type
        } else if !is_reexport && local_types.contains(local) {
            SymbolKind::Type
        } else {
            SymbolKind::Value
        };
        descriptor.symbols.insert(exported, kind);
    }
}

fn collect_declaration(decl: Node, source: &[u8], symbols: &mut SymbolTable) {
    match decl.kind() {
        "function_declaration"
        | "generator_function_declaration"
        | "function_signature"
        | "class_declaration"
        | "abstract_class_declaration"
        | "enum_declaration" => {
            if let Some(name) = decl.child_by_field_name("name") {
                symbols.insert(text(name, source), SymbolKind::Value);
            }
        }
        "internal_module" | "module" => {
            if let Some(name) = decl.child_by_field_name("name") {
                if name.kind() != "string" {
                    // `namespace A.B {}` exports `A`.
                    let full = text(name, source);
                    let head = full.split('.').next().unwrap_or(full).trim();
                    symbols.insert(head, SymbolKind::Value);
                }
            }
        }
        "interface_declaration" | "type_alias_declaration" => {
            if let Some(name) = decl.child_by_field_name("name") {
                symbols.insert(text(name, source), SymbolKind::Type);
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = decl.walk();
            for declarator in decl.named_children(&mut cursor) {
                if declarator.kind() == "variable_declarator" {
                    if let Some(pattern) = declarator.child_by_field_name("name") {
                        collect_pattern_names(pattern, source, symbols);
                    }
                }
            }
        }
        "ambient_declaration" => {
            let mut cursor = decl.walk();
            for inner in decl.named_children(&mut cursor) {
                collect_declaration(inner, source, symbols);
            }
        }
        "import_alias" => {
            let mut cursor = decl.walk();
            let name = decl
                .named_children(&mut cursor)
                .find(|n| n.kind() == "identifier");
            if let Some(name) = name {
                symbols.insert(text(name, source), SymbolKind::Value);
            }
        }
        other => log::debug!("Unhandled exported declaration kind: {}", other),
    }
}

fn collect_pattern_names(pattern: Node, source: &[u8], symbols: &mut SymbolTable) {
    match pattern.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            symbols.insert(text(pattern, source), SymbolKind::Value);
        }
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = pattern.child_by_field_name("left") {
                collect_pattern_names(left, source, symbols);
            }
        }
        "pair_pattern" => {
            if let Some(value) = pattern.child_by_field_name("value") {
                collect_pattern_names(value, source, symbols);
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" => {
            let mut cursor = pattern.walk();
            for child in pattern.named_children(&mut cursor) {
                collect_pattern_names(child, source, symbols);
            }
        }
        _ => {}
    }
}
