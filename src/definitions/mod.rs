//! Symbol table recovered from `.d.coi` declaration documents.
//!
//! A declaration document describes library surface without implementation:
//!
//! ```text
//! type Canvas extends Element {
//!     type def create(w: int, h: int): Canvas
//!     // maps to: gfx::make_canvas
//!     def clear(): void
//! }
//!
//! namespace Math {
//!     def sqrt(x: float): float
//! }
//! ```
//!
//! [`DefinitionTable`] is built once per load and never patched afterwards.
//! Reloading produces a brand new table; holders of an `Arc<DefinitionTable>`
//! keep reading the snapshot they started with.

mod lines;
mod params;
mod parser;

#[cfg(test)]
mod tests;

pub use lines::DeclLine;
pub(crate) use lines::{brace_delta, instance_method};
pub use params::parse_params;

use std::{
    collections::{HashMap, HashSet},
    fmt,
    path::Path,
};

use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

/// File suffix identifying declaration documents.
pub const DECLARATION_SUFFIX: &str = ".d.coi";

/// One `name: type` entry of a parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    /// `None` when the segment had no colon.
    pub type_name: Option<String>,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_name {
            Some(type_name) => write!(f, "{}: {}", self.name, type_name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Implementation target attached by a `// maps to: module::function` comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalBinding {
    pub module: String,
    pub function: String,
}

impl fmt::Display for ExternalBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.function)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: String,
    pub is_static: bool,
    pub external_binding: Option<ExternalBinding>,
}

impl MethodSignature {
    /// `a: int, b: float`
    pub fn params_label(&self) -> String {
        self.params.iter().join(", ")
    }

    /// `name(a: int, b: float): ReturnType`
    pub fn label(&self) -> String {
        format!("{}({}): {}", self.name, self.params_label(), self.return_type)
    }

    /// Snippet text with one tab stop per parameter: `name(${1:a}, ${2:b})`.
    pub fn snippet(&self) -> String {
        let placeholders = self
            .params
            .iter()
            .enumerate()
            .map(|(i, param)| format!("${{{}:{}}}", i + 1, param.name))
            .join(", ");
        format!("{}({})", self.name, placeholders)
    }
}

/// Overloads are not modeled: the last declaration with a given name wins.
fn find_method<'a>(methods: &'a [MethodSignature], name: &str) -> Option<&'a MethodSignature> {
    methods.iter().rev().find(|method| method.name == name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDefinition {
    pub name: String,
    /// Name of the extended type. Resolved by table lookup, never owned.
    pub parent: Option<String>,
    pub instance_methods: Vec<MethodSignature>,
    pub static_methods: Vec<MethodSignature>,
    pub source_id: String,
}

impl TypeDefinition {
    pub fn static_method(&self, name: &str) -> Option<&MethodSignature> {
        find_method(&self.static_methods, name)
    }

    pub fn instance_method(&self, name: &str) -> Option<&MethodSignature> {
        find_method(&self.instance_methods, name)
    }

    pub fn method_count(&self) -> usize {
        self.instance_methods.len() + self.static_methods.len()
    }

    /// `type Name` or `type Name extends Parent`
    pub fn header(&self) -> String {
        match &self.parent {
            Some(parent) => format!("type {} extends {}", self.name, parent),
            None => format!("type {}", self.name),
        }
    }

    /// Walks the `extends` chain through `table`.
    ///
    /// Stops at the first parent that is not declared, and at the first
    /// name seen twice.
    pub fn ancestors<'a>(&'a self, table: &'a DefinitionTable) -> Vec<&'a TypeDefinition> {
        let mut seen = HashSet::from([self.name.as_str()]);
        let mut chain = Vec::new();
        let mut next = self.parent.as_deref();

        while let Some(parent) = next {
            if !seen.insert(parent) {
                break;
            }
            let Some(definition) = table.type_def(parent) else {
                break;
            };
            chain.push(definition);
            next = definition.parent.as_deref();
        }

        chain
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceDefinition {
    pub name: String,
    /// Every namespace function is static.
    pub functions: Vec<MethodSignature>,
    pub source_id: String,
}

impl NamespaceDefinition {
    pub fn function(&self, name: &str) -> Option<&MethodSignature> {
        find_method(&self.functions, name)
    }
}

/// Types and namespaces keyed by name. Later declarations overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DefinitionTable {
    types: HashMap<String, TypeDefinition>,
    namespaces: HashMap<String, NamespaceDefinition>,
}

impl DefinitionTable {
    pub fn new() -> DefinitionTable {
        DefinitionTable::default()
    }

    /// Builds a table from every declaration document directly inside `dir`.
    ///
    /// A missing directory gives an empty table. Documents are applied in
    /// file-name order, so on a name collision the later file wins.
    pub fn load_directory(dir: &Path) -> DefinitionTable {
        if !dir.is_dir() {
            tracing::debug!("Definition directory {} does not exist", dir.display());
            return DefinitionTable::new();
        }

        let paths = WalkDir::new(dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), err);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(DECLARATION_SUFFIX))
            })
            .map(|entry| entry.into_path())
            .collect_vec();

        let documents: Vec<DefinitionTable> = paths
            .par_iter()
            .filter_map(|path| match std::fs::read_to_string(path) {
                Ok(text) => {
                    let source_id = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    Some(DefinitionTable::from_document(&text, &source_id))
                }
                Err(err) => {
                    tracing::warn!("Skipping {}: {}", path.display(), err);
                    None
                }
            })
            .collect();

        let table = documents
            .into_iter()
            .fold(DefinitionTable::new(), |mut table, document| {
                table.merge(document);
                table
            });

        tracing::info!(
            "Loaded {} types, {} namespaces from {}",
            table.types.len(),
            table.namespaces.len(),
            dir.display()
        );

        table
    }

    pub fn from_document(text: &str, source_id: &str) -> DefinitionTable {
        let mut table = DefinitionTable::new();
        table.parse_document(text, source_id);
        table
    }

    /// Scans one declaration document into this table.
    pub fn parse_document(&mut self, text: &str, source_id: &str) {
        parser::DocumentScanner::new(self, source_id).scan(text);
    }

    /// Moves every entry of `other` into `self`, overwriting on name collision.
    pub fn merge(&mut self, other: DefinitionTable) {
        self.types.extend(other.types);
        self.namespaces.extend(other.namespaces);
    }

    pub fn insert_type(&mut self, definition: TypeDefinition) {
        self.types.insert(definition.name.clone(), definition);
    }

    pub fn insert_namespace(&mut self, definition: NamespaceDefinition) {
        self.namespaces.insert(definition.name.clone(), definition);
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn namespace(&self, name: &str) -> Option<&NamespaceDefinition> {
        self.namespaces.get(name)
    }

    /// Types sorted by name.
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types
            .values()
            .sorted_by(|a, b| a.name.cmp(&b.name))
    }

    /// Namespaces sorted by name.
    pub fn namespaces(&self) -> impl Iterator<Item = &NamespaceDefinition> {
        self.namespaces
            .values()
            .sorted_by(|a, b| a.name.cmp(&b.name))
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.namespaces.is_empty()
    }
}
