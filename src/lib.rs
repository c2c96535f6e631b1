//! coi-lsp: editor tooling for the COI component language
//!
//! The crate reads two kinds of text:
//!
//! - **Declaration documents** (`*.d.coi`) describing library types and
//!   namespaces. [`definitions`] scans them into a [`DefinitionTable`].
//! - **User source**, scanned on demand for components ([`component`]) and
//!   variable types ([`resolve`]), and re-indented by [`format`].
//!
//! Scanning is line oriented and never fails: malformed input yields
//! partial results instead of errors.
//!
//! # Architecture
//!
//! - [`definitions`], [`component`], [`resolve`], [`format`]: text analysis
//! - [`completion`], [`hover`], [`signature`], [`formatting`]: editor queries
//!   built on the analysis modules
//! - [`server`]: the tower-lsp backend
//! - [`config`], [`cli`]: settings and command line
//!
//! ```ignore
//! use coi_lsp::definitions::DefinitionTable;
//!
//! let table = DefinitionTable::load_directory(Path::new("def"));
//! let canvas = table.type_def("Canvas");
//! ```
//!
//! [`DefinitionTable`]: definitions::DefinitionTable

// Text analysis
pub mod component;
pub mod definitions;
pub mod format;
pub mod resolve;

// LSP feature modules
pub mod completion;
pub mod formatting;
pub mod hover;
pub mod server;
pub mod signature;
pub mod text;

// Configuration and entry points
pub mod cli;
pub mod config;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
