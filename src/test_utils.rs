//! Fixtures for tests that read declaration documents.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::definitions::DECLARATION_SUFFIX;

/// Empty `def/` folder inside a fresh temp dir. The directory is removed
/// when the returned `TempDir` drops.
pub fn create_test_definition_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let def_dir = temp_dir.path().join("def");
    fs::create_dir(&def_dir).expect("Failed to create def subdirectory");
    (temp_dir, def_dir)
}

/// Writes `<stem>.d.coi` into `dir`.
pub fn write_declaration(dir: &Path, stem: &str, text: &str) -> PathBuf {
    let path = dir.join(format!("{stem}{DECLARATION_SUFFIX}"));
    fs::write(&path, text).expect("Failed to write declaration document");
    path
}

/// Declaration text shared by the editor query tests.
pub const SAMPLE_DECLARATIONS: &str = "\
type Element {
    def setText(text: string): void
    // maps to: dom::set_text
}

type Canvas extends Element {
    type def createCanvas(id: string, w: int, h: int): Canvas
    // maps to: gfx::make_canvas
    def getContext(kind: string): Context
    def clear(): void
}

namespace Math {
    def sqrt(x: float): float
    def max(a: int, b: int): int
}
";
