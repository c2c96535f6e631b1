use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::definitions::DefinitionTable;
use crate::format::{format, FormatOptions};

/// Language server and formatter for COI sources
#[derive(Parser)]
#[command(name = "coi-lsp")]
#[command(version)]
#[command(about = "COI language server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the language server over stdio (the default)
    Serve,
    /// Format source files in place
    Fmt {
        /// List files that would change and exit with status 1 instead of writing
        #[arg(long)]
        check: bool,
        /// Spaces per indentation level, overriding `indent_width` from settings
        #[arg(long, value_name = "N")]
        indent: Option<usize>,
        /// Indent with tabs, overriding `use_tabs` from settings
        #[arg(long)]
        tabs: bool,
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the definitions found in a declaration directory as JSON
    Index {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
}

/// Formatting options from the settings found for `root_dir`, with the
/// command line flags applied on top.
pub fn format_options(
    root_dir: &Path,
    indent: Option<usize>,
    tabs: bool,
) -> anyhow::Result<FormatOptions> {
    let settings = Settings::new(root_dir)?;
    let mut options = FormatOptions::from(&settings);

    if let Some(indent) = indent {
        options.indent_width = indent.max(1);
    }
    if tabs {
        options.use_spaces = false;
    }

    Ok(options)
}

/// Formats `files`. In check mode nothing is written and the returned flag
/// tells whether every file was already formatted.
pub fn format_files(
    files: &[PathBuf],
    options: &FormatOptions,
    check: bool,
) -> anyhow::Result<bool> {
    let mut clean = true;

    for path in files {
        let original = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let formatted = format(&original, options);

        if formatted == original {
            continue;
        }

        if check {
            println!("{}", path.display());
            clean = false;
        } else {
            std::fs::write(path, formatted)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Formatted {}", path.display());
        }
    }

    Ok(clean)
}

pub fn index_json(dir: &Path) -> anyhow::Result<String> {
    let table = DefinitionTable::load_directory(dir);
    let types: Vec<_> = table.types().collect();
    let namespaces: Vec<_> = table.namespaces().collect();
    let json = serde_json::json!({
        "types": types,
        "namespaces": namespaces,
    });

    Ok(serde_json::to_string_pretty(&json)?)
}
