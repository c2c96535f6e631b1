use std::path::{Path, PathBuf};

use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;

/// Name of the declaration folder looked up beside the executable and at
/// the workspace root.
pub const DEFINITIONS_FOLDER: &str = "def";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Spaces per indentation level when formatting with spaces
    pub indent_width: usize,
    pub use_tabs: bool,
    /// Declaration directory override; empty means unset
    pub definitions_path: String,
}

/// Editor-side settings pushed through `workspace/didChangeConfiguration`.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
struct ClientSettings {
    definitions_path: Option<String>,
    indent_width: Option<usize>,
    use_tabs: Option<bool>,
}

impl Settings {
    pub fn new(root_dir: &Path) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/coi/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.coi",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            )
            .set_default("indent_width", 4)?
            .set_default("use_tabs", false)?
            .set_default("definitions_path", "")?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }

    /// Merges the `coi` section of an editor configuration payload.
    ///
    /// Returns whether the declaration location changed.
    pub fn apply_client_settings(&mut self, value: &serde_json::Value) -> anyhow::Result<bool> {
        let section = value.get("coi").unwrap_or(value);
        let client: ClientSettings = serde_json::from_value(section.clone())?;

        if let Some(indent_width) = client.indent_width {
            self.indent_width = indent_width;
        }
        if let Some(use_tabs) = client.use_tabs {
            self.use_tabs = use_tabs;
        }

        match client.definitions_path {
            Some(path) if path != self.definitions_path => {
                self.definitions_path = path;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Directory to load declaration documents from.
    ///
    /// The configured path wins over the folder shipped beside the
    /// executable, and a `def/` folder at the workspace root wins over both.
    pub fn definitions_dir(&self, workspace_root: Option<&Path>) -> Option<PathBuf> {
        if let Some(workspace_defs) = workspace_root
            .map(|root| root.join(DEFINITIONS_FOLDER))
            .filter(|dir| dir.is_dir())
        {
            return Some(workspace_defs);
        }

        if !self.definitions_path.is_empty() {
            let expanded = shellexpand::tilde(&self.definitions_path);
            return Some(PathBuf::from(expanded.as_ref()));
        }

        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(DEFINITIONS_FOLDER)))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            indent_width: 4,
            use_tabs: false,
            definitions_path: "".to_string(),
        }
    }
}
