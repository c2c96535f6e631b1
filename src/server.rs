//! Language server backend.
//!
//! The definition table is shared as an `Arc` snapshot behind a lock. A
//! reload builds a complete new table before taking the write lock, so a
//! request never observes a half-built table.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use ropey::Rope;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use crate::completion::get_completions;
use crate::config::Settings;
use crate::definitions::DefinitionTable;
use crate::format::FormatOptions;
use crate::formatting::formatting_edits;
use crate::hover::hover;
use crate::signature::signature_help;

pub struct Backend {
    client: Client,
    documents: RwLock<HashMap<Url, Rope>>,
    definitions: RwLock<Arc<DefinitionTable>>,
    settings: RwLock<Settings>,
    workspace_root: RwLock<Option<PathBuf>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Backend {
            client,
            documents: RwLock::new(HashMap::new()),
            definitions: RwLock::new(Arc::new(DefinitionTable::new())),
            settings: RwLock::new(Settings::default()),
            workspace_root: RwLock::new(None),
        }
    }

    /// Current table snapshot. Stays valid across a concurrent reload.
    async fn definitions(&self) -> Arc<DefinitionTable> {
        self.definitions.read().await.clone()
    }

    async fn document(&self, uri: &Url) -> Option<Rope> {
        self.documents.read().await.get(uri).cloned()
    }

    /// Rebuilds the definition table from the configured location and swaps
    /// it in.
    async fn reload_definitions(&self) {
        let root = self.workspace_root.read().await.clone();
        let dir = self.settings.read().await.definitions_dir(root.as_deref());

        let table = match dir {
            Some(dir) => {
                match tokio::task::spawn_blocking(move || DefinitionTable::load_directory(&dir))
                    .await
                {
                    Ok(table) => table,
                    Err(err) => {
                        tracing::warn!("Definition reload failed: {}", err);
                        return;
                    }
                }
            }
            None => {
                tracing::warn!("No definition directory could be located");
                DefinitionTable::new()
            }
        };

        let summary = format!(
            "Loaded {} types, {} namespaces",
            table.type_count(),
            table.namespace_count()
        );
        tracing::info!("{}", summary);

        *self.definitions.write().await = Arc::new(table);

        self.client.log_message(MessageType::INFO, summary).await;
    }
}

/// Char index of an LSP position, clamped to the document.
fn position_to_char(rope: &Rope, position: Position) -> usize {
    let line = (position.line as usize).min(rope.len_lines().saturating_sub(1));
    let line_start = rope.line_to_char(line);
    let line_len = rope.line(line).len_chars();
    line_start + (position.character as usize).min(line_len)
}

fn apply_change(rope: &mut Rope, change: TextDocumentContentChangeEvent) {
    match change.range {
        Some(range) => {
            let start = position_to_char(rope, range.start);
            let end = position_to_char(rope, range.end).max(start);
            rope.remove(start..end);
            rope.insert(start, &change.text);
        }
        None => *rope = Rope::from_str(&change.text),
    }
}

fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    let folder_uri = params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| folder.uri.clone());

    #[allow(deprecated)]
    let uri = folder_uri.or_else(|| params.root_uri.clone())?;

    uri.to_file_path().ok()
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = workspace_root(&params);
        tracing::info!("Initializing COI language server at {:?}", root);

        let settings = match root.as_deref().map(Settings::new) {
            Some(Ok(settings)) => settings,
            Some(Err(err)) => {
                tracing::warn!("Falling back to default settings: {}", err);
                Settings::default()
            }
            None => Settings::default(),
        };

        *self.settings.write().await = settings;
        *self.workspace_root.write().await = root;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![".".to_string(), "<".to_string()]),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
                    ..Default::default()
                }),
                document_formatting_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "coi-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.reload_definitions().await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down COI language server");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        tracing::debug!("Document opened: {}", params.text_document.uri);
        self.documents.write().await.insert(
            params.text_document.uri,
            Rope::from_str(&params.text_document.text),
        );
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let mut documents = self.documents.write().await;
        let rope = documents
            .entry(params.text_document.uri)
            .or_insert_with(Rope::new);

        for change in params.content_changes {
            apply_change(rope, change);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents
            .write()
            .await
            .remove(&params.text_document.uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let applied = self
            .settings
            .write()
            .await
            .apply_client_settings(&params.settings);

        match applied {
            Ok(path_changed) => {
                tracing::debug!("Configuration updated, definitions path changed: {}", path_changed);
                self.reload_definitions().await;
            }
            Err(err) => tracing::warn!("Ignoring invalid configuration: {}", err),
        }
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let Some(document) = self.document(uri).await else {
            return Ok(None);
        };
        let table = self.definitions().await;

        Ok(get_completions(&table, &document, &params))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let Some(document) = self.document(uri).await else {
            return Ok(None);
        };
        let table = self.definitions().await;

        Ok(hover(&table, &document, &params))
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let Some(document) = self.document(uri).await else {
            return Ok(None);
        };
        let table = self.definitions().await;

        Ok(signature_help(&table, &document, &params))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let Some(document) = self.document(&params.text_document.uri).await else {
            return Ok(None);
        };

        Ok(formatting_edits(&document, &FormatOptions::from(&params.options)))
    }
}

/// Serves the language server over stdio until the client disconnects.
pub async fn run() {
    tracing::info!("Starting COI language server");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
