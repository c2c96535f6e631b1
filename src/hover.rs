//! Hover provider for COI documents.
//!
//! # Hover Targets
//!
//! | Target | Shows |
//! |--------|-------|
//! | `Owner.method` | Signature, method kind and external binding |
//! | Declared type name | Header, method count and source document |
//! | Namespace name | Function count and source document |
//!
//! `Owner` may be a type, a namespace, or a variable whose type the
//! resolver can find.

use once_cell::sync::Lazy;
use regex::Regex;
use ropey::Rope;
use tower_lsp::lsp_types::{
    Hover, HoverContents, HoverParams, MarkupContent, MarkupKind, Position, Range,
};

use crate::definitions::{DefinitionTable, MethodSignature};
use crate::resolve::resolve_type;
use crate::text::line_text;

static OWNER_BEFORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?<owner>\w+)\.\s*$").unwrap());

/// Word under the cursor, with its char span on the line.
struct Word {
    text: String,
    start: usize,
    end: usize,
    /// Identifier directly before a `.` preceding the word.
    owner: Option<String>,
}

fn word_at(line: &str, character: usize) -> Option<Word> {
    let chars: Vec<char> = line.chars().collect();
    let is_word = |c: &char| c.is_alphanumeric() || *c == '_';

    let cursor = character.min(chars.len());
    let start = chars[..cursor]
        .iter()
        .rposition(|c| !is_word(c))
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = chars[cursor..]
        .iter()
        .position(|c| !is_word(c))
        .map(|i| cursor + i)
        .unwrap_or(chars.len());

    if start >= end {
        return None;
    }

    let before: String = chars[..start].iter().collect();
    let owner = OWNER_BEFORE_RE
        .captures(&before)
        .map(|caps| caps["owner"].to_string());

    Some(Word {
        text: chars[start..end].iter().collect(),
        start,
        end,
        owner,
    })
}

fn method_markdown(owner: &str, method: &MethodSignature, kind: &str) -> String {
    let mut text = format!("```coi\n{}.{}\n```\n\n*{}*", owner, method.label(), kind);
    if let Some(binding) = &method.external_binding {
        text.push_str(&format!("\n\nMaps to: `{binding}`"));
    }
    text
}

/// Hover text for `owner.member`, trying static, instance, namespace, then
/// instance methods of the owner's resolved variable type.
fn member_markdown(
    table: &DefinitionTable,
    document_text: &str,
    owner: &str,
    member: &str,
) -> Option<String> {
    if let Some(definition) = table.type_def(owner) {
        if let Some(method) = definition.static_method(member) {
            return Some(method_markdown(&definition.name, method, "static method"));
        }
        if let Some(method) = definition.instance_method(member) {
            return Some(method_markdown(&definition.name, method, "instance method"));
        }
    }

    if let Some(method) = table
        .namespace(owner)
        .and_then(|namespace| namespace.function(member))
    {
        return Some(method_markdown(owner, method, "namespace function"));
    }

    let type_name = resolve_type(document_text, owner)?;
    let method = table.type_def(&type_name)?.instance_method(member)?;
    Some(method_markdown(&type_name, method, "instance method"))
}

fn symbol_markdown(table: &DefinitionTable, name: &str) -> Option<String> {
    if let Some(definition) = table.type_def(name) {
        return Some(format!(
            "```coi\n{}\n```\n\n{} methods\n\nSource: `{}`",
            definition.header(),
            definition.method_count(),
            definition.source_id
        ));
    }

    table.namespace(name).map(|namespace| {
        format!(
            "```coi\nnamespace {}\n```\n\n{} functions\n\nSource: `{}`",
            namespace.name,
            namespace.functions.len(),
            namespace.source_id
        )
    })
}

/// Generate hover content for the symbol at the cursor position.
///
/// Returns `None` when the cursor is not on a word, or the word names
/// nothing in the definition table.
pub fn hover(table: &DefinitionTable, document: &Rope, params: &HoverParams) -> Option<Hover> {
    let position = params.text_document_position_params.position;
    let line = line_text(document, position.line as usize)?;
    let word = word_at(&line, position.character as usize)?;

    let markdown = match &word.owner {
        Some(owner) => member_markdown(table, &document.to_string(), owner, &word.text),
        None => symbol_markdown(table, &word.text),
    }?;

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: markdown,
        }),
        range: Some(Range {
            start: Position::new(position.line, word.start as u32),
            end: Position::new(position.line, word.end as u32),
        }),
    })
}

#[cfg(test)]
mod tests {
    use tower_lsp::lsp_types::{TextDocumentIdentifier, TextDocumentPositionParams, Url};

    use super::*;
    use crate::test_utils::SAMPLE_DECLARATIONS;

    fn hover_text(document: &str, line: u32, character: u32) -> Option<String> {
        let table = DefinitionTable::from_document(SAMPLE_DECLARATIONS, "sample.d.coi");
        let params = HoverParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier {
                    uri: Url::parse("file:///app.coi").unwrap(),
                },
                position: Position { line, character },
            },
            work_done_progress_params: Default::default(),
        };

        hover(&table, &Rope::from_str(document), &params).map(|hover| match hover.contents {
            HoverContents::Markup(markup) => markup.value,
            other => panic!("Expected markup, got {:?}", other),
        })
    }

    #[test]
    fn static_method_with_binding() {
        let text = hover_text("Canvas c = Canvas.createCanvas(\"a\", 1, 2);", 0, 21).unwrap();

        assert!(text.contains("Canvas.createCanvas(id: string, w: int, h: int): Canvas"));
        assert!(text.contains("*static method*"));
        assert!(text.contains("Maps to: `gfx::make_canvas`"));
    }

    #[test]
    fn instance_method_through_variable() {
        let document = "Canvas canvas = Canvas.createCanvas(\"a\", 1, 2);\ncanvas.clear();";

        let text = hover_text(document, 1, 8).unwrap();

        assert!(text.contains("Canvas.clear(): void"));
        assert!(text.contains("*instance method*"));
        assert!(!text.contains("Maps to"));
    }

    #[test]
    fn namespace_function() {
        let text = hover_text("float r = Math.max(1, 2);", 0, 15).unwrap();

        assert!(text.contains("Math.max(a: int, b: int): int"));
        assert!(text.contains("*namespace function*"));
    }

    #[test]
    fn type_summary() {
        let text = hover_text("Canvas c;", 0, 2).unwrap();

        assert_eq!(
            text,
            "```coi\ntype Canvas extends Element\n```\n\n3 methods\n\nSource: `sample.d.coi`"
        );
    }

    #[test]
    fn namespace_summary() {
        let text = hover_text("Math", 0, 4).unwrap();

        assert!(text.starts_with("```coi\nnamespace Math\n```"));
        assert!(text.contains("2 functions"));
    }

    #[test]
    fn unknown_symbols_have_no_hover() {
        assert_eq!(hover_text("int x = 1;", 0, 5), None);
        assert_eq!(hover_text("Canvas.missing();", 0, 9), None);
        assert_eq!(hover_text("   ", 0, 1), None);
        assert_eq!(hover_text("x", 5, 0), None);
    }

    #[test]
    fn word_span_and_owner() {
        let word = word_at("  canvas.getContext(", 12).unwrap();

        assert_eq!(word.text, "getContext");
        assert_eq!((word.start, word.end), (9, 19));
        assert_eq!(word.owner.as_deref(), Some("canvas"));
    }
}
