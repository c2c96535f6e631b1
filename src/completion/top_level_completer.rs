use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind};

use crate::definitions::{NamespaceDefinition, TypeDefinition};

use super::{Completable, Completer, Context};

pub const KEYWORDS: &[&str] = &[
    "component", "def", "view", "style", "prop", "mut", "tick", "if", "else", "for", "while",
    "return", "import", "app", "struct",
];

pub const PRIMITIVE_TYPES: &[&str] = &["int", "float", "string", "bool", "void"];

/// Fallback completer. It accepts every position, so it runs last.
pub struct TopLevelCompleter<'a> {
    context: Context<'a>,
}

impl<'a> Completer<'a> for TopLevelCompleter<'a> {
    fn construct(context: Context<'a>, _line: usize, _character: usize) -> Option<Self>
    where
        Self: Sized + Completer<'a>,
    {
        Some(TopLevelCompleter { context })
    }

    fn completions(&self) -> Vec<impl Completable<'a, Self>>
    where
        Self: Sized,
    {
        let table = self.context.table;

        KEYWORDS
            .iter()
            .copied()
            .map(TopLevel::Keyword)
            .chain(PRIMITIVE_TYPES.iter().copied().map(TopLevel::Primitive))
            .chain(table.types().map(TopLevel::Type))
            .chain(table.namespaces().map(TopLevel::Namespace))
            .collect()
    }
}

enum TopLevel<'a> {
    Keyword(&'static str),
    Primitive(&'static str),
    Type(&'a TypeDefinition),
    Namespace(&'a NamespaceDefinition),
}

impl<'a> Completable<'a, TopLevelCompleter<'a>> for TopLevel<'a> {
    fn completions(&self, _completer: &TopLevelCompleter<'a>) -> Option<CompletionItem> {
        let (label, kind, detail) = match *self {
            TopLevel::Keyword(keyword) => (keyword.to_string(), CompletionItemKind::KEYWORD, None),
            TopLevel::Primitive(primitive) => (
                primitive.to_string(),
                CompletionItemKind::TYPE_PARAMETER,
                Some("primitive type".to_string()),
            ),
            TopLevel::Type(definition) => (
                definition.name.clone(),
                CompletionItemKind::CLASS,
                Some(definition.header()),
            ),
            TopLevel::Namespace(namespace) => (
                namespace.name.clone(),
                CompletionItemKind::MODULE,
                Some(format!("namespace {}", namespace.name)),
            ),
        };

        Some(CompletionItem {
            label,
            kind: Some(kind),
            detail,
            ..Default::default()
        })
    }
}
