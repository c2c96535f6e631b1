//! Tag completion after `<` in markup.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Documentation};

use crate::component::{parse_user_source, ComponentDeclaration};

use super::{Completable, Completer, Context};
use crate::text::text_before_cursor;

pub const HTML_TAGS: &[&str] = &[
    "div", "span", "p", "h1", "h2", "h3", "button", "input", "a", "img", "ul", "li", "canvas",
];

static TAG_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(?<partial>\w*)$").unwrap());

pub struct TagCompleter {
    components: Vec<ComponentDeclaration>,
}

impl<'a> Completer<'a> for TagCompleter {
    fn construct(context: Context<'a>, line: usize, character: usize) -> Option<Self>
    where
        Self: Sized + Completer<'a>,
    {
        let before = text_before_cursor(context.document, line, character)?;
        TAG_START_RE.captures(&before)?;

        let components = parse_user_source(&context.document.to_string())
            .into_values()
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .collect();

        Some(TagCompleter { components })
    }

    fn completions(&self) -> Vec<impl Completable<'a, Self>>
    where
        Self: Sized,
    {
        self.components
            .iter()
            .map(|component| TagCompletion::Component(component.clone()))
            .chain(HTML_TAGS.iter().copied().map(TagCompletion::Html))
            .collect()
    }
}

enum TagCompletion {
    Component(ComponentDeclaration),
    Html(&'static str),
}

impl<'a> Completable<'a, TagCompleter> for TagCompletion {
    fn completions(&self, _completer: &TagCompleter) -> Option<CompletionItem> {
        let item = match self {
            TagCompletion::Component(component) => CompletionItem {
                label: component.name.clone(),
                kind: Some(CompletionItemKind::CLASS),
                detail: Some(format!("component {}", component.name)),
                documentation: Some(Documentation::String(
                    component
                        .props_summary()
                        .map(|props| format!("Props: {props}"))
                        .unwrap_or_else(|| "No props".to_string()),
                )),
                ..Default::default()
            },
            TagCompletion::Html(tag) => CompletionItem {
                label: tag.to_string(),
                kind: Some(CompletionItemKind::KEYWORD),
                ..Default::default()
            },
        };

        Some(item)
    }
}
