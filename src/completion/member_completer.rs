//! Member completion after `Owner.` or `variable.`
//!
//! The owner is looked up as a declared type (static methods) and as a
//! namespace (functions). Only when neither offers anything is it treated
//! as a variable, and the instance methods of its resolved type are listed.

use once_cell::sync::Lazy;
use regex::Regex;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, Documentation, InsertTextFormat,
};

use crate::definitions::MethodSignature;
use crate::resolve::resolve_type;

use super::{Completable, Completer, Context};
use crate::text::text_before_cursor;

static MEMBER_ACCESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?<owner>\w+)\.\s*(?<partial>\w*)$").unwrap());

pub struct MemberCompleter<'a> {
    owner: String,
    partial: String,
    context: Context<'a>,
}

impl<'a> Completer<'a> for MemberCompleter<'a> {
    fn construct(context: Context<'a>, line: usize, character: usize) -> Option<Self>
    where
        Self: Sized + Completer<'a>,
    {
        let before = text_before_cursor(context.document, line, character)?;
        let captures = MEMBER_ACCESS_RE.captures(&before)?;

        Some(MemberCompleter {
            owner: captures["owner"].to_string(),
            partial: captures["partial"].to_lowercase(),
            context,
        })
    }

    fn completions(&self) -> Vec<impl Completable<'a, Self>>
    where
        Self: Sized,
    {
        let table = self.context.table;
        let mut members = Vec::new();

        if let Some(definition) = table.type_def(&self.owner) {
            members.extend(definition.static_methods.iter().map(|method| Member {
                owner: definition.name.as_str(),
                method,
                kind: CompletionItemKind::METHOD,
            }));
        }

        if let Some(namespace) = table.namespace(&self.owner) {
            members.extend(namespace.functions.iter().map(|method| Member {
                owner: namespace.name.as_str(),
                method,
                kind: CompletionItemKind::FUNCTION,
            }));
        }

        if members.is_empty() {
            let text = self.context.document.to_string();
            if let Some(definition) =
                resolve_type(&text, &self.owner).and_then(|name| table.type_def(&name))
            {
                members.extend(definition.instance_methods.iter().map(|method| Member {
                    owner: definition.name.as_str(),
                    method,
                    kind: CompletionItemKind::METHOD,
                }));
            }
        }

        members
            .into_iter()
            .filter(|member| member.method.name.to_lowercase().starts_with(&self.partial))
            .collect()
    }
}

struct Member<'a> {
    owner: &'a str,
    method: &'a MethodSignature,
    kind: CompletionItemKind,
}

impl<'a> Completable<'a, MemberCompleter<'a>> for Member<'a> {
    fn completions(&self, _completer: &MemberCompleter<'a>) -> Option<CompletionItem> {
        Some(CompletionItem {
            label: self.method.name.clone(),
            kind: Some(self.kind),
            detail: Some(format!("{}.{}", self.owner, self.method.label())),
            documentation: self
                .method
                .external_binding
                .as_ref()
                .map(|binding| Documentation::String(format!("Maps to: {binding}"))),
            insert_text: Some(self.method.snippet()),
            insert_text_format: Some(InsertTextFormat::SNIPPET),
            ..Default::default()
        })
    }
}
