//! Completion provider for COI documents.
//!
//! Completers are tried in order and the first one that recognizes the
//! text before the cursor answers the request:
//!
//! | Completer | Trigger | Offers |
//! |-----------|---------|--------|
//! | [`MemberCompleter`] | `Owner.part` | static methods, namespace functions, instance methods |
//! | [`TagCompleter`] | `<part` | components in the buffer, HTML tags |
//! | [`TopLevelCompleter`] | anything else | keywords, primitives, types, namespaces |

use ropey::Rope;
use tower_lsp::lsp_types::{CompletionItem, CompletionList, CompletionParams, CompletionResponse};

use crate::definitions::DefinitionTable;

use self::member_completer::MemberCompleter;
use self::tag_completer::TagCompleter;
use self::top_level_completer::TopLevelCompleter;

mod member_completer;
mod tag_completer;
mod top_level_completer;

#[derive(Clone, Copy)]
pub struct Context<'a> {
    table: &'a DefinitionTable,
    document: &'a Rope,
}

pub trait Completer<'a>: Sized {
    fn construct(context: Context<'a>, line: usize, character: usize) -> Option<Self>
    where
        Self: Sized + Completer<'a>;

    fn completions(&self) -> Vec<impl Completable<'a, Self>>
    where
        Self: Sized;
}

pub trait Completable<'a, T: Completer<'a>>: Sized {
    fn completions(&self, completer: &T) -> Option<CompletionItem>;
}

pub fn get_completions(
    table: &DefinitionTable,
    document: &Rope,
    params: &CompletionParams,
) -> Option<CompletionResponse> {
    let completion_context = Context { table, document };
    let position = params.text_document_position.position;

    run_completer::<MemberCompleter>(completion_context, position.line, position.character)
        .or_else(|| {
            run_completer::<TagCompleter>(completion_context, position.line, position.character)
        })
        .or_else(|| {
            run_completer::<TopLevelCompleter>(
                completion_context,
                position.line,
                position.character,
            )
        })
}

fn run_completer<'a, T: Completer<'a>>(
    context: Context<'a>,
    line: u32,
    character: u32,
) -> Option<CompletionResponse> {
    let completer = T::construct(context, line as usize, character as usize)?;
    let completions = completer
        .completions()
        .into_iter()
        .flat_map(|completable| completable.completions(&completer))
        .collect::<Vec<CompletionItem>>();

    Some(CompletionResponse::List(CompletionList {
        is_incomplete: false,
        items: completions,
    }))
}
