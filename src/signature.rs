//! Signature help inside an open `Owner.method(` call.

use once_cell::sync::Lazy;
use regex::Regex;
use ropey::Rope;
use tower_lsp::lsp_types::{
    Documentation, ParameterInformation, ParameterLabel, SignatureHelp, SignatureHelpParams,
    SignatureInformation,
};

use crate::definitions::{DefinitionTable, MethodSignature};
use crate::resolve::resolve_type;
use crate::text::text_before_cursor;

static OPEN_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?<owner>\w+)\.(?<method>\w+)\s*\((?<args>[^)]*)$").unwrap()
});

/// Finds the method named by `owner.method`: static, then instance, then
/// namespace function, then instance method of the owner's variable type.
pub fn lookup_method<'a>(
    table: &'a DefinitionTable,
    document_text: &str,
    owner: &str,
    method: &str,
) -> Option<(String, &'a MethodSignature)> {
    if let Some(definition) = table.type_def(owner) {
        if let Some(found) = definition
            .static_method(method)
            .or_else(|| definition.instance_method(method))
        {
            return Some((definition.name.clone(), found));
        }
    }

    if let Some(found) = table
        .namespace(owner)
        .and_then(|namespace| namespace.function(method))
    {
        return Some((owner.to_string(), found));
    }

    let type_name = resolve_type(document_text, owner)?;
    let found = table.type_def(&type_name)?.instance_method(method)?;
    Some((type_name, found))
}

/// Index of the argument being typed: commas after the last `(`.
fn active_parameter(args: &str) -> u32 {
    let current = args.rsplit('(').next().unwrap_or(args);
    current.matches(',').count() as u32
}

pub fn signature_help(
    table: &DefinitionTable,
    document: &Rope,
    params: &SignatureHelpParams,
) -> Option<SignatureHelp> {
    let position = params.text_document_position_params.position;
    let before = text_before_cursor(
        document,
        position.line as usize,
        position.character as usize,
    )?;

    let captures = OPEN_CALL_RE.captures(&before)?;
    let (owner, method) = lookup_method(
        table,
        &document.to_string(),
        &captures["owner"],
        &captures["method"],
    )?;

    let active = active_parameter(&captures["args"]);
    let signature = SignatureInformation {
        label: format!("{}.{}", owner, method.label()),
        documentation: method
            .external_binding
            .as_ref()
            .map(|binding| Documentation::String(format!("Maps to: {binding}"))),
        parameters: Some(
            method
                .params
                .iter()
                .map(|param| ParameterInformation {
                    label: ParameterLabel::Simple(param.to_string()),
                    documentation: None,
                })
                .collect(),
        ),
        active_parameter: Some(active),
    };

    Some(SignatureHelp {
        signatures: vec![signature],
        active_signature: Some(0),
        active_parameter: Some(active),
    })
}
