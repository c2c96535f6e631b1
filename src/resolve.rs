//! Textual variable-to-type lookup.
//!
//! The search covers the whole document and ignores scoping: a variable of
//! the same name declared in an unrelated block can win.

use regex::Regex;

/// Finds the type name bound to `variable` by the first declaration in `text`.
///
/// Patterns are tried in order and the first one with any match decides:
/// `Type name =`, `Type name ;`, `mut Type name =`. An `=` that starts `==`
/// is not a declaration.
pub fn resolve_type(text: &str, variable: &str) -> Option<String> {
    if variable.is_empty() {
        return None;
    }

    let name = regex::escape(variable);
    let patterns = [
        format!(r"(\w+)\s+{name}\s*=(?:[^=]|$)"),
        format!(r"(\w+)\s+{name}\s*;"),
        format!(r"mut\s+(\w+)\s+{name}\s*=(?:[^=]|$)"),
    ];

    patterns.iter().find_map(|pattern| {
        let re = Regex::new(pattern).ok()?;
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}
