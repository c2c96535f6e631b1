//! `textDocument/formatting`: the whole document is replaced by one edit.

use ropey::Rope;
use tower_lsp::lsp_types::{FormattingOptions, Position, Range, TextEdit};

use crate::format::{format, FormatOptions};

impl From<&FormattingOptions> for FormatOptions {
    fn from(options: &FormattingOptions) -> Self {
        FormatOptions {
            indent_width: (options.tab_size as usize).max(1),
            use_spaces: options.insert_spaces,
        }
    }
}

/// Range covering every character of `document`.
fn full_range(document: &Rope) -> Range {
    let last_line = document.len_lines().saturating_sub(1);
    let last_line_chars = document.line(last_line).len_chars();

    Range {
        start: Position::new(0, 0),
        end: Position::new(last_line as u32, last_line_chars as u32),
    }
}

/// Formats `document`, or `None` when the formatter changes nothing.
pub fn formatting_edits(document: &Rope, options: &FormatOptions) -> Option<Vec<TextEdit>> {
    let original = document.to_string();
    let formatted = format(&original, options);

    if formatted == original {
        return None;
    }

    Some(vec![TextEdit {
        range: full_range(document),
        new_text: formatted,
    }])
}
