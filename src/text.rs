//! Line access on open documents shared by the editor queries.

use ropey::Rope;

/// Text of `line`, or `None` past the end of the document.
pub fn line_text(document: &Rope, line: usize) -> Option<String> {
    (line < document.len_lines()).then(|| document.line(line).to_string())
}

/// Text of `line` up to the cursor, or `None` past the end of the document.
///
/// `character` counts chars and is clamped to the line length.
pub fn text_before_cursor(document: &Rope, line: usize, character: usize) -> Option<String> {
    if line >= document.len_lines() {
        return None;
    }

    let line_slice = document.line(line);
    let end = character.min(line_slice.len_chars());

    Some(line_slice.slice(..end).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_line_length() {
        let rope = Rope::from_str("abc\ndef");

        assert_eq!(text_before_cursor(&rope, 1, 2).as_deref(), Some("de"));
        assert_eq!(text_before_cursor(&rope, 1, 50).as_deref(), Some("def"));
        assert_eq!(text_before_cursor(&rope, 4, 0), None);
    }

    #[test]
    fn whole_line_keeps_line_break() {
        let rope = Rope::from_str("abc\ndef");

        assert_eq!(line_text(&rope, 0).as_deref(), Some("abc\n"));
        assert_eq!(line_text(&rope, 1).as_deref(), Some("def"));
        assert_eq!(line_text(&rope, 2), None);
    }
}
