//! Same-line tag balance used for indentation inside `view` blocks.
//!
//! This is a per-line approximation, not tag matching. An opening tag
//! counts only when no closing tag of the same name follows it anywhere on
//! the line, so `<a><a></a>` counts no openers at all.

use once_cell::sync::Lazy;
use regex::Regex;

// A tag without `>` on this line runs to the end of the line.
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(?<close>/)?(?<name>[A-Za-z][\w.:-]*)(?<attrs>[^<>]*)(?:>|$)").unwrap()
});

#[derive(Debug, PartialEq, Eq)]
enum Tag<'a> {
    Open(&'a str),
    Close(&'a str),
    SelfClosing,
}

fn tags(line: &str) -> Vec<Tag<'_>> {
    TAG_RE
        .captures_iter(line)
        .filter_map(|caps| {
            let name = caps.name("name")?.as_str();
            let tag = if caps.name("close").is_some() {
                Tag::Close(name)
            } else if caps["attrs"].trim_end().ends_with('/') {
                Tag::SelfClosing
            } else {
                Tag::Open(name)
            };
            Some(tag)
        })
        .collect()
}

/// Indentation change a view line causes for the lines after it.
///
/// Openers not closed later on the line count up. Closers with no opener
/// earlier on the line count down, except a leading closer, which has
/// already dedented the line itself.
pub fn tag_balance(line: &str) -> i32 {
    let tags = tags(line);

    let mut opens = 0;
    let mut closes = 0;
    for (i, tag) in tags.iter().enumerate() {
        match *tag {
            Tag::Open(name) if !tags[i + 1..].contains(&Tag::Close(name)) => opens += 1,
            Tag::Close(name) if !tags[..i].contains(&Tag::Open(name)) => closes += 1,
            _ => {}
        }
    }

    let leading = i32::from(line.starts_with("</") && closes > 0);

    opens - (closes - leading)
}

/// Whether a tag is still unterminated at the end of `line`.
///
/// `open` says whether the line starts inside a tag left open by an earlier
/// line. Quoted attribute values may contain `>`.
pub fn tag_open_after(line: &str, open: bool) -> bool {
    let mut in_tag = open;
    let mut in_quote = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_tag => in_quote = !in_quote,
            '>' if in_tag && !in_quote => in_tag = false,
            '<' if !in_tag => {
                in_tag = chars
                    .peek()
                    .is_some_and(|next| next.is_ascii_alphabetic() || *next == '/');
            }
            _ => {}
        }
    }

    in_tag
}
