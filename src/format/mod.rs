//! Indentation and spacing formatter for COI source.
//!
//! The formatter works line by line and never builds a syntax tree. A small
//! state machine tracks three kinds of block:
//!
//! | Block | Opened by | Contents |
//! |-------|-----------|----------|
//! | brace | a line ending in `{` | re-spaced and indented |
//! | style | `style {` / `style global {` | indented, otherwise verbatim |
//! | view | `view {` | indented by brace and same-line tag balance |
//!
//! Input it cannot classify still gets indentation and operator spacing;
//! nothing here reports errors.

mod operators;
mod tags;

pub use operators::space_operators;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Settings;

static STYLE_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^style(?<global>\s+global)?\s*\{$").unwrap());

static VIEW_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^view\s*\{").unwrap());

static COMPONENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^component\b").unwrap());

static METHOD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^def\b").unwrap());

static VARIABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:pub\s+)?(?:mut\s+)?[A-Za-z_]\w*&?\s+[A-Za-z_]\w*").unwrap()
});

static MARKUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^</?[A-Za-z]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub indent_width: usize,
    pub use_spaces: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            indent_width: 4,
            use_spaces: true,
        }
    }
}

impl From<&Settings> for FormatOptions {
    fn from(settings: &Settings) -> Self {
        FormatOptions {
            indent_width: settings.indent_width.max(1),
            use_spaces: !settings.use_tabs,
        }
    }
}

impl FormatOptions {
    fn indent(&self, level: usize) -> String {
        match self.use_spaces {
            true => " ".repeat(level * self.indent_width),
            false => "\t".repeat(level),
        }
    }
}

/// Re-indents and re-spaces `text`.
///
/// Line breaks are kept, including a trailing newline. Lines end in `\n`
/// on output.
pub fn format(text: &str, options: &FormatOptions) -> String {
    let mut formatter = LineFormatter::new(options);
    text.split('\n').map(|line| formatter.line(line)).join("\n")
}

/// Rewrites one trimmed line outside style blocks, first matching rule wins.
fn rewrite(trimmed: &str) -> String {
    if trimmed.starts_with("//") || MARKUP_RE.is_match(trimmed) {
        trimmed.to_string()
    } else if COMPONENT_RE.is_match(trimmed) {
        operators::normalize_declaration(trimmed)
    } else if METHOD_RE.is_match(trimmed) {
        operators::normalize_method(trimmed)
    } else if VARIABLE_RE.is_match(trimmed) {
        operators::normalize_variable(trimmed)
    } else {
        space_operators(trimmed)
    }
}

/// Whether a line opens a brace block: it ends in `{` and has no `}` other
/// than a leading closer, so `} else {` opens one again.
fn opens_block(trimmed: &str) -> bool {
    let body = trimmed.strip_prefix('}').unwrap_or(trimmed);
    trimmed.ends_with('{') && !body.contains('}')
}

struct LineFormatter<'o> {
    options: &'o FormatOptions,
    indent: usize,
    in_style: bool,
    /// Rule blocks open inside the current style block.
    style_depth: usize,
    in_view: bool,
    /// A markup tag opened on an earlier line has not seen its `>` yet.
    in_tag: bool,
}

impl<'o> LineFormatter<'o> {
    fn new(options: &'o FormatOptions) -> Self {
        LineFormatter {
            options,
            indent: 0,
            in_style: false,
            style_depth: 0,
            in_view: false,
            in_tag: false,
        }
    }

    fn emit(&self, text: &str) -> String {
        format!("{}{}", self.options.indent(self.indent), text)
    }

    fn shift(&mut self, delta: i32) {
        self.indent = self.indent.saturating_add_signed(delta as isize);
    }

    fn line(&mut self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        if self.in_style {
            return self.style_line(trimmed);
        }

        if self.in_tag {
            return self.tag_continuation(trimmed);
        }

        if let Some(caps) = STYLE_OPEN_RE.captures(trimmed) {
            let opener = match caps.name("global") {
                Some(_) => "style global {",
                None => "style {",
            };
            let out = self.emit(opener);
            self.indent += 1;
            self.in_style = true;
            self.style_depth = 0;
            return out;
        }

        if trimmed.starts_with('}') || trimmed.starts_with("</") {
            self.shift(-1);
        }

        let out = self.emit(&rewrite(trimmed));

        if trimmed.starts_with("//") {
            return out;
        }

        if VIEW_OPEN_RE.is_match(trimmed) {
            self.in_view = true;
        } else if self.in_view && trimmed == "}" {
            self.in_view = false;
        }

        if self.in_view {
            self.shift(tags::tag_balance(trimmed));
        }

        if MARKUP_RE.is_match(trimmed) {
            self.in_tag = tags::tag_open_after(trimmed, false);
        }

        if opens_block(trimmed) {
            self.indent += 1;
        }

        out
    }

    /// Attribute lines of a tag spanning several lines are kept verbatim.
    fn tag_continuation(&mut self, trimmed: &str) -> String {
        let out = self.emit(trimmed);
        self.in_tag = tags::tag_open_after(trimmed, true);
        if self.in_view && !self.in_tag {
            self.shift(tags::tag_balance(trimmed));
        }
        out
    }

    /// Style content is re-indented but never rewritten. The bare `}` that
    /// balances the opener ends the style block.
    fn style_line(&mut self, trimmed: &str) -> String {
        if trimmed.starts_with('}') {
            self.shift(-1);
            match self.style_depth {
                0 => self.in_style = false,
                _ => self.style_depth -= 1,
            }
        }

        let out = self.emit(trimmed);

        if self.in_style && opens_block(trimmed) {
            self.style_depth += 1;
            self.indent += 1;
        }

        out
    }
}
