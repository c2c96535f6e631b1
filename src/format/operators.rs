//! Spacing rules applied to a single trimmed line.
//!
//! String literals and trailing `//` comments are swapped for placeholder
//! tokens before any rule runs and restored afterwards, so their contents
//! are never rewritten.

use once_cell::sync::Lazy;
use regex::Regex;

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

static COMPARISON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*(==|!=|<=|>=)\s*").unwrap());
static LOGICAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*(&&|\|\|)\s*").unwrap());
static COMPOUND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*([+\-*/]=)\s*").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BEFORE_PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(\s*").unwrap());
static BEFORE_CLOSE_PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\)").unwrap());
static COMMA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*,\s*").unwrap());
static RETURN_COLON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)\s*:\s*").unwrap());
static TRAILING_BRACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\{$").unwrap());
static TRAILING_SEMICOLON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+;$").unwrap());

/// A line with its string literals and trailing comment replaced by placeholders.
struct Shielded {
    text: String,
    literals: Vec<String>,
}

impl Shielded {
    fn new(line: &str) -> Shielded {
        let mut text = String::with_capacity(line.len());
        let mut literals = Vec::new();
        let mut rest = line;

        while let Some(start) = rest.find(|c: char| c == '"' || c == '/') {
            let tail = &rest[start..];

            let literal_len = if tail.starts_with('"') {
                // No escape handling; an unterminated literal runs to the end.
                tail[1..].find('"').map(|end| end + 2).unwrap_or(tail.len())
            } else if tail.starts_with("//") {
                tail.len()
            } else {
                text.push_str(&rest[..start + 1]);
                rest = &rest[start + 1..];
                continue;
            };

            text.push_str(&rest[..start]);
            text.push(PLACEHOLDER_OPEN);
            text.push_str(&literals.len().to_string());
            text.push(PLACEHOLDER_CLOSE);
            literals.push(tail[..literal_len].to_string());
            rest = &tail[literal_len..];
        }
        text.push_str(rest);

        Shielded { text, literals }
    }

    fn map(mut self, f: impl FnOnce(&str) -> String) -> Shielded {
        self.text = f(&self.text);
        self
    }

    fn restore(self) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut chars = self.text.chars();

        while let Some(c) = chars.next() {
            if c != PLACEHOLDER_OPEN {
                out.push(c);
                continue;
            }
            let index: String = chars.by_ref().take_while(|&c| c != PLACEHOLDER_CLOSE).collect();
            match index.parse::<usize>().ok().and_then(|i| self.literals.get(i)) {
                Some(literal) => out.push_str(literal),
                None => out.push_str(&index),
            }
        }

        out
    }
}

/// Rewrites every single-character operator accepted by `is_operator` to
/// have exactly one space on each side. `is_operator` sees the raw
/// neighbours of the character.
fn space_single(text: &str, is_operator: impl Fn(char, char, char) -> bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let operator = i > 0 && i + 1 < chars.len() && is_operator(chars[i - 1], c, chars[i + 1]);

        if !operator {
            out.push(c);
            i += 1;
            continue;
        }

        let kept = out.trim_end().len();
        out.truncate(kept);
        if !out.is_empty() {
            out.push(' ');
        }
        out.push(c);
        out.push(' ');

        i += 1;
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
    }

    out
}

fn is_relational(prev: char, c: char, next: char) -> bool {
    const NEIGHBOURS: &[char] = &['<', '>', '=', '-', '/', '!'];
    matches!(c, '<' | '>') && !NEIGHBOURS.contains(&prev) && !NEIGHBOURS.contains(&next)
}

fn is_assignment(prev: char, c: char, next: char) -> bool {
    const BEFORE: &[char] = &['=', '!', '<', '>', '+', '-', '*', '/', '%', '&', '|', '^'];
    c == '=' && !BEFORE.contains(&prev) && next != '=' && next != '>'
}

fn apply_operator_rules(text: &str) -> String {
    let text = COMPARISON_RE.replace_all(text, " $1 ");
    let text = space_single(&text, is_relational);
    let text = LOGICAL_RE.replace_all(&text, " $1 ");
    let text = COMPOUND_RE.replace_all(&text, " $1 ");
    space_single(&text, is_assignment)
}

/// Normalizes operator spacing. Comparison, relational, logical, compound
/// and plain assignment operators are handled in that order.
pub fn space_operators(line: &str) -> String {
    Shielded::new(line)
        .map(apply_operator_rules)
        .restore()
        .trim()
        .to_string()
}

fn normalize_signature(text: &str) -> String {
    let text = WHITESPACE_RE.replace_all(text, " ");
    let text = BEFORE_PAREN_RE.replace_all(&text, "(");
    let text = BEFORE_CLOSE_PAREN_RE.replace_all(&text, ")");
    let text = COMMA_RE.replace_all(&text, ", ");
    TRAILING_BRACE_RE.replace(&text, " {").into_owned()
}

/// `component Name (a,b){` becomes `component Name(a, b) {`.
pub fn normalize_declaration(line: &str) -> String {
    Shielded::new(line)
        .map(normalize_signature)
        .restore()
        .trim()
        .to_string()
}

/// Declaration normalization plus ` : ` before the return type.
pub fn normalize_method(line: &str) -> String {
    Shielded::new(line)
        .map(|text| RETURN_COLON_RE.replace(&normalize_signature(text), ") : ").into_owned())
        .restore()
        .trim()
        .to_string()
}

/// Operator spacing plus no whitespace before a trailing `;`.
pub fn normalize_variable(line: &str) -> String {
    Shielded::new(line)
        .map(|text| {
            let text = apply_operator_rules(text);
            TRAILING_SEMICOLON_RE.replace(text.trim_end(), ";").into_owned()
        })
        .restore()
        .trim()
        .to_string()
}
