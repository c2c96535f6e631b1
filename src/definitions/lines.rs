//! Per-line recognizers for declaration documents.
//!
//! Each recognizer is anchored at the start of an already trimmed line.
//! [`DeclLine::member`] tries the member forms in a fixed priority: static
//! method, instance method, binding comment. A later form is only tried
//! when every earlier one failed.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{parse_params, ExternalBinding, MethodSignature};

static TYPE_OPEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^type\s+(?<name>\w+)(?:\s+extends\s+(?<parent>\w+))?\s*\{").unwrap()
});

static NAMESPACE_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^namespace\s+(?<name>\w+)\s*\{").unwrap());

static STATIC_METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^type\s+def\s+(?<name>\w+)\s*\((?<params>[^)]*)\)\s*:\s*(?<ret>\w+)").unwrap()
});

static INSTANCE_METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^def\s+(?<name>\w+)\s*\((?<params>[^)]*)\)\s*:\s*(?<ret>\w+)").unwrap()
});

static BINDING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"//\s*maps to:\s*(?<module>\w+)::(?<function>\w+)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclLine<'a> {
    TypeBlockStart {
        name: String,
        parent: Option<String>,
        /// Text after the opening brace.
        rest: &'a str,
    },
    NamespaceBlockStart {
        name: String,
        rest: &'a str,
    },
    StaticMethod(MethodSignature),
    InstanceMethod(MethodSignature),
    BindingComment(ExternalBinding),
    Other,
}

impl<'a> DeclLine<'a> {
    /// Recognizes `type Name [extends Parent] {` and `namespace Name {`.
    pub fn opener(trimmed: &'a str) -> Option<DeclLine<'a>> {
        if let Some(caps) = TYPE_OPEN_RE.captures(trimmed) {
            return Some(DeclLine::TypeBlockStart {
                name: caps["name"].to_string(),
                parent: caps.name("parent").map(|m| m.as_str().to_string()),
                rest: &trimmed[caps.get(0)?.end()..],
            });
        }

        NAMESPACE_OPEN_RE.captures(trimmed).and_then(|caps| {
            Some(DeclLine::NamespaceBlockStart {
                name: caps["name"].to_string(),
                rest: &trimmed[caps.get(0)?.end()..],
            })
        })
    }

    /// Classifies a line inside an open block.
    pub fn member(trimmed: &str) -> DeclLine<'a> {
        if let Some(method) = static_method(trimmed) {
            DeclLine::StaticMethod(method)
        } else if let Some(method) = instance_method(trimmed) {
            DeclLine::InstanceMethod(method)
        } else if let Some(binding) = binding_comment(trimmed) {
            DeclLine::BindingComment(binding)
        } else {
            DeclLine::Other
        }
    }
}

fn method_from(re: &Regex, trimmed: &str, is_static: bool) -> Option<MethodSignature> {
    let caps = re.captures(trimmed)?;
    Some(MethodSignature {
        name: caps["name"].to_string(),
        params: parse_params(&caps["params"]),
        return_type: caps["ret"].to_string(),
        is_static,
        external_binding: None,
    })
}

/// `type def name(params) : ReturnType`
pub fn static_method(trimmed: &str) -> Option<MethodSignature> {
    method_from(&STATIC_METHOD_RE, trimmed, true)
}

/// `def name(params) : ReturnType`
pub fn instance_method(trimmed: &str) -> Option<MethodSignature> {
    method_from(&INSTANCE_METHOD_RE, trimmed, false)
}

/// `// maps to: module::function`
pub fn binding_comment(trimmed: &str) -> Option<ExternalBinding> {
    let caps = BINDING_RE.captures(trimmed)?;
    Some(ExternalBinding {
        module: caps["module"].to_string(),
        function: caps["function"].to_string(),
    })
}

/// Net brace depth change of a line: opens minus closes.
pub fn brace_delta(line: &str) -> i32 {
    line.chars().fold(0, |delta, c| match c {
        '{' => delta + 1,
        '}' => delta - 1,
        _ => delta,
    })
}
