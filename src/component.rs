//! Component symbols recovered from a live user document.
//!
//! Every call re-parses the buffer from scratch. Nothing is cached, since
//! the text changes with each keystroke and may be half-typed.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::definitions::{brace_delta, instance_method, MethodSignature};

static COMPONENT_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^component\s+(?<name>\w+)\s*\{").unwrap());

static PROP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^prop\s+(?<mut>mut\s+)?(?<type>\w+)(?<ref>&)?\s+(?<name>\w+)").unwrap()
});

// `==` is a comparison, never a binding.
static STATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:pub\s+)?(?<mut>mut\s+)?(?<type>\w+)\s+(?<name>\w+)\s*=(?:[^=]|$)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropDeclaration {
    pub name: String,
    pub type_name: String,
    pub mutable: bool,
    /// Declared with a `&` suffix on the type.
    pub by_reference: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateDeclaration {
    pub name: String,
    pub type_name: String,
    pub mutable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ComponentDeclaration {
    pub name: String,
    pub props: Vec<PropDeclaration>,
    pub state: Vec<StateDeclaration>,
    pub methods: Vec<MethodSignature>,
}

impl ComponentDeclaration {
    fn new(name: &str) -> ComponentDeclaration {
        ComponentDeclaration {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// `title: string, count: int`, or `None` without props.
    pub fn props_summary(&self) -> Option<String> {
        if self.props.is_empty() {
            return None;
        }
        Some(
            self.props
                .iter()
                .map(|prop| format!("{}: {}", prop.name, prop.type_name))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    /// Applies one statement, trying prop, state, then method.
    fn apply_statement(&mut self, statement: &str) {
        if let Some(caps) = PROP_RE.captures(statement) {
            self.props.push(PropDeclaration {
                name: caps["name"].to_string(),
                type_name: caps["type"].to_string(),
                mutable: caps.name("mut").is_some(),
                by_reference: caps.name("ref").is_some(),
            });
        } else if let Some(caps) = STATE_RE.captures(statement) {
            self.state.push(StateDeclaration {
                name: caps["name"].to_string(),
                type_name: caps["type"].to_string(),
                mutable: caps.name("mut").is_some(),
            });
        } else if let Some(method) = instance_method(statement) {
            self.methods.push(method);
        }
    }
}

/// Extracts every `component Name { ... }` block of `text`.
///
/// Blocks still open at the end of the text are dropped. A later component
/// with the same name replaces the earlier one.
pub fn parse_user_source(text: &str) -> HashMap<String, ComponentDeclaration> {
    let mut components = HashMap::new();
    let mut current: Option<(ComponentDeclaration, i32)> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }

        let body = match COMPONENT_OPEN_RE.captures(trimmed) {
            Some(caps) => {
                current = Some((ComponentDeclaration::new(&caps["name"]), 1));
                match caps.get(0) {
                    Some(opener) => trimmed[opener.end()..].trim(),
                    None => continue,
                }
            }
            None => trimmed,
        };

        let Some((component, depth)) = current.as_mut() else {
            continue;
        };

        *depth += brace_delta(body);
        for statement in split_statements(body) {
            component.apply_statement(statement);
        }

        if *depth <= 0 {
            if let Some((component, _)) = current.take() {
                components.insert(component.name.clone(), component);
            }
        }
    }

    components
}

/// Splits a line on `;` outside double-quoted strings, trimming each piece.
fn split_statements(line: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut in_string = false;
    let mut start = 0;

    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            ';' if !in_string => {
                statements.push(line[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    statements.push(line[start..].trim());

    statements.retain(|statement| !statement.is_empty());
    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_component() {
        let components =
            parse_user_source("component Card { prop mut string& title; int count = 0; }");

        assert_eq!(components.len(), 1);
        let card = &components["Card"];
        assert_eq!(
            card.props,
            vec![PropDeclaration {
                name: "title".into(),
                type_name: "string".into(),
                mutable: true,
                by_reference: true,
            }]
        );
        assert_eq!(
            card.state,
            vec![StateDeclaration {
                name: "count".into(),
                type_name: "int".into(),
                mutable: false,
            }]
        );
    }

    #[test]
    fn multi_line_component_with_methods() {
        let text = r#"
component Counter {
    prop int start;
    prop Theme& theme;
    mut int count = 0;
    string label = "a;b";

    def increment(by: int) : void {
        count += by;
    }

    view {
        <div>{count}</div>
    }
}
"#;

        let components = parse_user_source(text);
        let counter = &components["Counter"];

        let props: Vec<_> = counter
            .props
            .iter()
            .map(|p| (p.name.as_str(), p.type_name.as_str(), p.mutable, p.by_reference))
            .collect();
        assert_eq!(
            props,
            vec![("start", "int", false, false), ("theme", "Theme", false, true)]
        );

        let state: Vec<_> = counter
            .state
            .iter()
            .map(|s| (s.name.as_str(), s.type_name.as_str(), s.mutable))
            .collect();
        assert_eq!(state, vec![("count", "int", true), ("label", "string", false)]);

        assert_eq!(counter.methods.len(), 1);
        assert_eq!(counter.methods[0].name, "increment");
        assert_eq!(counter.methods[0].return_type, "void");
        assert_eq!(counter.props_summary().as_deref(), Some("start: int, theme: Theme"));
    }

    #[test]
    fn prop_with_initializer_is_not_state() {
        let components = parse_user_source("component A {\n    prop int size = 3;\n}\n");

        assert_eq!(components["A"].props.len(), 1);
        assert!(components["A"].state.is_empty());
    }

    #[test]
    fn comparison_is_not_state() {
        let text = "component A {\n    def f() : bool {\n        if ready == true {\n        }\n    }\n}\n";

        let components = parse_user_source(text);

        assert!(components["A"].state.is_empty());
        assert_eq!(components["A"].methods.len(), 1);
    }

    #[test]
    fn several_components_in_one_pass() {
        let text = "\
component First {
    prop int a;
}

int outside = 1;

component Second {
    mut float ratio = 0.5;
}
";

        let components = parse_user_source(text);

        assert_eq!(components.len(), 2);
        assert_eq!(components["First"].props.len(), 1);
        assert_eq!(components["Second"].state[0].name, "ratio");
        assert!(components.values().all(|c| c.state.iter().all(|s| s.name != "outside")));
    }

    #[test]
    fn unterminated_component_is_dropped() {
        let components = parse_user_source("component Half {\n    prop int a;\n");

        assert!(components.is_empty());
    }

    #[test]
    fn duplicate_component_last_wins() {
        let text = "component A {\n    prop int x;\n}\ncomponent A {\n    prop int y;\n}\n";

        let components = parse_user_source(text);

        assert_eq!(components["A"].props[0].name, "y");
        assert_eq!(components["A"].props_summary().as_deref(), Some("y: int"));
    }

    #[test]
    fn split_statements_respects_strings() {
        assert_eq!(
            split_statements(r#"a = "x;y"; b = 2;  "#),
            vec![r#"a = "x;y""#, "b = 2"]
        );
    }
}
