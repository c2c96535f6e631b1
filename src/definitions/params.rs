use super::Parameter;

/// Parses the text between a method's parentheses.
///
/// `"x: int, y: float"` gives `[(x, int), (y, float)]`. Each segment splits
/// on its first colon; a segment without one keeps its name and has no type.
pub fn parse_params(raw: &str) -> Vec<Parameter> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    raw.split(',')
        .map(|segment| match segment.split_once(':') {
            Some((name, type_name)) => Parameter {
                name: name.trim().to_string(),
                type_name: Some(type_name.trim().to_string()),
            },
            None => Parameter {
                name: segment.trim().to_string(),
                type_name: None,
            },
        })
        .collect()
}
