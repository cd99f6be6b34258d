use serde_json::{Map, Value as JsonValue};

use crate::source::Variables;

/// Resolves a dotted name such as `form.inputs.0` against the variables.
///
/// An exact key wins over traversal, so a variable literally named `a.b`
/// shadows `a` → `b`.
pub fn lookup<'v>(vars: &'v Variables, path: &str) -> Option<&'v JsonValue> {
    if let Some(value) = vars.get(path) {
        return Some(value);
    }

    let mut segments = path.split('.');
    let mut current = vars.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            JsonValue::Object(map) => map.get(segment)?,
            JsonValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Assigns `value` at a dotted path, creating intermediate objects as needed.
pub fn assign(vars: &mut Variables, path: &str, value: JsonValue) -> Result<(), String> {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return Err("Empty variable name".into());
    };
    let Some((first, rest)) = parents.split_first() else {
        vars.insert(path.to_string(), value);
        return Ok(());
    };

    let mut current = vars
        .entry(first.to_string())
        .or_insert_with(|| JsonValue::Object(Map::new()));
    let mut walked = first.to_string();
    for segment in rest {
        current = match current {
            JsonValue::Object(map) => map
                .entry(segment.to_string())
                .or_insert_with(|| JsonValue::Object(Map::new())),
            _ => return Err(not_an_object(path, &walked)),
        };
        walked.push('.');
        walked.push_str(segment);
    }

    match current {
        JsonValue::Object(map) => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        _ => Err(not_an_object(path, &walked)),
    }
}

fn not_an_object(path: &str, prefix: &str) -> String {
    format!("Cannot assign '{}': '{}' is not a dictionary", path, prefix)
}
