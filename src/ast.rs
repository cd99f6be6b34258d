use indexmap::IndexMap;
use serde::Serialize;

/// Right-hand side of an assignment, as written in the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum ValueKind {
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    String(String),
    Number(f64),
    Boolean(bool),
    /// `wc-<name>` selector
    Component(String),
    /// `@extends <path>` used as a value
    DictExtends(String),
    /// `@copyurl <path>`
    FileUrl(String),
    /// bare identifier, possibly dotted
    Reference(String),
    /// `@copycontent <path>`
    FileContent(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Value {
    #[serde(flatten)]
    pub kind: ValueKind,
    #[serde(rename = "lineno")]
    pub line: usize,
}

impl Value {
    pub fn new(kind: ValueKind, line: usize) -> Self {
        Self { kind, line }
    }

    pub fn string(text: impl Into<String>, line: usize) -> Self {
        Self::new(ValueKind::String(text.into()), line)
    }

    /// Re-serializes the value as PL source. Performs no I/O.
    pub fn to_raw(&self) -> String {
        match &self.kind {
            ValueKind::Array(items) => {
                let items: Vec<String> = items.iter().map(Value::to_raw).collect();
                format!("[{}]", items.join(", "))
            }
            ValueKind::Object(entries) => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.to_raw()))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            ValueKind::String(s) => quote(s),
            ValueKind::Number(n) => n.to_string(),
            ValueKind::Boolean(b) => b.to_string(),
            ValueKind::Component(selector) => selector.clone(),
            ValueKind::DictExtends(path) => format!("@extends {}", path),
            ValueKind::FileUrl(path) => format!("@copyurl {}", path),
            ValueKind::Reference(name) => name.clone(),
            ValueKind::FileContent(path) => format!("@copycontent {}", path),
        }
    }

    /// True for variants whose resolution may perform I/O or recursive compilation.
    pub fn is_directive(&self) -> bool {
        matches!(
            self.kind,
            ValueKind::DictExtends(_) | ValueKind::FileUrl(_) | ValueKind::FileContent(_)
        )
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        if let ValueKind::Object(entries) = &self.kind {
            Some(entries)
        } else {
            None
        }
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Assignment { key: String, value: Value },
    Comment { text: String },
    Include { path: String },
    Extends { path: String },
}

/// One top-level statement of a PL file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(rename = "lineno")]
    pub line: usize,
    /// Absolute path of the file the statement came from. Empty until evaluated.
    pub origin: String,
}

impl Node {
    pub fn new(kind: NodeKind, line: usize) -> Self {
        Self {
            kind,
            line,
            origin: String::new(),
        }
    }

    pub fn to_raw(&self) -> String {
        match &self.kind {
            NodeKind::Assignment { key, value } => match &value.kind {
                ValueKind::String(s) if s.contains('\n') => {
                    let body = s.strip_suffix('\n').unwrap_or(s);
                    format!("{} ==\n{}\n==", key, body)
                }
                _ => format!("{} = {}", key, value.to_raw()),
            },
            NodeKind::Comment { text } => text.clone(),
            NodeKind::Include { path } => format!("@include {}", path),
            NodeKind::Extends { path } => format!("@extends {}", path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_values_to_raw() {
        let url = Value::new(ValueKind::FileUrl("foo/bar.png".into()), 1);
        assert_eq!(url.to_raw(), "@copyurl foo/bar.png");

        let content = Value::new(ValueKind::FileContent("grader.py".into()), 1);
        assert_eq!(content.to_raw(), "@copycontent grader.py");

        let parent = Value::new(ValueKind::DictExtends("/lib/base.pl".into()), 1);
        assert_eq!(parent.to_raw(), "@extends /lib/base.pl");
        assert!(parent.is_directive());
    }

    #[test]
    fn test_nested_literal_to_raw() {
        let mut entries = IndexMap::new();
        entries.insert("a".to_string(), Value::new(ValueKind::Number(1.0), 1));
        entries.insert(
            "b".to_string(),
            Value::new(
                ValueKind::Array(vec![
                    Value::new(ValueKind::Boolean(true), 1),
                    Value::string("x \"y\"", 1),
                ]),
                1,
            ),
        );
        let obj = Value::new(ValueKind::Object(entries), 1);
        assert_eq!(obj.to_raw(), r#"{a: 1, b: [true, "x \"y\""]}"#);
    }

    #[test]
    fn test_multiline_assignment_to_raw() {
        let node = Node::new(
            NodeKind::Assignment {
                key: "body".into(),
                value: Value::string("line1\nline2\n", 1),
            },
            1,
        );
        assert_eq!(node.to_raw(), "body ==\nline1\nline2\n==");
    }
}
