/// Parses a numeric literal after stripping `_` group separators.
pub fn normalize_number(lexeme: &str) -> Option<f64> {
    let cleaned: String = lexeme.chars().filter(|c| *c != '_').collect();
    cleaned.parse::<f64>().ok()
}

/// Directory part of an absolute path, always ending without a slash (root is `/`).
pub fn dirname(abspath: &str) -> &str {
    match abspath.rfind('/') {
        Some(0) => "/",
        Some(idx) => &abspath[..idx],
        None => "/",
    }
}

/// Resolves a directive path against the file that contains the directive.
///
/// `/x` is rooted, `~/x` is handed to the repository untouched, anything else
/// is relative to the including file's directory.
pub fn resolve_path(current: &str, raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("~/") {
        return raw.to_string();
    }
    if raw.starts_with('/') {
        return normalize_path(raw);
    }
    if let Some(home_relative) = current.strip_prefix('~') {
        return format!("~{}", resolve_path(home_relative, raw));
    }
    let base = dirname(current);
    normalize_path(&format!("{}/{}", base.trim_end_matches('/'), raw))
}

/// Collapses `.`, `..` and repeated slashes. The result is always absolute.
pub fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}

/// Converts a parsed number into JSON, keeping integral values integral.
pub fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_number() {
        assert_eq!(normalize_number("1_000.5"), Some(1000.5));
        assert_eq!(normalize_number("-42"), Some(-42.0));
        assert_eq!(normalize_number("1_000_000"), Some(1_000_000.0));
        assert_eq!(normalize_number("1.2.3"), None);
    }

    #[test]
    fn test_resolve_relative_and_rooted() {
        assert_eq!(resolve_path("/ex/loop/main.pl", "grader.py"), "/ex/loop/grader.py");
        assert_eq!(resolve_path("/ex/loop/main.pl", "../lib/base.pl"), "/ex/lib/base.pl");
        assert_eq!(resolve_path("/ex/loop/main.pl", "/lib//base.pl"), "/lib/base.pl");
        assert_eq!(resolve_path("/main.pl", "./a.pl"), "/a.pl");
        assert_eq!(resolve_path("/main.pl", "~/shared.pl"), "~/shared.pl");
        assert_eq!(resolve_path("~/lib/shared.pl", "../x.pl"), "~/x.pl");
    }

    #[test]
    fn test_number_to_json() {
        assert_eq!(number_to_json(3.0), serde_json::json!(3));
        assert_eq!(number_to_json(1000.5), serde_json::json!(1000.5));
        assert_eq!(number_to_json(-2.0), serde_json::json!(-2));
    }
}
