// Author: Dustin Pilgrim
// License: MIT

use crate::ast::Node;
use crate::compiler::Compiler;
use crate::source::SourceFile;
use crate::PlError;

/// Serializes a compiled file to pretty JSON.
///
/// The layout is the one consumers of compiled resources expect:
/// - `variables`, `ast.variables` → plain JSON objects in assignment order
/// - `ast.nodes` → `{"type", "lineno", "origin", ...}` per statement
/// - `dependencies` → `alias` only present for dict-extends
/// - `errors`, `warnings` → `{"lineno", "abspath", "description"}`
pub fn source_file_to_json(source: &SourceFile) -> Result<String, PlError> {
    serde_json::to_string_pretty(source).map_err(|e| PlError::CompileError {
        message: format!("Failed to serialize compiled file: {}", e),
        path: source.abspath.clone(),
    })
}

/// Writes statements back out as PL text, one per line.
pub fn ast_to_source(nodes: &[Node]) -> String {
    let mut out = nodes.iter().map(Node::to_raw).collect::<Vec<_>>().join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Compiles a file and exports it to JSON in one call.
///
/// # Examples
/// ```no_run
/// use pl_compiler::{Compiler, FsRepo, export};
///
/// # async fn run() -> Result<(), pl_compiler::PlError> {
/// let compiler = Compiler::new(FsRepo::new("resources", "loops"));
/// let json = export::export_file(&compiler, "/main.pl", "latest").await?;
/// println!("{}", json);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// Returns the fatal error when the entry file cannot be read, lexed or parsed.
pub async fn export_file(compiler: &Compiler, abspath: &str, version: &str) -> Result<String, PlError> {
    let source = compiler.compile(abspath, version).await?;
    source_file_to_json(&source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, MemoryRepo};
    use serde_json::json;

    #[tokio::test]
    async fn test_export_compiled_file_to_json() {
        let repo = MemoryRepo::new("loops")
            .with_file("/form.pl", "size = 2")
            .with_file("/main.pl", "# header\ntitle = \"Loops\"\nform = @extends form.pl\nx = missing");
        let compiler = Compiler::new(repo);
        let json_output = export_file(&compiler, "/main.pl", "v1").await.expect("Failed to export");

        let exported: serde_json::Value = serde_json::from_str(&json_output).unwrap();
        assert_eq!(exported["resource"], json!("loops"));
        assert_eq!(exported["version"], json!("v1"));
        assert_eq!(exported["variables"], json!({"title": "Loops", "form": {"size": 2}}));
        assert_eq!(exported["ast"]["nodes"][0]["type"], json!("Comment"));
        assert_eq!(exported["ast"]["nodes"][1]["lineno"], json!(2));
        assert_eq!(exported["ast"]["nodes"][1]["origin"], json!("/main.pl"));
        assert_eq!(exported["dependencies"][0]["alias"], json!("form"));
        assert_eq!(exported["errors"][0]["lineno"], json!(4));
        assert_eq!(exported["errors"][0]["abspath"], json!("/main.pl"));
    }

    #[tokio::test]
    async fn test_include_dependency_has_no_alias_key() {
        let repo = MemoryRepo::new("r")
            .with_file("/a.pl", "a = 1")
            .with_file("/main.pl", "@include a.pl");
        let source = Compiler::new(repo).compile("/main.pl", "latest").await.unwrap();
        let exported: serde_json::Value = serde_json::from_str(&source_file_to_json(&source).unwrap()).unwrap();
        assert!(exported["dependencies"][0].get("alias").is_none());
        assert_eq!(exported["dependencies"][0]["content"], json!("a = 1"));
    }

    #[test]
    fn test_ast_to_source_reparses_to_same_values() {
        let input = "# c\n@extends base.pl\nlist = [1, 'two', {k: true}]\nlogo = @copyurl img/logo.png\ntext ==\nhello\nworld\n==\n";
        let program = parse(input).unwrap();
        let written = ast_to_source(&program.nodes);

        let again = parse(&written).unwrap();
        let kinds = |p: &crate::parser::Program| p.nodes.iter().map(|n| n.kind.clone()).collect::<Vec<_>>();
        assert_eq!(kinds(&program), kinds(&again));
    }

    #[test]
    fn test_ast_to_source_empty() {
        assert_eq!(ast_to_source(&[]), "");
    }
}
