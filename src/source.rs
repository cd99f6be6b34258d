use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::PlError;
use crate::ast::Node;
use crate::error::Diagnostic;
use crate::evaluator::scope;

/// Resolved variables, in assignment order.
pub type Variables = IndexMap<String, JsonValue>;

/// A file pulled in while compiling, kept for caching and auditing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dependency {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(rename = "lineno")]
    pub line: usize,
    pub content: String,
    pub abspath: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SourceAst {
    pub nodes: Vec<Node>,
    /// Only this file's own assignments, included files counting as own.
    pub variables: Variables,
}

/// Output of compiling one PL file. Never mutated once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFile {
    pub resource: String,
    pub version: String,
    pub abspath: String,
    /// Every resolved variable, inherited ones included, child winning over parent.
    pub variables: Variables,
    pub dependencies: Vec<Dependency>,
    pub ast: SourceAst,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl SourceFile {
    pub(crate) fn new(resource: &str, version: &str, abspath: &str) -> Self {
        Self {
            resource: resource.to_string(),
            version: version.to_string(),
            abspath: abspath.to_string(),
            variables: Variables::new(),
            dependencies: Vec::new(),
            ast: SourceAst::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Looks up a variable by dotted path, e.g. `form.inputs`.
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        scope::lookup(&self.variables, path)
    }

    /// Typed access to a variable.
    ///
    /// ```
    /// # use pl_compiler::{Compiler, MemoryRepo};
    /// # tokio_test_block(async {
    /// let repo = MemoryRepo::new("demo").with_file("/main.pl", "max = 10");
    /// let source = Compiler::new(repo).compile("/main.pl", "latest").await.unwrap();
    /// let max: u32 = source.get_as("max").unwrap();
    /// assert_eq!(max, 10);
    /// # });
    /// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
    /// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
    /// # }
    /// ```
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, PlError> {
        let value = self.get(path).ok_or_else(|| PlError::TypeError {
            message: "No such variable".into(),
            key: path.to_string(),
            hint: None,
            code: Some(401),
        })?;
        serde_json::from_value(value.clone()).map_err(|e| PlError::TypeError {
            message: e.to_string(),
            key: path.to_string(),
            hint: Some(format!("Found {}", value)),
            code: Some(402),
        })
    }

    pub fn get_or<T: DeserializeOwned>(&self, path: &str, default: T) -> T {
        self.get_as(path).unwrap_or(default)
    }
}
