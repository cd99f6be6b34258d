// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::PlError;

/// Knobs for a [`Compiler`](crate::Compiler).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use pl_compiler::CompilerOptions;
///
/// let options = CompilerOptions::from_json(r#"{ "max_depth": 8 }"#).unwrap();
/// assert_eq!(options.max_depth, 8);
/// assert_eq!(options.component_prefix, "wc-");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Maximum nesting of `@extends`, `@include` and dict-extends.
    pub max_depth: usize,
    /// Drop a leading `#!lang=` line from multi-line values.
    pub strip_lang_hint: bool,
    /// Prefix that marks a component selector. Empty disables selectors.
    pub component_prefix: String,
    /// Prefix of the URLs minted for `@copyurl`.
    pub url_prefix: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            max_depth: 32,
            strip_lang_hint: true,
            component_prefix: "wc-".to_string(),
            url_prefix: crate::repo::DEFAULT_URL_PREFIX.to_string(),
        }
    }
}

impl CompilerOptions {
    pub fn from_json(content: &str) -> Result<Self, PlError> {
        serde_json::from_str(content).map_err(|e| PlError::SyntaxError {
            message: format!("Invalid compiler options: {}", e),
            line: e.line(),
            hint: Some("Options are a JSON object, e.g. {\"max_depth\": 16}".into()),
            code: Some(220),
        })
    }

    /// Load options from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PlError> {
        let content = fs::read_to_string(&path).map_err(|e| PlError::FileError {
            message: format!("Failed to read file: {}", e),
            path: path.as_ref().to_string_lossy().to_string(),
            hint: Some("Check that the file exists and is readable".into()),
            code: Some(301),
        })?;
        Self::from_json(&content)
    }

    /// Tries `primary` first and falls back to `fallback` when it cannot be read.
    pub fn from_file_with_fallback<P: AsRef<Path>>(primary: P, fallback: P) -> Result<Self, PlError> {
        match Self::from_file(&primary) {
            Ok(options) => Ok(options),
            Err(PlError::FileError { .. }) => Self::from_file(&fallback),
            Err(other) => Err(other),
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_component_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.component_prefix = prefix.into();
        self
    }

    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }
}
