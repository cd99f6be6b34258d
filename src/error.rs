use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal errors raised while compiling a PL file.
///
/// Lexical and syntax errors abort compilation of the file they occur in;
/// no `SourceFile` is produced for it. Everything recoverable is reported as
/// a [`Diagnostic`] instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlError {
    #[error("[PL] Lexical Error at line {line}: {message}{}", suffix(.hint, .code))]
    LexError {
        message: String,
        line: usize,
        hint: Option<String>,
        code: Option<u32>,
    },

    #[error("[PL] Syntax Error at line {line}: {message}{}", suffix(.hint, .code))]
    SyntaxError {
        message: String,
        line: usize,
        hint: Option<String>,
        code: Option<u32>,
    },

    /// Raised by a repository when a file cannot be located or read.
    #[error("[PL] File Error '{path}': {message}{}", suffix(.hint, .code))]
    FileError {
        message: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },

    /// Raised when a compiled variable does not have the requested shape.
    #[error("[PL] Type Error for '{key}': {message}{}", suffix(.hint, .code))]
    TypeError {
        message: String,
        key: String,
        hint: Option<String>,
        code: Option<u32>,
    },

    /// Raised for nesting problems (circular directives, depth limit).
    #[error("[PL] Compile Error in '{path}': {message}")]
    CompileError { message: String, path: String },
}

fn suffix(hint: &Option<String>, code: &Option<u32>) -> String {
    format!(
        "{}{}",
        hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h)),
        code.map_or(String::new(), |c| format!(" Code: {}", c))
    )
}

impl PlError {
    pub fn lex(message: impl Into<String>, line: usize, code: u32) -> Self {
        PlError::LexError {
            message: message.into(),
            line,
            hint: None,
            code: Some(code),
        }
    }

    pub fn syntax(message: impl Into<String>, line: usize, code: u32) -> Self {
        PlError::SyntaxError {
            message: message.into(),
            line,
            hint: None,
            code: Some(code),
        }
    }

    pub fn file(message: impl Into<String>, path: impl Into<String>, code: u32) -> Self {
        PlError::FileError {
            message: message.into(),
            path: path.into(),
            hint: None,
            code: Some(code),
        }
    }

    pub fn with_hint(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            PlError::LexError { hint, .. }
            | PlError::SyntaxError { hint, .. }
            | PlError::FileError { hint, .. }
            | PlError::TypeError { hint, .. } => *hint = Some(text.into()),
            PlError::CompileError { .. } => {}
        }
        self
    }

    /// Source line the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            PlError::LexError { line, .. } | PlError::SyntaxError { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<u32> {
        match self {
            PlError::LexError { code, .. }
            | PlError::SyntaxError { code, .. }
            | PlError::FileError { code, .. }
            | PlError::TypeError { code, .. } => *code,
            PlError::CompileError { .. } => None,
        }
    }

    pub fn is_syntactic(&self) -> bool {
        matches!(self, PlError::LexError { .. } | PlError::SyntaxError { .. })
    }
}

/// A recoverable error or a warning attached to a compiled file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(rename = "lineno")]
    pub line: usize,
    pub abspath: String,
    pub description: String,
}

impl Diagnostic {
    pub fn new(line: usize, abspath: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            line,
            abspath: abspath.into(),
            description: description.into(),
        }
    }

    /// Wraps a fatal error raised by a nested file so the including file can keep going.
    ///
    /// Lexical and syntax errors point into `nested`; anything else points at the
    /// directive (`line` in `current`).
    pub fn from_nested(err: &PlError, nested: &str, line: usize, current: &str) -> Self {
        match err.line() {
            Some(nested_line) => Self::new(nested_line, nested, err.to_string()),
            None => Self::new(line, current, err.to_string()),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.abspath, self.line, self.description)
    }
}
