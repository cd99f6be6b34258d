// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;

use tracing::{debug, error};

use crate::PlError;
use crate::config::CompilerOptions;
use crate::evaluator::Evaluator;
use crate::lexer::{Lexer, Token};
use crate::parser::{parse_tokens, Program};
use crate::repo::{read_source, FileDescriptor, Repo};
use crate::source::SourceFile;

/// Stage a single file goes through while being compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Lexing,
    Parsing,
    Evaluating,
    Done,
    Fatal,
}

/// Compiles PL files read from a [`Repo`].
///
/// ```
/// use pl_compiler::{Compiler, MemoryRepo};
///
/// # fn main() -> Result<(), pl_compiler::PlError> {
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let repo = MemoryRepo::new("loops")
///     .with_file("/base.pl", "title = \"Base\"\ndifficulty = 1")
///     .with_file("/main.pl", "@extends base.pl\ntitle = \"Loops\"");
/// let source = Compiler::new(repo).compile("/main.pl", "latest").await?;
///
/// assert_eq!(source.get("title"), Some(&serde_json::json!("Loops")));
/// assert_eq!(source.get("difficulty"), Some(&serde_json::json!(1)));
/// # Ok(())
/// # })
/// # }
/// ```
#[derive(Clone)]
pub struct Compiler {
    repo: Arc<dyn Repo>,
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(repo: impl Repo + 'static) -> Self {
        Self::from_shared(Arc::new(repo))
    }

    /// Compiler over a repository that is shared with other owners.
    pub fn from_shared(repo: Arc<dyn Repo>) -> Self {
        Self {
            repo,
            options: CompilerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn repo(&self) -> &dyn Repo {
        self.repo.as_ref()
    }

    /// Compiles the file at `abspath`.
    ///
    /// Fails only when the file itself cannot be read, lexed or parsed;
    /// everything else ends up in [`SourceFile::errors`].
    #[tracing::instrument(name = "compile", level = "info", skip(self))]
    pub async fn compile(&self, abspath: &str, version: &str) -> Result<SourceFile, PlError> {
        debug!(phase = ?Phase::Pending, "reading");
        let (file, text) = read_source(self.repo.as_ref(), abspath, version)
            .await
            .inspect_err(|e| error!(phase = ?Phase::Fatal, error = %e, "cannot read"))?;
        self.compile_text(&file, &text).await
    }

    /// Compiles `text` as if it were stored at `file`. Directives still go
    /// through the repository.
    pub async fn compile_source(&self, text: &str, file: &FileDescriptor) -> Result<SourceFile, PlError> {
        self.compile_text(file, text).await
    }

    async fn compile_text(&self, file: &FileDescriptor, text: &str) -> Result<SourceFile, PlError> {
        let program = parse_source(text, &file.abspath, &self.options)?;

        debug!(phase = ?Phase::Evaluating, abspath = %file.abspath, statements = program.nodes.len());
        let source = Evaluator::new(self.repo.as_ref(), &self.options, file, Vec::new())
            .run(program)
            .await;

        debug!(
            phase = ?Phase::Done,
            abspath = %source.abspath,
            errors = source.errors.len(),
            warnings = source.warnings.len()
        );
        Ok(source)
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler").field("options", &self.options).finish_non_exhaustive()
    }
}

/// Lexes then parses one file. Used for the entry file and for every nested one.
pub(crate) fn parse_source(text: &str, abspath: &str, options: &CompilerOptions) -> Result<Program, PlError> {
    debug!(phase = ?Phase::Lexing, abspath);
    let tokens = Lexer::new(text)
        .with_component_prefix(options.component_prefix.clone())
        .collect::<Result<Vec<Token>, PlError>>()
        .inspect_err(|e| error!(phase = ?Phase::Fatal, abspath, error = %e))?;

    debug!(phase = ?Phase::Parsing, abspath, tokens = tokens.len());
    parse_tokens(tokens, options).inspect_err(|e| error!(phase = ?Phase::Fatal, abspath, error = %e))
}
