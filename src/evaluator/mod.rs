// Author: Dustin Pilgrim
// License: MIT

//! Walks parsed statements in order and builds a [`SourceFile`].
//!
//! Everything here runs strictly one step at a time: each directive is
//! awaited before the next statement is looked at, so repository reads happen
//! in source order and later assignments always see earlier ones.

use std::collections::HashSet;

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, warn};

use crate::PlError;
use crate::ast::{Node, NodeKind, Value};
use crate::compiler::parse_source;
use crate::config::CompilerOptions;
use crate::error::Diagnostic;
use crate::parser::Program;
use crate::repo::{read_source, FileDescriptor, Repo};
use crate::source::{Dependency, SourceFile};
use crate::utils::resolve_path;

pub mod scope;
mod value;

pub(crate) struct Evaluator<'r> {
    repo: &'r dyn Repo,
    options: &'r CompilerOptions,
    source: SourceFile,
    /// File whose statements are being visited; differs from the output file inside an @include.
    current: String,
    /// Files currently open above this point, outermost first.
    stack: Vec<String>,
    included: HashSet<String>,
    /// Key of the assignment being resolved.
    assigning: Option<String>,
}

impl<'r> Evaluator<'r> {
    pub(crate) fn new(
        repo: &'r dyn Repo,
        options: &'r CompilerOptions,
        file: &FileDescriptor,
        mut stack: Vec<String>,
    ) -> Self {
        stack.push(file.abspath.clone());
        Self {
            repo,
            options,
            source: SourceFile::new(&file.resource, &file.version, &file.abspath),
            current: file.abspath.clone(),
            stack,
            included: HashSet::new(),
            assigning: None,
        }
    }

    /// Evaluates every statement of the file and returns the finished output.
    pub(crate) async fn run(mut self, program: Program) -> SourceFile {
        let abspath = self.current.clone();
        self.take_notes(&program, &abspath);

        for mut node in program.nodes {
            node.origin = self.current.clone();
            self.visit(&node).await;
            self.source.ast.nodes.push(node);
        }

        debug!(
            abspath = %self.source.abspath,
            variables = self.source.variables.len(),
            errors = self.source.errors.len(),
            "evaluated"
        );
        self.source
    }

    async fn visit(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Comment { .. } => {}
            NodeKind::Assignment { key, value } => self.visit_assignment(key, value).await,
            NodeKind::Include { path } => self.visit_include(path, node.line).await,
            NodeKind::Extends { path } => self.visit_extends(path, node.line).await,
        }
    }

    async fn visit_assignment(&mut self, key: &str, value: &Value) {
        self.assigning = Some(key.to_string());
        let resolved = self.resolve(value).await;
        self.assigning = None;

        let resolved = match resolved {
            Ok(v) => v,
            Err(diagnostic) => return self.error(diagnostic),
        };
        if let Err(message) = scope::assign(&mut self.source.variables, key, resolved.clone()) {
            return self.error(Diagnostic::new(value.line, self.current.clone(), message));
        }
        if let Err(message) = scope::assign(&mut self.source.ast.variables, key, resolved) {
            self.error(Diagnostic::new(value.line, self.current.clone(), message));
        }
    }

    /// Splices another file's statements in place, as if they were written here.
    fn visit_include<'a>(&'a mut self, raw: &'a str, line: usize) -> BoxFuture<'a, ()> {
        async move {
            let target = resolve_path(&self.current, raw);
            debug!(from = %self.current, path = %target, "@include");

            if let Err(e) = self.check_nesting(&target) {
                return self.error(Diagnostic::new(line, self.current.clone(), e.to_string()));
            }
            let (file, text) = match read_source(self.repo, &target, &self.source.version).await {
                Ok(found) => found,
                Err(e) => {
                    let message = format!("Cannot include '{}': {}", raw, e);
                    return self.error(Diagnostic::new(line, self.current.clone(), message));
                }
            };

            if !self.included.insert(file.abspath.clone()) {
                let message = format!("'{}' is included more than once", file.abspath);
                self.warning(Diagnostic::new(line, self.current.clone(), message));
            }
            self.source.dependencies.push(Dependency {
                alias: None,
                line,
                content: text.clone(),
                abspath: file.abspath.clone(),
            });

            let program = match parse_source(&text, &file.abspath, self.options) {
                Ok(program) => program,
                Err(e) => {
                    return self.error(Diagnostic::from_nested(&e, &file.abspath, line, &self.current));
                }
            };
            self.take_notes(&program, &file.abspath);

            let outer = std::mem::replace(&mut self.current, file.abspath.clone());
            self.stack.push(file.abspath);
            for node in &program.nodes {
                self.visit(node).await;
            }
            self.stack.pop();
            self.current = outer;
        }
        .boxed()
    }

    /// Merges a parent file into this one. Keys this file assigns itself are never overwritten.
    async fn visit_extends(&mut self, raw: &str, line: usize) {
        let target = resolve_path(&self.current, raw);
        debug!(from = %self.current, path = %target, "@extends");

        let parent = match self.compile_nested(target.clone()).await {
            Ok((parent, _)) => parent,
            Err(e) => {
                let message = Diagnostic::from_nested(&e, &target, line, &self.current);
                return self.error(message);
            }
        };

        self.absorb(&parent);
        for (key, value) in parent.variables {
            if !self.source.ast.variables.contains_key(&key) {
                self.source.variables.insert(key, value);
            }
        }
    }

    /// Compiles another file on its own, sharing the repository and open-file stack.
    ///
    /// Returns the compiled file and its text.
    fn compile_nested(&self, abspath: String) -> BoxFuture<'_, Result<(SourceFile, String), PlError>> {
        async move {
            self.check_nesting(&abspath)?;
            let (file, text) = read_source(self.repo, &abspath, &self.source.version).await?;
            let program = parse_source(&text, &file.abspath, self.options)?;
            let nested = Evaluator::new(self.repo, self.options, &file, self.stack.clone());
            Ok((nested.run(program).await, text))
        }
        .boxed()
    }

    fn check_nesting(&self, target: &str) -> Result<(), PlError> {
        if self.stack.iter().any(|open| open == target) {
            let mut chain = self.stack.clone();
            chain.push(target.to_string());
            return Err(PlError::CompileError {
                message: format!("Circular reference: {}", chain.join(" -> ")),
                path: target.to_string(),
            });
        }
        if self.stack.len() >= self.options.max_depth {
            return Err(PlError::CompileError {
                message: format!("Nesting exceeds the maximum depth of {}", self.options.max_depth),
                path: target.to_string(),
            });
        }
        Ok(())
    }

    /// Carries a nested file's diagnostics and dependencies over into this one.
    fn absorb(&mut self, nested: &SourceFile) {
        self.source.errors.extend(nested.errors.iter().cloned());
        self.source.warnings.extend(nested.warnings.iter().cloned());
        self.source.dependencies.extend(nested.dependencies.iter().cloned());
    }

    fn take_notes(&mut self, program: &Program, abspath: &str) {
        for note in &program.notes {
            self.warning(Diagnostic::new(note.line, abspath, note.message.clone()));
        }
    }

    fn error(&mut self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "compile error");
        self.source.errors.push(diagnostic);
    }

    fn warning(&mut self, diagnostic: Diagnostic) {
        self.source.warnings.push(diagnostic);
    }
}
