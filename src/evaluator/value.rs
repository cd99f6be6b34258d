use base64::Engine;
use futures::future::{BoxFuture, FutureExt};
use serde_json::{json, Map, Value as JsonValue};
use tracing::trace;
use uuid::Uuid;

use super::{scope, Evaluator};
use crate::ast::{Value, ValueKind};
use crate::error::Diagnostic;
use crate::source::Dependency;
use crate::utils::{number_to_json, resolve_path};

impl<'r> Evaluator<'r> {
    /// Resolves one value to JSON.
    ///
    /// A failing element of an array becomes `null` and a failing entry of a
    /// dictionary is dropped; both are recorded as errors. A failing value at
    /// the top is returned so the assignment is skipped.
    pub(super) fn resolve<'a>(&'a mut self, value: &'a Value) -> BoxFuture<'a, Result<JsonValue, Diagnostic>> {
        async move {
            let line = value.line;
            match &value.kind {
                ValueKind::Array(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        match self.resolve(item).await {
                            Ok(v) => out.push(v),
                            Err(diagnostic) => {
                                self.error(diagnostic);
                                out.push(JsonValue::Null);
                            }
                        }
                    }
                    Ok(JsonValue::Array(out))
                }
                ValueKind::Object(entries) => {
                    let mut out = Map::new();
                    for (key, entry) in entries {
                        match self.resolve(entry).await {
                            Ok(v) => {
                                out.insert(key.clone(), v);
                            }
                            Err(diagnostic) => self.error(diagnostic),
                        }
                    }
                    Ok(JsonValue::Object(out))
                }
                ValueKind::String(text) => Ok(JsonValue::String(text.trim().to_string())),
                ValueKind::Number(n) => Ok(number_to_json(*n)),
                ValueKind::Boolean(b) => Ok(JsonValue::Bool(*b)),
                ValueKind::Component(selector) => Ok(json!({
                    "cid": Uuid::new_v4().to_string(),
                    "selector": selector,
                })),
                ValueKind::Reference(name) => scope::lookup(&self.source.variables, name)
                    .cloned()
                    .ok_or_else(|| self.diagnostic(line, format!("Unresolved reference '{}'", name))),
                ValueKind::FileUrl(path) => self.copy_url(path, line).await,
                ValueKind::FileContent(path) => self.copy_content(path, line).await,
                ValueKind::DictExtends(path) => self.extend_dict(path, line).await,
            }
        }
        .boxed()
    }

    async fn copy_url(&mut self, raw: &str, line: usize) -> Result<JsonValue, Diagnostic> {
        let target = resolve_path(&self.current, raw);
        trace!(path = %target, "@copyurl");
        let file = self
            .repo
            .read(&target, &self.source.version)
            .await
            .map_err(|e| self.diagnostic(line, format!("Cannot copy url of '{}': {}", raw, e)))?;
        Ok(JsonValue::String(self.repo.url(&file, &self.options.url_prefix)))
    }

    /// Text files come back verbatim; anything else as a base64 data URL.
    async fn copy_content(&mut self, raw: &str, line: usize) -> Result<JsonValue, Diagnostic> {
        let target = resolve_path(&self.current, raw);
        trace!(path = %target, "@copycontent");
        let fail = |e: crate::PlError| format!("Cannot copy content of '{}': {}", raw, e);

        let file = match self.repo.read(&target, &self.source.version).await {
            Ok(file) => file,
            Err(e) => return Err(self.diagnostic(line, fail(e))),
        };
        let bytes = match self.repo.content(&file).await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.diagnostic(line, fail(e))),
        };

        Ok(JsonValue::String(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => format!(
                "data:application/octet-stream;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(e.into_bytes())
            ),
        }))
    }

    /// `@extends` as a value: the other file's variables become a dictionary
    /// and nothing is merged into this file.
    async fn extend_dict(&mut self, raw: &str, line: usize) -> Result<JsonValue, Diagnostic> {
        let target = resolve_path(&self.current, raw);
        trace!(path = %target, "@extends value");

        let (nested, content) = match self.compile_nested(target.clone()).await {
            Ok(compiled) => compiled,
            Err(e) => return Err(Diagnostic::from_nested(&e, &target, line, &self.current)),
        };

        self.absorb(&nested);
        self.source.dependencies.push(Dependency {
            alias: self.assigning.clone(),
            line,
            content,
            abspath: nested.abspath.clone(),
        });
        Ok(JsonValue::Object(nested.variables.into_iter().collect()))
    }

    fn diagnostic(&self, line: usize, message: String) -> Diagnostic {
        Diagnostic::new(line, self.current.clone(), message)
    }
}
