pub mod ast;
pub mod compiler;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod export;
pub mod lexer;
pub mod logging;
pub mod parser;
pub mod repo;
pub mod source;
pub mod utils;

pub use ast::{Node, NodeKind, Value, ValueKind};
pub use compiler::{Compiler, Phase};
pub use config::CompilerOptions;
pub use error::{Diagnostic, PlError};
pub use lexer::tokenize;
pub use parser::{parse, parse_tokens, Program};
pub use repo::{FileDescriptor, FsRepo, MemoryRepo, Repo};
pub use source::{Dependency, SourceFile, Variables};
