// Author: Dustin Pilgrim
// License: MIT

use crate::PlError;

mod scanner;
mod tokenizer;

/// The four directive keywords. Each switches the lexer into path mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Include,
    Extends,
    CopyUrl,
    CopyContent,
}

impl Directive {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "include" => Some(Directive::Include),
            "extends" => Some(Directive::Extends),
            "copyurl" => Some(Directive::CopyUrl),
            "copycontent" => Some(Directive::CopyContent),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Directive::Include => "@include",
            Directive::Extends => "@extends",
            Directive::CopyUrl => "@copyurl",
            Directive::CopyContent => "@copycontent",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // --- literals ---
    Ident(String),
    Number(f64),
    Bool(bool),
    String(String),
    Selector(String),

    // --- directives ---
    Directive(Directive),
    Path(String),

    // --- multi-line strings ---
    MultiOpen,
    Any(String),
    MultiClose,

    Comment(String),

    // --- structure ---
    Equals,
    Colon,
    Comma,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }
}

/// Lexical condition the lexer is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    Initial,
    /// After a directive keyword: the rest of the construct is a path.
    Path,
    /// After `==`: raw lines until a line holding only `==`.
    Multi,
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    state: LexState,
    /// line of the `==` that opened the current multi-line body
    multi_start: usize,
    component_prefix: String,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            line: 1,
            state: LexState::Initial,
            multi_start: 0,
            component_prefix: "wc-".to_string(),
            finished: false,
        }
    }

    pub fn with_component_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.component_prefix = prefix.into();
        self
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn state(&self) -> LexState {
        self.state
    }

    /// Produces the next token according to the current lexical state.
    pub fn next_token(&mut self) -> Result<Token, PlError> {
        match self.state {
            LexState::Initial => tokenizer::next_initial(self),
            LexState::Path => tokenizer::next_path(self),
            LexState::Multi => tokenizer::next_multi(self),
        }
    }
}

/// Lazily yields tokens up to and including `Eof`, or up to the first error.
impl Iterator for Lexer<'_> {
    type Item = Result<Token, PlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        match &token {
            Ok(Token { kind: TokenKind::Eof, .. }) | Err(_) => self.finished = true,
            Ok(_) => {}
        }
        Some(token)
    }
}

/// Tokenizes `text`. The returned lexer is consumed as it is iterated.
pub fn tokenize(text: &str) -> Lexer<'_> {
    Lexer::new(text)
}
