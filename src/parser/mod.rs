use crate::PlError;
use crate::ast::Node;
use crate::config::CompilerOptions;
use crate::lexer::{Lexer, Token, TokenKind};

mod document;
mod value;

/// Something the parser accepted but that deserves a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub line: usize,
    pub message: String,
}

/// Statements of one PL file, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub nodes: Vec<Node>,
    pub notes: Vec<Note>,
}

type TokenStream<'a> = Box<dyn Iterator<Item = Result<Token, PlError>> + 'a>;

pub struct Parser<'a> {
    tokens: TokenStream<'a>,
    peek: Option<Token>,
    strip_lang_hint: bool,
    notes: Vec<Note>,
}

impl<'a> Parser<'a> {
    /// Parser pulling tokens lazily from a fresh lexer over `input`.
    pub fn new(input: &'a str) -> Result<Self, PlError> {
        Self::from_stream(Box::new(Lexer::new(input)), true)
    }

    pub fn with_options(input: &'a str, options: &CompilerOptions) -> Result<Self, PlError> {
        let lexer = Lexer::new(input).with_component_prefix(options.component_prefix.clone());
        Self::from_stream(Box::new(lexer), options.strip_lang_hint)
    }

    /// Parser over an already lexed token sequence.
    pub fn from_tokens(tokens: Vec<Token>, options: &CompilerOptions) -> Result<Self, PlError> {
        Self::from_stream(Box::new(tokens.into_iter().map(Ok)), options.strip_lang_hint)
    }

    fn from_stream(tokens: TokenStream<'a>, strip_lang_hint: bool) -> Result<Self, PlError> {
        let mut parser = Self {
            tokens,
            peek: None,
            strip_lang_hint,
            notes: Vec::new(),
        };
        parser.peek = Some(parser.pull(1)?);
        Ok(parser)
    }

    /// Next token from the stream; a drained stream reads as end of input.
    fn pull(&mut self, last_line: usize) -> Result<Token, PlError> {
        match self.tokens.next() {
            Some(token) => token,
            None => Ok(Token::new(TokenKind::Eof, "", last_line)),
        }
    }

    pub(crate) fn bump(&mut self) -> Result<Token, PlError> {
        let curr = self
            .peek
            .take()
            .ok_or_else(|| PlError::syntax("Unexpected end of input", 0, 201))?;
        self.peek = Some(if curr.kind == TokenKind::Eof {
            curr.clone()
        } else {
            self.pull(curr.line)?
        });
        Ok(curr)
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.peek.as_ref()
    }

    pub(crate) fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek.as_ref().map(|t| &t.kind)
    }

    /// Consumes the next token if it has the same kind as `expected`.
    pub(crate) fn expect(&mut self, expected: TokenKind, what: &str) -> Result<Token, PlError> {
        let token = self.bump()?;
        if std::mem::discriminant(&token.kind) != std::mem::discriminant(&expected) {
            return Err(unexpected(&token, what, 202));
        }
        Ok(token)
    }

    pub(crate) fn note(&mut self, line: usize, message: impl Into<String>) {
        self.notes.push(Note {
            line,
            message: message.into(),
        });
    }

    pub fn parse_program(mut self) -> Result<Program, PlError> {
        let nodes = document::parse_statements(&mut self)?;
        Ok(Program {
            nodes,
            notes: self.notes,
        })
    }
}

pub(crate) fn unexpected(token: &Token, what: &str, code: u32) -> PlError {
    let found = match token.kind {
        TokenKind::Eof => "end of input".to_string(),
        _ => format!("'{}'", token.lexeme.trim()),
    };
    PlError::syntax(format!("Expected {}, found {}", what, found), token.line, code)
}

/// Lexes and parses `input` in one pass.
pub fn parse(input: &str) -> Result<Program, PlError> {
    Parser::new(input)?.parse_program()
}

/// Parses a token sequence produced by [`crate::lexer::tokenize`].
pub fn parse_tokens(tokens: Vec<Token>, options: &CompilerOptions) -> Result<Program, PlError> {
    Parser::from_tokens(tokens, options)?.parse_program()
}

#[cfg(test)]
mod tests;
