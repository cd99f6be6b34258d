use once_cell::sync::Lazy;
use regex::Regex;

use super::*;
use super::scanner::{advance, bump, peek_char, peek_second, rest, rest_of_line, skip_whitespace};
use crate::utils::normalize_number;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+(?:[_.][0-9]+)*").unwrap());
static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.(?:[A-Za-z_][A-Za-z0-9_]*|[0-9]+))*").unwrap());
static SELECTOR_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*").unwrap());
static DIRECTIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@[A-Za-z]+").unwrap());

pub(super) fn next_initial(lexer: &mut Lexer) -> Result<Token, PlError> {
    skip_whitespace(lexer, false);
    let line = lexer.line;

    match peek_char(lexer) {
        None => Ok(Token::new(TokenKind::Eof, "", line)),
        Some('#') => tokenize_line_comment(lexer),
        Some('/') if peek_second(lexer) == Some('/') => tokenize_line_comment(lexer),
        Some('/') if peek_second(lexer) == Some('*') => tokenize_block_comment(lexer),
        Some('=') if peek_second(lexer) == Some('=') => tokenize_multi_open(lexer),
        Some('=') => tokenize_symbol(lexer, TokenKind::Equals),
        Some(':') => tokenize_symbol(lexer, TokenKind::Colon),
        Some(',') => tokenize_symbol(lexer, TokenKind::Comma),
        Some('[') => tokenize_symbol(lexer, TokenKind::LBracket),
        Some(']') => tokenize_symbol(lexer, TokenKind::RBracket),
        Some('{') => tokenize_symbol(lexer, TokenKind::LBrace),
        Some('}') => tokenize_symbol(lexer, TokenKind::RBrace),
        Some('@') => tokenize_directive(lexer),
        Some('"') | Some('\'') => tokenize_string(lexer),
        Some(c) if c.is_ascii_digit() => tokenize_number(lexer),
        Some('+') | Some('-') if peek_second(lexer).is_some_and(|c| c.is_ascii_digit()) => {
            tokenize_number(lexer)
        }
        Some(_) if !lexer.component_prefix.is_empty()
            && rest(lexer).starts_with(lexer.component_prefix.as_str()) =>
        {
            tokenize_selector_or_identifier(lexer)
        }
        Some(c) if c.is_ascii_alphabetic() || c == '_' => tokenize_identifier_or_bool(lexer),
        Some(ch) => tokenize_unexpected_char(lexer, ch),
    }
}

/// Path mode: the remainder of the directive up to end-of-line, or up to a
/// delimiter closing the enclosing array/object. Trailing comments are left
/// for the initial state.
pub(super) fn next_path(lexer: &mut Lexer) -> Result<Token, PlError> {
    skip_whitespace(lexer, true);
    let line = lexer.line;
    let candidate = rest_of_line(lexer);

    let mut end = candidate.len();
    let mut prev_blank = true;
    for (idx, ch) in candidate.char_indices() {
        let tail = &candidate[idx..];
        let starts_comment = ch == '#' || tail.starts_with("//") || tail.starts_with("/*");
        if matches!(ch, ',' | ']' | '}') || (prev_blank && starts_comment) {
            end = idx;
            break;
        }
        prev_blank = ch == ' ' || ch == '\t';
    }

    let raw = advance(lexer, end);
    let path = raw.trim();
    lexer.state = LexState::Initial;

    if path.is_empty() {
        return Err(PlError::lex("Expected a path after directive", line, 107)
            .with_hint("Directives take a file path, e.g. `@include lib/base.pl`"));
    }
    Ok(Token::new(TokenKind::Path(path.to_string()), raw, line))
}

/// Multi-line mode: one `Any` token per raw line until a line holding only `==`.
pub(super) fn next_multi(lexer: &mut Lexer) -> Result<Token, PlError> {
    let line = lexer.line;
    if rest(lexer).is_empty() {
        return Err(PlError::lex("Unterminated multi-line string", lexer.multi_start, 108)
            .with_hint("Close the value with a line containing only `==`"));
    }

    let text = rest_of_line(lexer);
    let with_newline = if text.len() < rest(lexer).len() { text.len() + 1 } else { text.len() };

    if text.trim_end() == "==" {
        let lexeme = advance(lexer, with_newline);
        lexer.state = LexState::Initial;
        return Ok(Token::new(TokenKind::MultiClose, lexeme, line));
    }

    let lexeme = advance(lexer, with_newline);
    Ok(Token::new(TokenKind::Any(lexeme.clone()), lexeme, line))
}

fn tokenize_symbol(lexer: &mut Lexer, kind: TokenKind) -> Result<Token, PlError> {
    let line = lexer.line;
    let lexeme = advance(lexer, 1);
    Ok(Token::new(kind, lexeme, line))
}

fn tokenize_line_comment(lexer: &mut Lexer) -> Result<Token, PlError> {
    let line = lexer.line;
    let len = rest_of_line(lexer).len();
    let text = advance(lexer, len);
    let text = text.trim_end().to_string();
    Ok(Token::new(TokenKind::Comment(text.clone()), text, line))
}

fn tokenize_block_comment(lexer: &mut Lexer) -> Result<Token, PlError> {
    let line = lexer.line;
    match rest(lexer)[2..].find("*/") {
        Some(idx) => {
            let text = advance(lexer, idx + 4);
            Ok(Token::new(TokenKind::Comment(text.clone()), text, line))
        }
        None => Err(PlError::lex("Unterminated block comment", line, 105)
            .with_hint("Close the comment with `*/`")),
    }
}

fn tokenize_multi_open(lexer: &mut Lexer) -> Result<Token, PlError> {
    let line = lexer.line;
    advance(lexer, 2);

    let trailing = rest_of_line(lexer);
    if !trailing.trim().is_empty() {
        return Err(PlError::lex(
            format!("Unexpected text '{}' after '=='", trailing.trim()),
            line,
            109,
        )
        .with_hint("The body of a multi-line value starts on the next line"));
    }
    let len = trailing.len();
    advance(lexer, len);
    bump(lexer); // newline, if any

    lexer.state = LexState::Multi;
    lexer.multi_start = line;
    Ok(Token::new(TokenKind::MultiOpen, "==", line))
}

fn tokenize_directive(lexer: &mut Lexer) -> Result<Token, PlError> {
    let line = lexer.line;
    let word = DIRECTIVE
        .find(rest(lexer))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "@".to_string());

    match Directive::from_keyword(&word[1..]) {
        Some(directive) => {
            advance(lexer, word.len());
            lexer.state = LexState::Path;
            Ok(Token::new(TokenKind::Directive(directive), word, line))
        }
        None => Err(PlError::lex(format!("Unknown directive '{}'", word), line, 106)
            .with_hint("Expected one of @include, @extends, @copyurl, @copycontent")),
    }
}

fn tokenize_string(lexer: &mut Lexer) -> Result<Token, PlError> {
    let line = lexer.line;
    let start = lexer.pos;
    let quote = bump(lexer).unwrap_or('"');
    let mut content = String::new();

    loop {
        match bump(lexer) {
            Some(ch) if ch == quote => break,
            Some('\\') => match bump(lexer) {
                Some(next_ch) => content.push(match next_ch {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                }),
                None => {
                    return Err(PlError::lex("Trailing backslash in string", line, 103));
                }
            },
            Some(ch) => content.push(ch),
            None => {
                return Err(PlError::LexError {
                    message: format!("String starting with {} is never closed", quote),
                    line,
                    hint: Some("String literal not closed".into()),
                    code: Some(103),
                });
            }
        }
    }

    let lexeme = lexer.input[start..lexer.pos].to_string();
    Ok(Token::new(TokenKind::String(content), lexeme, line))
}

fn tokenize_number(lexer: &mut Lexer) -> Result<Token, PlError> {
    let line = lexer.line;
    let len = NUMBER.find(rest(lexer)).map_or(0, |m| m.end());
    let lexeme = advance(lexer, len);

    normalize_number(&lexeme)
        .map(|n| Token::new(TokenKind::Number(n), lexeme.clone(), line))
        .ok_or_else(|| PlError::lex(format!("Invalid number '{}'", lexeme), line, 102))
}

fn tokenize_selector_or_identifier(lexer: &mut Lexer) -> Result<Token, PlError> {
    let line = lexer.line;
    let prefix_len = lexer.component_prefix.len();

    match SELECTOR_NAME.find(&rest(lexer)[prefix_len..]) {
        Some(m) => {
            let lexeme = advance(lexer, prefix_len + m.end());
            Ok(Token::new(TokenKind::Selector(lexeme.clone()), lexeme, line))
        }
        None => tokenize_identifier_or_bool(lexer),
    }
}

fn tokenize_identifier_or_bool(lexer: &mut Lexer) -> Result<Token, PlError> {
    let line = lexer.line;
    let len = IDENT.find(rest(lexer)).map_or(0, |m| m.end());
    if len == 0 {
        let ch = peek_char(lexer).unwrap_or('\0');
        return tokenize_unexpected_char(lexer, ch);
    }
    let ident = advance(lexer, len);

    // The boolean pattern has never matched a bare `False`; it falls through
    // to an identifier. Kept until product decides otherwise.
    let kind = if ident.eq_ignore_ascii_case("true") {
        TokenKind::Bool(true)
    } else if ident.eq_ignore_ascii_case("false") && ident != "False" {
        TokenKind::Bool(false)
    } else {
        TokenKind::Ident(ident.clone())
    };

    Ok(Token::new(kind, ident, line))
}

fn tokenize_unexpected_char(lexer: &mut Lexer, ch: char) -> Result<Token, PlError> {
    let line = lexer.line;
    bump(lexer);
    Err(PlError::lex(format!("Unexpected character '{}'", ch), line, 104)
        .with_hint("Unexpected character in input"))
}
