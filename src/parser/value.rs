use indexmap::IndexMap;

use super::*;
use crate::ast::{NodeKind, Value, ValueKind};
use crate::lexer::Directive;

pub(super) fn parse_assignment(parser: &mut Parser) -> Result<Node, PlError> {
    let key_token = parser.bump()?;
    let key = match key_token.kind {
        TokenKind::Ident(k) => k,
        _ => unreachable!(),
    };
    let line = key_token.line;

    let value = match parser.peek_kind() {
        Some(TokenKind::Equals) => {
            let equals = parser.bump()?;
            if has_empty_rhs(parser, equals.line) {
                Value::string("", line)
            } else {
                parse_value(parser)?
            }
        }
        Some(TokenKind::MultiOpen) => {
            parser.bump()?;
            parse_multi_line_body(parser, line)?
        }
        _ => {
            let token = parser.bump()?;
            return Err(unexpected(&token, &format!("'=' or '==' after '{}'", key), 208));
        }
    };

    Ok(Node::new(NodeKind::Assignment { key, value }, line))
}

/// `key =` followed by a comment, end of input, or nothing else on the line.
fn has_empty_rhs(parser: &Parser, equals_line: usize) -> bool {
    match parser.peek() {
        Some(tok) => {
            matches!(tok.kind, TokenKind::Comment(_) | TokenKind::Eof) || tok.line > equals_line
        }
        None => true,
    }
}

fn parse_multi_line_body(parser: &mut Parser, line: usize) -> Result<Value, PlError> {
    let mut body = String::new();
    let mut first = true;

    loop {
        let token = parser.bump()?;
        match token.kind {
            TokenKind::Any(text) => {
                if first && parser.strip_lang_hint && text.trim_start().starts_with("#!lang=") {
                    // editor hint, not content
                } else {
                    body.push_str(&text);
                }
                first = false;
            }
            TokenKind::MultiClose => break,
            _ => return Err(unexpected(&token, "'==' closing the multi-line value", 209)),
        }
    }

    Ok(Value::string(body, line))
}

pub(super) fn parse_value(parser: &mut Parser) -> Result<Value, PlError> {
    let token = parser.bump()?;
    let line = token.line;

    let kind = match token.kind {
        TokenKind::Number(n) => ValueKind::Number(n),
        TokenKind::Bool(b) => ValueKind::Boolean(b),
        TokenKind::String(s) => ValueKind::String(s),
        TokenKind::Ident(name) => ValueKind::Reference(name),
        TokenKind::Selector(selector) => ValueKind::Component(selector),
        TokenKind::Directive(directive) => return parse_directive_value(parser, directive, line),
        TokenKind::LBracket => return parse_array_value(parser, line),
        TokenKind::LBrace => return parse_object_value(parser, line),
        _ => return Err(unexpected(&token, "a value", 210)),
    };

    Ok(Value::new(kind, line))
}

fn parse_directive_value(
    parser: &mut Parser,
    directive: Directive,
    line: usize,
) -> Result<Value, PlError> {
    let path = match parser.expect(TokenKind::Path(String::new()), "a path")?.kind {
        TokenKind::Path(p) => p,
        _ => unreachable!(),
    };

    let kind = match directive {
        Directive::Extends => ValueKind::DictExtends(path),
        Directive::CopyUrl => ValueKind::FileUrl(path),
        Directive::CopyContent => ValueKind::FileContent(path),
        Directive::Include => {
            return Err(PlError::syntax("@include cannot be used as a value", line, 206)
                .with_hint("Use `@extends path` to bind another file's variables to a key"));
        }
    };
    Ok(Value::new(kind, line))
}

fn skip_comments(parser: &mut Parser) -> Result<(), PlError> {
    while let Some(TokenKind::Comment(_)) = parser.peek_kind() {
        parser.bump()?;
    }
    Ok(())
}

fn parse_array_value(parser: &mut Parser, line: usize) -> Result<Value, PlError> {
    let mut items = Vec::new();

    skip_comments(parser)?;
    if let Some(TokenKind::RBracket) = parser.peek_kind() {
        parser.bump()?;
        return Ok(Value::new(ValueKind::Array(items), line));
    }

    loop {
        skip_comments(parser)?;
        items.push(parse_value(parser)?);
        skip_comments(parser)?;

        let token = parser.bump()?;
        match token.kind {
            TokenKind::Comma => continue,
            TokenKind::RBracket => break,
            _ => return Err(unexpected(&token, "',' or ']'", 211)),
        }
    }

    Ok(Value::new(ValueKind::Array(items), line))
}

fn parse_object_value(parser: &mut Parser, line: usize) -> Result<Value, PlError> {
    let mut entries: IndexMap<String, Value> = IndexMap::new();

    skip_comments(parser)?;
    if let Some(TokenKind::RBrace) = parser.peek_kind() {
        parser.bump()?;
        return Ok(Value::new(ValueKind::Object(entries), line));
    }

    loop {
        skip_comments(parser)?;
        let key_token = parser.bump()?;
        let key = match key_token.kind {
            TokenKind::Ident(k) => k,
            _ => return Err(unexpected(&key_token, "an object key", 212)),
        };
        parser.expect(TokenKind::Colon, &format!("':' after '{}'", key))?;
        let value = parse_value(parser)?;

        // last write wins, first position is kept
        if entries.insert(key.clone(), value).is_some() {
            parser.note(
                key_token.line,
                format!("Duplicate key '{}' in object, the last value is kept", key),
            );
        }
        skip_comments(parser)?;

        let token = parser.bump()?;
        match token.kind {
            TokenKind::Comma => continue,
            TokenKind::RBrace => break,
            _ => return Err(unexpected(&token, "',' or '}'", 213)),
        }
    }

    Ok(Value::new(ValueKind::Object(entries), line))
}
