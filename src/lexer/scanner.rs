use super::*;

/// Advance one character and update line tracking
pub(super) fn bump(lexer: &mut Lexer) -> Option<char> {
    let curr = peek_char(lexer)?;
    if curr == '\n' {
        lexer.line += 1;
    }
    lexer.pos += curr.len_utf8();
    Some(curr)
}

/// Advance over `len` bytes of already-matched input
pub(super) fn advance(lexer: &mut Lexer, len: usize) -> String {
    let end = lexer.pos + len;
    let text = &lexer.input[lexer.pos..end];
    lexer.line += text.matches('\n').count();
    lexer.pos = end;
    text.to_string()
}

pub(super) fn peek_char(lexer: &Lexer) -> Option<char> {
    rest(lexer).chars().next()
}

pub(super) fn peek_second(lexer: &Lexer) -> Option<char> {
    rest(lexer).chars().nth(1)
}

/// Unconsumed input
pub(super) fn rest<'a>(lexer: &Lexer<'a>) -> &'a str {
    let input: &'a str = lexer.input;
    &input[lexer.pos..]
}

/// Skip blanks. Newlines are skipped too unless `stop_at_newline` is set.
pub(super) fn skip_whitespace(lexer: &mut Lexer, stop_at_newline: bool) {
    while let Some(c) = peek_char(lexer) {
        match c {
            ' ' | '\t' | '\r' => {
                bump(lexer);
            }
            '\n' if !stop_at_newline => {
                bump(lexer);
            }
            _ => break,
        }
    }
}

/// Everything up to (not including) the next newline
pub(super) fn rest_of_line<'a>(lexer: &Lexer<'a>) -> &'a str {
    let rest = rest(lexer);
    match rest.find('\n') {
        Some(idx) => &rest[..idx],
        None => rest,
    }
}
