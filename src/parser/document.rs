use super::*;
use crate::ast::NodeKind;
use crate::lexer::Directive;

pub(super) fn parse_statements(parser: &mut Parser) -> Result<Vec<Node>, PlError> {
    let mut nodes = Vec::new();

    while let Some(tok) = parser.peek() {
        match &tok.kind {
            TokenKind::Eof => {
                break;
            }
            TokenKind::Comment(_) => {
                nodes.push(parse_comment(parser)?);
            }
            TokenKind::Ident(_) => {
                nodes.push(value::parse_assignment(parser)?);
            }
            TokenKind::Directive(Directive::Include) | TokenKind::Directive(Directive::Extends) => {
                nodes.push(parse_file_directive(parser)?);
            }
            TokenKind::Directive(other) => {
                return Err(PlError::syntax(
                    format!("{} is only valid on the right-hand side of '='", other.keyword()),
                    tok.line,
                    204,
                )
                .with_hint("Write it as `key = @copyurl path`"));
            }
            _ => {
                let token = tok.clone();
                return Err(unexpected(&token, "a statement", 205)
                    .with_hint("Statements are assignments, comments, @include or @extends"));
            }
        }
    }

    Ok(nodes)
}

fn parse_comment(parser: &mut Parser) -> Result<Node, PlError> {
    let token = parser.bump()?;
    match token.kind {
        TokenKind::Comment(text) => Ok(Node::new(NodeKind::Comment { text }, token.line)),
        _ => unreachable!(),
    }
}

fn parse_file_directive(parser: &mut Parser) -> Result<Node, PlError> {
    let directive = parser.bump()?;
    let path = parser.expect(TokenKind::Path(String::new()), "a path")?;
    let path = match path.kind {
        TokenKind::Path(p) => p,
        _ => unreachable!(),
    };

    let kind = match directive.kind {
        TokenKind::Directive(Directive::Include) => NodeKind::Include { path },
        _ => NodeKind::Extends { path },
    };
    Ok(Node::new(kind, directive.line))
}
