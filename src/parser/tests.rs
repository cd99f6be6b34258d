#[cfg(test)]
use super::*;
#[cfg(test)]
use crate::ast::{NodeKind, Value, ValueKind};

fn assigned(program: &Program, key: &str) -> Value {
    program
        .nodes
        .iter()
        .find_map(|n| match &n.kind {
            NodeKind::Assignment { key: k, value } if k == key => Some(value.clone()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no assignment to '{}'", key))
}

#[test]
fn test_parser_basic_document() {
    let input = r#"
@extends /templates/base.pl
# statement
title = "Loops"
max = 1_000.5
@include lib/feedback.pl
"#;

    let program = parse(input).expect("Failed to parse document");
    println!("{:#?}", program);

    assert_eq!(program.nodes.len(), 5);
    assert_eq!(
        program.nodes[0].kind,
        NodeKind::Extends { path: "/templates/base.pl".into() }
    );
    assert_eq!(
        program.nodes[1].kind,
        NodeKind::Comment { text: "# statement".into() }
    );
    assert_eq!(program.nodes[2].line, 4);
    assert_eq!(assigned(&program, "max").kind, ValueKind::Number(1000.5));
    assert_eq!(
        program.nodes[4].kind,
        NodeKind::Include { path: "lib/feedback.pl".into() }
    );
}

#[test]
fn test_empty_program_is_accepted() {
    let program = parse("\n\n").expect("Empty input should parse");
    assert!(program.nodes.is_empty());
}

#[test]
fn test_empty_rhs_yields_empty_string() {
    let program = parse("a =\nb = # trailing\nc = 1\nd =").expect("Failed to parse");
    assert_eq!(assigned(&program, "a").kind, ValueKind::String(String::new()));
    assert_eq!(assigned(&program, "b").kind, ValueKind::String(String::new()));
    assert_eq!(assigned(&program, "c").kind, ValueKind::Number(1.0));
    assert_eq!(assigned(&program, "d").kind, ValueKind::String(String::new()));
    // the comment after `b =` is kept as its own statement
    assert!(program
        .nodes
        .iter()
        .any(|n| n.kind == NodeKind::Comment { text: "# trailing".into() }));
}

#[test]
fn test_multi_line_is_concatenated_line_by_line() {
    let program = parse("body ==\nline1\nline2\n==\n").expect("Failed to parse");
    assert_eq!(
        assigned(&program, "body").kind,
        ValueKind::String("line1\nline2\n".into())
    );
}

#[test]
fn test_multi_line_strips_leading_lang_hint() {
    let program = parse("code ==\n#!lang=python\nprint(1)\n#!lang=c\n==").expect("Failed to parse");
    assert_eq!(
        assigned(&program, "code").kind,
        ValueKind::String("print(1)\n#!lang=c\n".into())
    );
}

#[test]
fn test_lang_hint_kept_when_disabled() {
    let options = CompilerOptions {
        strip_lang_hint: false,
        ..CompilerOptions::default()
    };
    let program = Parser::with_options("code ==\n#!lang=python\nx\n==", &options)
        .and_then(Parser::parse_program)
        .expect("Failed to parse");
    assert_eq!(
        assigned(&program, "code").kind,
        ValueKind::String("#!lang=python\nx\n".into())
    );
}

#[test]
fn test_nested_arrays_and_objects() {
    let input = r#"
form = {
    # fields
    inputs: [wc-input, { label: "x", size: [1, [2, 3]] }],
    done: false
}
"#;
    let program = parse(input).expect("Failed to parse");
    let form = assigned(&program, "form");
    let entries = form.as_object().expect("form is an object");
    assert_eq!(entries.len(), 2);

    match &entries["inputs"].kind {
        ValueKind::Array(items) => {
            assert_eq!(items[0].kind, ValueKind::Component("wc-input".into()));
            let inner = items[1].as_object().expect("object in array");
            assert_eq!(inner["size"].to_raw(), "[1, [2, 3]]");
        }
        other => panic!("Expected array, got {:?}", other),
    }
    assert_eq!(entries["done"].kind, ValueKind::Boolean(false));
    assert_eq!(entries["done"].line, 5);
}

#[test]
fn test_duplicate_object_key_last_write_wins() {
    let program = parse("o = {a: 1, b: 2, a: 3}").expect("Failed to parse");
    let o = assigned(&program, "o");
    let entries = o.as_object().unwrap();
    let keys: Vec<&String> = entries.keys().collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(entries["a"].kind, ValueKind::Number(3.0));
    assert_eq!(program.notes.len(), 1);
    assert!(program.notes[0].message.contains("Duplicate key 'a'"));
}

#[test]
fn test_directive_values() {
    let input = "\
img = @copyurl static/logo.png
src = @copycontent grader.py
base = @extends /lib/dict.pl
ref = other.key";
    let program = parse(input).expect("Failed to parse");
    assert_eq!(assigned(&program, "img").kind, ValueKind::FileUrl("static/logo.png".into()));
    assert_eq!(assigned(&program, "src").kind, ValueKind::FileContent("grader.py".into()));
    assert_eq!(assigned(&program, "base").kind, ValueKind::DictExtends("/lib/dict.pl".into()));
    assert_eq!(assigned(&program, "ref").kind, ValueKind::Reference("other.key".into()));
}

#[test]
fn test_every_value_round_trips_through_to_raw() {
    let input = r#"v = [1000.5, -2, true, "a \"b\"\nc", wc-editor, @extends p.pl, @copyurl foo/bar.png, name.x, @copycontent c.txt, {k: [], e: {}}]"#;
    let program = parse(input).expect("Failed to parse");
    let original = assigned(&program, "v");

    let raw = format!("v = {}", original.to_raw());
    let reparsed = parse(&raw).expect("Failed to reparse");
    assert_eq!(assigned(&reparsed, "v"), original);
}

#[test]
fn test_copyurl_round_trip() {
    let program = parse("x = @copyurl foo/bar.png").unwrap();
    let value = assigned(&program, "x");
    assert_eq!(value.kind, ValueKind::FileUrl("foo/bar.png".into()));
    assert_eq!(value.to_raw(), "@copyurl foo/bar.png");
}

#[test]
fn test_capitalized_false_parses_as_reference() {
    let program = parse("flag = False\nother = FALSE").unwrap();
    assert_eq!(assigned(&program, "flag").kind, ValueKind::Reference("False".into()));
    assert_eq!(assigned(&program, "other").kind, ValueKind::Boolean(false));
}

#[test]
fn test_syntax_errors_are_fatal() {
    let cases = [
        ("x 1", 208),
        ("= 1", 205),
        ("x = [1, 2", 211),
        ("x = [1,", 210),
        ("x = [1 2]", 211),
        ("x = {a 1}", 202),
        ("x = {1: 2}", 212),
        ("x = {a: 1 b: 2}", 213),
        ("x = @include a.pl", 206),
        ("@copyurl a.png", 204),
        ("x = ]", 210),
    ];

    for (input, code) in cases {
        let err = parse(input).expect_err(input);
        assert!(err.is_syntactic(), "{}: {:?}", input, err);
        assert_eq!(err.code(), Some(code), "{}: {}", input, err);
    }
}

#[test]
fn test_lex_errors_surface_from_parse() {
    let err = parse("x = 1\ny = $").unwrap_err();
    match err {
        PlError::LexError { line, .. } => assert_eq!(line, 2),
        other => panic!("Expected LexError, got {:?}", other),
    }
}

#[test]
fn test_comments_inside_literals_are_skipped() {
    let input = "xs = [\n  1, // one\n  /* two */ 2\n]";
    let program = parse(input).unwrap();
    assert_eq!(assigned(&program, "xs").to_raw(), "[1, 2]");
    assert_eq!(program.nodes.len(), 1);
}

#[test]
fn test_parse_from_token_sequence() {
    let options = CompilerOptions::default();
    let tokens = crate::lexer::tokenize("a = 1\n@include lib.pl\nb = a")
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let program = parse_tokens(tokens.clone(), &options).unwrap();
    assert_eq!(program, parse("a = 1\n@include lib.pl\nb = a").unwrap());

    // A stream cut short still ends cleanly at the last line.
    let truncated: Vec<_> = tokens.into_iter().take(3).collect();
    let program = parse_tokens(truncated, &options).unwrap();
    assert_eq!(program.nodes.len(), 1);
}
