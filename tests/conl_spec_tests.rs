//! Conformance tests for the CONL grammar: section structure, indentation,
//! scalar decoding, multiline blocks, and the error taxonomy.

use conl::{conl, parse_str, serialize, tokenize, ParseError, ParseOptions, Token, Value};

fn parsed(input: &str) -> Value {
    parse_str(input).unwrap_or_else(|e| panic!("{input:?} failed to parse: {e}"))
}

#[test]
fn test_single_entry() {
    assert_eq!(parsed("a = b\n"), conl!({ "a": "b" }));
}

#[test]
fn test_nested_list() {
    assert_eq!(
        parsed("list\n  = 1\n  = 2\n"),
        conl!({ "list": ["1", "2"] })
    );
}

#[test]
fn test_duplicate_key_fails_at_second_line() {
    let err = parse_str("a = 1\na = 2\n").unwrap_err();
    assert_eq!(
        err,
        ParseError::DuplicateKey {
            line: 2,
            key: "a".to_string(),
        }
    );
}

#[test]
fn test_inconsistent_indent() {
    // stack after line 2 is ["", "    "]; line 3's level "  " matches neither
    let err = parse_str("a\n    b = 1\n  c = 2\n").unwrap_err();
    assert_eq!(err, ParseError::InconsistentIndent { line: 3 });
}

#[test]
fn test_multiline_with_paragraph_break() {
    assert_eq!(
        parsed("x = \"\"\"\n  line1\n\n  line2\n"),
        conl!({ "x": "line1\n\nline2" })
    );
}

#[test]
fn test_codepoint_escape() {
    assert_eq!(parsed("k = \"a\\{1F431}b\"\n"), conl!({ "k": "a\u{1F431}b" }));
}

#[test]
fn test_indentation_balance() {
    let input = "a\n  b\n    c = 1\n  d = 2\ne\n  = 1\n";
    let tokens: Vec<Token> = tokenize(input).map(Result::unwrap).collect();
    let indents = tokens.iter().filter(|t| t.name() == "indent").count();
    let outdents = tokens.iter().filter(|t| t.name() == "outdent").count();
    assert_eq!(indents, outdents);
}

#[test]
fn test_absent_coercion() {
    let doc = parsed("key\n");
    let value = doc.get("key").unwrap();
    assert_eq!(value, &Value::Absent);
    assert!(value.as_map().unwrap().is_empty());
    assert!(value.as_list().unwrap().is_empty());
    assert_eq!(value.as_scalar().unwrap(), "");
}

#[test]
fn test_absent_is_not_an_empty_container() {
    assert_ne!(Value::Absent, conl!({}));
    assert_ne!(Value::Absent, conl!([]));
    assert_ne!(Value::Absent, conl!(""));
}

#[test]
fn test_empty_document() {
    assert_eq!(parsed(""), Value::Absent);
    assert_eq!(parsed("\n\n; comments only\n"), Value::Absent);
}

#[test]
fn test_round_trip_preserves_order_and_structure() {
    let value = conl!({
        "zeta": "1",
        "alpha": {
            "nested": ["x", "y"],
            "text": "multi\nline"
        },
        "omega": "3"
    });
    let text = serialize(&value);
    assert_eq!(parsed(&text), value);
    // canonical form is a fixed point
    assert_eq!(serialize(&parsed(&text)), text);
}

#[test]
fn test_comments_do_not_shadow_duplicates() {
    let err = parse_str("a = 1\n\n; interlude\na = 2\n").unwrap_err();
    assert!(matches!(err, ParseError::DuplicateKey { line: 4, .. }));
}

#[test]
fn test_mixed_section_kinds() {
    assert!(matches!(
        parse_str("a = 1\n= 2\n").unwrap_err(),
        ParseError::MixedSectionKind { line: 2, .. }
    ));
    assert!(matches!(
        parse_str("= 1\nb = 2\n").unwrap_err(),
        ParseError::MixedSectionKind { line: 2, .. }
    ));
}

#[test]
fn test_unterminated_quote() {
    assert_eq!(
        parse_str("a = \"oops\n").unwrap_err(),
        ParseError::UnterminatedQuote { line: 1 }
    );
    assert_eq!(
        parse_str("ok = 1\n\"broken = 2\n").unwrap_err(),
        ParseError::UnterminatedQuote { line: 2 }
    );
}

#[test]
fn test_invalid_escape() {
    let err = parse_str("a = \"bad \\q escape\"\n").unwrap_err();
    assert_eq!(
        err,
        ParseError::InvalidEscape {
            line: 1,
            escape: "q".to_string(),
        }
    );
}

#[test]
fn test_invalid_codepoints() {
    assert!(matches!(
        parse_str("a = \"\\{110000}\"\n").unwrap_err(),
        ParseError::InvalidCodepoint { line: 1, .. }
    ));
    // unpaired surrogates are not scalar values
    assert!(matches!(
        parse_str("a = \"\\{D9AB}\"\n").unwrap_err(),
        ParseError::InvalidCodepoint { line: 1, .. }
    ));
}

#[test]
fn test_malformed_trailing_garbage() {
    let err = parse_str("a = \"value\" extra\n").unwrap_err();
    assert!(matches!(err, ParseError::MalformedLine { line: 1, .. }));
}

#[test]
fn test_indent_under_inline_value_is_malformed() {
    let err = parse_str("a = 1\n  b = 2\n").unwrap_err();
    assert!(matches!(err, ParseError::MalformedLine { line: 2, .. }));
}

#[test]
fn test_key_grammar() {
    // the = is optional for valueless keys, and embedded = is data in values
    let doc = parsed("plain\nwith-eq =\nexpr = a = b\n\"quoted = key\" = 1\n");
    assert_eq!(doc.get("plain"), Some(&Value::Absent));
    assert_eq!(doc.get("with-eq"), Some(&Value::Absent));
    assert_eq!(doc.get("expr").and_then(|v| v.as_str()), Some("a = b"));
    assert_eq!(doc.get("quoted = key").and_then(|v| v.as_str()), Some("1"));
}

#[test]
fn test_blank_trimming_around_tokens() {
    let doc = parsed("  \nkey   =   spaced   out   ; comment\n");
    assert_eq!(
        doc.get("key").and_then(|v| v.as_str()),
        Some("spaced   out")
    );
}

#[test]
fn test_crlf_documents() {
    assert_eq!(
        parsed("a = 1\r\nb\r\n  = x\r\n"),
        conl!({ "a": "1", "b": ["x"] })
    );
}

#[test]
fn test_tab_indentation() {
    assert_eq!(
        parsed("a\n\tb = 1\n\tc = 2\n"),
        conl!({ "a": { "b": "1", "c": "2" } })
    );
}

#[test]
fn test_tabs_do_not_match_spaces() {
    let err = parse_str("a\n\tb = 1\n        c = 2\n").unwrap_err();
    assert_eq!(err, ParseError::InconsistentIndent { line: 3 });
}

#[test]
fn test_multiline_hint_is_discarded() {
    let doc = parsed("script = \"\"\"bash ; setup\n  echo hi\n");
    assert_eq!(doc.get("script").and_then(|v| v.as_str()), Some("echo hi"));
}

#[test]
fn test_multiline_preserves_extra_indentation() {
    let doc = parsed("code = \"\"\"\n  if x\n    then y\n");
    assert_eq!(
        doc.get("code").and_then(|v| v.as_str()),
        Some("if x\n  then y")
    );
}

#[test]
fn test_multiline_block_ends_at_opener_level() {
    let doc = parsed("a = \"\"\"\n  body\nb = after\n");
    assert_eq!(doc.get("a").and_then(|v| v.as_str()), Some("body"));
    assert_eq!(doc.get("b").and_then(|v| v.as_str()), Some("after"));
}

#[test]
fn test_multiline_inside_nested_section() {
    let doc = parsed("outer\n  text = \"\"\"\n    deep\n  next = 1\n");
    let outer = doc.get("outer").unwrap();
    assert_eq!(outer.get("text").and_then(|v| v.as_str()), Some("deep"));
    assert_eq!(outer.get("next").and_then(|v| v.as_str()), Some("1"));
}

#[test]
fn test_multiline_semicolons_are_text() {
    let doc = parsed("x = \"\"\"\n  a ; b\n");
    assert_eq!(doc.get("x").and_then(|v| v.as_str()), Some("a ; b"));
}

#[test]
fn test_list_of_sections() {
    let doc = parsed("=\n  name = a\n=\n  name = b\n");
    let items = doc.as_list().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].get("name").and_then(|v| v.as_str()), Some("a"));
    assert_eq!(items[1].get("name").and_then(|v| v.as_str()), Some("b"));
}

#[test]
fn test_scalar_escapes_round_trip() {
    let awkward = [
        "",
        " leading and trailing ",
        "tab\there",
        "line\nbreak",
        "cr\rhere",
        "quote\"backslash\\",
        "; not a comment",
        "= not a list",
        "ünïcödé 🐱",
    ];
    for text in awkward {
        let value = conl!({ "k": text });
        let emitted = serialize(&value);
        assert_eq!(parsed(&emitted), value, "failed for {text:?} via {emitted:?}");
    }
}

#[test]
fn test_depth_guard() {
    let deep = "a\n  b\n    c\n      d = 1\n";
    assert!(parse_str(deep).is_ok());
    let err = conl::parse_with_options(deep.as_bytes(), ParseOptions::new().with_max_depth(3))
        .unwrap_err();
    assert!(matches!(err, ParseError::ResourceLimitExceeded { .. }));
}

#[test]
fn test_token_stream_surface() {
    let mut stream = tokenize("a = 1\n");
    let token = stream.next().unwrap().unwrap();
    assert_eq!(token.name(), "map key");
    assert_eq!(token.line_number(), 1);
    // stop early without draining: the iterator is just dropped
    drop(stream);
}

#[test]
fn test_error_display_includes_line() {
    let err = parse_str("a = 1\na = 2\n").unwrap_err();
    assert_eq!(err.line(), Some(2));
    let message = err.to_string();
    assert!(message.contains("line 2"), "unexpected message: {message}");
    assert!(message.contains("duplicate key"), "unexpected message: {message}");
}
