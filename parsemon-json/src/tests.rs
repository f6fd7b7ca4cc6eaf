use std::collections::BTreeMap;

use assert_matches::assert_matches;
use parsemon::{IoStream, StringStream};

use crate::{parse_str, parse_str_with, Config, Error, Number, Value};

type Result<T> = std::result::Result<T, Error>;

/// Parses `text` with both stream implementations, which must agree.
fn parse(text: &str) -> Result<Value> {
    let in_memory = parse_str_with::<StringStream>(text, Config::default());
    let from_reader = parse_str_with::<IoStream>(text, Config::default());
    match (&in_memory, &from_reader) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
        _ => panic!("stream implementations disagree: {in_memory:?} vs {from_reader:?}"),
    }
    in_memory
}

fn failure(text: &str) -> String {
    match parse(text) {
        Err(Error::ParsingFailed(failed)) => failed.to_string(),
        other => panic!("expected a parse failure for {text:?}, got {other:?}"),
    }
}

fn int(value: i64) -> Value {
    Value::from(value)
}

fn object<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Object(BTreeMap::from_iter(
        entries.map(|(key, value)| (key.to_owned(), value)),
    ))
}

#[test]
fn literals() -> Result<()> {
    assert_eq!(parse("null")?, Value::Null);
    assert_eq!(parse("true")?, Value::Bool(true));
    assert_eq!(parse("false")?, Value::Bool(false));
    assert_matches!(parse("abcd"), Err(Error::ParsingFailed(_)));
    assert_matches!(parse("nul"), Err(Error::ParsingFailed(_)));
    Ok(())
}

#[test]
fn strings() -> Result<()> {
    assert_eq!(parse(r#""abc""#)?, "abc".into());
    assert_eq!(parse(r#""""#)?, "".into());
    assert_eq!(parse(r#""\"""#)?, "\"".into());
    assert_eq!(parse(r#""\"\f\b\n\r\\\t\/""#)?, "\"\u{c}\u{8}\n\r\\\t/".into());
    assert_eq!(parse(r#""\u003d""#)?, "=".into());
    assert_eq!(parse(r#""äöü 🦀""#)?, "äöü 🦀".into());
    Ok(())
}

#[test]
fn surrogate_pairs() -> Result<()> {
    assert_eq!(parse(r#""\ud83e\udd80""#)?, "🦀".into());
    assert_eq!(parse(r#""\uD83E\uDD80!""#)?, "🦀!".into());
    assert_matches!(parse(r#""\ud83e""#), Err(Error::ParsingFailed(_)));
    Ok(())
}

#[test]
fn invalid_surrogates() {
    let message = failure(r#""\ud83eA""#);
    assert!(message.ends_with("Expected `\\u` but found `A`. @ L: 1, C: 7"), "{message}");
    let message = failure(r#""\ud83e\u0041""#);
    assert!(
        message.ends_with("Expected low surrogate but found `0041` @ L: 1, C: 13"),
        "{message}"
    );
    let message = failure(r#""\udd80""#);
    assert!(message.ends_with("Invalid unicode escape `dd80` @ L: 1, C: 7"), "{message}");
}

#[test]
fn invalid_strings() {
    let message = failure(r#""abc"#);
    assert!(
        message.ends_with("Expected string character but found end of string @ L: 1, C: 4"),
        "{message}"
    );

    let message = failure(r#""\x""#);
    assert!(message.contains("Expected `u` but found `x`. @ L: 1, C: 2"), "{message}");
    assert!(message.ends_with("Expected `/` but found `x`. @ L: 1, C: 2"), "{message}");

    let message = failure("\"a\nb\"");
    assert!(
        message.ends_with("Unescaped control character '\\n' in string @ L: 1, C: 2"),
        "{message}"
    );
}

#[test]
fn numbers() -> Result<()> {
    assert_eq!(parse("0")?, int(0));
    assert_eq!(parse("45")?, int(45));
    assert_eq!(parse("-1")?, int(-1));
    assert_eq!(parse("-0")?, int(0));
    assert_eq!(parse("1.1")?, 1.1.into());
    assert_eq!(parse("1e+0")?, 1.0.into());
    assert_eq!(parse("1.54e-2")?, 1.54e-2.into());
    assert_eq!(parse("2E3")?, 2000.0.into());
    assert_eq!(parse("9223372036854775807")?, i64::MAX.into());
    assert_eq!(
        parse("9223372036854775808")?,
        Value::Number(Number::Float(9223372036854775808.0))
    );
    Ok(())
}

#[test]
fn invalid_numbers() {
    assert_eq!(
        failure("01"),
        "Found leading zero in json number @ L: 1, C: 1"
    );
    assert_eq!(
        failure("1."),
        "Expected one of `0123456789` but found end of string @ L: 1, C: 2"
    );
    assert_matches!(parse("-"), Err(Error::ParsingFailed(_)));
    assert_matches!(parse("1e"), Err(Error::ParsingFailed(_)));
    assert_matches!(parse("+1"), Err(Error::ParsingFailed(_)));
    assert_matches!(parse(".5"), Err(Error::ParsingFailed(_)));
}

#[test]
fn arrays() -> Result<()> {
    assert_eq!(parse("[]")?, Value::Array(vec![]));
    assert_eq!(parse("[     ]")?, Value::Array(vec![]));
    assert_eq!(parse("[1]")?, Value::Array(vec![int(1)]));
    assert_eq!(parse("[1,  2 ,3]")?, Value::Array(vec![int(1), int(2), int(3)]));
    assert_eq!(
        parse(r#"[1, "two", 3, "four"]"#)?,
        Value::Array(vec![int(1), "two".into(), int(3), "four".into()])
    );
    assert_eq!(parse("[ null ]")?, Value::Array(vec![Value::Null]));
    assert_eq!(
        parse("[1, [2,3], [],[[]]]")?,
        Value::Array(vec![
            int(1),
            Value::Array(vec![int(2), int(3)]),
            Value::Array(vec![]),
            Value::Array(vec![Value::Array(vec![])]),
        ])
    );
    assert_matches!(parse("[1,]"), Err(Error::ParsingFailed(_)));
    assert_matches!(parse("[1 2]"), Err(Error::ParsingFailed(_)));
    Ok(())
}

#[test]
fn objects() -> Result<()> {
    assert_eq!(parse("{}")?, object([]));
    assert_eq!(parse("{     }")?, object([]));
    assert_eq!(parse(r#"{"a": 1}"#)?, object([("a", int(1))]));
    assert_eq!(parse(r#"{"a":true}"#)?, object([("a", true.into())]));
    assert_eq!(
        parse(r#"{"a": {"b": {}}}"#)?,
        object([("a", object([("b", object([]))]))])
    );
    assert_eq!(
        parse(r#"{"a": 1, "b" : [null], "a": 2}"#)?,
        object([("a", int(2)), ("b", Value::Array(vec![Value::Null]))])
    );
    assert_matches!(parse(r#"{"a" 1}"#), Err(Error::ParsingFailed(_)));
    assert_matches!(parse("{a: 1}"), Err(Error::ParsingFailed(_)));
    Ok(())
}

#[test]
fn document_whitespace() -> Result<()> {
    assert_eq!(parse(" {}  ")?, object([]));
    assert_eq!(parse("\n\t[\u{3000}1\u{a0}]\r\n")?, Value::Array(vec![int(1)]));
    Ok(())
}

#[test]
fn trailing_input() -> Result<()> {
    assert_eq!(
        failure("[1] x"),
        "Expected end-of-file but found `x` @ L: 1, C: 4"
    );
    let config = Config::default().allow_trailing_input(true);
    assert_eq!(parse_str("[1] x", config)?, Value::Array(vec![int(1)]));
    Ok(())
}

#[test]
fn failures_are_located() {
    // the object entry is backtracked, so the failure is reported where it started
    let message = failure("{\n  \"a\": [1,\n    2,\n    x]\n}");
    assert!(
        message.ends_with("Expected `}` but found `\"`. @ L: 2, C: 2"),
        "{message}"
    );
    assert_eq!(
        failure("[1,\n 2]]"),
        "Expected end-of-file but found `]` @ L: 2, C: 3"
    );
}

#[test]
fn deep_nesting() -> Result<()> {
    let depth = 1000;
    let text = "[".repeat(depth) + &"]".repeat(depth);
    let mut value = parse(&text)?;
    let mut seen = 0;
    while let Value::Array(mut items) = value {
        seen += 1;
        value = match items.pop() {
            Some(item) => item,
            None => break,
        };
    }
    assert_eq!(seen, depth);
    Ok(())
}

#[test]
fn long_arrays() -> Result<()> {
    let text = format!("[{}]", vec!["1"; 10_000].join(","));
    assert_matches!(parse(&text)?, Value::Array(items) if items.len() == 10_000);
    Ok(())
}

#[test]
fn display_writes_json() -> Result<()> {
    let text = r#"{"a":[1,2.5,-3.0,"x\n\"y\""],"b":{"c":null,"d":false}}"#;
    let value = parse(text)?;
    assert_eq!(value.to_string(), text);
    assert_eq!(parse(&value.to_string())?, value);
    assert_eq!(Value::from("\u{1}").to_string(), r#""\u0001""#);
    Ok(())
}
