//! Parsers reading individual characters.
//!
//! All of these report failures at the position where they started and leave the stream there.
use std::rc::Rc;

use crate::{parser::resume, stream::ResetPoint, ParseResult, Parser, Stream};

/// Matches the exact character sequence `expected` and returns it.
pub fn literal<S: Stream>(expected: impl Into<String>) -> Parser<S, String> {
    let expected: Rc<str> = expected.into().into();
    Parser::from_fn(move |mut stream: S, cont| {
        let result = match_literal(&mut stream, &expected);
        resume(cont, stream, result)
    })
}

fn match_literal<S: Stream>(stream: &mut S, expected: &str) -> ParseResult<String> {
    let start = stream.reset_point();
    let position = stream.position();
    for expected_char in expected.chars() {
        match stream.peek() {
            Some(c) if c == expected_char => {
                stream.read();
            }
            found => {
                stream.reset_stream(start);
                let message = match found {
                    Some(c) => format!("Expected `{expected}` but found `{c}`."),
                    None => format!("Expected `{expected}` but found end of string"),
                };
                return ParseResult::failure(message, position);
            }
        }
    }
    start.destroy();
    ParseResult::success(expected.to_owned(), stream.position())
}

/// Matches a single character contained in `chars`.
pub fn one_of<S: Stream>(chars: impl Into<String>) -> Parser<S, char> {
    let chars: Rc<str> = chars.into().into();
    Parser::from_fn(move |mut stream: S, cont| {
        let position = stream.position();
        let result = match stream.peek() {
            Some(c) if chars.contains(c) => {
                stream.read();
                ParseResult::success(c, stream.position())
            }
            Some(c) => {
                ParseResult::failure(format!("Expected one of `{chars}` but found `{c}`"), position)
            }
            None => ParseResult::failure(
                format!("Expected one of `{chars}` but found end of string"),
                position,
            ),
        };
        resume(cont, stream, result)
    })
}

/// Matches a single character not contained in `chars`.
pub fn none_of<S: Stream>(chars: impl Into<String>) -> Parser<S, char> {
    let chars: Rc<str> = chars.into().into();
    Parser::from_fn(move |mut stream: S, cont| {
        let position = stream.position();
        let result = match stream.peek() {
            Some(c) if !chars.contains(c) => {
                stream.read();
                ParseResult::success(c, stream.position())
            }
            Some(c) => ParseResult::failure(
                format!("Expected none of `{chars}` but found `{c}`"),
                position,
            ),
            None => ParseResult::failure(
                format!("Expected none of `{chars}` but found end of string"),
                position,
            ),
        };
        resume(cont, stream, result)
    })
}

/// Matches any `count` characters and returns them.
///
/// When fewer than `count` characters are left, this fails without consuming any of them.
pub fn character<S: Stream>(count: usize) -> Parser<S, String> {
    Parser::from_fn(move |mut stream: S, cont| {
        let start = stream.reset_point();
        let position = stream.position();
        let mut chars = String::with_capacity(count);
        for _ in 0..count {
            match stream.read() {
                Some(c) => chars.push(c),
                None => {
                    stream.reset_stream(start);
                    return resume(
                        cont,
                        stream,
                        ParseResult::failure("Expected character but found end of string", position),
                    );
                }
            }
        }
        start.destroy();
        let position = stream.position();
        resume(cont, stream, ParseResult::success(chars, position))
    })
}

/// Succeeds only at the end of the input.
pub fn end_of_file<S: Stream>() -> Parser<S, ()> {
    Parser::from_fn(|mut stream: S, cont| {
        let position = stream.position();
        let result = match stream.peek() {
            None => ParseResult::success((), position),
            Some(c) => {
                ParseResult::failure(format!("Expected end-of-file but found `{c}`"), position)
            }
        };
        resume(cont, stream, result)
    })
}
