use std::collections::BTreeMap;

use parsemon::{
    bind, chain, choice, choices, enclosed_by, end_of_file, fail, fmap, lazy, left, literal,
    look_ahead, many, many1, one_of, optional, repeat, resume, run_stream, separated_by, unit,
    until, whitespace, Error, ParseResult, Parser, Stream, StringStream,
};

use crate::{Number, Value};

/// Configuration for the JSON parser.
#[derive(Clone, Default, Debug)]
#[non_exhaustive]
pub struct Config {
    /// When set, a document may be followed by arbitrary input, which is left unparsed.
    /// (Default: `false`)
    pub allow_trailing_input: bool,
}

impl Config {
    #[inline]
    /// Sets the [`allow_trailing_input`][Self#structfield.allow_trailing_input] field.
    pub fn allow_trailing_input(mut self, value: bool) -> Self {
        self.allow_trailing_input = value;
        self
    }
}

/// Parses the JSON document `text`.
pub fn parse_str(text: &str, config: Config) -> Result<Value, Error> {
    parse_str_with::<StringStream>(text, config)
}

/// Parses the JSON document `text` using the stream implementation `S`.
pub fn parse_str_with<S: Stream>(text: &str, config: Config) -> Result<Value, Error> {
    parse_stream(S::from_string(text), config)
}

/// Parses a JSON document read from `stream`.
pub fn parse_stream<S: Stream>(stream: S, config: Config) -> Result<Value, Error> {
    Ok(run_stream(&document(config), stream)?.value)
}

/// A JSON value surrounded by optional whitespace.
pub fn document<S: Stream>(config: Config) -> Parser<S, Value> {
    let document = enclosed_by(value(), whitespaces(), whitespaces());
    if config.allow_trailing_input {
        document
    } else {
        left(document, end_of_file())
    }
}

/// A single JSON value without surrounding whitespace.
pub fn value<S: Stream>() -> Parser<S, Value> {
    choices([
        fmap(Value::Number, number()),
        fmap(Value::String, string()),
        fmap(|_| Value::Null, literal("null")),
        fmap(Value::Array, lazy(array::<S>)),
        fmap(Value::Object, lazy(object::<S>)),
        boolean(),
    ])
}

fn whitespaces<S: Stream>() -> Parser<S, Vec<char>> {
    many(whitespace())
}

/// `,` between elements of arrays and objects.
fn separator<S: Stream>() -> Parser<S, Vec<char>> {
    chain(whitespaces(), chain(literal(","), whitespaces()))
}

fn digit<S: Stream>() -> Parser<S, char> {
    one_of("0123456789")
}

fn digits<S: Stream>() -> Parser<S, String> {
    fmap(String::from_iter, many1(digit()))
}

/// Runs both parsers, keeping both values.
fn pair<S: Stream, A: Clone + 'static, B: 'static>(
    first: Parser<S, A>,
    second: Parser<S, B>,
) -> Parser<S, (A, B)> {
    bind(first, move |a| fmap(move |b| (a.clone(), b), second.clone()))
}

fn number<S: Stream>() -> Parser<S, Number> {
    let sign = fmap(Option::unwrap_or_default, optional(literal("-")));
    let fraction = optional(fmap(|digits| format!(".{digits}"), chain(literal("."), digits())));
    let exponent = optional(bind(one_of("eE"), |_| {
        fmap(
            |(sign, digits): (Option<char>, String)| format!("e{}{digits}", String::from_iter(sign)),
            pair(optional(one_of("+-")), digits()),
        )
    }));

    let parts = pair(pair(pair(sign, integer()), fraction), exponent);
    bind(parts, |(((sign, integer), fraction), exponent)| {
        let is_float = fraction.is_some() || exponent.is_some();
        let text = format!(
            "{sign}{integer}{}{}",
            fraction.unwrap_or_default(),
            exponent.unwrap_or_default()
        );
        match to_number(&text, is_float) {
            Some(number) => unit(number),
            None => fail(format!("Invalid number `{text}`")),
        }
    })
}

/// The integral part of a number, without leading zeros.
fn integer<S: Stream>() -> Parser<S, String> {
    let zero = bind(literal("0"), |zero| {
        bind(optional(look_ahead(digit())), move |next| match next {
            Some(_) => fail("Found leading zero in json number"),
            None => unit(zero.clone()),
        })
    });
    let nonzero = bind(one_of("123456789"), |first| {
        fmap(
            move |rest: Vec<char>| std::iter::once(first).chain(rest).collect::<String>(),
            many(digit()),
        )
    });
    choice(zero, nonzero)
}

fn to_number(text: &str, is_float: bool) -> Option<Number> {
    if !is_float {
        if let Ok(value) = text.parse() {
            return Some(Number::Integer(value));
        }
    }
    text.parse().ok().map(Number::Float)
}

fn boolean<S: Stream>() -> Parser<S, Value> {
    choice(
        fmap(|_| Value::Bool(true), literal("true")),
        fmap(|_| Value::Bool(false), literal("false")),
    )
}

/// A quoted string.
///
/// The closing quote is tried before each character, so a failing escape sequence is reported
/// instead of being backtracked.
fn string<S: Stream>() -> Parser<S, String> {
    let chars = fmap(
        String::from_iter,
        until(choice(escaped(), unescaped()), literal("\"")),
    );
    chain(literal("\""), chars)
}

/// A character that needs no escaping within a string.
fn unescaped<S: Stream>() -> Parser<S, char> {
    Parser::from_fn(|mut stream: S, cont| {
        let position = stream.position();
        let result = match stream.peek() {
            Some(c) if c < ' ' => ParseResult::failure(
                format!("Unescaped control character {c:?} in string"),
                position,
            ),
            Some(c) if c != '"' && c != '\\' => {
                stream.read();
                ParseResult::success(c, stream.position())
            }
            Some(c) => ParseResult::failure(format!("Unexpected `{c}` in string"), position),
            None => {
                ParseResult::failure("Expected string character but found end of string", position)
            }
        };
        resume(cont, stream, result)
    })
}

fn escaped<S: Stream>() -> Parser<S, char> {
    let simple = [
        ('b', '\u{8}'),
        ('f', '\u{c}'),
        ('n', '\n'),
        ('r', '\r'),
        ('t', '\t'),
        ('"', '"'),
        ('\\', '\\'),
        ('/', '/'),
    ]
    .map(|(escape, translation)| chain(literal(escape), unit(translation)));
    chain(literal("\\"), choices([unicode_escape()].into_iter().chain(simple)))
}

fn hex_code_unit<S: Stream>() -> Parser<S, u32> {
    fmap(
        |digits: Vec<char>| {
            digits
                .into_iter()
                .fold(0, |acc, c| acc * 16 + c.to_digit(16).unwrap_or(0))
        },
        repeat(one_of("0123456789abcdefABCDEF"), 4),
    )
}

/// `uXXXX`, combining UTF-16 surrogate pairs.
fn unicode_escape<S: Stream>() -> Parser<S, char> {
    bind(chain(literal("u"), hex_code_unit()), |high| {
        if (0xd800..0xdc00).contains(&high) {
            bind(chain(literal("\\u"), hex_code_unit()), move |low| {
                if (0xdc00..0xe000).contains(&low) {
                    let code = 0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00);
                    char_or_fail(code)
                } else {
                    fail(format!("Expected low surrogate but found `{low:04x}`"))
                }
            })
        } else {
            char_or_fail(high)
        }
    })
}

fn char_or_fail<S: Stream>(code: u32) -> Parser<S, char> {
    match char::from_u32(code) {
        Some(c) => unit(c),
        None => fail(format!("Invalid unicode escape `{code:04x}`")),
    }
}

fn array<S: Stream>() -> Parser<S, Vec<Value>> {
    enclosed_by(
        separated_by(value(), separator()),
        chain(literal("["), whitespaces()),
        chain(whitespaces(), literal("]")),
    )
}

fn object<S: Stream>() -> Parser<S, BTreeMap<String, Value>> {
    let entry = bind(string(), |key| {
        let colon = chain(whitespaces(), chain(literal(":"), whitespaces()));
        chain(colon, fmap(move |item| (key.clone(), item), value()))
    });
    fmap(
        BTreeMap::from_iter,
        enclosed_by(
            separated_by(entry, separator()),
            chain(literal("{"), whitespaces()),
            chain(whitespaces(), literal("}")),
        ),
    )
}
