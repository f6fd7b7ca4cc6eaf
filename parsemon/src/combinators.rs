//! Combinators built on top of the core parsers.
//!
//! Everything here is expressed using [`bind`], [`choice`], [`try_parser`] and friends or, for the
//! repeating combinators, using a loop of tail steps. All repeating combinators are stack safe for
//! any number of repetitions.
use crate::{
    bind, choice, fail, fmap, one_of,
    parser::{resume, Step},
    try_parser, unit, Continuation, ParseResult, Parser, Stream, Trampoline,
};

/// Characters classified as whitespace by Unicode, including line breaks.
pub const WHITESPACE: &str = "\u{9}\u{a}\u{b}\u{c}\u{d}\u{20}\u{85}\u{a0}\u{1680}\u{2000}\u{2001}\
    \u{2002}\u{2003}\u{2004}\u{2005}\u{2006}\u{2007}\u{2008}\u{2009}\u{200a}\u{2028}\u{2029}\
    \u{202f}\u{205f}\u{3000}";

/// Runs `first` and then `second`, keeping the value of `second`.
pub fn chain<S, T, U>(first: Parser<S, T>, second: Parser<S, U>) -> Parser<S, U>
where
    S: Stream,
    T: 'static,
    U: 'static,
{
    bind(first, move |_| second.clone())
}

/// Runs `first` and then `second`, keeping the value of `first`.
pub fn left<S, T, U>(first: Parser<S, T>, second: Parser<S, U>) -> Parser<S, T>
where
    S: Stream,
    T: 'static,
    U: 'static,
{
    Parser::from_fn(move |stream, cont| {
        let second = second.clone();
        on_success(&first, stream, cont, move |stream, value, cont| {
            second.tail_call(
                stream,
                Box::new(move |stream, result| resume(cont, stream, result.map(|_| value))),
            )
        })
    })
}

/// Tries each of `parsers` in order, as a chain of [`choice`]s.
///
/// Given no parsers at all, the resulting parser always fails.
pub fn choices<S: Stream, T: 'static>(
    parsers: impl IntoIterator<Item = Parser<S, T>>,
) -> Parser<S, T> {
    parsers
        .into_iter()
        .reduce(choice)
        .unwrap_or_else(|| fail("Expected one of no alternatives"))
}

/// Applies `parser` as often as possible, including zero times.
///
/// Each application is wrapped in [`try_parser`], so a final failing application does not consume
/// input. Repetition also stops when `parser` succeeds without consuming input.
pub fn many<S: Stream, T: 'static>(parser: Parser<S, T>) -> Parser<S, Vec<T>> {
    let attempt = attempt(parser);
    Parser::from_fn(move |stream, cont| {
        let attempt = attempt.clone();
        Trampoline::tail(move || collect(attempt, vec![], stream, cont))
    })
}

/// Applies `parser` as often as possible, but at least once.
pub fn many1<S: Stream, T: 'static>(parser: Parser<S, T>) -> Parser<S, Vec<T>> {
    let rest = attempt(parser.clone());
    Parser::from_fn(move |stream, cont| {
        let rest = rest.clone();
        on_success(&parser, stream, cont, move |stream, first, cont| {
            Trampoline::tail(move || collect(rest, vec![first], stream, cont))
        })
    })
}

/// Applies `parser` as often as possible, with `separator` between consecutive applications.
///
/// A separator is only consumed together with the following application of `parser`.
pub fn separated_by<S, T, U>(parser: Parser<S, T>, separator: Parser<S, U>) -> Parser<S, Vec<T>>
where
    S: Stream,
    T: 'static,
    U: 'static,
{
    let first = attempt(parser.clone());
    let rest = attempt(chain(separator, parser));
    Parser::from_fn(move |stream, cont| {
        let rest = rest.clone();
        on_success(&first, stream, cont, move |stream, first, cont| match first {
            Some(first) => Trampoline::tail(move || collect(rest, vec![first], stream, cont)),
            None => {
                let position = stream.position();
                resume(cont, stream, ParseResult::success(vec![], position))
            }
        })
    })
}

/// Runs `prefix`, `parser` and `suffix`, keeping the value of `parser`.
pub fn enclosed_by<S, T, P, Q>(
    parser: Parser<S, T>,
    prefix: Parser<S, P>,
    suffix: Parser<S, Q>,
) -> Parser<S, T>
where
    S: Stream,
    T: 'static,
    P: 'static,
    Q: 'static,
{
    chain(prefix, left(parser, suffix))
}

/// Applies `parser` repeatedly until `delimiter` matches.
///
/// Before each application of `parser`, `delimiter` is tried. Once it matches, the values of
/// `parser` are returned and the input matched by `delimiter` stays consumed. When neither matches
/// the whole parser fails.
pub fn until<S, T, U>(parser: Parser<S, T>, delimiter: Parser<S, U>) -> Parser<S, Vec<T>>
where
    S: Stream,
    T: 'static,
    U: 'static,
{
    let item = choice(fmap(|_| None, delimiter), fmap(Some, parser));
    Parser::from_fn(move |stream, cont| {
        let item = item.clone();
        Trampoline::tail(move || collect(item, vec![], stream, cont))
    })
}

/// Applies `parser` exactly `count` times.
pub fn repeat<S: Stream, T: 'static>(parser: Parser<S, T>, count: usize) -> Parser<S, Vec<T>> {
    Parser::from_fn(move |stream, cont| {
        let parser = parser.clone();
        Trampoline::tail(move || repeat_step(parser, count, Vec::with_capacity(count), stream, cont))
    })
}

/// Returns `Some` value of `parser` or `None` when `parser` fails without consuming input.
pub fn optional<S: Stream, T: 'static>(parser: Parser<S, T>) -> Parser<S, Option<T>> {
    choice(fmap(Some, parser), none())
}

/// Matches a single whitespace character, see [`WHITESPACE`].
pub fn whitespace<S: Stream>() -> Parser<S, char> {
    one_of(WHITESPACE)
}

fn none<S: Stream, T: 'static>() -> Parser<S, Option<T>> {
    fmap(|()| None, unit(()))
}

/// Wraps a repeated parser so that a failing final application yields `None`.
fn attempt<S: Stream, T: 'static>(parser: Parser<S, T>) -> Parser<S, Option<T>> {
    choice(try_parser(fmap(Some, parser)), none())
}

/// Runs `parser` and hands the value to `next`, passing failures on to `cont`.
fn on_success<S, T, U>(
    parser: &Parser<S, T>,
    stream: S,
    cont: Continuation<S, U>,
    next: impl FnOnce(S, T, Continuation<S, U>) -> Step + 'static,
) -> Step
where
    S: Stream,
    T: 'static,
    U: 'static,
{
    parser.tail_call(
        stream,
        Box::new(move |stream, result| match result {
            ParseResult::Success { value, .. } => next(stream, value, cont),
            ParseResult::Failure(failures) => resume(cont, stream, ParseResult::Failure(failures)),
        }),
    )
}

/// Applies `item` until it yields `None` or stops making progress, appending values to `items`.
fn collect<S: Stream, T: 'static>(
    item: Parser<S, Option<T>>,
    mut items: Vec<T>,
    stream: S,
    cont: Continuation<S, Vec<T>>,
) -> Step {
    let start = stream.position();
    let next = item.clone();
    on_success(&item, stream, cont, move |stream, value, cont| {
        let position = stream.position();
        match value {
            Some(value) => {
                items.push(value);
                if position == start {
                    resume(cont, stream, ParseResult::success(items, position))
                } else {
                    Trampoline::tail(move || collect(next, items, stream, cont))
                }
            }
            None => resume(cont, stream, ParseResult::success(items, position)),
        }
    })
}

fn repeat_step<S: Stream, T: 'static>(
    parser: Parser<S, T>,
    remaining: usize,
    mut items: Vec<T>,
    stream: S,
    cont: Continuation<S, Vec<T>>,
) -> Step {
    if remaining == 0 {
        let position = stream.position();
        return resume(cont, stream, ParseResult::success(items, position));
    }
    let next = parser.clone();
    on_success(&parser, stream, cont, move |stream, value, cont| {
        items.push(value);
        Trampoline::tail(move || repeat_step(next, remaining - 1, items, stream, cont))
    })
}
