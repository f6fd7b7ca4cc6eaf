//! Running parsers to completion.
use std::{cell::Cell, rc::Rc};

use tracing::debug;

use crate::{error::ParsingFailed, Error, ParseResult, Parser, Stream, StringStream, Trampoline};

/// The value produced by a successful parser together with the input it did not consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    /// The value produced by the parser.
    pub value: T,
    /// Everything following the matched input.
    pub remaining_input: String,
}

/// Runs `parser` on `stream` until it passes a result to the final continuation.
///
/// Returns the stream as left by the parser together with the raw result. This only fails with
/// [`Error::Abandoned`].
pub fn run<S: Stream, T: 'static>(
    parser: &Parser<S, T>,
    stream: S,
) -> Result<(S, ParseResult<T>), Error> {
    let outcome = Rc::new(Cell::new(None));
    let sink = Rc::clone(&outcome);
    parser
        .call(
            stream,
            Box::new(move |stream, result| {
                sink.set(Some((stream, result)));
                Trampoline::Done(())
            }),
        )
        .run();
    outcome.take().ok_or(Error::Abandoned)
}

/// Runs `parser` on `stream`, turning failures into an [`Error`].
///
/// IO errors of the stream take precedence over parse failures. Failures are located using the
/// [`SourceMap`][crate::SourceMap] of the stream.
pub fn run_stream<S: Stream, T: 'static>(
    parser: &Parser<S, T>,
    stream: S,
) -> Result<Parsed<T>, Error> {
    debug!(start = stream.position(), "running parser");
    let (mut stream, result) = run(parser, stream)?;
    stream.check_io_error()?;
    match result {
        ParseResult::Success { value, position } => {
            let remaining_input = stream.remaining();
            stream.check_io_error()?;
            debug!(position, "parser matched");
            Ok(Parsed {
                value,
                remaining_input,
            })
        }
        ParseResult::Failure(failures) => {
            let source_map = stream.source_map();
            stream.check_io_error()?;
            let failed = ParsingFailed::new(failures, &source_map);
            debug!(failures = failed.failures().len(), "parser failed");
            Err(failed.into())
        }
    }
}

/// Runs `parser` on `input` using a [`StringStream`].
pub fn run_parser<T: 'static>(
    parser: &Parser<StringStream, T>,
    input: &str,
) -> Result<Parsed<T>, Error> {
    run_parser_with(parser, input)
}

/// Runs `parser` on `input` using the stream implementation `S`.
pub fn run_parser_with<S: Stream, T: 'static>(
    parser: &Parser<S, T>,
    input: &str,
) -> Result<Parsed<T>, Error> {
    debug!(input_len = input.len(), "parsing string input");
    run_stream(parser, S::from_string(input))
}
