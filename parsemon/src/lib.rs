//! Parsemon is a library of monadic parser combinators.
//!
//! Parsers are built from a handful of core building blocks and combined into larger parsers
//! using ordinary Rust functions:
//!
//! * _Monadic_: [`unit`] produces a value without reading input and [`bind`] sequences a parser
//!   with a function that chooses the next parser based on the value produced so far. Everything
//!   else, from [`fmap`] to [`many`], can be expressed in terms of these two plus [`choice`].
//!
//! * _Predictive by default_: [`choice`] only tries its second alternative when the first one
//!   failed without consuming input. Backtracking is opt-in, via [`try_parser`], and so is
//!   look-ahead, via [`look_ahead`].
//!
//! * _Error reporting_: When all alternatives fail, the failures of every alternative that was
//!   attempted are kept in order. Running a parser with [`run_parser`] locates them in the input
//!   and renders them as `<message> @ L: <line>, C: <column>`, joined by ` OR `.
//!
//! * _Stack safe_: Parsers are written in continuation-passing style and every step returns a
//!   [`Trampoline`] instead of calling the next step directly. A driver loop runs these steps,
//!   so neither long sequences of binds nor thousands of repetitions grow the native stack.
//!
//! * _Pluggable input_: Parsers are generic over the [`Stream`] they read from. The provided
//!   [`StringStream`] parses in-memory text, while [`IoStream`] reads from any seekable source
//!   such as a file. IO errors are deferred and reported once the parser is done, see
//!   [`Stream::check_io_error`].
//!
//! ## Using Parsemon
//!
//! ```rust
//! use parsemon::*;
//!
//! let digit = one_of("0123456789");
//! let number = fmap(|digits: Vec<char>| String::from_iter(digits), many1(digit));
//! let pair = bind(number.clone(), move |first| {
//!     let first = first.clone();
//!     fmap(move |second| (first.clone(), second), chain(literal(","), number.clone()))
//! });
//!
//! let parsed = run_parser(&pair, "12,345!").unwrap();
//! assert_eq!(parsed.value, ("12".to_owned(), "345".to_owned()));
//! assert_eq!(parsed.remaining_input, "!");
//!
//! let error = run_parser(&pair, "12;345").unwrap_err();
//! assert_eq!(error.to_string(), "Expected `,` but found `;`. @ L: 1, C: 2");
//! ```

#![warn(missing_docs)]

#[cfg(test)]
macro_rules! for_each_stream {
    ($($test:ident),* $(,)?) => {
        $(
            mod $test {
                #[test]
                fn string_stream() {
                    super::$test::<$crate::StringStream>();
                }

                #[test]
                fn io_stream() {
                    super::$test::<$crate::IoStream>();
                }
            }
        )*
    };
}

mod combinators;
mod error;
mod io_stream;
mod parser;
mod primitives;
mod result;
mod run;
mod source_map;
mod stream;
mod trampoline;

pub use combinators::{
    chain, choices, enclosed_by, left, many, many1, optional, repeat, separated_by, until,
    whitespace, WHITESPACE,
};
pub use error::{Error, LocatedFailure, ParsingFailed};
pub use io_stream::{IoConfig, IoResetPoint, IoStream};
pub use parser::{
    bind, choice, fail, fmap, lazy, look_ahead, resume, try_parser, unit, Continuation, Parser,
    Step,
};
pub use primitives::{character, end_of_file, literal, none_of, one_of};
pub use result::{Failure, Failures, ParseResult};
pub use run::{run, run_parser, run_parser_with, run_stream, Parsed};
pub use source_map::{Location, SourceMap};
pub use stream::{ResetPoint, Stream, StringResetPoint, StringStream};
pub use trampoline::Trampoline;
