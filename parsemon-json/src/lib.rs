//! Parsing of JSON documents, built from [`parsemon`] combinators.
#![warn(missing_docs)]

mod parser;
mod value;

pub use parser::{document, parse_str, parse_str_with, parse_stream, value, Config};
pub use value::{Number, Value};

pub use parsemon::Error;

#[cfg(test)]
mod tests;
