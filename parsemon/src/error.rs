//! Errors returned by the parser drivers.
use std::{fmt, io};

use thiserror::Error;

use crate::{Failure, Failures, Location, SourceMap};

/// Error returned when running a parser to completion.
#[derive(Error, Debug)]
pub enum Error {
    /// The parser did not match, see [`ParsingFailed`].
    #[error(transparent)]
    ParsingFailed(#[from] ParsingFailed),
    /// Reading the input failed.
    ///
    /// This takes precedence over parse failures, as those are usually caused by the input ending
    /// early due to the IO error.
    #[error("IO error during parsing: {}", .0)]
    Io(#[from] io::Error),
    /// A parser returned without passing a result to its continuation.
    #[error("parser finished without producing a result")]
    Abandoned,
}

/// A [`Failure`] together with its line and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedFailure {
    /// The error message.
    pub message: String,
    /// The character offset of the failure.
    pub position: usize,
    /// The source location of the failure.
    pub location: Location,
}

impl LocatedFailure {
    /// Looks up the location of `failure` in `source_map`.
    pub fn new(failure: Failure, source_map: &SourceMap) -> Self {
        Self {
            location: source_map.locate(failure.position),
            message: failure.message,
            position: failure.position,
        }
    }
}

impl fmt::Display for LocatedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.message, self.location)
    }
}

/// All failures of a parser that did not match the input.
///
/// Displays as the located failures in the order they were attempted, joined by ` OR `.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingFailed {
    failures: Vec<LocatedFailure>,
}

impl ParsingFailed {
    /// Locates all `failures` in `source_map`.
    pub fn new(failures: Failures, source_map: &SourceMap) -> Self {
        Self {
            failures: failures
                .into_iter()
                .map(|failure| LocatedFailure::new(failure, source_map))
                .collect(),
        }
    }

    /// The individual failures, never empty.
    pub fn failures(&self) -> &[LocatedFailure] {
        &self.failures
    }
}

impl fmt::Display for ParsingFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, failure) in self.failures.iter().enumerate() {
            if index > 0 {
                f.write_str(" OR ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParsingFailed {}
