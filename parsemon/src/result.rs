//! Outcomes of individual parsing steps.
use std::ops::Add;

/// An expected pattern that was not found at a position of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Describes what was expected and what was found instead.
    pub message: String,
    /// The character offset, counted from the start of the document, where the pattern was
    /// expected.
    pub position: usize,
}

impl Failure {
    /// Creates a failure for `message` at `position`.
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// The failures of all alternatives that were attempted, in the order they were attempted.
///
/// This is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failures {
    first: Failure,
    rest: Vec<Failure>,
}

impl Failures {
    /// Returns the failure of the alternative that was attempted first.
    pub fn first(&self) -> &Failure {
        &self.first
    }

    /// Number of collected failures, always at least `1`.
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// Always `false`, provided for symmetry with [`len`][Self::len].
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over the failures in attempt order.
    pub fn iter(&self) -> impl Iterator<Item = &Failure> + '_ {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    /// Returns the failures in attempt order.
    pub fn into_vec(self) -> Vec<Failure> {
        let mut failures = Vec::with_capacity(self.len());
        failures.push(self.first);
        failures.extend(self.rest);
        failures
    }
}

impl From<Failure> for Failures {
    fn from(failure: Failure) -> Self {
        Self {
            first: failure,
            rest: vec![],
        }
    }
}

impl IntoIterator for Failures {
    type Item = Failure;
    type IntoIter = std::vec::IntoIter<Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl Add for Failures {
    type Output = Failures;

    fn add(mut self, other: Failures) -> Failures {
        self.rest.reserve(other.len());
        self.rest.push(other.first);
        self.rest.extend(other.rest);
        self
    }
}

impl Add<Failure> for Failures {
    type Output = Failures;

    fn add(mut self, other: Failure) -> Failures {
        self.rest.push(other);
        self
    }
}

impl Add for Failure {
    type Output = Failures;

    fn add(self, other: Failure) -> Failures {
        Failures::from(self) + other
    }
}

impl Add<Failures> for Failure {
    type Output = Failures;

    fn add(self, other: Failures) -> Failures {
        Failures::from(self) + other
    }
}

/// Result of running a parser up to some point of the input.
///
/// Unlike a plain [`Result`], a failed `ParseResult` can hold the failures of several
/// alternatives. These are combined using `+`, see the [`Add`] implementation.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult<T> {
    /// The parser matched and produced `value`, leaving the input at `position`.
    Success {
        /// The produced value.
        value: T,
        /// The stream position after matching.
        position: usize,
    },
    /// The parser, and any alternatives tried on the way, did not match.
    Failure(Failures),
}

impl<T> ParseResult<T> {
    /// A successful result.
    #[inline]
    pub fn success(value: T, position: usize) -> Self {
        ParseResult::Success { value, position }
    }

    /// A failed result containing a single failure.
    #[inline]
    pub fn failure(message: impl Into<String>, position: usize) -> Self {
        ParseResult::Failure(Failure::new(message, position).into())
    }

    /// Returns whether this result holds one or more failures.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, ParseResult::Failure(_))
    }

    /// Returns whether this result holds a value.
    #[inline]
    pub fn is_success(&self) -> bool {
        !self.is_failure()
    }

    /// Transforms a successful value, leaving failures untouched.
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseResult<U> {
        match self {
            ParseResult::Success { value, position } => ParseResult::Success {
                value: f(value),
                position,
            },
            ParseResult::Failure(failures) => ParseResult::Failure(failures),
        }
    }

    /// Returns the failures, if any.
    pub fn failures(&self) -> Option<&Failures> {
        match self {
            ParseResult::Success { .. } => None,
            ParseResult::Failure(failures) => Some(failures),
        }
    }

    /// Converts into a plain [`Result`], dropping the success position.
    pub fn into_result(self) -> Result<T, Failures> {
        match self {
            ParseResult::Success { value, .. } => Ok(value),
            ParseResult::Failure(failures) => Err(failures),
        }
    }
}

/// Merges the outcomes of two alternatives.
///
/// Two failures are concatenated with the failures of `self` first. If exactly one side
/// succeeded, that side is returned, preferring `self` when both succeeded.
impl<T> Add for ParseResult<T> {
    type Output = ParseResult<T>;

    fn add(self, other: ParseResult<T>) -> ParseResult<T> {
        match (self, other) {
            (ParseResult::Failure(first), ParseResult::Failure(second)) => {
                ParseResult::Failure(first + second)
            }
            (ParseResult::Failure(_), success) => success,
            (success, _) => success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(failures: &Failures) -> Vec<&str> {
        failures.iter().map(|f| f.message.as_str()).collect()
    }

    #[test]
    fn map_only_touches_values() {
        assert_eq!(
            ParseResult::success(2, 5).map(|n| n * 10),
            ParseResult::success(20, 5)
        );

        let failed: ParseResult<i32> = ParseResult::failure("nope", 3);
        assert_eq!(failed.clone().map(|n| n * 10), failed.map(|n| n + 1));
    }

    #[test]
    fn failures_concatenate_in_attempt_order() {
        let combined = ParseResult::<()>::failure("a", 0)
            + ParseResult::failure("b", 1)
            + ParseResult::failure("c", 2);
        let failures = combined.failures().unwrap();
        assert_eq!(messages(failures), ["a", "b", "c"]);
        assert_eq!(failures.len(), 3);
        assert_eq!(failures.first().position, 0);
    }

    #[test]
    fn failures_plus_failures_keeps_both_lists() {
        let left = Failure::new("a", 0) + Failure::new("b", 0);
        let right = Failure::new("c", 0) + Failure::new("d", 0);
        assert_eq!(messages(&(left + right)), ["a", "b", "c", "d"]);

        let prepended = Failure::new("x", 0) + (Failure::new("y", 0) + Failure::new("z", 0));
        assert_eq!(messages(&prepended), ["x", "y", "z"]);
    }

    #[test]
    fn success_wins_over_failure() {
        let failed: ParseResult<&str> = ParseResult::failure("a", 0);
        assert_eq!(
            failed.clone() + ParseResult::success("b", 1),
            ParseResult::success("b", 1)
        );
        assert_eq!(
            ParseResult::success("c", 1) + failed,
            ParseResult::success("c", 1)
        );
    }

    #[test]
    fn into_result() {
        assert_eq!(ParseResult::success('x', 1).into_result(), Ok('x'));
        let err = ParseResult::<char>::failure("e", 4).into_result().unwrap_err();
        assert_eq!(err.into_vec(), vec![Failure::new("e", 4)]);
    }
}
