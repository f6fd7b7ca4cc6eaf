//! The parser monad.
use std::{any::Any, cell::RefCell, fmt, mem::ManuallyDrop, ops::BitOr, rc::Rc};

use crate::{stream::ResetPoint, ParseResult, Stream, Trampoline};

/// A single step of a parser run.
pub type Step = Trampoline<()>;

/// What happens with the outcome of a parser: receives the progressed stream and the result.
pub type Continuation<S, T> = Box<dyn FnOnce(S, ParseResult<T>) -> Step>;

/// A parser reading from streams of type `S` and producing values of type `T`.
///
/// A `Parser` wraps a function taking a stream and a [`Continuation`]. The function reads from the
/// stream and then hands the stream together with its [`ParseResult`] to the continuation. All
/// calls that would otherwise nest are returned as [`Trampoline::Tail`] steps instead, which keeps
/// the native stack depth constant no matter how many parsers are combined.
///
/// Parsers hold no mutable state and cloning them is cheap. The same parser can be run any number
/// of times.
///
/// Dropping a parser also does not recurse on the native stack, however deeply the parsers it owns
/// are nested.
pub struct Parser<S: 'static, T: 'static> {
    function: ManuallyDrop<ParserFn<S, T>>,
}

type ParserFn<S, T> = Rc<dyn Fn(S, Continuation<S, T>) -> Step>;

thread_local! {
    // parser functions waiting to be freed, `None` unless `release` is draining it
    static PENDING_RELEASE: RefCell<Option<Vec<Box<dyn Any>>>> = const { RefCell::new(None) };
}

impl<S: 'static, T: 'static> Drop for Parser<S, T> {
    fn drop(&mut self) {
        // SAFETY: `function` is not accessed again after this
        let function = unsafe { ManuallyDrop::take(&mut self.function) };
        if Rc::strong_count(&function) == 1 {
            release(Box::new(function));
        }
    }
}

/// Frees a parser function that is no longer shared.
///
/// The parsers owned by `function` are freed in a loop instead of recursively: while the outermost
/// call drains the queue, nested calls only enqueue.
fn release(function: Box<dyn Any>) {
    let first = PENDING_RELEASE.try_with(|pending| {
        let mut pending = pending.borrow_mut();
        match pending.as_mut() {
            Some(queue) => {
                queue.push(function);
                None
            }
            None => {
                *pending = Some(vec![]);
                Some(function)
            }
        }
    });
    // during thread teardown `function` is dropped right away
    let Ok(Some(mut next)) = first else {
        return;
    };
    loop {
        drop(next);
        let popped = PENDING_RELEASE
            .try_with(|pending| pending.borrow_mut().as_mut().and_then(Vec::pop))
            .ok()
            .flatten();
        match popped {
            Some(function) => next = function,
            None => break,
        }
    }
    let _ = PENDING_RELEASE.try_with(|pending| pending.borrow_mut().take());
}

impl<S: 'static, T: 'static> Clone for Parser<S, T> {
    fn clone(&self) -> Self {
        Parser {
            function: ManuallyDrop::new(Rc::clone(&self.function)),
        }
    }
}

impl<S: 'static, T: 'static> fmt::Debug for Parser<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Parser(..)")
    }
}

impl<S: Stream, T: 'static> Parser<S, T> {
    /// Creates a parser from a function.
    ///
    /// The function must eventually pass its result to the continuation, and it should do so by
    /// returning a tail step, e.g. using [`resume`], rather than by calling the continuation
    /// directly.
    pub fn from_fn(function: impl Fn(S, Continuation<S, T>) -> Step + 'static) -> Self {
        let function: ParserFn<S, T> = Rc::new(function);
        Parser {
            function: ManuallyDrop::new(function),
        }
    }

    /// Invokes the parser function right away.
    #[inline]
    pub fn call(&self, stream: S, continuation: Continuation<S, T>) -> Step {
        (self.function)(stream, continuation)
    }

    /// Returns a step that will invoke the parser function.
    #[inline]
    pub fn tail_call(&self, stream: S, continuation: Continuation<S, T>) -> Step {
        let parser = self.clone();
        Trampoline::tail(move || parser.call(stream, continuation))
    }

    /// See [`bind`].
    pub fn bind<U: 'static>(self, binding: impl Fn(T) -> Parser<S, U> + 'static) -> Parser<S, U> {
        bind(self, binding)
    }

    /// See [`fmap`].
    pub fn map<U: 'static>(self, mapping: impl Fn(T) -> U + 'static) -> Parser<S, U> {
        fmap(mapping, self)
    }

    /// See [`choice`].
    pub fn or(self, other: Parser<S, T>) -> Parser<S, T> {
        choice(self, other)
    }
}

/// `p | q` is [`choice(p, q)`][choice].
impl<S: Stream, T: 'static> BitOr for Parser<S, T> {
    type Output = Parser<S, T>;

    fn bitor(self, other: Parser<S, T>) -> Parser<S, T> {
        choice(self, other)
    }
}

/// Returns a step that passes `stream` and `result` to `continuation`.
#[inline]
pub fn resume<S: Stream, T: 'static>(
    continuation: Continuation<S, T>,
    stream: S,
    result: ParseResult<T>,
) -> Step {
    Trampoline::tail(move || continuation(stream, result))
}

/// A parser that consumes nothing and always succeeds with `value`.
pub fn unit<S: Stream, T: Clone + 'static>(value: T) -> Parser<S, T> {
    Parser::from_fn(move |stream: S, cont| {
        let position = stream.position();
        resume(cont, stream, ParseResult::success(value.clone(), position))
    })
}

/// A parser that consumes nothing and always fails with `message`.
pub fn fail<S: Stream, T: 'static>(message: impl Into<String>) -> Parser<S, T> {
    let message: Rc<str> = message.into().into();
    Parser::from_fn(move |stream: S, cont| {
        let position = stream.position();
        resume(cont, stream, ParseResult::failure(&*message, position))
    })
}

/// Sequences two parsers.
///
/// Runs `parser` and, if it succeeds, runs the parser returned by `binding` applied to the value,
/// continuing where `parser` stopped. When `parser` fails, its failure is passed on and `binding`
/// is not called.
///
/// This is associative: `bind(bind(p, f), g)` behaves like `bind(p, |x| bind(f(x), g))`.
pub fn bind<S, T, U>(
    parser: Parser<S, T>,
    binding: impl Fn(T) -> Parser<S, U> + 'static,
) -> Parser<S, U>
where
    S: Stream,
    T: 'static,
    U: 'static,
{
    let binding = Rc::new(binding);
    Parser::from_fn(move |stream, cont: Continuation<S, U>| {
        let binding = Rc::clone(&binding);
        parser.tail_call(
            stream,
            Box::new(move |stream, result| match result {
                ParseResult::Success { value, .. } => binding(value).tail_call(stream, cont),
                ParseResult::Failure(failures) => {
                    resume(cont, stream, ParseResult::Failure(failures))
                }
            }),
        )
    })
}

/// Tries `first` and falls back to `second` if `first` fails without consuming input.
///
/// When `first` fails after consuming input, neither backtracking nor trying `second` happens.
/// Wrap `first` in [`try_parser`] to allow this. When both fail, the failures of `first` are
/// reported before those of `second`.
///
/// Consumption is detected by comparing stream positions.
pub fn choice<S: Stream, T: 'static>(first: Parser<S, T>, second: Parser<S, T>) -> Parser<S, T> {
    Parser::from_fn(move |stream: S, cont: Continuation<S, T>| {
        let start = stream.position();
        let second = second.clone();
        first.tail_call(
            stream,
            Box::new(move |stream, result| match result {
                ParseResult::Failure(failures) if stream.position() == start => second.tail_call(
                    stream,
                    Box::new(move |stream, other| {
                        let result = match other {
                            ParseResult::Failure(other) => ParseResult::Failure(failures + other),
                            success => success,
                        };
                        resume(cont, stream, result)
                    }),
                ),
                result => resume(cont, stream, result),
            }),
        )
    })
}

/// Rewinds the stream when `parser` fails.
///
/// This turns a failure after consuming input into one that consumed nothing, so that an enclosing
/// [`choice`] tries its other alternative.
pub fn try_parser<S: Stream, T: 'static>(parser: Parser<S, T>) -> Parser<S, T> {
    Parser::from_fn(move |stream: S, cont: Continuation<S, T>| {
        let point = stream.reset_point();
        parser.tail_call(
            stream,
            Box::new(move |mut stream, result| {
                if result.is_failure() {
                    stream.reset_stream(point);
                } else {
                    point.destroy();
                }
                resume(cont, stream, result)
            }),
        )
    })
}

/// Runs `parser` without consuming input when it succeeds.
///
/// On failure the stream is left wherever `parser` left it.
pub fn look_ahead<S: Stream, T: 'static>(parser: Parser<S, T>) -> Parser<S, T> {
    Parser::from_fn(move |stream: S, cont: Continuation<S, T>| {
        let point = stream.reset_point();
        parser.tail_call(
            stream,
            Box::new(move |mut stream, result| {
                if result.is_failure() {
                    point.destroy();
                } else {
                    stream.reset_stream(point);
                }
                resume(cont, stream, result)
            }),
        )
    })
}

/// Applies `mapping` to the value of `parser`.
///
/// This behaves like `bind(parser, |x| unit(mapping(x)))`. Failures are passed on unchanged.
pub fn fmap<S, T, U>(mapping: impl Fn(T) -> U + 'static, parser: Parser<S, T>) -> Parser<S, U>
where
    S: Stream,
    T: 'static,
    U: 'static,
{
    let mapping = Rc::new(mapping);
    Parser::from_fn(move |stream, cont: Continuation<S, U>| {
        let mapping = Rc::clone(&mapping);
        parser.tail_call(
            stream,
            Box::new(move |stream, result| {
                resume(cont, stream, result.map(|value| mapping(value)))
            }),
        )
    })
}

/// Builds the parser using `build` each time it runs.
///
/// This allows defining recursive grammars, where a parser refers to itself.
pub fn lazy<S: Stream, T: 'static>(build: impl Fn() -> Parser<S, T> + 'static) -> Parser<S, T> {
    Parser::from_fn(move |stream, cont| build().tail_call(stream, cont))
}
