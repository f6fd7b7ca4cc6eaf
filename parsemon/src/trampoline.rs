//! Tail call elimination for continuation passing code.
//!
//! A function that would otherwise end in a tail call returns a [`Trampoline::Tail`] describing
//! that call instead. [`Trampoline::run`] repeatedly performs the pending call in a loop until a
//! [`Trampoline::Done`] value is produced, so the native stack depth stays constant no matter how
//! many steps a computation takes.

/// A single step of a trampolined computation.
#[must_use]
pub enum Trampoline<T> {
    /// The computation finished with this value.
    Done(T),
    /// The computation continues by invoking this function.
    Tail(Box<dyn FnOnce() -> Trampoline<T>>),
}

impl<T> Trampoline<T> {
    /// Describes a pending call.
    ///
    /// The closure captures the arguments of the call, so `Trampoline::tail(move || f(a, b))`
    /// plays the role of a `Tail(f, a, b)` step.
    #[inline]
    pub fn tail(call: impl FnOnce() -> Trampoline<T> + 'static) -> Self {
        Trampoline::Tail(Box::new(call))
    }

    /// Drives the computation to its final value.
    pub fn run(self) -> T {
        let mut step = self;
        let mut steps: u64 = 0;
        loop {
            match step {
                Trampoline::Done(value) => {
                    tracing::trace!(steps, "trampoline finished");
                    return value;
                }
                Trampoline::Tail(call) => {
                    steps += 1;
                    step = call();
                }
            }
        }
    }
}

impl<T> std::fmt::Debug for Trampoline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trampoline::Done(_) => f.write_str("Done(..)"),
            Trampoline::Tail(_) => f.write_str("Tail(..)"),
        }
    }
}
