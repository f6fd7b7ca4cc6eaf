//! Cursors over the characters of an input document.
//!
//! Parsers only see input through the [`Stream`] trait. Two implementations are provided:
//!
//! * [`StringStream`] has value semantics. Every clone is an independent cursor over a shared
//!   string, so restoring an earlier state amounts to restoring an offset.
//! * [`IoStream`][crate::IoStream] reads from a seekable source. All clones share one cursor and
//!   restoring an earlier state seeks the source.
//!
//! Both report positions as character offsets counted from the start of the document.
use std::{io, rc::Rc};

use crate::SourceMap;

/// Captured cursor state, see [`Stream::reset_point`].
pub trait ResetPoint: Sized {
    /// Releases the reset point without restoring it.
    ///
    /// Reset points that are neither restored nor destroyed are released when dropped.
    fn destroy(self) {}
}

/// A cursor over the characters of an input document.
///
/// Reset points must be used in a stack like fashion: a point obtained before another point must
/// not be restored while the later point is still in use. Violating this leaves the cursor of a
/// stateful stream in an unspecified (but memory safe) state. This is not detected at runtime.
pub trait Stream: Sized + 'static {
    /// Captured cursor state for this stream.
    type ResetPoint: ResetPoint;

    /// Creates a stream positioned at the start of `text`.
    fn from_string(text: &str) -> Self;

    /// Returns the character at the current position without consuming it.
    ///
    /// Returns `None` at the end of the input.
    fn peek(&mut self) -> Option<char>;

    /// Consumes and returns the character at the current position.
    ///
    /// Returns `None`, leaving the position unchanged, at the end of the input.
    fn read(&mut self) -> Option<char>;

    /// The number of characters consumed since the start of the document.
    fn position(&self) -> usize;

    /// Returns all characters from the current position to the end of the input.
    ///
    /// This does not consume those characters.
    fn remaining(&mut self) -> String;

    /// Captures the current cursor state.
    fn reset_point(&self) -> Self::ResetPoint;

    /// Restores the cursor state captured in `point`.
    fn reset_stream(&mut self, point: Self::ResetPoint);

    /// Builds a [`SourceMap`] of the whole document, independent of the current position.
    fn source_map(&mut self) -> SourceMap;

    /// Returns and clears an IO error that occured while reading.
    ///
    /// Streams that encounter an IO error behave as if the input ended at that point. Streams
    /// without an underlying IO source always return `Ok(())`.
    fn check_io_error(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An in-memory stream with value semantics.
///
/// Cloning is cheap and produces an independent cursor.
#[derive(Clone, Debug)]
pub struct StringStream {
    text: Rc<str>,
    // byte offset into `text`, always on a char boundary
    offset: usize,
    position: usize,
}

/// Reset point of a [`StringStream`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StringResetPoint {
    offset: usize,
    position: usize,
}

impl ResetPoint for StringResetPoint {}

impl StringStream {
    /// Creates a stream positioned at the start of `text`.
    pub fn new(text: impl Into<Rc<str>>) -> Self {
        Self {
            text: text.into(),
            offset: 0,
            position: 0,
        }
    }

    /// Returns the unconsumed input without copying it.
    pub fn as_str(&self) -> &str {
        &self.text[self.offset..]
    }
}

impl Stream for StringStream {
    type ResetPoint = StringResetPoint;

    fn from_string(text: &str) -> Self {
        Self::new(text)
    }

    #[inline]
    fn peek(&mut self) -> Option<char> {
        self.as_str().chars().next()
    }

    #[inline]
    fn read(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        self.position += 1;
        Some(c)
    }

    #[inline]
    fn position(&self) -> usize {
        self.position
    }

    fn remaining(&mut self) -> String {
        self.as_str().to_owned()
    }

    #[inline]
    fn reset_point(&self) -> StringResetPoint {
        StringResetPoint {
            offset: self.offset,
            position: self.position,
        }
    }

    #[inline]
    fn reset_stream(&mut self, point: StringResetPoint) {
        self.offset = point.offset;
        self.position = point.position;
    }

    fn source_map(&mut self) -> SourceMap {
        SourceMap::new(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &["", "1", "abc", "a\nb\r\nc", "äöü ß", "🦀 crab\n\t"];

    fn roundtrip<S: Stream>() {
        for text in SAMPLES {
            assert_eq!(S::from_string(text).remaining(), *text);
        }
    }

    fn reads_in_order<S: Stream>() {
        for text in SAMPLES {
            let mut stream = S::from_string(text);
            for (n, c) in text.chars().enumerate() {
                assert_eq!(stream.position(), n);
                assert_eq!(stream.peek(), Some(c));
                assert_eq!(stream.read(), Some(c));
                assert_eq!(stream.remaining(), text.chars().skip(n + 1).collect::<String>());
            }
            assert_eq!(stream.peek(), None);
            assert_eq!(stream.read(), None);
            assert_eq!(stream.position(), text.chars().count());
        }
    }

    fn peek_does_not_consume<S: Stream>() {
        for text in SAMPLES.iter().filter(|text| !text.is_empty()) {
            let mut stream = S::from_string(text);
            let peeked = stream.peek();
            assert_eq!(stream.peek(), peeked);
            assert_eq!(stream.position(), 0);
            assert_eq!(stream.remaining(), *text);
            assert_eq!(stream.read(), peeked);
            assert_eq!(stream.position(), 1);
        }
    }

    fn reset_restores_cursor<S: Stream>() {
        for text in SAMPLES.iter().filter(|text| !text.is_empty()) {
            let mut stream = S::from_string(text);
            stream.read();
            let point = stream.reset_point();
            let read = stream.read();
            stream.read();
            stream.reset_stream(point);
            assert_eq!(stream.position(), 1);
            assert_eq!(stream.read(), read);
            assert_eq!(stream.remaining(), text.chars().skip(2).collect::<String>());
        }
    }

    fn nested_reset_points<S: Stream>() {
        let mut stream = S::from_string("abcdef");
        let outer = stream.reset_point();
        stream.read();
        let inner = stream.reset_point();
        stream.read();
        stream.read();
        stream.reset_stream(inner);
        assert_eq!(stream.peek(), Some('b'));
        stream.read();
        stream.reset_stream(outer);
        assert_eq!(stream.position(), 0);
        assert_eq!(stream.remaining(), "abcdef");
    }

    fn source_map_covers_whole_document<S: Stream>() {
        let mut stream = S::from_string("ab\ncd\n");
        stream.read();
        stream.read();
        stream.read();
        assert_eq!(stream.source_map().newlines(), &[2, 5]);
        assert_eq!(stream.position(), 3);
        assert_eq!(stream.read(), Some('c'));
    }

    for_each_stream!(
        roundtrip,
        reads_in_order,
        peek_does_not_consume,
        reset_restores_cursor,
        nested_reset_points,
        source_map_covers_whole_document,
    );

    #[test]
    fn string_stream_clones_are_independent() {
        let mut stream = StringStream::from_string("xyz");
        let mut copy = stream.clone();
        assert_eq!(stream.read(), Some('x'));
        assert_eq!(copy.position(), 0);
        assert_eq!(copy.read(), Some('x'));
        assert_eq!(stream.as_str(), "yz");
    }
}
