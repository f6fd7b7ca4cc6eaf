//! A stream over seekable byte sources.
use std::{
    cell::RefCell,
    fmt,
    io::{self, BufRead, BufReader, Cursor, Read, Seek},
    rc::Rc,
};

use crate::{stream::ResetPoint, SourceMap, Stream};

trait Source: Read + Seek {}

impl<T: Read + Seek + ?Sized> Source for T {}

/// Configuration options for an [`IoStream`].
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct IoConfig {
    /// Capacity of the read buffer in bytes. (Default: 8 KiB)
    pub buffer_capacity: usize,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 8 << 10,
        }
    }
}

impl IoConfig {
    /// Sets the [`buffer_capacity`][Self#structfield.buffer_capacity] field.
    #[inline]
    pub fn buffer_capacity(mut self, value: usize) -> Self {
        self.buffer_capacity = value;
        self
    }
}

/// A stream decoding UTF-8 text from a seekable source.
///
/// All clones of an `IoStream` share the same cursor, so a stream must not be shared between
/// concurrent runs. Restoring a reset point seeks the source backwards.
///
/// IO errors are deferred: when reading fails, or the source contains invalid UTF-8, the stream
/// behaves as if the input ended at that point and keeps the error until
/// [`check_io_error`][Stream::check_io_error] is called. This way the parser exhausts its
/// alternatives, producing a parse failure, and the caller checks for an IO error outside of the
/// hot path.
#[derive(Clone)]
pub struct IoStream {
    state: Rc<RefCell<IoState>>,
}

/// Reset point of an [`IoStream`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IoResetPoint {
    byte_offset: u64,
    position: usize,
}

impl ResetPoint for IoResetPoint {}

struct IoState {
    reader: BufReader<Box<dyn Source>>,
    // byte offset of `reader` within the source
    physical: u64,
    // byte offset of the logical cursor, behind `physical` by the width of `peeked`
    byte_offset: u64,
    position: usize,
    peeked: Option<char>,
    failed: bool,
    io_error: Option<io::Error>,
}

impl IoStream {
    /// Creates an `IoStream` reading from the current position of `source`.
    ///
    /// Offsets and positions are counted from that position, which acts as the start of the
    /// document.
    pub fn from_read_seek(source: impl Read + Seek + 'static) -> Self {
        Self::with_config(source, IoConfig::default())
    }

    /// Creates an `IoStream` using the given configuration.
    pub fn with_config(source: impl Read + Seek + 'static, config: IoConfig) -> Self {
        let source: Box<dyn Source> = Box::new(source);
        let IoConfig { buffer_capacity } = config;
        IoStream {
            state: Rc::new(RefCell::new(IoState {
                reader: BufReader::with_capacity(buffer_capacity.max(1), source),
                physical: 0,
                byte_offset: 0,
                position: 0,
                peeked: None,
                failed: false,
                io_error: None,
            })),
        }
    }
}

impl fmt::Debug for IoStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("IoStream")
            .field("position", &state.position)
            .field("byte_offset", &state.byte_offset)
            .field("failed", &state.failed)
            .finish_non_exhaustive()
    }
}

impl IoState {
    #[cold]
    #[inline(never)]
    fn fail(&mut self, err: io::Error) {
        tracing::debug!(error = %err, position = self.position, "IO error while reading input");
        self.failed = true;
        if self.io_error.is_none() {
            self.io_error = Some(err);
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        loop {
            match self.reader.fill_buf() {
                Ok([]) => return None,
                Ok(buf) => {
                    let byte = buf[0];
                    self.reader.consume(1);
                    self.physical += 1;
                    return Some(byte);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.fail(err);
                    return None;
                }
            }
        }
    }

    /// Decodes the character at the physical position, advancing it.
    fn decode_char(&mut self) -> Option<char> {
        if self.failed {
            return None;
        }
        let mut bytes = [0; 4];
        bytes[0] = self.read_byte()?;
        let width = utf8_width(bytes[0]);
        if width == 0 {
            self.fail(invalid_utf8());
            return None;
        }
        for byte in &mut bytes[1..width] {
            match self.read_byte() {
                Some(value) => *byte = value,
                None => {
                    if !self.failed {
                        self.fail(invalid_utf8());
                    }
                    return None;
                }
            }
        }
        match std::str::from_utf8(&bytes[..width]) {
            Ok(decoded) => decoded.chars().next(),
            Err(_) => {
                self.fail(invalid_utf8());
                None
            }
        }
    }

    fn peek(&mut self) -> Option<char> {
        if self.peeked.is_none() {
            self.peeked = self.decode_char();
        }
        self.peeked
    }

    fn read(&mut self) -> Option<char> {
        let c = match self.peeked.take() {
            Some(c) => c,
            None => self.decode_char()?,
        };
        self.byte_offset += c.len_utf8() as u64;
        self.position += 1;
        Some(c)
    }

    fn seek_to(&mut self, byte_offset: u64) {
        let delta = byte_offset as i64 - self.physical as i64;
        if delta != 0 {
            if let Err(err) = self.reader.seek_relative(delta) {
                self.fail(err);
            }
        }
        self.physical = byte_offset;
    }

    fn restore(&mut self, byte_offset: u64, position: usize) {
        self.seek_to(byte_offset);
        self.byte_offset = byte_offset;
        self.position = position;
        self.peeked = None;
    }
}

fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => 0,
    }
}

fn invalid_utf8() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "input is not valid UTF-8")
}

impl Stream for IoStream {
    type ResetPoint = IoResetPoint;

    fn from_string(text: &str) -> Self {
        Self::from_read_seek(Cursor::new(text.as_bytes().to_vec()))
    }

    #[inline]
    fn peek(&mut self) -> Option<char> {
        self.state.borrow_mut().peek()
    }

    #[inline]
    fn read(&mut self) -> Option<char> {
        self.state.borrow_mut().read()
    }

    #[inline]
    fn position(&self) -> usize {
        self.state.borrow().position
    }

    fn remaining(&mut self) -> String {
        let mut state = self.state.borrow_mut();
        let (byte_offset, position) = (state.byte_offset, state.position);
        let mut rest = String::new();
        while let Some(c) = state.read() {
            rest.push(c);
        }
        state.restore(byte_offset, position);
        rest
    }

    #[inline]
    fn reset_point(&self) -> IoResetPoint {
        let state = self.state.borrow();
        IoResetPoint {
            byte_offset: state.byte_offset,
            position: state.position,
        }
    }

    fn reset_stream(&mut self, point: IoResetPoint) {
        self.state
            .borrow_mut()
            .restore(point.byte_offset, point.position);
    }

    fn source_map(&mut self) -> SourceMap {
        let mut state = self.state.borrow_mut();
        let (byte_offset, position) = (state.byte_offset, state.position);
        state.restore(0, 0);
        let map = SourceMap::from_chars(std::iter::from_fn(|| state.decode_char()));
        state.restore(byte_offset, position);
        map
    }

    fn check_io_error(&mut self) -> io::Result<()> {
        match self.state.borrow_mut().io_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
