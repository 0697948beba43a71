//! Streaming tokenizer for signed decimal integers.
//!
//! An integer is an optional `-` followed by one or more digits. Any other
//! byte separates integers. A `-` always closes the integer before it and
//! opens a new negative one, so `12-3` reads as `12, -3`. A `-` without
//! digits after it yields nothing.
//!
//! Digits are accumulated only while the magnitude is at most
//! [`MAGNITUDE_LIMIT`]; remaining digits of the same integer are dropped. A
//! run of 25 nines therefore reads as `999999999999999999`. The result is
//! always in `(-2^63, 2^63)`, so [`crate::EMPTY`] is never produced.
use std::io::{self, Read};

use crate::Key;

/// Bytes requested from the reader per refill.
pub const READ_SIZE: usize = 10_000;

/// Largest magnitude that can take one more digit without overflowing an `i64`.
pub const MAGNITUDE_LIMIT: i64 = (i64::MAX - 9) / 10;

/// The integer currently being read.
#[derive(Clone, Copy, Debug, Default)]
struct Token {
    /// Inside a token, i.e. a `-` or digit was seen since the last separator.
    open: bool,
    negative: bool,
    /// At least one digit was seen.
    digits: bool,
    magnitude: i64,
}

impl Token {
    fn value(&self) -> Key {
        if self.negative {
            -self.magnitude
        } else {
            self.magnitude
        }
    }

    /// Close the token, returning its value if it had any digits.
    fn close(&mut self) -> Option<Key> {
        let value = (self.open && self.digits).then(|| self.value());
        *self = Token::default();
        value
    }
}

/// Reads batches of integers from a byte source.
///
/// The read buffer is allocated once. A token that straddles two reads keeps
/// its state across the refill, so tokens of any length parse the same way
/// regardless of where the reads split them.
pub struct IntStream<R: Read> {
    reader: R,
    buf: Box<[u8]>,
    /// Number of valid bytes in `buf`.
    len: usize,
    /// Next byte of `buf` to look at.
    pos: usize,
    token: Token,
    eof: bool,
}

impl<R: Read> IntStream<R> {
    pub fn new(reader: R) -> Self {
        Self::with_read_size(reader, READ_SIZE)
    }

    pub fn with_read_size(reader: R, read_size: usize) -> Self {
        assert!(read_size > 0, "read size must be positive");
        Self {
            reader,
            buf: vec![0u8; read_size].into_boxed_slice(),
            len: 0,
            pos: 0,
            token: Token::default(),
            eof: false,
        }
    }

    /// True once the reader is exhausted and every integer was returned.
    pub fn is_done(&self) -> bool {
        self.eof && self.pos == self.len
    }

    /// Replace the contents of `out` by the next at most `max` integers.
    ///
    /// Returns how many were read; fewer than `max` means the input is exhausted.
    pub fn next_batch(&mut self, out: &mut Vec<Key>, max: usize) -> io::Result<usize> {
        out.clear();
        while out.len() < max {
            if self.pos == self.len {
                if self.eof {
                    break;
                }
                self.refill()?;
                if self.len == 0 {
                    self.eof = true;
                    // End of input in the middle of a token still emits it.
                    out.extend(self.token.close());
                    continue;
                }
            }
            self.scan(out, max);
        }
        Ok(out.len())
    }

    /// Tokenize buffered bytes until the buffer is consumed or `out` holds `max` integers.
    fn scan(&mut self, out: &mut Vec<Key>, max: usize) {
        let token = &mut self.token;
        while self.pos < self.len && out.len() < max {
            let b = self.buf[self.pos];
            self.pos += 1;
            match b {
                b'0'..=b'9' => {
                    token.open = true;
                    token.digits = true;
                    if token.magnitude <= MAGNITUDE_LIMIT {
                        token.magnitude = token.magnitude * 10 + (b - b'0') as i64;
                    }
                }
                b'-' => {
                    out.extend(token.close());
                    token.open = true;
                    token.negative = true;
                }
                _ => out.extend(token.close()),
            }
        }
    }

    fn refill(&mut self) -> io::Result<()> {
        self.pos = 0;
        self.len = loop {
            match self.reader.read(&mut self.buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        Ok(())
    }
}
