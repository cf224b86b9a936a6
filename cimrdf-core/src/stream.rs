//! Incremental reader over a streamed JSON array.
//!
//! The conversion path consumes arbitrarily large batches one element at a
//! time: [`JsonArrayReader::begin`] consumes the opening bracket,
//! [`JsonArrayReader::more`] reports whether another element follows, and
//! [`JsonArrayReader::next_value`] extracts exactly one balanced JSON value
//! and deserializes it. Elements are materialized individually; the array
//! itself never is.

use crate::error::TransformError;
use serde::de::DeserializeOwned;
use std::io::BufRead;

pub struct JsonArrayReader<R> {
    inner: R,
    first: bool,
    done: bool,
}

impl<R: BufRead> JsonArrayReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            first: true,
            done: false,
        }
    }

    /// Consume the opening `[`.
    pub fn begin(&mut self) -> Result<(), TransformError> {
        match self.next_byte()? {
            Some(b'[') => Ok(()),
            Some(other) => Err(TransformError::ExpectedArrayOpen {
                found: other as char,
            }),
            None => Err(TransformError::UnterminatedArray),
        }
    }

    /// Advance past any separating comma and report whether another element
    /// follows. Consumes the closing `]` when the array ends.
    pub fn more(&mut self) -> Result<bool, TransformError> {
        if self.done {
            return Ok(false);
        }
        match self.peek_byte()? {
            Some(b']') => {
                self.inner.consume(1);
                self.done = true;
                Ok(false)
            }
            Some(b',') if !self.first => {
                self.inner.consume(1);
                match self.peek_byte()? {
                    Some(b']') => Err(TransformError::ExpectedValue { found: ']' }),
                    Some(_) => Ok(true),
                    None => Err(TransformError::UnterminatedArray),
                }
            }
            Some(_) if self.first => Ok(true),
            Some(other) => Err(TransformError::ExpectedArrayDelimiter {
                found: other as char,
            }),
            None => Err(TransformError::UnterminatedArray),
        }
    }

    /// Extract and deserialize the next element.
    pub fn next_value<T: DeserializeOwned>(&mut self) -> Result<T, TransformError> {
        let raw = self.next_raw()?;
        self.first = false;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Scan the raw bytes of one balanced JSON value, stopping at the
    /// delimiter that follows it (which stays unconsumed unless it closed a
    /// nested structure or string belonging to the value).
    fn next_raw(&mut self) -> Result<Vec<u8>, TransformError> {
        if self.peek_byte()?.is_none() {
            return Err(TransformError::UnterminatedArray);
        }

        let mut raw: Vec<u8> = Vec::new();
        let mut in_string = false;
        let mut escaped = false;
        let mut depth: usize = 0;
        loop {
            let chunk = self.inner.fill_buf()?;
            if chunk.is_empty() {
                // a bare scalar may legitimately end at end of input
                if depth == 0 && !in_string && !raw.is_empty() {
                    return Ok(raw);
                }
                return Err(TransformError::UnterminatedArray);
            }
            let mut used = 0;
            for &byte in chunk {
                if in_string {
                    raw.push(byte);
                    used += 1;
                    if escaped {
                        escaped = false;
                    } else if byte == b'\\' {
                        escaped = true;
                    } else if byte == b'"' {
                        in_string = false;
                        if depth == 0 {
                            self.inner.consume(used);
                            return Ok(raw);
                        }
                    }
                    continue;
                }
                match byte {
                    b'"' => {
                        in_string = true;
                        raw.push(byte);
                        used += 1;
                    }
                    b'{' | b'[' => {
                        depth += 1;
                        raw.push(byte);
                        used += 1;
                    }
                    b'}' | b']' => {
                        if depth == 0 {
                            // delimiter of the enclosing array, not ours
                            self.inner.consume(used);
                            return Ok(raw);
                        }
                        depth -= 1;
                        raw.push(byte);
                        used += 1;
                        if depth == 0 {
                            self.inner.consume(used);
                            return Ok(raw);
                        }
                    }
                    b',' if depth == 0 => {
                        self.inner.consume(used);
                        return Ok(raw);
                    }
                    b' ' | b'\t' | b'\n' | b'\r' if depth == 0 => {
                        self.inner.consume(used);
                        return Ok(raw);
                    }
                    _ => {
                        raw.push(byte);
                        used += 1;
                    }
                }
            }
            self.inner.consume(used);
        }
    }

    /// Next non-whitespace byte without consuming it.
    fn peek_byte(&mut self) -> Result<Option<u8>, TransformError> {
        loop {
            let chunk = self.inner.fill_buf()?;
            match chunk.first() {
                None => return Ok(None),
                Some(b' ' | b'\t' | b'\n' | b'\r') => self.inner.consume(1),
                Some(&byte) => return Ok(Some(byte)),
            }
        }
    }

    /// Next non-whitespace byte, consumed.
    fn next_byte(&mut self) -> Result<Option<u8>, TransformError> {
        let byte = self.peek_byte()?;
        if byte.is_some() {
            self.inner.consume(1);
        }
        Ok(byte)
    }
}
