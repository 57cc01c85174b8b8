//! Bounds-checked views over the shared component buffer.
//!
//! A [`ByteWindow`] never copies: it carries a reference-counted handle to
//! the whole file plus its own base offset, length and cursor. Sub-windows
//! are carved relative to their parent and can never see bytes outside the
//! parent's extent.

use std::fmt;
use std::sync::Arc;

use crate::error::{DecodeError, Result};

#[derive(Clone)]
pub struct ByteWindow {
    data: Arc<[u8]>,
    base: usize,
    len: usize,
    pos: usize,
}

impl fmt::Debug for ByteWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteWindow")
            .field("base", &self.base)
            .field("len", &self.len)
            .field("pos", &self.pos)
            .finish()
    }
}

impl ByteWindow {
    /// Creates the root window over the full buffer.
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        let data = data.into();
        let len = data.len();
        ByteWindow {
            data,
            base: 0,
            len,
            pos: 0,
        }
    }

    /// Absolute offset of this window's first byte in the underlying buffer.
    pub fn base(&self) -> usize {
        self.base
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current cursor, relative to the start of the window.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.len - self.pos
    }

    /// Moves the cursor. Positions outside `[0, len]` are rejected and leave
    /// the cursor untouched.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.len {
            return Err(self.out_of_bounds(pos, 0));
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.ensure(count)?;
        self.pos += count;
        Ok(())
    }

    /// Carves a window spanning from `offset` to the end of this window.
    pub fn window_from(&self, offset: usize) -> Result<ByteWindow> {
        if offset > self.len {
            return Err(self.out_of_bounds(offset, 0));
        }
        self.window(offset, self.len - offset)
    }

    /// Carves the window `[offset, offset + length)` of this window.
    pub fn window(&self, offset: usize, length: usize) -> Result<ByteWindow> {
        let end = offset
            .checked_add(length)
            .filter(|end| *end <= self.len)
            .ok_or_else(|| self.out_of_bounds(offset, length))?;
        debug_assert!(end <= self.len);
        Ok(ByteWindow {
            data: Arc::clone(&self.data),
            base: self.base + offset,
            len: length,
            pos: 0,
        })
    }

    /// Carves a window from a pair of absolute file offsets, as stored in the
    /// component index and in library/class offset tables.
    pub fn window_absolute(&self, start: u32, end: u32) -> Result<ByteWindow> {
        let (start, end) = (start as usize, end as usize);
        let relative = start
            .checked_sub(self.base)
            .ok_or_else(|| self.out_of_bounds(0, end.saturating_sub(start)))?;
        if end < start {
            return Err(DecodeError::format(format!(
                "window end {end:#x} precedes start {start:#x}"
            )));
        }
        self.window(relative, end - start)
    }

    /// Converts an absolute file offset to a position inside this window.
    pub fn relative(&self, absolute: u32) -> Result<usize> {
        let relative = (absolute as usize)
            .checked_sub(self.base)
            .filter(|relative| *relative <= self.len)
            .ok_or_else(|| self.out_of_bounds(absolute as usize, 0))?;
        Ok(relative)
    }

    /// Every byte of the window regardless of the cursor.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.base..self.base + self.len]
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let byte = self.data[self.base + self.pos];
        self.pos += 1;
        Ok(byte)
    }

    pub fn peek_u8(&self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.data[self.base + self.pos])
    }

    /// Reads `count` bytes and returns a borrowed slice.
    pub fn read_bytes(&mut self, count: usize) -> Result<&[u8]> {
        self.ensure(count)?;
        let start = self.base + self.pos;
        self.pos += count;
        Ok(&self.data[start..start + count])
    }

    /// Reads a `List<Byte>`: a `UInt` length followed by the bytes.
    pub fn read_byte_list(&mut self) -> Result<&[u8]> {
        let count = self.read_uint()? as usize;
        self.read_bytes(count)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    /// Reads a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array::<4>()?))
    }

    /// Reads `count` consecutive big-endian `u32` words.
    pub fn read_u32s(&mut self, count: usize) -> Result<Vec<u32>> {
        let needed = count
            .checked_mul(4)
            .ok_or_else(|| self.out_of_bounds(self.pos, usize::MAX))?;
        self.ensure(needed)?;
        (0..count).map(|_| self.read_u32()).collect()
    }

    /// Reads an IEEE-754 double. Doubles are the one multi-byte value the
    /// front end writes in host (little-endian) order.
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Reads the 1/2/4 byte variable-length unsigned integer.
    ///
    /// * `0xxxxxxx`                               : 7-bit value
    /// * `10xxxxxx xxxxxxxx`                      : 14-bit value
    /// * `11xxxxxx xxxxxxxx xxxxxxxx xxxxxxxx`    : 30-bit value
    pub fn read_uint(&mut self) -> Result<u32> {
        let byte1 = self.read_u8()? as u32;
        if byte1 & 0x80 == 0 {
            return Ok(byte1);
        }
        let byte2 = self.read_u8()? as u32;
        if byte1 & 0x40 == 0 {
            return Ok(((byte1 & 0x3F) << 8) | byte2);
        }
        let byte3 = self.read_u8()? as u32;
        let byte4 = self.read_u8()? as u32;
        Ok(((byte1 & 0x3F) << 24) | (byte2 << 16) | (byte3 << 8) | byte4)
    }

    /// Reads one byte and fails unless it equals `expected`.
    pub fn check_tag(&mut self, expected: u8) -> Result<()> {
        let actual = self.read_u8()?;
        if actual != expected {
            return Err(DecodeError::TagMismatch { actual, expected });
        }
        Ok(())
    }

    fn ensure(&self, count: usize) -> Result<()> {
        if self
            .pos
            .checked_add(count)
            .is_some_and(|end| end <= self.len)
        {
            Ok(())
        } else {
            Err(self.out_of_bounds(self.pos, count))
        }
    }

    fn out_of_bounds(&self, position: usize, wanted: usize) -> DecodeError {
        DecodeError::OutOfBounds {
            position,
            wanted,
            length: self.len,
            base: self.base,
        }
    }
}
