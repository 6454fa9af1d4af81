// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};

/// Reads bits MSB-first from a destuffed entropy-coded buffer.
#[derive(Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl Debug for BitReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitReader{{ data: [{} bytes], total_bits_read: {} }}",
            self.data.len(),
            self.bit_pos,
        )
    }
}

pub const MAX_BITS_PER_CALL: usize = 16;

impl<'a> BitReader<'a> {
    /// Constructs a BitReader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> BitReader<'a> {
        BitReader { data, bit_pos: 0 }
    }

    /// Reads `num` bits from the buffer without consuming them.
    ///
    /// Fails if fewer than `num` bits are left.
    pub fn peek(&self, num: usize) -> Result<u16> {
        debug_assert!(num <= MAX_BITS_PER_CALL);
        if num == 0 {
            return Ok(0);
        }
        if self.bit_pos + num > self.total_bits_available() {
            return Err(Error::OutOfBounds);
        }
        let word = self.window();
        let shift = 32 - (self.bit_pos % 8) - num;
        Ok(((word >> shift) & ((1u32 << num) - 1)) as u16)
    }

    /// Advances by `num` bits.
    pub fn consume(&mut self, num: usize) -> Result<()> {
        if self.bit_pos + num > self.total_bits_available() {
            return Err(Error::OutOfBounds);
        }
        self.bit_pos += num;
        Ok(())
    }

    /// Reads `num` bits from the buffer.
    /// ```
    /// # use jpegdec::bit_reader::BitReader;
    /// let mut br = BitReader::new(&[0b1010_0000, 0xff]);
    /// assert_eq!(br.read(3)?, 0b101);
    /// assert_eq!(br.read(5)?, 0);
    /// assert_eq!(br.read(8)?, 0xff);
    /// assert_eq!(br.total_bits_read(), 16);
    /// assert!(br.read(1).is_err());
    /// # Ok::<(), jpegdec::error::Error>(())
    /// ```
    pub fn read(&mut self, num: usize) -> Result<u16> {
        let ret = self.peek(num)?;
        self.consume(num)?;
        Ok(ret)
    }

    /// Returns the total number of bits that have been read.
    pub fn total_bits_read(&self) -> usize {
        self.bit_pos
    }

    /// Returns the total number of bits in the underlying buffer.
    pub fn total_bits_available(&self) -> usize {
        self.data.len() * 8
    }

    // Big-endian 32-bit window starting at the byte that holds the current bit.
    fn window(&self) -> u32 {
        let index = self.bit_pos / 8;
        if index + 4 <= self.data.len() {
            BigEndian::read_u32(&self.data[index..])
        } else {
            self.window_slow(index)
        }
    }

    #[inline(never)]
    fn window_slow(&self, index: usize) -> u32 {
        let mut word = 0u32;
        for i in 0..4 {
            word = (word << 8) | self.data.get(index + i).copied().unwrap_or(0) as u32;
        }
        word
    }
}
