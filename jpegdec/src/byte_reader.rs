// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

/// Reads big-endian fields from marker segments.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> ByteReader<'a> {
        ByteReader { data, offset: 0 }
    }

    /// Current byte offset into the underlying data.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(Error::FileTruncated);
        }
        self.offset = offset;
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the underlying data, independent of the current offset.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(len).ok_or(Error::FileTruncated)?;
        let bytes = self.data.get(self.offset..end).ok_or(Error::FileTruncated)?;
        self.offset = end;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.read_bytes(2)?))
    }

    /// Reads a byte holding two 4-bit fields, high nibble first.
    pub fn read_nibbles(&mut self) -> Result<(u8, u8)> {
        let byte = self.read_u8()?;
        Ok((byte >> 4, byte & 0x0f))
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Splits off a reader over the next `len` bytes and advances past them.
    pub fn split(&mut self, len: usize) -> Result<ByteReader<'a>> {
        Ok(ByteReader::new(self.read_bytes(len)?))
    }
}
