// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::bit_reader::BitReader;
use crate::byte_reader::ByteReader;
use crate::error::{Error, Result};
use crate::util::tracing_wrappers::*;

pub const HUFFMAN_MAX_BITS: usize = 16;
pub const HUFFMAN_MAX_SYMBOLS: usize = 256;
pub const MAX_TABLE_IDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum TableClass {
    Dc = 0,
    Ac = 1,
}

/// One canonical code: `length` bits of `codeword` decode to `symbol`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuffmanEntry {
    pub length: u8,
    pub codeword: u16,
    pub symbol: u8,
}

/// A canonical Huffman table, as defined by one DHT record.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    class: TableClass,
    id: u8,
    counts: [u8; HUFFMAN_MAX_BITS],
    // Sorted by (length, codeword).
    entries: Vec<HuffmanEntry>,
    // For each length, the first codeword and the index of its entry.
    first_code: [u32; HUFFMAN_MAX_BITS + 1],
    first_index: [usize; HUFFMAN_MAX_BITS + 1],
}

impl HuffmanTable {
    /// Builds the canonical code from per-length counts and the symbol list.
    ///
    /// For each length, `counts[length - 1]` consecutive codewords are assigned
    /// starting at the running counter, which is then shifted left by one.
    pub fn build(
        class: TableClass,
        id: u8,
        counts: &[u8; HUFFMAN_MAX_BITS],
        symbols: &[u8],
    ) -> Result<HuffmanTable> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total > HUFFMAN_MAX_SYMBOLS {
            return Err(Error::HuffmanTableTooLarge(total));
        }
        if symbols.len() != total {
            return Err(Error::FileTruncated);
        }
        let mut entries = Vec::with_capacity(total);
        let mut first_code = [0u32; HUFFMAN_MAX_BITS + 1];
        let mut first_index = [0usize; HUFFMAN_MAX_BITS + 1];
        let mut code = 0u32;
        let mut symbols = symbols.iter();
        for length in 1..=HUFFMAN_MAX_BITS {
            first_code[length] = code;
            first_index[length] = entries.len();
            for _ in 0..counts[length - 1] {
                if code >= 1 << length {
                    return Err(Error::HuffmanTableOverflow { length });
                }
                // The iterator holds exactly `total` symbols.
                let symbol = *symbols.next().ok_or(Error::FileTruncated)?;
                entries.push(HuffmanEntry {
                    length: length as u8,
                    codeword: code as u16,
                    symbol,
                });
                code += 1;
            }
            code <<= 1;
        }
        Ok(HuffmanTable {
            class,
            id,
            counts: *counts,
            entries,
            first_code,
            first_index,
        })
    }

    /// Reads one table record of a DHT segment: class/id, 16 counts, then the symbols.
    pub fn read(br: &mut ByteReader) -> Result<HuffmanTable> {
        let (tc, th) = br.read_nibbles()?;
        let class = TableClass::from_u8(tc).ok_or(Error::InvalidTableId { class: tc, id: th })?;
        if th as usize >= MAX_TABLE_IDS {
            return Err(Error::InvalidTableId { class: tc, id: th });
        }
        let mut counts = [0u8; HUFFMAN_MAX_BITS];
        counts.copy_from_slice(br.read_bytes(HUFFMAN_MAX_BITS)?);
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total > HUFFMAN_MAX_SYMBOLS {
            return Err(Error::HuffmanTableTooLarge(total));
        }
        let symbols = br.read_bytes(total)?;
        debug!("Tc {} ({:?} table), Th {}, total {} codes", tc, class, th, total);
        HuffmanTable::build(class, th, &counts, symbols)
    }

    pub fn class(&self) -> TableClass {
        self.class
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn entries(&self) -> &[HuffmanEntry] {
        &self.entries
    }

    /// Returns the symbol whose code is exactly `length` bits equal to `codeword`.
    pub fn lookup(&self, length: usize, codeword: u16) -> Option<u8> {
        if length == 0 || length > HUFFMAN_MAX_BITS {
            return None;
        }
        let count = self.counts[length - 1] as u32;
        let offset = (codeword as u32).checked_sub(self.first_code[length])?;
        if offset >= count {
            return None;
        }
        Some(self.entries[self.first_index[length] + offset as usize].symbol)
    }

    /// Decodes the next symbol, trying code lengths 1 through 16 in turn.
    ///
    /// Bits are only consumed once a code matches.
    pub fn read_symbol(&self, br: &mut BitReader) -> Result<u8> {
        for length in 1..=HUFFMAN_MAX_BITS {
            let candidate = br.peek(length)?;
            if let Some(symbol) = self.lookup(length, candidate) {
                br.consume(length)?;
                trace!("decoded {:0width$b} -> {:#04x}", candidate, symbol, width = length);
                return Ok(symbol);
            }
        }
        Err(Error::InvalidCode {
            bit_position: br.total_bits_read(),
        })
    }
}

/// Huffman tables indexed by class (DC/AC) and destination id.
#[derive(Debug, Clone, Default)]
pub struct HuffmanTableStore {
    tables: [[Option<HuffmanTable>; MAX_TABLE_IDS]; 2],
}

impl HuffmanTableStore {
    pub fn new() -> HuffmanTableStore {
        HuffmanTableStore::default()
    }

    /// Installs `table`, replacing any previous table with the same class and id.
    pub fn insert(&mut self, table: HuffmanTable) {
        let slot = &mut self.tables[table.class as usize][table.id as usize];
        *slot = Some(table);
    }

    pub fn get(&self, class: TableClass, id: u8) -> Result<&HuffmanTable> {
        self.tables[class as usize]
            .get(id as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::MissingHuffmanTable {
                class: class as u8,
                id,
            })
    }
}
