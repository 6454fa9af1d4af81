// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::BLOCK_SIZE;
use crate::byte_reader::ByteReader;
use crate::error::{Error, Result};
use crate::util::tracing_wrappers::*;

pub const MAX_QUANT_TABLES: usize = 4;
// Pq/Tq byte followed by 64 8-bit values.
const QUANT_RECORD_LEN: usize = 1 + BLOCK_SIZE;

/// Natural (row-major) index of each position along the zigzag scan.
#[rustfmt::skip]
pub const ZIGZAG_TO_NATURAL: [usize; BLOCK_SIZE] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// A quantization table with its 64 values in zigzag order, as stored in DQT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizationTable {
    pub index: u8,
    pub values: [u16; BLOCK_SIZE],
}

impl QuantizationTable {
    /// Reads every table record of a DQT segment; `br` is positioned at its length field.
    pub fn read_segment(br: &mut ByteReader) -> Result<Vec<QuantizationTable>> {
        let length = br.read_u16()?;
        debug!("DQT found (length {} bytes)", length);
        let payload = (length as usize).saturating_sub(2);
        if payload == 0 || payload % QUANT_RECORD_LEN != 0 {
            return Err(Error::InvalidQuantTableLength(payload));
        }
        let mut segment = br.split(payload)?;
        let mut tables = Vec::with_capacity(payload / QUANT_RECORD_LEN);
        while !segment.is_empty() {
            let (pq, tq) = segment.read_nibbles()?;
            if pq != 0 {
                return Err(Error::UnsupportedPrecision(16));
            }
            if tq as usize >= MAX_QUANT_TABLES {
                return Err(Error::InvalidTableId { class: pq, id: tq });
            }
            let bytes = segment.read_bytes(BLOCK_SIZE)?;
            let values = array_init::array_init(|i| bytes[i] as u16);
            debug!("Pq {}, Tq {}, Q[0] {}", pq, tq, bytes[0]);
            trace!("Q{} {:?}", tq, bytes);
            tables.push(QuantizationTable { index: tq, values });
        }
        Ok(tables)
    }

    /// Multiplies zigzag-ordered coefficients by the table and returns them in natural order.
    ///
    /// Fails with [`Error::ArithmeticOverflow`] if a product does not fit in an `i32`,
    /// which only a corrupt run of DC differences can cause.
    pub fn dequantize(&self, zigzag: &[i32; BLOCK_SIZE]) -> Result<[i32; BLOCK_SIZE]> {
        let mut natural = [0i32; BLOCK_SIZE];
        for (k, (&coefficient, &q)) in zigzag.iter().zip(self.values.iter()).enumerate() {
            natural[ZIGZAG_TO_NATURAL[k]] = coefficient
                .checked_mul(q as i32)
                .ok_or(Error::ArithmeticOverflow)?;
        }
        Ok(natural)
    }
}

/// The four quantization table slots; a later DQT replaces the earlier table.
#[derive(Debug, Clone, Default)]
pub struct QuantizationTableStore {
    tables: [Option<QuantizationTable>; MAX_QUANT_TABLES],
}

impl QuantizationTableStore {
    pub fn new() -> QuantizationTableStore {
        QuantizationTableStore::default()
    }

    pub fn insert(&mut self, table: QuantizationTable) {
        let index = table.index as usize;
        self.tables[index] = Some(table);
    }

    pub fn get(&self, index: u8) -> Result<&QuantizationTable> {
        self.tables
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::MissingQuantTable(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn dqt(records: &[(u8, u8)]) -> Vec<u8> {
        let length = (2 + records.len() * QUANT_RECORD_LEN) as u16;
        let mut data = length.to_be_bytes().to_vec();
        for &(pq_tq, base) in records {
            data.push(pq_tq);
            data.extend((0..BLOCK_SIZE as u8).map(|i| base.wrapping_add(i)));
        }
        data
    }

    #[test]
    fn zigzag_is_a_permutation() {
        let mut seen = [false; BLOCK_SIZE];
        for &n in ZIGZAG_TO_NATURAL.iter() {
            assert!(!seen[n]);
            seen[n] = true;
        }
        // Second entry moves right, third moves down-left.
        assert_eq!(ZIGZAG_TO_NATURAL[1], 1);
        assert_eq!(ZIGZAG_TO_NATURAL[2], 8);
        assert_eq!(ZIGZAG_TO_NATURAL[63], 63);
    }

    #[test]
    fn reads_multiple_tables() -> Result<()> {
        let data = dqt(&[(0x00, 1), (0x01, 100)]);
        let tables = QuantizationTable::read_segment(&mut ByteReader::new(&data))?;
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].index, 0);
        assert_eq!(tables[0].values[0], 1);
        assert_eq!(tables[1].index, 1);
        assert_eq!(tables[1].values[63], 163);
        Ok(())
    }

    #[test]
    fn rejects_bad_length() {
        let mut data = dqt(&[(0x00, 1)]);
        data[1] -= 1;
        assert!(matches!(
            QuantizationTable::read_segment(&mut ByteReader::new(&data)),
            Err(Error::InvalidQuantTableLength(64))
        ));
    }

    #[test]
    fn rejects_16_bit_tables() {
        let data = dqt(&[(0x10, 1)]);
        assert!(matches!(
            QuantizationTable::read_segment(&mut ByteReader::new(&data)),
            Err(Error::UnsupportedPrecision(16))
        ));
    }

    #[test]
    fn rejects_bad_destination() {
        let data = dqt(&[(0x04, 1)]);
        assert!(matches!(
            QuantizationTable::read_segment(&mut ByteReader::new(&data)),
            Err(Error::InvalidTableId { class: 0, id: 4 })
        ));
    }

    #[test]
    fn dequantizes_into_natural_order() -> Result<()> {
        let table = QuantizationTable {
            index: 0,
            values: array_init::array_init(|k| k as u16 + 1),
        };
        let mut zigzag = [0i32; BLOCK_SIZE];
        zigzag[0] = 3;
        zigzag[2] = -2;
        zigzag[5] = 1;
        let natural = table.dequantize(&zigzag)?;
        assert_eq!(natural[0], 3);
        // Zigzag position 2 is row 1, column 0.
        assert_eq!(natural[8], -6);
        // Zigzag position 5 is row 0, column 2.
        assert_eq!(natural[2], 6);
        assert_eq!(natural.iter().filter(|&&c| c != 0).count(), 3);
        Ok(())
    }

    #[test]
    fn dequantize_reports_overflow() -> Result<()> {
        let table = QuantizationTable {
            index: 0,
            values: [255; BLOCK_SIZE],
        };
        let mut zigzag = [0i32; BLOCK_SIZE];
        zigzag[0] = i32::MAX / 255;
        assert_eq!(table.dequantize(&zigzag)?[0], i32::MAX / 255 * 255);
        zigzag[0] += 1;
        assert!(matches!(
            table.dequantize(&zigzag),
            Err(Error::ArithmeticOverflow)
        ));
        zigzag[0] = 0;
        zigzag[63] = i32::MIN / 200;
        assert!(matches!(
            table.dequantize(&zigzag),
            Err(Error::ArithmeticOverflow)
        ));
        Ok(())
    }

    #[test]
    fn store_replaces_and_reports_missing() -> Result<()> {
        let mut store = QuantizationTableStore::new();
        assert!(matches!(store.get(2), Err(Error::MissingQuantTable(2))));
        store.insert(QuantizationTable {
            index: 2,
            values: [1; BLOCK_SIZE],
        });
        store.insert(QuantizationTable {
            index: 2,
            values: [7; BLOCK_SIZE],
        });
        assert_eq!(store.get(2)?.values[10], 7);
        Ok(())
    }
}
