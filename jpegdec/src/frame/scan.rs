// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::bit_reader::BitReader;
use crate::entropy_coding::huffman::{HuffmanTable, HuffmanTableStore, TableClass};
use crate::error::{Error, Result};
use crate::headers::FrameHeader;
use crate::util::tracing_wrappers::*;
use crate::{BLOCK_SIZE, NUM_COMPONENTS};

const EOB: u8 = 0x00;
const ZRL: u8 = 0xf0;
const ZRL_RUN: usize = 16;
const MAX_DC_CATEGORY: u8 = 16;

/// Maps `size` raw magnitude bits to a signed value.
///
/// A leading 0 bit marks a negative value, `-(bits ^ mask)`; a leading 1 bit
/// is the value itself.
#[inline]
pub fn extend(bits: u16, size: u8) -> i32 {
    if size == 0 {
        return 0;
    }
    let value = bits as i32;
    if value < 1 << (size - 1) {
        value - ((1 << size) - 1)
    } else {
        value
    }
}

/// Decoding position carried from one data unit to the next.
pub struct ScanState<'a> {
    br: BitReader<'a>,
    dc_predictors: [i32; NUM_COMPONENTS],
}

impl<'a> ScanState<'a> {
    /// Starts at the first bit of destuffed scan data with all predictors at 0.
    pub fn new(data: &'a [u8]) -> ScanState<'a> {
        ScanState {
            br: BitReader::new(data),
            dc_predictors: [0; NUM_COMPONENTS],
        }
    }

    pub fn dc_predictor(&self, component: usize) -> i32 {
        self.dc_predictors[component]
    }

    pub fn bits_read(&self) -> usize {
        self.br.total_bits_read()
    }

    pub fn bits_available(&self) -> usize {
        self.br.total_bits_available()
    }

    fn invalid_code(&self) -> Error {
        Error::InvalidCode {
            bit_position: self.br.total_bits_read(),
        }
    }
}

/// One decoded data unit, still quantized, in zigzag order.
#[derive(Debug, Clone)]
pub struct CodedBlock {
    pub mcu: usize,
    pub component: usize,
    /// Index of the unit within the component's `H x V` grid of the MCU.
    pub data_unit: usize,
    pub coefficients: [i32; BLOCK_SIZE],
}

/// Huffman decoding of data units with the tables selected by the scan.
pub struct ScanDecoder<'t> {
    dc_tables: [&'t HuffmanTable; NUM_COMPONENTS],
    ac_tables: [&'t HuffmanTable; NUM_COMPONENTS],
    blocks_per_mcu: [usize; NUM_COMPONENTS],
}

impl<'t> ScanDecoder<'t> {
    /// Resolves the per-component table selectors recorded by the scan header.
    pub fn new(frame: &FrameHeader, tables: &'t HuffmanTableStore) -> Result<ScanDecoder<'t>> {
        let components = &frame.components;
        Ok(ScanDecoder {
            dc_tables: array_init::try_array_init(|c| {
                tables.get(TableClass::Dc, components[c].dc_table)
            })?,
            ac_tables: array_init::try_array_init(|c| {
                tables.get(TableClass::Ac, components[c].ac_table)
            })?,
            blocks_per_mcu: array_init::array_init(|c| components[c].blocks_per_mcu()),
        })
    }

    /// Decodes the DC difference and the AC run-lengths of one data unit.
    pub fn decode_block(
        &self,
        state: &mut ScanState,
        component: usize,
    ) -> Result<[i32; BLOCK_SIZE]> {
        let mut coefficients = [0i32; BLOCK_SIZE];

        let size = self.dc_tables[component].read_symbol(&mut state.br)?;
        if size > MAX_DC_CATEGORY {
            return Err(state.invalid_code());
        }
        let diff = extend(state.br.read(size as usize)?, size);
        let dc = state.dc_predictors[component]
            .checked_add(diff)
            .ok_or(Error::ArithmeticOverflow)?;
        state.dc_predictors[component] = dc;
        coefficients[0] = dc;

        let ac_table = self.ac_tables[component];
        let mut k = 1;
        while k < BLOCK_SIZE {
            let rs = ac_table.read_symbol(&mut state.br)?;
            match rs {
                EOB => break,
                ZRL => {
                    k += ZRL_RUN;
                    if k > BLOCK_SIZE {
                        return Err(state.invalid_code());
                    }
                }
                _ => {
                    let (run, size) = (rs >> 4, rs & 0x0f);
                    if size == 0 {
                        // Only EOB and ZRL have a zero magnitude size.
                        return Err(state.invalid_code());
                    }
                    k += run as usize;
                    if k >= BLOCK_SIZE {
                        return Err(state.invalid_code());
                    }
                    coefficients[k] = extend(state.br.read(size as usize)?, size);
                    k += 1;
                }
            }
        }
        trace!(
            "component {} DC {} (diff {}), last AC position {}",
            component,
            dc,
            diff,
            k.min(BLOCK_SIZE) - 1
        );
        Ok(coefficients)
    }

    /// Decodes every data unit of MCU `mcu`: Y units first, then Cb, then Cr.
    pub fn decode_mcu(
        &self,
        state: &mut ScanState,
        mcu: usize,
        out: &mut Vec<CodedBlock>,
    ) -> Result<()> {
        for component in 0..NUM_COMPONENTS {
            for data_unit in 0..self.blocks_per_mcu[component] {
                let coefficients = self.decode_block(state, component)?;
                out.try_reserve(1)?;
                out.push(CodedBlock {
                    mcu,
                    component,
                    data_unit,
                    coefficients,
                });
            }
        }
        Ok(())
    }

    /// Number of data units in one MCU, summed over the components.
    pub fn units_per_mcu(&self) -> usize {
        self.blocks_per_mcu.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_reader::ByteReader;
    use crate::headers::frame_header::tests::sof0;
    use test_log::test;

    fn table(class: TableClass, counts: &[(usize, u8)], symbols: &[u8]) -> HuffmanTable {
        let mut c = [0u8; 16];
        for &(length, count) in counts {
            c[length - 1] = count;
        }
        HuffmanTable::build(class, 0, &c, symbols).unwrap()
    }

    // DC: 2-bit codes 00 -> 0, 01 -> 2, 10 -> 3. AC: 1-bit code 0 -> EOB.
    fn small_tables() -> HuffmanTableStore {
        let mut store = HuffmanTableStore::new();
        store.insert(table(TableClass::Dc, &[(2, 3)], &[0, 2, 3]));
        store.insert(table(TableClass::Ac, &[(1, 1)], &[EOB]));
        store
    }

    fn frame(sampling: [(u8, u8); 3]) -> FrameHeader {
        FrameHeader::read(&mut ByteReader::new(&sof0(8, 8, sampling))).unwrap()
    }

    #[test]
    fn sign_extension() {
        assert_eq!(extend(0b011, 3), -4);
        assert_eq!(extend(0b101, 3), 5);
        assert_eq!(extend(0, 1), -1);
        assert_eq!(extend(1, 1), 1);
        assert_eq!(extend(0, 0), 0);
        assert_eq!(extend(0x7fff, 16), -32768);
        assert_eq!(extend(0xffff, 16), 65535);
    }

    #[test]
    fn dc_predictor_persists() -> Result<()> {
        // 10 101 0 | 01 01 0: category 3 with +5, EOB, category 2 with -2, EOB.
        let data = [0b1010_1001, 0b0101_1111];
        let tables = small_tables();
        let frame = frame([(1, 1); 3]);
        let decoder = ScanDecoder::new(&frame, &tables)?;
        let mut state = ScanState::new(&data);
        let first = decoder.decode_block(&mut state, 0)?;
        assert_eq!(first[0], 5);
        assert_eq!(state.dc_predictor(0), 5);
        let second = decoder.decode_block(&mut state, 0)?;
        assert_eq!(second[0], 3);
        assert_eq!(state.dc_predictor(1), 0);
        assert!(second[1..].iter().all(|&c| c == 0));
        assert_eq!(state.bits_read(), 11);
        Ok(())
    }

    #[test]
    fn dc_predictor_overflow_is_an_error() -> Result<()> {
        // 10 101: category 3 with +5.
        let data = [0b1010_1011, 0xff];
        let tables = small_tables();
        let frame = frame([(1, 1); 3]);
        let decoder = ScanDecoder::new(&frame, &tables)?;
        let mut state = ScanState::new(&data);
        state.dc_predictors[2] = i32::MAX - 4;
        assert!(matches!(
            decoder.decode_block(&mut state, 2),
            Err(Error::ArithmeticOverflow)
        ));
        Ok(())
    }

    fn ac_tables(symbols: &[u8]) -> HuffmanTableStore {
        let mut store = HuffmanTableStore::new();
        store.insert(table(TableClass::Dc, &[(1, 1)], &[0]));
        store.insert(table(TableClass::Ac, &[(2, symbols.len() as u8)], symbols));
        store
    }

    #[test]
    fn ac_run_lengths() -> Result<()> {
        // AC codes: 00 -> 0x21 (run 2, size 1), 01 -> ZRL, 10 -> EOB.
        // DC 0 | 00 1 | 01 | 00 0 | 10
        let data = [0b0001_0100, 0b0100_0000];
        let tables = ac_tables(&[0x21, ZRL, EOB]);
        let frame = frame([(1, 1); 3]);
        let decoder = ScanDecoder::new(&frame, &tables)?;
        let mut state = ScanState::new(&data);
        let block = decoder.decode_block(&mut state, 1)?;
        assert_eq!(block[3], 1);
        // After ZRL at position 4, the next run of two lands at 22.
        assert_eq!(block[22], -1);
        assert_eq!(block.iter().filter(|&&c| c != 0).count(), 2);
        Ok(())
    }

    #[test]
    fn zero_runs_past_the_block_are_invalid() -> Result<()> {
        // DC 0, then four ZRLs: 1 + 64 > 64.
        let data = [0b0010_1010, 0b1000_0000];
        let tables = ac_tables(&[0x21, ZRL, EOB]);
        let frame = frame([(1, 1); 3]);
        let decoder = ScanDecoder::new(&frame, &tables)?;
        let mut state = ScanState::new(&data);
        assert!(matches!(
            decoder.decode_block(&mut state, 0),
            Err(Error::InvalidCode { .. })
        ));
        Ok(())
    }

    #[test]
    fn run_past_last_position_is_invalid() -> Result<()> {
        // Three ZRLs reach position 49, then 0xf1 skips 15 more to 64.
        // DC 0 | 01 01 01 | 00 1
        let data = [0b0010_1010, 0b0100_0000];
        let tables = ac_tables(&[0xf1, ZRL, EOB]);
        let frame = frame([(1, 1); 3]);
        let decoder = ScanDecoder::new(&frame, &tables)?;
        let mut state = ScanState::new(&data);
        assert!(matches!(
            decoder.decode_block(&mut state, 0),
            Err(Error::InvalidCode { .. })
        ));
        Ok(())
    }

    #[test]
    fn block_without_eob_fills_all_positions() -> Result<()> {
        // 63 AC coefficients of value 1, each coded as 0 + magnitude bit 1.
        let mut bits = vec![0u8];
        for _ in 0..63 {
            bits.extend_from_slice(&[0, 1]);
        }
        let data: Vec<u8> = bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .chain(std::iter::repeat(&1))
                    .take(8)
                    .fold(0u8, |acc, &b| (acc << 1) | b)
            })
            .collect();
        let mut store = HuffmanTableStore::new();
        store.insert(table(TableClass::Dc, &[(1, 1)], &[0]));
        store.insert(table(TableClass::Ac, &[(1, 1)], &[0x01]));
        let frame = frame([(1, 1); 3]);
        let decoder = ScanDecoder::new(&frame, &store)?;
        let mut state = ScanState::new(&data);
        let block = decoder.decode_block(&mut state, 0)?;
        assert_eq!(block[0], 0);
        assert!(block[1..].iter().all(|&c| c == 1));
        assert_eq!(state.bits_read(), 127);
        Ok(())
    }

    #[test]
    fn invalid_code_reports_position() -> Result<()> {
        // DC code 11 is unassigned; after 2 bits every longer prefix also fails.
        let data = [0xff, 0xff, 0xff];
        let tables = small_tables();
        let frame = frame([(1, 1); 3]);
        let decoder = ScanDecoder::new(&frame, &tables)?;
        let mut state = ScanState::new(&data);
        assert!(matches!(
            decoder.decode_block(&mut state, 0),
            Err(Error::InvalidCode { bit_position: 0 })
        ));
        Ok(())
    }

    #[test]
    fn running_out_of_bits() -> Result<()> {
        // The first unit takes six bits; the second runs out while reading AC.
        let data = [0b1010_0000];
        let tables = small_tables();
        let frame = frame([(1, 1); 3]);
        let decoder = ScanDecoder::new(&frame, &tables)?;
        let mut state = ScanState::new(&data);
        decoder.decode_block(&mut state, 0)?;
        assert!(matches!(
            decoder.decode_block(&mut state, 0),
            Err(Error::OutOfBounds)
        ));
        Ok(())
    }

    #[test]
    fn mcu_order_follows_sampling() -> Result<()> {
        let tables = small_tables();
        let frame = frame([(2, 2), (1, 1), (1, 1)]);
        let decoder = ScanDecoder::new(&frame, &tables)?;
        assert_eq!(decoder.units_per_mcu(), 6);
        // Six units of DC code 00 followed by EOB: 000 per unit.
        let data = [0u8; 3];
        let mut state = ScanState::new(&data);
        let mut blocks = Vec::new();
        decoder.decode_mcu(&mut state, 7, &mut blocks)?;
        let order: Vec<(usize, usize)> = blocks.iter().map(|b| (b.component, b.data_unit)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (0, 2), (0, 3), (1, 0), (2, 0)]);
        assert!(blocks.iter().all(|b| b.mcu == 7));
        Ok(())
    }

    #[test]
    fn missing_table_is_reported() {
        let mut store = HuffmanTableStore::new();
        store.insert(table(TableClass::Dc, &[(1, 1)], &[0]));
        let frame = frame([(1, 1); 3]);
        assert!(matches!(
            ScanDecoder::new(&frame, &store),
            Err(Error::MissingHuffmanTable { class: 1, id: 0 })
        ));
    }
}
