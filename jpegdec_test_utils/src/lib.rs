// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Test helpers: approximate comparisons and a writer for small synthetic
//! baseline JPEG files.

use std::collections::BTreeSet;

#[macro_export]
macro_rules! assert_almost_eq {
    ($left:expr, $right:expr, $max_error:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                let diff = if *left_val > *right_val {
                    *left_val - *right_val
                } else {
                    *right_val - *left_val
                };
                if !(diff <= $max_error) {
                    panic!(
                        "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n max_error: `{:?}`",
                        left_val, right_val, $max_error
                    );
                }
            }
        }
    };
}

/// Element-wise [`assert_almost_eq`] over two sequences of equal length.
#[macro_export]
macro_rules! assert_all_almost_eq {
    ($left:expr, $right:expr, $max_error:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                assert_eq!(left_val.len(), right_val.len(), "length mismatch");
                for (index, (l, r)) in left_val.iter().zip(right_val.iter()).enumerate() {
                    let diff = if *l > *r { *l - *r } else { *r - *l };
                    if !(diff <= $max_error) {
                        panic!(
                            "assertion failed at index {}: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n max_error: `{:?}`",
                            index, l, r, $max_error
                        );
                    }
                }
            }
        }
    };
}

const SOI: u8 = 0xd8;
const EOI: u8 = 0xd9;
const APP0: u8 = 0xe0;
const DQT: u8 = 0xdb;
const SOF0: u8 = 0xc0;
const DHT: u8 = 0xc4;
const SOS: u8 = 0xda;

/// Quantized coefficients of one data unit, in zigzag order. Entry 0 is the
/// absolute DC value; the builder encodes differences.
pub type Block = [i16; 64];

/// A block with only a DC coefficient.
pub fn dc_block(dc: i16) -> Block {
    let mut block = [0; 64];
    block[0] = dc;
    block
}

/// Number of magnitude bits (SSSS) needed for `value`.
pub fn magnitude_category(value: i32) -> u8 {
    (32 - value.unsigned_abs().leading_zeros()) as u8
}

/// MSB-first bit writer with `ff 00` byte stuffing and 1-bit padding.
#[derive(Default)]
struct BitWriter {
    bytes: Vec<u8>,
    acc: u32,
    nbits: u32,
}

impl BitWriter {
    fn write(&mut self, bits: u32, count: u8) {
        for i in (0..count).rev() {
            self.acc = (self.acc << 1) | ((bits >> i) & 1);
            self.nbits += 1;
            if self.nbits == 8 {
                self.push_byte();
            }
        }
    }

    fn push_byte(&mut self) {
        let byte = self.acc as u8;
        self.bytes.push(byte);
        if byte == 0xff {
            self.bytes.push(0x00);
        }
        self.acc = 0;
        self.nbits = 0;
    }

    fn finish(mut self) -> Vec<u8> {
        while self.nbits != 0 {
            self.write(1, 1);
        }
        self.bytes
    }
}

/// Table in which every symbol gets a code of the same length, the smallest
/// `L` with `2^L > n` so the all-ones code stays unused.
struct FlatTable {
    symbols: Vec<u8>,
    length: u8,
}

impl FlatTable {
    fn new(symbols: BTreeSet<u8>) -> FlatTable {
        let symbols: Vec<u8> = symbols.into_iter().collect();
        let mut length = 1u8;
        while (1usize << length) <= symbols.len() {
            length += 1;
        }
        FlatTable { symbols, length }
    }

    fn code(&self, symbol: u8) -> (u32, u8) {
        let index = self
            .symbols
            .iter()
            .position(|&s| s == symbol)
            .expect("symbol missing from table");
        (index as u32, self.length)
    }

    /// One DHT record: Tc/Th, 16 counts, symbols.
    fn record(&self, class_and_id: u8) -> Vec<u8> {
        let mut record = vec![class_and_id];
        let mut counts = [0u8; 16];
        counts[self.length as usize - 1] = self.symbols.len() as u8;
        record.extend_from_slice(&counts);
        record.extend_from_slice(&self.symbols);
        record
    }
}

enum Symbol {
    Dc { category: u8, bits: u32 },
    Ac { rs: u8, bits: u32, size: u8 },
}

fn magnitude_bits(value: i32, category: u8) -> u32 {
    if value >= 0 {
        value as u32
    } else {
        (value - 1) as u32 & ((1u32 << category) - 1)
    }
}

/// Writes three-component baseline JPEG files from explicit coefficients.
#[derive(Clone, Debug)]
pub struct JpegBuilder {
    width: u16,
    height: u16,
    precision: u8,
    frame_marker: u8,
    sampling: [(u8, u8); 3],
    quant_tables: Vec<(u8, [u8; 64])>,
    quant_selectors: [u8; 3],
    blocks: Vec<Block>,
    jfif: bool,
    segments: Vec<(u8, Vec<u8>)>,
    scan_data: Option<Vec<u8>>,
    eoi: bool,
}

impl JpegBuilder {
    /// A 4:4:4 image with a single all-ones quantization table.
    pub fn new(width: u16, height: u16) -> JpegBuilder {
        JpegBuilder {
            width,
            height,
            precision: 8,
            frame_marker: SOF0,
            sampling: [(1, 1); 3],
            quant_tables: vec![(0, [1; 64])],
            quant_selectors: [0; 3],
            blocks: Vec::new(),
            jfif: true,
            segments: Vec::new(),
            scan_data: None,
            eoi: true,
        }
    }

    pub fn sampling(mut self, sampling: [(u8, u8); 3]) -> Self {
        self.sampling = sampling;
        self
    }

    /// Defines quantization table `index`; values are in zigzag order.
    pub fn quant_table(mut self, index: u8, values: [u8; 64]) -> Self {
        self.quant_tables.retain(|(i, _)| *i != index);
        self.quant_tables.push((index, values));
        self
    }

    pub fn quant_selectors(mut self, selectors: [u8; 3]) -> Self {
        self.quant_selectors = selectors;
        self
    }

    /// Appends one data unit. Blocks are given in decoding order: for each MCU,
    /// the `H * V` units of Y, then Cb, then Cr.
    pub fn block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn blocks(mut self, blocks: impl IntoIterator<Item = Block>) -> Self {
        self.blocks.extend(blocks);
        self
    }

    pub fn without_jfif(mut self) -> Self {
        self.jfif = false;
        self
    }

    /// Inserts an extra segment with `payload` before the tables.
    pub fn segment(mut self, marker: u8, payload: &[u8]) -> Self {
        self.segments.push((marker, payload.to_vec()));
        self
    }

    pub fn precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    /// Replaces the SOF0 marker, e.g. with `0xc2` for a progressive frame.
    pub fn frame_marker(mut self, marker: u8) -> Self {
        self.frame_marker = marker;
        self
    }

    /// Uses `data` verbatim as the entropy-coded segment.
    pub fn scan_data(mut self, data: &[u8]) -> Self {
        self.scan_data = Some(data.to_vec());
        self
    }

    pub fn without_eoi(mut self) -> Self {
        self.eoi = false;
        self
    }

    fn mcu_grid(&self) -> (usize, usize) {
        let h_max = self.sampling.iter().map(|s| s.0).max().unwrap_or(1) as usize;
        let v_max = self.sampling.iter().map(|s| s.1).max().unwrap_or(1) as usize;
        (
            (self.width as usize).div_ceil(8 * h_max),
            (self.height as usize).div_ceil(8 * v_max),
        )
    }

    /// Number of data units in the scan.
    pub fn num_blocks(&self) -> usize {
        let (x, y) = self.mcu_grid();
        let per_mcu: usize = self
            .sampling
            .iter()
            .map(|&(h, v)| h as usize * v as usize)
            .sum();
        x * y * per_mcu
    }

    /// Component of each data unit, in decoding order.
    fn block_components(&self) -> Vec<usize> {
        let per_mcu: Vec<usize> = self
            .sampling
            .iter()
            .enumerate()
            .flat_map(|(c, &(h, v))| std::iter::repeat_n(c, h as usize * v as usize))
            .collect();
        per_mcu
            .iter()
            .copied()
            .cycle()
            .take(self.num_blocks())
            .collect()
    }

    fn symbols(&self) -> Vec<Vec<Symbol>> {
        let mut predictors = [0i32; 3];
        let mut blocks = self.blocks.clone();
        blocks.resize(self.num_blocks(), [0; 64]);
        blocks
            .iter()
            .zip(self.block_components())
            .map(|(block, c)| {
                let mut symbols = Vec::new();
                let dc = block[0] as i32;
                let diff = dc - predictors[c];
                predictors[c] = dc;
                let category = magnitude_category(diff);
                symbols.push(Symbol::Dc {
                    category,
                    bits: magnitude_bits(diff, category),
                });
                let mut run = 0u8;
                for &coefficient in block[1..].iter() {
                    if coefficient == 0 {
                        run += 1;
                        continue;
                    }
                    while run >= 16 {
                        symbols.push(Symbol::Ac {
                            rs: 0xf0,
                            bits: 0,
                            size: 0,
                        });
                        run -= 16;
                    }
                    let size = magnitude_category(coefficient as i32);
                    symbols.push(Symbol::Ac {
                        rs: (run << 4) | size,
                        bits: magnitude_bits(coefficient as i32, size),
                        size,
                    });
                    run = 0;
                }
                if run > 0 {
                    symbols.push(Symbol::Ac {
                        rs: 0x00,
                        bits: 0,
                        size: 0,
                    });
                }
                symbols
            })
            .collect()
    }

    fn push_segment(out: &mut Vec<u8>, marker: u8, payload: &[u8]) {
        out.extend_from_slice(&[0xff, marker]);
        out.extend_from_slice(&(payload.len() as u16 + 2).to_be_bytes());
        out.extend_from_slice(payload);
    }

    pub fn build(&self) -> Vec<u8> {
        let blocks = self.symbols();
        let mut dc_symbols = BTreeSet::new();
        let mut ac_symbols = BTreeSet::new();
        for symbol in blocks.iter().flatten() {
            match symbol {
                Symbol::Dc { category, .. } => dc_symbols.insert(*category),
                Symbol::Ac { rs, .. } => ac_symbols.insert(*rs),
            };
        }
        // Keep both tables non-empty.
        dc_symbols.insert(0);
        ac_symbols.insert(0);
        let dc_table = FlatTable::new(dc_symbols);
        let ac_table = FlatTable::new(ac_symbols);

        let mut out = vec![0xff, SOI];
        if self.jfif {
            let mut app0 = b"JFIF\0".to_vec();
            app0.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0]);
            Self::push_segment(&mut out, APP0, &app0);
        }
        for (marker, payload) in self.segments.iter() {
            Self::push_segment(&mut out, *marker, payload);
        }

        let mut dqt = Vec::new();
        for (index, values) in self.quant_tables.iter() {
            dqt.push(*index);
            dqt.extend_from_slice(values);
        }
        Self::push_segment(&mut out, DQT, &dqt);

        let mut sof = vec![self.precision];
        sof.extend_from_slice(&self.height.to_be_bytes());
        sof.extend_from_slice(&self.width.to_be_bytes());
        sof.push(3);
        for c in 0..3 {
            let (h, v) = self.sampling[c];
            sof.extend_from_slice(&[c as u8 + 1, (h << 4) | v, self.quant_selectors[c]]);
        }
        Self::push_segment(&mut out, self.frame_marker, &sof);

        let mut dht = dc_table.record(0x00);
        dht.extend(ac_table.record(0x10));
        Self::push_segment(&mut out, DHT, &dht);

        Self::push_segment(&mut out, SOS, &[3, 1, 0x00, 2, 0x00, 3, 0x00, 0, 63, 0]);

        match &self.scan_data {
            Some(data) => out.extend_from_slice(data),
            None => {
                let mut writer = BitWriter::default();
                for symbol in blocks.iter().flatten() {
                    match *symbol {
                        Symbol::Dc { category, bits } => {
                            let (code, length) = dc_table.code(category);
                            writer.write(code, length);
                            writer.write(bits, category);
                        }
                        Symbol::Ac { rs, bits, size } => {
                            let (code, length) = ac_table.code(rs);
                            writer.write(code, length);
                            writer.write(bits, size);
                        }
                    }
                }
                out.extend(writer.finish());
            }
        }
        if self.eoi {
            out.extend_from_slice(&[0xff, EOI]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_floats() {
        assert_almost_eq!(1.0000001f64, 1.0000002, 0.000001);
        assert_almost_eq!(1.0, 1.1, 0.2);
    }

    #[test]
    fn test_with_integers() {
        assert_almost_eq!(100, 101, 2);
        assert_almost_eq!(777u32, 770, 7);
    }

    #[test]
    fn test_all_almost_eq() {
        assert_all_almost_eq!([1.0f32, 2.0], vec![1.05f32, 1.95], 0.1);
        let result = std::panic::catch_unwind(|| {
            assert_all_almost_eq!([1.0f32, 2.0], [1.0f32, 2.5], 0.1);
        });
        assert!(result.is_err());
    }

    #[test]
    fn magnitude_categories() {
        assert_eq!(magnitude_category(0), 0);
        assert_eq!(magnitude_category(1), 1);
        assert_eq!(magnitude_category(-1), 1);
        assert_eq!(magnitude_category(-4), 3);
        assert_eq!(magnitude_category(255), 8);
        assert_eq!(magnitude_bits(-4, 3), 0b011);
        assert_eq!(magnitude_bits(5, 3), 0b101);
    }

    #[test]
    fn bit_writer_stuffs_and_pads() {
        let mut writer = BitWriter::default();
        writer.write(0xff, 8);
        writer.write(0b01, 2);
        assert_eq!(writer.finish(), vec![0xff, 0x00, 0b0111_1111]);
    }

    #[test]
    fn flat_table_lengths() {
        assert_eq!(FlatTable::new([0].into()).length, 1);
        assert_eq!(FlatTable::new([0, 1].into()).length, 2);
        assert_eq!(FlatTable::new((0..=6).collect()).length, 3);
        assert_eq!(FlatTable::new((0..=7).collect()).length, 4);
    }

    #[test]
    fn builds_a_complete_stream() {
        let data = JpegBuilder::new(8, 8).block(dc_block(3)).build();
        assert_eq!(&data[..4], &[0xff, SOI, 0xff, APP0]);
        assert_eq!(&data[data.len() - 2..], &[0xff, EOI]);
        assert_eq!(JpegBuilder::new(17, 9).sampling([(2, 2), (1, 1), (1, 1)]).num_blocks(), 12);
    }
}
