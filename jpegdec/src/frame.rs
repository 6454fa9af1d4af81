// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub mod assemble;
pub mod scan;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::entropy_coding::huffman::HuffmanTableStore;
use crate::error::Result;
use crate::headers::FrameHeader;
use crate::idct::IdctMethod;
use crate::image::Plane;
use crate::quantizer::{QuantizationTable, QuantizationTableStore};
use crate::util::tracing_wrappers::*;
use crate::{BLOCK_SIZE, NUM_COMPONENTS};

use assemble::PlaneAssembler;
use scan::{CodedBlock, ScanDecoder, ScanState};

/// Dequantizes and inverse-transforms one coded block.
fn reconstruct(
    block: &CodedBlock,
    quant: &[&QuantizationTable; NUM_COMPONENTS],
    idct: IdctMethod,
) -> Result<[f32; BLOCK_SIZE]> {
    let natural = quant[block.component].dequantize(&block.coefficients)?;
    Ok(idct.transform(&natural))
}

fn reconstruct_all(
    blocks: &[CodedBlock],
    quant: &[&QuantizationTable; NUM_COMPONENTS],
    idct: IdctMethod,
) -> Result<Vec<[f32; BLOCK_SIZE]>> {
    #[cfg(feature = "parallel")]
    let blocks = blocks.par_iter();
    #[cfg(not(feature = "parallel"))]
    let blocks = blocks.iter();
    blocks
        .map(|block| reconstruct(block, quant, idct))
        .collect()
}

/// Decodes the entropy-coded data of the single scan into full-resolution
/// Y, Cb and Cr planes.
///
/// Huffman decoding runs in scan order. Each row of MCUs is then dequantized,
/// transformed and written to the planes before the next row is decoded.
#[instrument(level = "debug", skip_all, err)]
pub fn decode_scan(
    frame: &FrameHeader,
    huffman: &HuffmanTableStore,
    quant: &QuantizationTableStore,
    data: &[u8],
    idct: IdctMethod,
) -> Result<[Plane; NUM_COMPONENTS]> {
    let quant: [&QuantizationTable; NUM_COMPONENTS] =
        array_init::try_array_init(|c| quant.get(frame.components[c].quant_table))?;
    let decoder = ScanDecoder::new(frame, huffman)?;
    let assembler = PlaneAssembler::new(frame);
    let mut planes: [Plane; NUM_COMPONENTS] =
        array_init::try_array_init(|_| Plane::new((frame.width, frame.height)))?;

    let (mcus_x, mcus_y) = frame.mcu_grid();
    let mut blocks = Vec::new();
    blocks.try_reserve(mcus_x * decoder.units_per_mcu())?;
    let mut state = ScanState::new(data);
    for mcu_row in 0..mcus_y {
        blocks.clear();
        for mcu_col in 0..mcus_x {
            decoder.decode_mcu(&mut state, mcu_row * mcus_x + mcu_col, &mut blocks)?;
        }
        let samples = reconstruct_all(&blocks, &quant, idct)?;
        for (block, samples) in blocks.iter().zip(samples.iter()) {
            assembler.store_block(
                &mut planes[block.component],
                block.mcu,
                block.component,
                block.data_unit,
                samples,
            );
        }
    }

    let unused = state.bits_available() - state.bits_read();
    debug!(
        "decoded {} MCUs, {} of {} bits used",
        mcus_x * mcus_y,
        state.bits_read(),
        state.bits_available()
    );
    if unused >= 8 {
        warn!("{} bits of scan data left after the last MCU", unused);
    }
    Ok(planes)
}
