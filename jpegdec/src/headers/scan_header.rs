// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::byte_reader::ByteReader;
use crate::entropy_coding::huffman::MAX_TABLE_IDS;
use crate::error::{Error, Result};
use crate::util::tracing_wrappers::*;
use crate::NUM_COMPONENTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanComponentSelector {
    /// Cs: matches `ComponentDescriptor::id` of the frame.
    pub component_id: u8,
    /// Td
    pub dc_table: u8,
    /// Ta
    pub ac_table: u8,
}

/// Start-of-scan header (SOS).
///
/// Only interleaved scans over all three components are decoded. The spectral
/// selection and successive approximation fields are kept for logging; for a
/// baseline scan they are 0, 63, 0 and 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHeader {
    pub components: Vec<ScanComponentSelector>,
    pub spectral_start: u8,
    pub spectral_end: u8,
    pub approx_high: u8,
    pub approx_low: u8,
}

impl ScanHeader {
    /// Reads an SOS segment; `br` is positioned at its length field and is left at
    /// the first byte of entropy-coded data.
    pub fn read(br: &mut ByteReader) -> Result<ScanHeader> {
        let length = br.read_u16()?;
        debug!("SOS found (length {} bytes)", length);
        let mut segment = br.split((length as usize).saturating_sub(2))?;

        let num_components = segment.read_u8()?;
        if num_components as usize != NUM_COMPONENTS {
            return Err(Error::UnsupportedScanComponentCount(num_components));
        }
        let expected_length = 6 + 2 * num_components as u16;
        if length != expected_length {
            return Err(Error::InvalidSegmentLength {
                marker: 0xda,
                length,
            });
        }

        let mut components: Vec<ScanComponentSelector> = Vec::with_capacity(NUM_COMPONENTS);
        for _ in 0..num_components {
            let component_id = segment.read_u8()?;
            if components.iter().any(|c| c.component_id == component_id) {
                return Err(Error::DuplicateScanComponent(component_id));
            }
            let (dc_table, ac_table) = segment.read_nibbles()?;
            if dc_table as usize >= MAX_TABLE_IDS {
                return Err(Error::InvalidTableId {
                    class: 0,
                    id: dc_table,
                });
            }
            if ac_table as usize >= MAX_TABLE_IDS {
                return Err(Error::InvalidTableId {
                    class: 1,
                    id: ac_table,
                });
            }
            debug!("Cs {}, Td {}, Ta {}", component_id, dc_table, ac_table);
            components.push(ScanComponentSelector {
                component_id,
                dc_table,
                ac_table,
            });
        }
        let spectral_start = segment.read_u8()?;
        let spectral_end = segment.read_u8()?;
        let (approx_high, approx_low) = segment.read_nibbles()?;
        debug!(
            "Ss {}, Se {}, Ah {}, Al {}",
            spectral_start, spectral_end, approx_high, approx_low
        );
        Ok(ScanHeader {
            components,
            spectral_start,
            spectral_end,
            approx_high,
            approx_low,
        })
    }
}
