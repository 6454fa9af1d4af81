// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::byte_reader::ByteReader;
use crate::error::{Error, Result};
use crate::headers::scan_header::ScanHeader;
use crate::util::{ceil_to_multiple, scale_rounded, tracing_wrappers::*};
use crate::{BLOCK_DIM, NUM_COMPONENTS};

pub const COMPONENT_NAMES: [&str; NUM_COMPONENTS] = ["Y", "Cb", "Cr"];

const MAX_SAMPLING_FACTOR: u8 = 4;

/// One image component as declared by SOF0, completed by the scan header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub id: u8,
    /// Horizontal sampling factor.
    pub h: u8,
    /// Vertical sampling factor.
    pub v: u8,
    /// Quantization table index.
    pub quant_table: u8,
    /// DC Huffman table index, assigned by SOS.
    pub dc_table: u8,
    /// AC Huffman table index, assigned by SOS.
    pub ac_table: u8,
    /// Width of the component's sample plane before upsampling.
    pub xi: usize,
    /// Height of the component's sample plane before upsampling.
    pub yi: usize,
}

impl ComponentDescriptor {
    /// Number of data units this component contributes to each MCU.
    pub fn blocks_per_mcu(&self) -> usize {
        self.h as usize * self.v as usize
    }
}

/// Baseline frame header (SOF0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub precision: u8,
    pub width: usize,
    pub height: usize,
    pub components: [ComponentDescriptor; NUM_COMPONENTS],
    pub h_max: u8,
    pub v_max: u8,
}

impl FrameHeader {
    /// Reads a SOF0 segment; `br` is positioned at its length field.
    pub fn read(br: &mut ByteReader) -> Result<FrameHeader> {
        let length = br.read_u16()?;
        debug!("SOF0 found (length {} bytes)", length);
        let mut segment = br.split((length as usize).saturating_sub(2))?;

        let precision = segment.read_u8()?;
        let height = segment.read_u16()? as usize;
        let width = segment.read_u16()? as usize;
        let num_components = segment.read_u8()?;
        if precision != 8 {
            return Err(Error::UnsupportedPrecision(precision));
        }
        if width == 0 || height == 0 {
            return Err(Error::InvalidImageSize(width, height));
        }
        if num_components as usize != NUM_COMPONENTS {
            return Err(Error::UnsupportedComponentCount(num_components));
        }
        debug!("imagesize X {} Y {}, {} components", width, height, num_components);

        let mut components = array_init::try_array_init(|i| -> Result<ComponentDescriptor> {
            let id = segment.read_u8()?;
            let (h, v) = segment.read_nibbles()?;
            let quant_table = segment.read_u8()?;
            if !(1..=MAX_SAMPLING_FACTOR).contains(&h) || !(1..=MAX_SAMPLING_FACTOR).contains(&v) {
                return Err(Error::InvalidSamplingFactors { h, v });
            }
            if quant_table > 3 {
                return Err(Error::InvalidTableId {
                    class: 0,
                    id: quant_table,
                });
            }
            debug!(
                "component {} ({}) C {}, H {}, V {}, Tq {}",
                i, COMPONENT_NAMES[i], id, h, v, quant_table
            );
            Ok(ComponentDescriptor {
                id,
                h,
                v,
                quant_table,
                dc_table: 0,
                ac_table: 0,
                xi: 0,
                yi: 0,
            })
        })?;

        let h_max = components.iter().map(|c| c.h).max().unwrap_or(1);
        let v_max = components.iter().map(|c| c.v).max().unwrap_or(1);
        for c in components.iter_mut() {
            // Each block is replicated by an integer factor during plane assembly.
            if h_max % c.h != 0 || v_max % c.v != 0 {
                return Err(Error::InvalidSamplingFactors { h: c.h, v: c.v });
            }
            c.xi = scale_rounded(width, c.h as usize, h_max as usize);
            c.yi = scale_rounded(height, c.v as usize, v_max as usize);
        }

        let header = FrameHeader {
            precision,
            width,
            height,
            components,
            h_max,
            v_max,
        };
        debug!(
            "Hmax {} Vmax {}, MCU_total {}",
            h_max,
            v_max,
            header.num_mcus()
        );
        Ok(header)
    }

    /// Width and height of one MCU in full-resolution pixels.
    pub fn mcu_size(&self) -> (usize, usize) {
        (
            BLOCK_DIM * self.h_max as usize,
            BLOCK_DIM * self.v_max as usize,
        )
    }

    /// Number of MCUs per row and per column.
    pub fn mcu_grid(&self) -> (usize, usize) {
        let (mcu_w, mcu_h) = self.mcu_size();
        (
            ceil_to_multiple(self.width, mcu_w) / mcu_w,
            ceil_to_multiple(self.height, mcu_h) / mcu_h,
        )
    }

    pub fn num_mcus(&self) -> usize {
        let (x, y) = self.mcu_grid();
        x * y
    }

    /// Horizontal and vertical replication factors of `component`.
    pub fn zoom(&self, component: usize) -> (usize, usize) {
        let c = &self.components[component];
        (
            (self.h_max / c.h) as usize,
            (self.v_max / c.v) as usize,
        )
    }

    /// Records the Huffman table selectors of `scan`, matching components by id.
    pub fn apply_scan(&mut self, scan: &ScanHeader) -> Result<()> {
        for selector in scan.components.iter() {
            let component = self
                .components
                .iter_mut()
                .find(|c| c.id == selector.component_id)
                .ok_or(Error::UnknownComponentId(selector.component_id))?;
            component.dc_table = selector.dc_table;
            component.ac_table = selector.ac_table;
        }
        Ok(())
    }
}
