// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::headers::FrameHeader;
use crate::image::Plane;
use crate::{BLOCK_DIM, BLOCK_SIZE, NUM_COMPONENTS};

/// Where a data unit lands in its full-resolution plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Top-left pixel of the upsampled block.
    pub origin: (usize, usize),
    /// Replication factors (Hmax / H, Vmax / V).
    pub zoom: (usize, usize),
}

/// Writes transformed blocks into the Y, Cb and Cr planes.
#[derive(Debug, Clone)]
pub struct PlaneAssembler {
    mcus_x: usize,
    mcu_size: (usize, usize),
    h: [usize; NUM_COMPONENTS],
    zoom: [(usize, usize); NUM_COMPONENTS],
}

impl PlaneAssembler {
    pub fn new(frame: &FrameHeader) -> PlaneAssembler {
        PlaneAssembler {
            mcus_x: frame.mcu_grid().0,
            mcu_size: frame.mcu_size(),
            h: array_init::array_init(|c| frame.components[c].h as usize),
            zoom: array_init::array_init(|c| frame.zoom(c)),
        }
    }

    pub fn placement(&self, mcu: usize, component: usize, data_unit: usize) -> Placement {
        let (zoom_x, zoom_y) = self.zoom[component];
        let (mcu_x, mcu_y) = (mcu % self.mcus_x, mcu / self.mcus_x);
        let h = self.h[component];
        let (unit_x, unit_y) = (data_unit % h, data_unit / h);
        Placement {
            origin: (
                mcu_x * self.mcu_size.0 + unit_x * BLOCK_DIM * zoom_x,
                mcu_y * self.mcu_size.1 + unit_y * BLOCK_DIM * zoom_y,
            ),
            zoom: (zoom_x, zoom_y),
        }
    }

    /// Replicates each sample `zoom_x * zoom_y` times, dropping anything outside the plane.
    pub fn store_block(
        &self,
        plane: &mut Plane,
        mcu: usize,
        component: usize,
        data_unit: usize,
        samples: &[f32; BLOCK_SIZE],
    ) {
        let Placement {
            origin: (x0, y0),
            zoom: (zoom_x, zoom_y),
        } = self.placement(mcu, component, data_unit);
        let (width, height) = plane.size();
        if x0 >= width || y0 >= height {
            return;
        }
        let x_end = (x0 + BLOCK_DIM * zoom_x).min(width);
        let y_end = (y0 + BLOCK_DIM * zoom_y).min(height);
        for py in y0..y_end {
            let source = &samples[(py - y0) / zoom_y * BLOCK_DIM..][..BLOCK_DIM];
            let row = &mut plane.row_mut(py)[x0..x_end];
            for (i, out) in row.iter_mut().enumerate() {
                *out = source[i / zoom_x];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_reader::ByteReader;
    use crate::error::Result;
    use crate::headers::frame_header::tests::sof0;
    use test_log::test;

    fn assembler(width: u16, height: u16, sampling: [(u8, u8); 3]) -> PlaneAssembler {
        let data = sof0(width, height, sampling);
        PlaneAssembler::new(&FrameHeader::read(&mut ByteReader::new(&data)).unwrap())
    }

    fn ramp() -> [f32; BLOCK_SIZE] {
        array_init::array_init(|i| i as f32)
    }

    #[test]
    fn placements_420() {
        let assembler = assembler(40, 40, [(2, 2), (1, 1), (1, 1)]);
        // Three MCUs per row; MCU 4 is the middle of the second row.
        assert_eq!(
            assembler.placement(4, 0, 3),
            Placement {
                origin: (24, 24),
                zoom: (1, 1)
            }
        );
        assert_eq!(
            assembler.placement(4, 0, 1),
            Placement {
                origin: (24, 16),
                zoom: (1, 1)
            }
        );
        assert_eq!(
            assembler.placement(4, 2, 0),
            Placement {
                origin: (16, 16),
                zoom: (2, 2)
            }
        );
    }

    #[test]
    fn chroma_is_replicated() -> Result<()> {
        let assembler = assembler(16, 16, [(2, 2), (1, 1), (1, 1)]);
        let mut plane = Plane::new((16, 16))?;
        assembler.store_block(&mut plane, 0, 1, 0, &ramp());
        for y in 0..BLOCK_DIM {
            for x in 0..BLOCK_DIM {
                let expected = (y * BLOCK_DIM + x) as f32;
                for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                    assert_eq!(plane.get(2 * x + dx, 2 * y + dy), Some(expected));
                }
            }
        }
        Ok(())
    }

    #[test]
    fn clips_to_plane() -> Result<()> {
        let assembler = assembler(12, 10, [(1, 1); 3]);
        let mut plane = Plane::new((12, 10))?;
        // MCU 3 is the bottom-right block; only 4x2 of its samples are visible.
        assembler.store_block(&mut plane, 3, 0, 0, &ramp());
        assert_eq!(plane.get(8, 8), Some(0.0));
        assert_eq!(plane.get(11, 8), Some(3.0));
        assert_eq!(plane.get(11, 9), Some(11.0));
        assert_eq!(plane.get(7, 7), Some(0.0));
        Ok(())
    }

    #[test]
    fn clips_replicated_chroma() -> Result<()> {
        let assembler = assembler(17, 9, [(2, 2), (1, 1), (1, 1)]);
        let mut plane = Plane::new((17, 9))?;
        assembler.store_block(&mut plane, 1, 2, 0, &ramp());
        // Only column 16 and rows 0..9 fall inside; each source sample covers 2x2.
        assert_eq!(plane.get(16, 0), Some(0.0));
        assert_eq!(plane.get(16, 1), Some(0.0));
        assert_eq!(plane.get(16, 2), Some(8.0));
        assert_eq!(plane.get(16, 8), Some(32.0));
        assert_eq!(plane.get(15, 0), Some(0.0));
        Ok(())
    }

    #[test]
    fn rewriting_a_block_does_not_accumulate() -> Result<()> {
        let assembler = assembler(8, 8, [(1, 1); 3]);
        let mut plane = Plane::new((8, 8))?;
        assembler.store_block(&mut plane, 0, 0, 0, &[5.0; BLOCK_SIZE]);
        assembler.store_block(&mut plane, 0, 0, 0, &[5.0; BLOCK_SIZE]);
        assert!(plane.samples().iter().all(|&s| s == 5.0));
        Ok(())
    }
}
