// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::error::{Error, Result};

/// A full-resolution sample plane of one component, row-major.
#[derive(Clone)]
pub struct Plane {
    size: (usize, usize),
    data: Vec<f32>,
}

impl Debug for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Plane {}x{}", self.size.0, self.size.1)
    }
}

impl Plane {
    /// Allocates a zero-filled plane, reporting allocation failure instead of aborting.
    pub fn new(size: (usize, usize)) -> Result<Plane> {
        let (xsize, ysize) = size;
        // These limits let us not worry about overflows.
        if xsize as u64 >= i64::MAX as u64 / 4 || ysize as u64 >= i64::MAX as u64 / 4 {
            return Err(Error::ImageSizeTooLarge(xsize, ysize));
        }
        let total_size = xsize
            .checked_mul(ysize)
            .ok_or(Error::ImageSizeTooLarge(xsize, ysize))?;
        if xsize == 0 || ysize == 0 {
            return Err(Error::InvalidImageSize(xsize, ysize));
        }
        let mut data = vec![];
        data.try_reserve_exact(total_size)?;
        data.resize(total_size, 0.0);
        Ok(Plane {
            size: (xsize, ysize),
            data,
        })
    }

    /// Width and height.
    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    pub fn row(&self, row: usize) -> &[f32] {
        debug_assert!(row < self.size.1);
        let start = row * self.size.0;
        &self.data[start..start + self.size.0]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        debug_assert!(row < self.size.1);
        let start = row * self.size.0;
        &mut self.data[start..start + self.size.0]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.size.0 || y >= self.size.1 {
            return None;
        }
        Some(self.data[y * self.size.0 + x])
    }

    /// All samples in row-major order.
    pub fn samples(&self) -> &[f32] {
        &self.data
    }
}
