// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! JFIF YCbCr to RGB conversion.

use crate::error::{Error, Result};
use crate::image::Plane;

const CR_TO_R: f32 = 1.402;
const CB_TO_B: f32 = 1.772;
const KR: f32 = 0.299;
const KB: f32 = 0.114;
const KG: f32 = 0.587;

#[inline]
fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Converts one sample; each channel is rounded to nearest and clamped to 0..=255.
#[inline]
pub fn ycbcr_to_rgb(y: f32, cb: f32, cr: f32) -> [u8; 3] {
    let cb = cb - 128.0;
    let cr = cr - 128.0;
    let r = y + CR_TO_R * cr;
    let g = y - (KB * CB_TO_B * cb + KR * CR_TO_R * cr) / KG;
    let b = y + CB_TO_B * cb;
    [to_u8(r), to_u8(g), to_u8(b)]
}

/// Interleaved 8-bit RGB, row-major, from three planes of equal size.
pub fn planes_to_rgb8(y: &Plane, cb: &Plane, cr: &Plane) -> Result<Vec<u8>> {
    let (width, height) = y.size();
    for plane in [cb, cr] {
        if plane.size() != (width, height) {
            let (w, h) = plane.size();
            return Err(Error::InvalidImageSize(w, h));
        }
    }
    let mut rgb = Vec::new();
    rgb.try_reserve_exact(width * height * 3)?;
    for ((&y, &cb), &cr) in y
        .samples()
        .iter()
        .zip(cb.samples().iter())
        .zip(cr.samples().iter())
    {
        rgb.extend_from_slice(&ycbcr_to_rgb(y, cb, cr));
    }
    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn grey_stays_grey() {
        assert_eq!(ycbcr_to_rgb(128.0, 128.0, 128.0), [128, 128, 128]);
        assert_eq!(ycbcr_to_rgb(0.0, 128.0, 128.0), [0, 0, 0]);
        assert_eq!(ycbcr_to_rgb(255.0, 128.0, 128.0), [255, 255, 255]);
    }

    #[test]
    fn known_conversion() {
        // R = 130 + 1.402 * 3 = 134.2, G = 130 - (0.2020 * -1 + 0.4192 * 3) / 0.587 = 128.2,
        // B = 130 - 1.772 = 128.2.
        assert_eq!(ycbcr_to_rgb(130.0, 127.0, 131.0), [134, 128, 128]);
    }

    #[test]
    fn clamps_and_rounds() {
        assert_eq!(ycbcr_to_rgb(300.0, 128.0, 128.0), [255, 255, 255]);
        assert_eq!(ycbcr_to_rgb(-20.0, 128.0, 128.0), [0, 0, 0]);
        assert_eq!(ycbcr_to_rgb(100.4, 128.0, 128.0), [100, 100, 100]);
        assert_eq!(ycbcr_to_rgb(100.6, 128.0, 128.0), [101, 101, 101]);
        // Saturated red.
        assert_eq!(ycbcr_to_rgb(128.0, 128.0, 255.0)[0], 255);
    }

    #[test]
    fn interleaves_planes() -> Result<()> {
        let mut y = Plane::new((2, 1))?;
        let mut cb = Plane::new((2, 1))?;
        let mut cr = Plane::new((2, 1))?;
        y.row_mut(0).copy_from_slice(&[10.0, 200.0]);
        cb.row_mut(0).fill(128.0);
        cr.row_mut(0).fill(128.0);
        assert_eq!(planes_to_rgb8(&y, &cb, &cr)?, vec![10, 10, 10, 200, 200, 200]);
        Ok(())
    }

    #[test]
    fn rejects_mismatched_planes() -> Result<()> {
        let y = Plane::new((2, 2))?;
        let cb = Plane::new((1, 1))?;
        assert!(matches!(
            planes_to_rgb8(&y, &cb, &y),
            Err(Error::InvalidImageSize(1, 1))
        ));
        Ok(())
    }
}
