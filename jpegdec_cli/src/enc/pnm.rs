// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Write;

use color_eyre::eyre::{Result, ensure};

fn check_size(size: (usize, usize), rgb: &[u8]) -> Result<()> {
    ensure!(
        rgb.len() == size.0 * size.1 * 3,
        "expected {}x{} RGB pixels, got {} bytes",
        size.0,
        size.1,
        rgb.len()
    );
    Ok(())
}

/// Plain-text PPM: one line per image row, each pixel written as `"r g b "`.
pub fn to_ppm_plain(size: (usize, usize), rgb: &[u8]) -> Result<Vec<u8>> {
    check_size(size, rgb)?;
    let mut ret = vec![];
    write!(&mut ret, "P3\n{} {}\n255\n", size.0, size.1)?;
    if size.0 == 0 {
        return Ok(ret);
    }
    for row in rgb.chunks_exact(size.0 * 3) {
        for pixel in row.chunks_exact(3) {
            write!(&mut ret, "{} {} {} ", pixel[0], pixel[1], pixel[2])?;
        }
        ret.push(b'\n');
    }
    Ok(ret)
}

/// Binary PPM.
pub fn to_ppm_binary(size: (usize, usize), rgb: &[u8]) -> Result<Vec<u8>> {
    check_size(size, rgb)?;
    let mut ret = vec![];
    write!(&mut ret, "P6\n{} {}\n255\n", size.0, size.1)?;
    ret.extend_from_slice(rgb);
    Ok(ret)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plain_layout() -> Result<()> {
        let rgb = [1, 2, 3, 40, 50, 60, 255, 0, 7, 8, 9, 10];
        let ppm = to_ppm_plain((2, 2), &rgb)?;
        assert_eq!(
            String::from_utf8(ppm)?,
            "P3\n2 2\n255\n1 2 3 40 50 60 \n255 0 7 8 9 10 \n"
        );
        Ok(())
    }

    #[test]
    fn binary_layout() -> Result<()> {
        let ppm = to_ppm_binary((1, 1), &[9, 8, 7])?;
        assert_eq!(ppm, b"P6\n1 1\n255\n\x09\x08\x07");
        Ok(())
    }

    #[test]
    fn size_mismatch() {
        assert!(to_ppm_plain((2, 2), &[0; 6]).is_err());
        assert!(to_ppm_binary((3, 1), &[0; 6]).is_err());
    }
}
