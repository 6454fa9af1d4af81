// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub mod pnm;

use std::path::Path;
use std::time::{Duration, Instant};

use color_eyre::eyre::{Result, WrapErr};
use jpegdec::DecodedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpmFormat {
    /// P3
    Plain,
    /// P6
    Binary,
}

/// Converts to RGB and serializes as PPM.
pub fn encode_ppm(image: &DecodedImage, format: PpmFormat) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8()?;
    let size = (image.width(), image.height());
    match format {
        PpmFormat::Plain => pnm::to_ppm_plain(size, &rgb),
        PpmFormat::Binary => pnm::to_ppm_binary(size, &rgb),
    }
}

/// Writes `image` to `path`, returning the time spent.
pub fn save_ppm(image: &DecodedImage, path: &Path, format: PpmFormat) -> Result<Duration> {
    let start = Instant::now();
    let bytes = encode_ppm(image, format)?;
    std::fs::write(path, bytes)
        .wrap_err_with(|| format!("Failed to write output file {}", path.display()))?;
    Ok(start.elapsed())
}
