// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::path::Path;
use std::time::{Duration, Instant};

use color_eyre::eyre::{Result, WrapErr};
use jpegdec::{DecodedImage, DecoderOptions, JpegDecoder};

/// Decodes an in-memory JPEG file and reports how long the decoder ran.
pub fn decode_bytes(data: &[u8], options: DecoderOptions) -> Result<(DecodedImage, Duration)> {
    let start = Instant::now();
    let image = JpegDecoder::new(options)
        .decode(data)
        .wrap_err("Failed to decode JPEG")?;
    Ok((image, start.elapsed()))
}

/// Reads and decodes `path`. The returned duration excludes reading the file.
pub fn decode_file(path: &Path, options: DecoderOptions) -> Result<(DecodedImage, Duration)> {
    let data = std::fs::read(path)
        .wrap_err_with(|| format!("Cannot read input file {}", path.display()))?;
    decode_bytes(&data, options)
}
