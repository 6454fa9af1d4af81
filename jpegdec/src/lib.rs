// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![deny(unsafe_code)]
//! Baseline sequential DCT JPEG decoder.
//!
//! Parses the marker segments of a JFIF/JPEG file, removes byte stuffing from the
//! entropy-coded scan, Huffman-decodes every data unit, dequantizes, applies the
//! inverse DCT and assembles three full-resolution Y, Cb and Cr planes.
//!
//! ```no_run
//! let data = std::fs::read("image.jpg").unwrap();
//! let image = jpegdec::decode(&data).unwrap();
//! let rgb = image.to_rgb8().unwrap();
//! assert_eq!(rgb.len(), image.width() * image.height() * 3);
//! ```

pub mod bit_reader;
pub mod byte_reader;
pub mod color;
pub mod decode;
pub mod entropy_coding;
pub mod error;
pub mod frame;
pub mod headers;
pub mod idct;
pub mod image;
pub mod quantizer;
pub mod util;

pub use decode::{DecodedImage, DecoderOptions, JpegDecoder, decode};
pub use error::{Error, Result};

const BLOCK_DIM: usize = 8;
const BLOCK_SIZE: usize = BLOCK_DIM * BLOCK_DIM;
const NUM_COMPONENTS: usize = 3;
