// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Header errors.
    #[error("Missing SOI marker, found {0:04x}")]
    MissingStartOfImage(u16),
    #[error("Unsupported sample precision: {0} bits, only 8 is supported")]
    UnsupportedPrecision(u8),
    #[error("Unsupported number of components: {0}, expected 3")]
    UnsupportedComponentCount(u8),
    #[error("Invalid APP0 identifier {0:02x?}, expected JFIF")]
    InvalidJfifIdentifier([u8; 5]),
    #[error("APP0 segment too short: {0} bytes")]
    JfifTooShort(u16),
    #[error("Invalid quantization table length: {0} bytes, expected a multiple of 65")]
    InvalidQuantTableLength(usize),
    #[error("Invalid length {length} for segment {marker:02x}")]
    InvalidSegmentLength { marker: u8, length: u16 },
    #[error("Invalid table id {id} for class {class}")]
    InvalidTableId { class: u8, id: u8 },
    #[error("Invalid sampling factors: H={h} V={v}")]
    InvalidSamplingFactors { h: u8, v: u8 },
    #[error("Invalid image size: {0}x{1}")]
    InvalidImageSize(usize, usize),
    #[error("Image size too large: {0}x{1}")]
    ImageSizeTooLarge(usize, usize),
    #[error("Huffman code space overflow at length {length}")]
    HuffmanTableOverflow { length: usize },
    #[error("Huffman table has {0} symbols, max is 256")]
    HuffmanTableTooLarge(usize),
    #[error("Scan references unknown component id {0}")]
    UnknownComponentId(u8),
    #[error("Scan selects component id {0} more than once")]
    DuplicateScanComponent(u8),
    #[error("Scan has {0} components, expected 3")]
    UnsupportedScanComponentCount(u8),
    #[error("Frame header (SOF0) missing before scan")]
    MissingFrameHeader,
    #[error("Frame header (SOF0) found twice")]
    DuplicateFrameHeader,
    #[error("No scan (SOS) found before EOI")]
    MissingScan,
    #[error("Huffman table class {class} id {id} is not defined")]
    MissingHuffmanTable { class: u8, id: u8 },
    #[error("Quantization table {0} is not defined")]
    MissingQuantTable(u8),
    // Stream errors.
    #[error("Marker EOI (0xFFD9) missing")]
    MissingEoi,
    #[error("File truncated")]
    FileTruncated,
    #[error("Read out of bounds")]
    OutOfBounds,
    #[error("Unexpected marker ff{0:02x} found in entropy-coded data")]
    UnexpectedMarker(u8),
    #[error("Invalid code in bitstream at bit position {bit_position}")]
    InvalidCode { bit_position: usize },
    #[error("Unknown marker {marker:04x} at offset {offset}")]
    UnknownSegment { marker: u16, offset: usize },
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
    // Generic arithmetic overflow. Prefer using other errors if possible.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

pub type Result<T> = std::result::Result<T, Error>;
