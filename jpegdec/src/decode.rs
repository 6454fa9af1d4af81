// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use byteorder::{BigEndian, ByteOrder};

use crate::NUM_COMPONENTS;
use crate::color::planes_to_rgb8;
use crate::entropy_coding::destuff::destuff;
use crate::entropy_coding::huffman::HuffmanTableStore;
use crate::error::{Error, Result};
use crate::frame::decode_scan;
use crate::headers::markers::Marker;
use crate::headers::{FrameHeader, JfifHeader, ScanHeader, Segment, SegmentParser};
use crate::idct::IdctMethod;
use crate::image::Plane;
use crate::quantizer::QuantizationTableStore;
use crate::util::tracing_wrappers::*;

const DEFAULT_MAX_PIXELS: usize = 1 << 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    pub idct: IdctMethod,
    /// Largest accepted `width * height`; `None` disables the check.
    pub max_pixels: Option<usize>,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            idct: IdctMethod::default(),
            max_pixels: Some(DEFAULT_MAX_PIXELS),
        }
    }
}

/// The three full-resolution planes of a decoded image with its headers.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    frame: FrameHeader,
    jfif: Option<JfifHeader>,
    planes: [Plane; NUM_COMPONENTS],
}

impl DecodedImage {
    pub fn width(&self) -> usize {
        self.frame.width
    }

    pub fn height(&self) -> usize {
        self.frame.height
    }

    pub fn frame(&self) -> &FrameHeader {
        &self.frame
    }

    /// The APP0 header, if the file had one.
    pub fn jfif(&self) -> Option<&JfifHeader> {
        self.jfif.as_ref()
    }

    /// Y, Cb and Cr, each `width x height`, not clamped.
    pub fn planes(&self) -> &[Plane; NUM_COMPONENTS] {
        &self.planes
    }

    pub fn into_planes(self) -> [Plane; NUM_COMPONENTS] {
        self.planes
    }

    /// Interleaved RGB, three bytes per pixel, row-major.
    pub fn to_rgb8(&self) -> Result<Vec<u8>> {
        let [y, cb, cr] = &self.planes;
        planes_to_rgb8(y, cb, cr)
    }
}

/// Tables and headers collected while walking the marker segments.
#[derive(Default)]
struct DecoderContext {
    jfif: Option<JfifHeader>,
    frame: Option<FrameHeader>,
    huffman: HuffmanTableStore,
    quant: QuantizationTableStore,
}

impl DecoderContext {
    fn set_frame(&mut self, frame: FrameHeader, options: &DecoderOptions) -> Result<()> {
        if self.frame.is_some() {
            return Err(Error::DuplicateFrameHeader);
        }
        if let Some(max_pixels) = options.max_pixels {
            let pixels = frame
                .width
                .checked_mul(frame.height)
                .ok_or(Error::ArithmeticOverflow)?;
            if pixels > max_pixels {
                return Err(Error::ImageSizeTooLarge(frame.width, frame.height));
            }
        }
        self.frame = Some(frame);
        Ok(())
    }

    /// Decodes the scan whose entropy-coded data starts at `parser`'s position,
    /// then consumes the EOI that terminates it.
    fn finish(
        self,
        scan: &ScanHeader,
        parser: &mut SegmentParser,
        options: &DecoderOptions,
    ) -> Result<DecodedImage> {
        let DecoderContext {
            jfif,
            frame,
            huffman,
            quant,
        } = self;
        let mut frame = frame.ok_or(Error::MissingFrameHeader)?;
        frame.apply_scan(scan)?;
        let scan_data = destuff(parser.data(), parser.position())?;
        let planes = decode_scan(&frame, &huffman, &quant, &scan_data.data, options.idct)?;
        parser.seek(scan_data.eoi_offset)?;
        parser.next_segment()?;
        info!(
            "decoded {}x{} image, {} bytes of scan data",
            frame.width, frame.height, scan_data.stuffed_len
        );
        Ok(DecodedImage {
            frame,
            jfif,
            planes,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct JpegDecoder {
    options: DecoderOptions,
}

impl JpegDecoder {
    pub fn new(options: DecoderOptions) -> JpegDecoder {
        JpegDecoder { options }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decodes a complete baseline JPEG file held in memory.
    #[instrument(level = "debug", skip_all, err)]
    pub fn decode(&self, data: &[u8]) -> Result<DecodedImage> {
        if data.len() < 2 {
            return Err(Error::FileTruncated);
        }
        let soi = BigEndian::read_u16(data);
        if soi != 0xff00 | Marker::SOI as u16 {
            return Err(Error::MissingStartOfImage(soi));
        }

        let mut ctx = DecoderContext::default();
        let mut parser = SegmentParser::new(data);
        // Skip the SOI checked above.
        parser.next_segment()?;
        loop {
            let offset = parser.position();
            match parser.next_segment()? {
                Segment::StartOfImage => {
                    return Err(Error::UnknownSegment {
                        marker: soi,
                        offset,
                    });
                }
                Segment::Jfif(jfif) => ctx.jfif = Some(jfif),
                Segment::Skipped { .. } => {}
                Segment::QuantizationTables(tables) => {
                    tables.into_iter().for_each(|t| ctx.quant.insert(t));
                }
                Segment::Frame(frame) => ctx.set_frame(frame, &self.options)?,
                Segment::HuffmanTables(tables) => {
                    tables.into_iter().for_each(|t| ctx.huffman.insert(t));
                }
                Segment::Scan(scan) => return ctx.finish(&scan, &mut parser, &self.options),
                Segment::EndOfImage => return Err(Error::MissingScan),
            }
        }
    }
}

/// Decodes `data` with default options.
pub fn decode(data: &[u8]) -> Result<DecodedImage> {
    JpegDecoder::default().decode(data)
}
