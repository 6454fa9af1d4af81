// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::byte_reader::ByteReader;
use crate::error::{Error, Result};
use crate::util::tracing_wrappers::*;

const JFIF_IDENTIFIER: &[u8; 5] = b"JFIF\0";
// Segment length (2) + identifier (5) + version (2) + units (1) + densities (4) + thumbnail size (2).
const MIN_JFIF_LENGTH: u16 = 16;

/// Units of the pixel density fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityUnits {
    AspectRatio,
    DotsPerInch,
    DotsPerCentimeter,
    Other(u8),
}

impl From<u8> for DensityUnits {
    fn from(value: u8) -> Self {
        match value {
            0 => DensityUnits::AspectRatio,
            1 => DensityUnits::DotsPerInch,
            2 => DensityUnits::DotsPerCentimeter,
            other => DensityUnits::Other(other),
        }
    }
}

/// Contents of the APP0 JFIF segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JfifHeader {
    pub version: (u8, u8),
    pub units: DensityUnits,
    pub x_density: u16,
    pub y_density: u16,
    /// Thumbnail width and height; the thumbnail pixels themselves are skipped.
    pub thumbnail: (u8, u8),
}

impl JfifHeader {
    /// Reads an APP0 segment; `br` is positioned at its length field.
    pub fn read(br: &mut ByteReader) -> Result<JfifHeader> {
        let length = br.read_u16()?;
        debug!("APP0 found (length {} bytes)", length);
        if length < MIN_JFIF_LENGTH {
            return Err(Error::JfifTooShort(length));
        }
        let mut segment = br.split(length as usize - 2)?;

        let mut identifier = [0u8; 5];
        identifier.copy_from_slice(segment.read_bytes(5)?);
        if &identifier != JFIF_IDENTIFIER {
            return Err(Error::InvalidJfifIdentifier(identifier));
        }
        let version = (segment.read_u8()?, segment.read_u8()?);
        let units = DensityUnits::from(segment.read_u8()?);
        let x_density = segment.read_u16()?;
        let y_density = segment.read_u16()?;
        let thumbnail = (segment.read_u8()?, segment.read_u8()?);
        debug!(
            "version {}.{}, units {:?}, density X {} Y {}",
            version.0, version.1, units, x_density, y_density
        );

        let thumbnail_bytes = 3 * thumbnail.0 as usize * thumbnail.1 as usize;
        if thumbnail_bytes > 0 {
            debug!("thumbnail {} bytes, skipping", thumbnail_bytes);
            segment.skip(thumbnail_bytes)?;
        }

        Ok(JfifHeader {
            version,
            units,
            x_density,
            y_density,
            thumbnail,
        })
    }
}
