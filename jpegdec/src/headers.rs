// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub mod frame_header;
pub mod jfif;
pub mod markers;
pub mod scan_header;

use num_traits::FromPrimitive;

use crate::byte_reader::ByteReader;
use crate::entropy_coding::huffman::HuffmanTable;
use crate::error::{Error, Result};
use crate::quantizer::QuantizationTable;
use crate::util::tracing_wrappers::*;

pub use frame_header::{ComponentDescriptor, FrameHeader};
pub use jfif::JfifHeader;
pub use markers::Marker;
pub use scan_header::{ScanComponentSelector, ScanHeader};

/// One parsed marker segment.
#[derive(Debug, Clone)]
pub enum Segment {
    StartOfImage,
    Jfif(JfifHeader),
    /// APPn (n > 0) or COM segment, skipped by its length.
    Skipped { marker: Marker, length: u16 },
    QuantizationTables(Vec<QuantizationTable>),
    Frame(FrameHeader),
    HuffmanTables(Vec<HuffmanTable>),
    /// After a scan header the parser is positioned at the entropy-coded data.
    Scan(ScanHeader),
    EndOfImage,
}

/// Walks the marker segments of a JPEG stream.
pub struct SegmentParser<'a> {
    br: ByteReader<'a>,
}

impl<'a> SegmentParser<'a> {
    pub fn new(data: &'a [u8]) -> SegmentParser<'a> {
        SegmentParser {
            br: ByteReader::new(data),
        }
    }

    /// Byte offset of the next segment, or of the entropy-coded data after a scan header.
    pub fn position(&self) -> usize {
        self.br.offset()
    }

    pub fn seek(&mut self, offset: usize) -> Result<()> {
        self.br.seek(offset)
    }

    pub fn data(&self) -> &'a [u8] {
        self.br.data()
    }

    /// Reads the two-byte marker at the current position.
    fn read_marker(&mut self) -> Result<Marker> {
        let offset = self.br.offset();
        let code = self.br.read_u16()?;
        let [prefix, id] = code.to_be_bytes();
        match Marker::from_u8(id) {
            Some(marker) if prefix == 0xff => Ok(marker),
            _ => Err(Error::UnknownSegment {
                marker: code,
                offset,
            }),
        }
    }

    /// Parses the next marker segment.
    pub fn next_segment(&mut self) -> Result<Segment> {
        let offset = self.br.offset();
        let marker = self.read_marker()?;
        trace!("marker {:?} at offset {}", marker, offset);
        let segment = match marker {
            Marker::SOI => {
                debug!("SOI found");
                Segment::StartOfImage
            }
            Marker::EOI => {
                debug!("EOI found");
                Segment::EndOfImage
            }
            Marker::APP0 => Segment::Jfif(JfifHeader::read(&mut self.br)?),
            Marker::DQT => {
                Segment::QuantizationTables(QuantizationTable::read_segment(&mut self.br)?)
            }
            Marker::SOF0 => Segment::Frame(FrameHeader::read(&mut self.br)?),
            Marker::DHT => Segment::HuffmanTables(self.read_huffman_tables()?),
            Marker::SOS => Segment::Scan(ScanHeader::read(&mut self.br)?),
            m if m.is_skippable() => {
                let length = self.br.read_u16()?;
                if length < 2 {
                    return Err(Error::InvalidSegmentLength {
                        marker: m as u8,
                        length,
                    });
                }
                debug!("{:?} found (length {} bytes), skipping", m, length);
                self.br.skip(length as usize - 2)?;
                Segment::Skipped { marker: m, length }
            }
            m => {
                return Err(Error::UnknownSegment {
                    marker: 0xff00 | m as u16,
                    offset,
                });
            }
        };
        Ok(segment)
    }

    fn read_huffman_tables(&mut self) -> Result<Vec<HuffmanTable>> {
        let length = self.br.read_u16()?;
        debug!("DHT found (length {} bytes)", length);
        if length <= 2 {
            return Err(Error::InvalidSegmentLength {
                marker: Marker::DHT as u8,
                length,
            });
        }
        let mut segment = self.br.split(length as usize - 2)?;
        let mut tables = Vec::new();
        while !segment.is_empty() {
            tables.push(HuffmanTable::read(&mut segment)?);
        }
        Ok(tables)
    }
}
