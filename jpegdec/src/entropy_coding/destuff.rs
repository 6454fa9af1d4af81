// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::error::{Error, Result};
use crate::headers::markers::Marker;
use crate::util::tracing_wrappers::*;

/// Entropy-coded scan data with byte stuffing removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntropyCodedData {
    /// Scan bytes with every `ff 00` pair replaced by a single `ff`.
    pub data: Vec<u8>,
    /// Number of bytes the scan occupied in the file, stuffing included.
    pub stuffed_len: usize,
    /// Offset of the `ff d9` marker that terminates the scan.
    pub eoi_offset: usize,
}

impl EntropyCodedData {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Copies the entropy-coded bytes starting at `start` into a stuffing-free buffer.
///
/// Scanning stops at the EOI marker. Any other marker inside the scan is an error,
/// as is reaching the end of `data` before EOI.
#[instrument(level = "debug", skip(data), err)]
pub fn destuff(data: &[u8], start: usize) -> Result<EntropyCodedData> {
    let scan = data.get(start..).ok_or(Error::FileTruncated)?;
    let mut out = Vec::new();
    out.try_reserve(scan.len())?;

    let mut pos = 0;
    while pos < scan.len() {
        let byte = scan[pos];
        if byte != 0xff {
            out.push(byte);
            pos += 1;
            continue;
        }
        let Some(&next) = scan.get(pos + 1) else {
            break;
        };
        match next {
            0x00 => {
                out.push(0xff);
                pos += 2;
            }
            m if m == Marker::EOI as u8 => {
                debug!(
                    "{} bytes with stuffing, {} data bytes without stuffing",
                    pos,
                    out.len()
                );
                return Ok(EntropyCodedData {
                    data: out,
                    stuffed_len: pos,
                    eoi_offset: start + pos,
                });
            }
            m => return Err(Error::UnexpectedMarker(m)),
        }
    }
    Err(Error::MissingEoi)
}
