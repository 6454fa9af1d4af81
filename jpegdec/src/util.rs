// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub mod tracing_wrappers;

/// Rounds `value` up to the next multiple of `multiple`.
pub fn ceil_to_multiple(value: usize, multiple: usize) -> usize {
    value.div_ceil(multiple) * multiple
}

/// Computes `round(value * num / den)` with halves rounded up, in integers.
pub fn scale_rounded(value: usize, num: usize, den: usize) -> usize {
    (2 * value * num + den) / (2 * den)
}
