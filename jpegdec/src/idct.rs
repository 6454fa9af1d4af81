// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! 8x8 inverse DCT with level shift.
//!
//! Both methods compute
//! `f(x, y) = 1/4 * sum_u sum_v C(u) C(v) F(v, u) cos((2x+1)u pi/16) cos((2y+1)v pi/16) + 128`
//! with `C(0) = 1/sqrt(2)` and `C(k) = 1` otherwise. Results are not clamped.

use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::sync::LazyLock;

use crate::{BLOCK_DIM, BLOCK_SIZE};

const LEVEL_SHIFT: f64 = 128.0;

/// How the inverse transform of each block is evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdctMethod {
    /// Full 64-term sum for every output sample.
    #[default]
    Direct,
    /// One-dimensional transforms over rows, then columns.
    Separable,
}

impl IdctMethod {
    pub fn transform(self, coefficients: &[i32; BLOCK_SIZE]) -> [f32; BLOCK_SIZE] {
        match self {
            IdctMethod::Direct => idct_direct(coefficients),
            IdctMethod::Separable => idct_separable(coefficients),
        }
    }
}

#[inline(always)]
fn alpha(u: usize) -> f64 {
    if u == 0 { FRAC_1_SQRT_2 } else { 1.0 }
}

// BASIS[k][n] = C(k) * cos((2n + 1) k pi / 16)
static BASIS: LazyLock<[[f64; BLOCK_DIM]; BLOCK_DIM]> = LazyLock::new(|| {
    array_init::array_init(|k| {
        array_init::array_init(|n| {
            alpha(k) * ((2 * n + 1) as f64 * k as f64 * PI / (2 * BLOCK_DIM) as f64).cos()
        })
    })
});

/// Evaluates the 2D sum directly. `coefficients` are dequantized, in natural
/// order (`v * 8 + u`); the result is row-major (`y * 8 + x`).
pub fn idct_direct(coefficients: &[i32; BLOCK_SIZE]) -> [f32; BLOCK_SIZE] {
    let basis = &*BASIS;
    let mut out = [0.0f32; BLOCK_SIZE];
    for y in 0..BLOCK_DIM {
        for x in 0..BLOCK_DIM {
            let mut sum = 0.0f64;
            for v in 0..BLOCK_DIM {
                for u in 0..BLOCK_DIM {
                    let c = coefficients[v * BLOCK_DIM + u];
                    if c != 0 {
                        sum += c as f64 * basis[u][x] * basis[v][y];
                    }
                }
            }
            out[y * BLOCK_DIM + x] = (0.25 * sum + LEVEL_SHIFT) as f32;
        }
    }
    out
}

/// Same result as [`idct_direct`], computed as two passes of 1D transforms.
pub fn idct_separable(coefficients: &[i32; BLOCK_SIZE]) -> [f32; BLOCK_SIZE] {
    let basis = &*BASIS;
    // Horizontal pass: rows[v][x] = sum_u F(v, u) * basis[u][x].
    let mut rows = [[0.0f64; BLOCK_DIM]; BLOCK_DIM];
    for (v, row) in rows.iter_mut().enumerate() {
        let input = &coefficients[v * BLOCK_DIM..(v + 1) * BLOCK_DIM];
        if input.iter().all(|&c| c == 0) {
            continue;
        }
        for (x, value) in row.iter_mut().enumerate() {
            *value = input
                .iter()
                .enumerate()
                .map(|(u, &c)| c as f64 * basis[u][x])
                .sum();
        }
    }
    let mut out = [0.0f32; BLOCK_SIZE];
    for y in 0..BLOCK_DIM {
        for x in 0..BLOCK_DIM {
            let sum: f64 = (0..BLOCK_DIM).map(|v| rows[v][x] * basis[v][y]).sum();
            out[y * BLOCK_DIM + x] = (0.25 * sum + LEVEL_SHIFT) as f32;
        }
    }
    out
}
