// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub use tracing::{debug, info, instrument, trace, warn};

#[cfg(not(feature = "tracing"))]
#[allow(unused_imports)]
pub use jpegdec_macros::noop as instrument;

// Without the `tracing` feature the arguments are still type-checked, but never formatted.
#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($arg:tt)+) => {
        if false {
            let _ = format_args!($($arg)+);
        }
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! info {
    ($($arg:tt)+) => {
        if false {
            let _ = format_args!($($arg)+);
        }
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($arg:tt)+) => {
        if false {
            let _ = format_args!($($arg)+);
        }
    };
}

// `warn` alone would be ambiguous with the built-in lint attribute.
#[cfg(not(feature = "tracing"))]
macro_rules! warn_ {
    ($($arg:tt)+) => {
        if false {
            let _ = format_args!($($arg)+);
        }
    };
}

#[cfg(not(feature = "tracing"))]
#[allow(unused_imports)]
pub(crate) use {debug, info, trace, warn_ as warn};
