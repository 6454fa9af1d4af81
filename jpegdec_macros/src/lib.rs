// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use proc_macro::TokenStream;

/// Attribute that leaves the annotated item untouched.
///
/// Used in place of `tracing::instrument` when the `tracing` feature is disabled.
#[proc_macro_attribute]
pub fn noop(_attr: TokenStream, item: TokenStream) -> TokenStream {
    item
}
