// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::Result;
use jpegdec::DecoderOptions;
use jpegdec::idct::IdctMethod;
use jpegdec_cli::dec::decode_file;
use jpegdec_cli::enc::{PpmFormat, save_ppm};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Idct {
    /// Reference 64-term sum per sample
    Direct,
    /// Row/column passes
    Separable,
}

impl From<Idct> for IdctMethod {
    fn from(value: Idct) -> Self {
        match value {
            Idct::Direct => IdctMethod::Direct,
            Idct::Separable => IdctMethod::Separable,
        }
    }
}

#[derive(Parser)]
#[command(about = "Decodes a baseline JPEG file into a PPM image")]
struct Opt {
    /// Input JPEG file
    input: PathBuf,

    /// Output PPM file
    #[clap(short, long, default_value = "decodedimage.ppm")]
    output: PathBuf,

    /// Write binary P6 instead of plain-text P3
    #[clap(long)]
    binary: bool,

    /// Inverse DCT implementation
    #[clap(long, value_enum, default_value_t = Idct::Direct)]
    idct: Idct,

    /// Print decoding and writing times
    #[clap(long)]
    timing: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    #[cfg(feature = "tracing-subscriber")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(EnvFilter::from_default_env())
            .init();
    }

    let opt = Opt::parse();
    let options = DecoderOptions {
        idct: opt.idct.into(),
        ..Default::default()
    };

    let (image, decode_time) = decode_file(&opt.input, options)?;
    println!("Image size: {} x {}", image.width(), image.height());

    let format = if opt.binary {
        PpmFormat::Binary
    } else {
        PpmFormat::Plain
    };
    let write_time = save_ppm(&image, &opt.output, format)?;

    if opt.timing {
        println!(
            "Time taken by the JPEG decoder: {:.6} seconds",
            decode_time.as_secs_f64()
        );
        println!(
            "Time taken for writing the image: {:.6} seconds",
            write_time.as_secs_f64()
        );
    }
    Ok(())
}
