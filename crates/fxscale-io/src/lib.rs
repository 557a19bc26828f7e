//! fxscale-io - Raster file formats
//!
//! Supported formats:
//!
//! - `bin`: native-endian `u32` width and height followed by raw samples
//! - PGM (P5) with the `pnm` feature
//! - bit-text stimulus dump of `bin` files with the `text` feature
//!
//! All readers build the raster only after the full payload was read.

pub mod bin;
mod error;
pub mod format;
#[cfg(feature = "pnm")]
pub mod pnm;
#[cfg(feature = "text")]
pub mod text;

pub use bin::{read_bin, read_bin_file, write_bin, write_bin_file};
pub use error::{IoError, IoResult};
pub use format::{OutputFormat, detect_format, detect_format_from_bytes};
#[cfg(feature = "pnm")]
pub use pnm::{read_pgm, write_pgm};
#[cfg(feature = "text")]
pub use text::{textualize, textualize_file};

use fxscale_core::Raster;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Write a raster in the given format to a writer.
pub fn write_raster<W: Write>(raster: &Raster, writer: W, format: OutputFormat) -> IoResult<()> {
    match format {
        OutputFormat::Bin => write_bin(raster, writer),
        #[cfg(feature = "pnm")]
        OutputFormat::Pgm => write_pgm(raster, writer),
        #[cfg(not(feature = "pnm"))]
        OutputFormat::Pgm => Err(IoError::UnsupportedFormat(
            "PGM support not enabled (feature \"pnm\")".to_string(),
        )),
    }
}

/// Read a raster of the given format from a buffered reader.
pub fn read_raster<R: BufRead>(reader: R, format: OutputFormat) -> IoResult<Raster> {
    match format {
        OutputFormat::Bin => read_bin(reader),
        #[cfg(feature = "pnm")]
        OutputFormat::Pgm => read_pgm(reader),
        #[cfg(not(feature = "pnm"))]
        OutputFormat::Pgm => {
            drop(reader);
            Err(IoError::UnsupportedFormat(
                "PGM support not enabled (feature \"pnm\")".to_string(),
            ))
        }
    }
}

/// Write a raster to a file in the given format.
pub fn write_raster_file<P: AsRef<Path>>(
    raster: &Raster,
    path: P,
    format: OutputFormat,
) -> IoResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_raster(raster, BufWriter::new(file), format)?;
    log::debug!(
        "wrote {}x{} raster to {}",
        raster.height(),
        raster.width(),
        path.display()
    );
    Ok(())
}

/// Read a raster file, detecting its format from the leading bytes.
pub fn read_raster_file<P: AsRef<Path>>(path: P) -> IoResult<Raster> {
    let path = path.as_ref();
    let format = detect_format(path)?;
    let raster = read_raster(BufReader::new(File::open(path)?), format)?;
    log::debug!(
        "read {}x{} {} raster from {}",
        raster.height(),
        raster.width(),
        format.extension(),
        path.display()
    );
    Ok(raster)
}
