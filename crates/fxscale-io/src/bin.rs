//! Raw `bin` raster format
//!
//! Layout: a native-endian `u32` width, a native-endian `u32` height, then
//! `height` rows of `width` 8-bit samples with no padding.
//!
//! Readers consume the whole payload before building a [`Raster`], so a
//! truncated file never yields a partially filled raster.

use crate::{IoError, IoResult};
use fxscale_core::Raster;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Size of the `bin` header in bytes.
pub const BIN_HEADER_LEN: usize = 8;

/// Parse the `(width, height)` header of a `bin` file.
pub fn parse_bin_header(header: &[u8; BIN_HEADER_LEN]) -> (u32, u32) {
    let width = u32::from_ne_bytes([header[0], header[1], header[2], header[3]]);
    let height = u32::from_ne_bytes([header[4], header[5], header[6], header[7]]);
    (width, height)
}

/// Read a `bin` raster from a reader.
///
/// # Errors
///
/// Returns [`IoError::InvalidData`] if the header is truncated, a dimension
/// is zero, or fewer than `width * height` samples follow the header.
pub fn read_bin<R: Read>(mut reader: R) -> IoResult<Raster> {
    let mut header = [0u8; BIN_HEADER_LEN];
    reader.read_exact(&mut header).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => {
            IoError::InvalidData("truncated bin header".to_string())
        }
        _ => IoError::Io(e),
    })?;
    let (width, height) = parse_bin_header(&header);
    if width == 0 || height == 0 {
        return Err(IoError::InvalidData(format!(
            "bin header declares empty raster {}x{}",
            width, height
        )));
    }

    let expected = u64::from(width) * u64::from(height);
    let mut data = Vec::new();
    reader.take(expected).read_to_end(&mut data)?;
    if data.len() as u64 != expected {
        return Err(IoError::InvalidData(format!(
            "bin payload holds {} samples, {}x{} raster needs {}",
            data.len(),
            height,
            width,
            expected
        )));
    }
    log::trace!("read bin raster {}x{}", height, width);
    Ok(Raster::from_vec(height, width, data)?)
}

/// Write a raster in `bin` format to a writer.
pub fn write_bin<W: Write>(raster: &Raster, mut writer: W) -> IoResult<()> {
    writer.write_all(&raster.width().to_ne_bytes())?;
    writer.write_all(&raster.height().to_ne_bytes())?;
    let guard = raster.read();
    for row in guard.rows() {
        writer.write_all(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a `bin` raster from a file.
pub fn read_bin_file<P: AsRef<Path>>(path: P) -> IoResult<Raster> {
    let file = File::open(path)?;
    read_bin(BufReader::new(file))
}

/// Write a raster to a file in `bin` format.
pub fn write_bin_file<P: AsRef<Path>>(raster: &Raster, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    write_bin(raster, BufWriter::new(file))
}
