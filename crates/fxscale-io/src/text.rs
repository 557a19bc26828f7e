//! Bit-text dump of `bin` rasters
//!
//! Turns a `bin` file into a stimulus file for hardware test benches: the
//! 8-byte header is skipped and every following byte is written as an
//! 8-character binary string on its own line.

use crate::IoResult;
use crate::bin::BIN_HEADER_LEN;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Write every payload byte of a `bin` stream as `bbbbbbbb\n`.
///
/// Returns the number of samples written. A stream shorter than the header
/// produces no output.
pub fn textualize<R: Read, W: Write>(mut reader: R, mut writer: W) -> IoResult<u64> {
    let mut header = Vec::with_capacity(BIN_HEADER_LEN);
    (&mut reader)
        .take(BIN_HEADER_LEN as u64)
        .read_to_end(&mut header)?;

    let mut count = 0u64;
    let mut buf = [0u8; 4096];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        for byte in &buf[..n] {
            writeln!(writer, "{:08b}", byte)?;
        }
        count += n as u64;
    }
    writer.flush()?;
    Ok(count)
}

/// Textualize the `bin` file at `input` into `output`.
pub fn textualize_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> IoResult<u64> {
    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);
    let count = textualize(reader, writer)?;
    log::debug!("textualized {} samples", count);
    Ok(count)
}
