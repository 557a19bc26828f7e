//! PGM (P5) support
//!
//! Writes the binary graymap variant with a single-line header
//! `"P5 <width> <height> 255 "` followed by raw samples. The reader accepts
//! any whitespace layout and `#` comments in the header, but only 8-bit
//! (maxval 255) graymaps.

use crate::{IoError, IoResult};
use fxscale_core::Raster;
use std::io::{BufRead, Read, Write};

/// Write a raster as binary PGM to a writer.
pub fn write_pgm<W: Write>(raster: &Raster, mut writer: W) -> IoResult<()> {
    write!(writer, "P5 {} {} 255 ", raster.width(), raster.height())?;
    let guard = raster.read();
    for row in guard.rows() {
        writer.write_all(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a binary PGM (P5) raster from a buffered reader.
///
/// # Errors
///
/// Returns [`IoError::InvalidData`] for a bad magic number, a malformed or
/// non-8-bit header, or a truncated sample payload.
pub fn read_pgm<R: BufRead>(mut reader: R) -> IoResult<Raster> {
    let magic = read_token(&mut reader)?;
    if magic != "P5" {
        return Err(IoError::InvalidData(format!(
            "expected P5 magic, found {:?}",
            magic
        )));
    }
    let width = read_number(&mut reader, "width")?;
    let height = read_number(&mut reader, "height")?;
    let maxval = read_number(&mut reader, "maxval")?;
    if maxval != 255 {
        return Err(IoError::UnsupportedFormat(format!(
            "PGM maxval {} (only 255 is supported)",
            maxval
        )));
    }
    if width == 0 || height == 0 {
        return Err(IoError::InvalidData(format!(
            "PGM header declares empty raster {}x{}",
            width, height
        )));
    }

    let expected = u64::from(width) * u64::from(height);
    let mut data = Vec::new();
    reader.take(expected).read_to_end(&mut data)?;
    if data.len() as u64 != expected {
        return Err(IoError::InvalidData(format!(
            "PGM payload holds {} samples, expected {}",
            data.len(),
            expected
        )));
    }
    Ok(Raster::from_vec(height, width, data)?)
}

/// Read one whitespace-delimited header token, skipping comments.
///
/// Consumes exactly one whitespace byte after the token, as PNM requires
/// before the sample payload.
fn read_token<R: BufRead>(reader: &mut R) -> IoResult<String> {
    let mut token = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if reader.read(&mut byte)? == 0 {
            if token.is_empty() {
                return Err(IoError::InvalidData("truncated PGM header".to_string()));
            }
            break;
        }
        let b = byte[0];
        if b == b'#' && token.is_empty() {
            let mut comment = Vec::new();
            reader.read_until(b'\n', &mut comment)?;
            continue;
        }
        if b.is_ascii_whitespace() {
            if token.is_empty() {
                continue;
            }
            break;
        }
        token.push(b);
        if token.len() > 16 {
            return Err(IoError::InvalidData("oversized PGM header token".to_string()));
        }
    }
    String::from_utf8(token).map_err(|_| IoError::InvalidData("non-ASCII PGM header".to_string()))
}

fn read_number<R: BufRead>(reader: &mut R, field: &str) -> IoResult<u32> {
    let token = read_token(reader)?;
    token
        .parse()
        .map_err(|_| IoError::InvalidData(format!("bad PGM {}: {:?}", field, token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_pgm_header_exact() {
        let r = Raster::from_vec(2, 3, vec![0, 1, 2, 3, 4, 5]).unwrap();
        let mut buf = Vec::new();
        write_pgm(&r, &mut buf).unwrap();
        assert!(buf.starts_with(b"P5 3 2 255 "));
        assert_eq!(&buf[11..], &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_pgm_read_written() {
        let r = Raster::from_vec(2, 2, vec![32, 10, 200, 255]).unwrap();
        let mut buf = Vec::new();
        write_pgm(&r, &mut buf).unwrap();
        let back = read_pgm(Cursor::new(buf)).unwrap();
        assert!(back.equals(&r));
    }

    #[test]
    fn test_pgm_read_with_comment_and_newlines() {
        let mut data = b"P5\n# made by hand\n2 1\n255\n".to_vec();
        data.extend_from_slice(&[7, 9]);
        let r = read_pgm(Cursor::new(data)).unwrap();
        assert_eq!(r.dimensions(), (1, 2));
        assert_eq!(r.to_vec(), vec![7, 9]);
    }

    #[test]
    fn test_pgm_first_sample_is_whitespace_byte() {
        let mut data = b"P5 1 1 255 ".to_vec();
        data.push(b' ');
        let r = read_pgm(Cursor::new(data)).unwrap();
        assert_eq!(r.get(0, 0), Some(b' '));
    }

    #[test]
    fn test_pgm_rejects_other_magic() {
        let err = read_pgm(Cursor::new(b"P6 1 1 255 abc".to_vec())).unwrap_err();
        assert!(matches!(err, IoError::InvalidData(_)));
    }

    #[test]
    fn test_pgm_rejects_16bit() {
        let err = read_pgm(Cursor::new(b"P5 1 1 65535 ab".to_vec())).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_pgm_truncated() {
        let err = read_pgm(Cursor::new(b"P5 4 4 255 abc".to_vec())).unwrap_err();
        assert!(matches!(err, IoError::InvalidData(_)));
    }
}
