//! Raster format selection and detection

use crate::{IoError, IoResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// On-disk raster formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Raw dimensions header plus samples
    Bin,
    /// Binary portable graymap
    Pgm,
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Bin => "bin",
            OutputFormat::Pgm => "pgm",
        }
    }

    /// Map an interactive selector character (`b` or `p`) to a format.
    pub fn from_selector(selector: char) -> Option<Self> {
        match selector.to_ascii_lowercase() {
            'b' => Some(OutputFormat::Bin),
            'p' => Some(OutputFormat::Pgm),
            _ => None,
        }
    }

    /// Selector character accepted by [`OutputFormat::from_selector`].
    pub fn selector(self) -> char {
        match self {
            OutputFormat::Bin => 'b',
            OutputFormat::Pgm => 'p',
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = IoError;

    fn from_str(s: &str) -> IoResult<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_selector(c),
            _ => match s.trim().to_ascii_lowercase().as_str() {
                "bin" => Some(OutputFormat::Bin),
                "pgm" => Some(OutputFormat::Pgm),
                _ => None,
            },
        }
        .ok_or_else(|| IoError::UnsupportedFormat(s.to_string()))
    }
}

/// Detect the format of a raster file from its first bytes
///
/// Anything that does not start with the `P5` magic is treated as `bin`,
/// which carries no magic number of its own.
pub fn detect_format<P: AsRef<Path>>(path: P) -> IoResult<OutputFormat> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 2];
    let n = file.read(&mut header)?;
    Ok(detect_format_from_bytes(&header[..n]))
}

/// Detect the format from leading bytes.
pub fn detect_format_from_bytes(data: &[u8]) -> OutputFormat {
    if data.starts_with(b"P5") {
        OutputFormat::Pgm
    } else {
        OutputFormat::Bin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector() {
        assert_eq!(OutputFormat::from_selector('b'), Some(OutputFormat::Bin));
        assert_eq!(OutputFormat::from_selector('P'), Some(OutputFormat::Pgm));
        assert_eq!(OutputFormat::from_selector('x'), None);
        assert_eq!(OutputFormat::Pgm.selector(), 'p');
    }

    #[test]
    fn test_from_str() {
        assert_eq!("b".parse::<OutputFormat>().unwrap(), OutputFormat::Bin);
        assert_eq!("pgm".parse::<OutputFormat>().unwrap(), OutputFormat::Pgm);
        assert!("png".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_extension() {
        assert_eq!(OutputFormat::Bin.extension(), "bin");
        assert_eq!(OutputFormat::Pgm.extension(), "pgm");
    }

    #[test]
    fn test_detect_from_bytes() {
        assert_eq!(detect_format_from_bytes(b"P5 1 1 255 x"), OutputFormat::Pgm);
        assert_eq!(detect_format_from_bytes(&[4, 0, 0, 0]), OutputFormat::Bin);
        assert_eq!(detect_format_from_bytes(&[]), OutputFormat::Bin);
    }
}
