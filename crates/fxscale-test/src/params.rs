//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::{golden_dir, regout_dir};
use fxscale_core::Raster;
use fxscale_io::OutputFormat;
use std::fs;
use std::path::Path;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Generate golden files
    Generate,
    /// Compare with golden files (default)
    #[default]
    Compare,
    /// Display mode - run without comparison
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("REGTEST_MODE").unwrap_or_default())
    }

    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "generate" => Self::Generate,
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Tracks the test name, the running check index, the mode and every
/// recorded failure. Call [`RegParams::cleanup`] at the end of a test and
/// assert on its result.
pub struct RegParams {
    /// Name of the test (e.g., "scale")
    pub test_name: String,
    /// Current test index (incremented before each check)
    index: usize,
    /// Test mode (generate, compare, or display)
    pub mode: RegTestMode,
    success: bool,
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode is taken from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        let _ = fs::create_dir_all(golden_dir());
        let _ = fs::create_dir_all(regout_dir());

        eprintln!();
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Compare two floating-point values
    ///
    /// Returns `true` if `|expected - actual| <= delta`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta {
            self.fail(format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            ));
            false
        } else {
            true
        }
    }

    /// Compare two rasters for exact equality
    ///
    /// On mismatch the failure message names the first differing sample.
    pub fn compare_raster(&mut self, expected: &Raster, actual: &Raster) -> bool {
        self.index += 1;

        if expected.dimensions() != actual.dimensions() {
            self.fail(format!(
                "Failure in {}_reg: raster comparison for index {} - dimension mismatch \
                 ({:?} vs {:?})",
                self.test_name,
                self.index,
                expected.dimensions(),
                actual.dimensions()
            ));
            return false;
        }

        let mismatch = {
            let a = expected.read();
            let b = actual.read();
            (0..expected.height()).find_map(|row| {
                a.row(row)
                    .iter()
                    .zip(b.row(row))
                    .position(|(pa, pb)| pa != pb)
                    .map(|col| (row, col))
            })
        };

        match mismatch {
            Some((row, col)) => {
                self.fail(format!(
                    "Failure in {}_reg: raster comparison for index {} - sample mismatch \
                     at (row {}, col {})",
                    self.test_name, self.index, row, col
                ));
                false
            }
            None => true,
        }
    }

    /// Compare two byte arrays for exact equality
    pub fn compare_strings(&mut self, expected: &[u8], actual: &[u8]) -> bool {
        self.index += 1;

        if expected != actual {
            self.fail(format!(
                "Failure in {}_reg: string comparison for index {}\n\
                 sizes: {} vs {}",
                self.test_name,
                self.index,
                expected.len(),
                actual.len()
            ));
            false
        } else {
            true
        }
    }

    /// Write a raster to the regout directory and check it against its golden file
    pub fn write_raster_and_check(
        &mut self,
        raster: &Raster,
        format: OutputFormat,
    ) -> TestResult<()> {
        self.index += 1;

        let local_path = format!(
            "{}/{}.{:02}.{}",
            regout_dir(),
            self.test_name,
            self.index,
            format.extension()
        );

        fxscale_io::write_raster_file(raster, &local_path, format).map_err(|e| {
            TestError::RasterWrite {
                path: local_path.clone(),
                message: e.to_string(),
            }
        })?;

        self.check_file(&local_path)
    }

    /// Check a file against its golden counterpart
    ///
    /// In generate mode, copies the file to golden. In compare mode,
    /// compares with the golden file, creating it first if it does not
    /// exist yet. In display mode, does nothing.
    fn check_file(&mut self, local_path: &str) -> TestResult<()> {
        let ext = Path::new(local_path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        let golden_path = format!(
            "{}/{}_golden.{:02}.{}",
            golden_dir(),
            self.test_name,
            self.index,
            ext
        );

        match self.mode {
            RegTestMode::Generate => {
                fs::copy(local_path, &golden_path)?;
                eprintln!("Generated: {}", golden_path);
            }
            RegTestMode::Compare => {
                if !Path::new(&golden_path).exists() {
                    fs::copy(local_path, &golden_path)?;
                    eprintln!("Bootstrapped missing golden: {}", golden_path);
                    return Ok(());
                }

                let local_data = fs::read(local_path)?;
                let golden_data = fs::read(&golden_path)?;

                if local_data != golden_data && !self.same_raster_files(local_path, &golden_path)
                {
                    self.fail(format!(
                        "Failure in {}_reg, index {}: comparing {} with {}",
                        self.test_name, self.index, local_path, golden_path
                    ));
                }
            }
            RegTestMode::Display => {}
        }

        Ok(())
    }

    /// Compare two raster files sample by sample
    fn same_raster_files(&self, path1: &str, path2: &str) -> bool {
        let (Ok(a), Ok(b)) = (
            fxscale_io::read_raster_file(path1),
            fxscale_io::read_raster_file(path2),
        ) else {
            return false;
        };
        a.equals(&b)
    }

    /// Clean up and report results
    ///
    /// Returns `true` if all checks passed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!(RegTestMode::parse("generate"), RegTestMode::Generate);
        assert_eq!(RegTestMode::parse("DISPLAY"), RegTestMode::Display);
        assert_eq!(RegTestMode::parse(""), RegTestMode::Compare);
        assert_eq!(RegTestMode::parse("bogus"), RegTestMode::Compare);
    }

    #[test]
    fn test_compare_values_within_delta() {
        let mut rp = RegParams::new("params");
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
        assert_eq!(rp.index(), 1);
    }

    #[test]
    fn test_compare_values_failure() {
        let mut rp = RegParams::new("params");
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(!rp.is_success());
        assert_eq!(rp.failures().len(), 1);
    }

    #[test]
    fn test_compare_raster_reports_position() {
        let mut rp = RegParams::new("params");
        let a = Raster::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
        let b = Raster::from_vec(2, 2, vec![1, 2, 3, 5]).unwrap();
        assert!(rp.compare_raster(&a, &a.deep_clone()));
        assert!(!rp.compare_raster(&a, &b));
        assert!(rp.failures()[0].contains("(row 1, col 1)"));
    }

    #[test]
    fn test_compare_raster_dimension_mismatch() {
        let mut rp = RegParams::new("params");
        let a = Raster::new(2, 3).unwrap();
        let b = Raster::new(3, 2).unwrap();
        assert!(!rp.compare_raster(&a, &b));
        assert!(rp.failures()[0].contains("dimension mismatch"));
    }
}
