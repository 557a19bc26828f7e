//! fxscale-test - Regression test framework for fxscale
//!
//! This crate provides a small regression harness supporting three modes:
//!
//! - **Generate**: Create golden files for comparison
//! - **Compare**: Compare results with golden files
//! - **Display**: Run tests without comparison (visual inspection)
//!
//! It also provides deterministic synthetic rasters so tests do not depend
//! on binary image assets.
//!
//! # Usage
//!
//! ```ignore
//! use fxscale_test::{RegParams, ramp_raster};
//!
//! let mut rp = RegParams::new("scale");
//! let src = ramp_raster(4, 4).unwrap();
//! rp.compare_values(4.0, src.height() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"

mod error;
mod fixtures;
mod params;

pub use error::{TestError, TestResult};
pub use fixtures::{checker_raster, gradient_raster, ramp_raster};
pub use params::{RegParams, RegTestMode};

/// Load a test raster (bin format) from the test data directory
///
/// # Arguments
///
/// * `name` - File name (e.g., "ramp16x12.bin")
pub fn load_test_raster(name: &str) -> TestResult<fxscale_core::Raster> {
    let path = test_data_path(name);
    fxscale_io::read_bin_file(&path).map_err(|e| TestError::RasterLoad {
        path: path.clone(),
        message: e.to_string(),
    })
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // fxscale-test is at crates/fxscale-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to a test data file
pub fn test_data_path(name: &str) -> String {
    format!("{}/tests/data/rasters/{}", workspace_root(), name)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
