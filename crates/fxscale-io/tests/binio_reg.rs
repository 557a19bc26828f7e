//! bin format regression test
//!
//! - file round trip reproduces width, height and every sample
//! - views are written as their own rectangle
//! - truncated files are rejected without producing a raster

use fxscale_core::Raster;
use fxscale_io::{IoError, OutputFormat, read_bin_file, read_raster_file, write_bin_file};
use fxscale_test::{RegParams, gradient_raster, load_test_raster, ramp_raster, regout_dir};
use std::fs;

#[test]
fn binio_reg() {
    let mut rp = RegParams::new("binio");
    let outdir = regout_dir();
    fs::create_dir_all(&outdir).expect("create regout dir");

    // Test 1-3: file round trip
    let src = gradient_raster(37, 53).expect("gradient");
    let path = format!("{}/binio_gradient.bin", outdir);
    write_bin_file(&src, &path).expect("write bin");
    let back = read_bin_file(&path).expect("read bin");
    rp.compare_values(37.0, back.height() as f64, 0.0);
    rp.compare_values(53.0, back.width() as f64, 0.0);
    rp.compare_raster(&src, &back);

    // Test 4: file size is header plus samples
    let size = fs::metadata(&path).expect("metadata").len();
    rp.compare_values((8 + 37 * 53) as f64, size as f64, 0.0);

    // Test 5: golden check
    rp.write_raster_and_check(&src, OutputFormat::Bin)
        .expect("write and check");

    assert!(rp.cleanup(), "binio regression test failed");
}

#[test]
fn binio_asset_reg() {
    let mut rp = RegParams::new("binio_asset");

    let r = load_test_raster("ramp16x12.bin").expect("load asset");
    rp.compare_values(12.0, r.height() as f64, 0.0);
    rp.compare_values(16.0, r.width() as f64, 0.0);
    rp.compare_values(4.0, r.get(0, 1).unwrap() as f64, 0.0);
    rp.compare_values(252.0, r.get(3, 15).unwrap() as f64, 0.0);
    rp.compare_values(0.0, r.get(4, 0).unwrap() as f64, 0.0);

    assert!(rp.cleanup(), "binio asset regression test failed");
}

#[test]
fn binio_view_reg() {
    let mut rp = RegParams::new("binio_view");
    let outdir = regout_dir();
    fs::create_dir_all(&outdir).expect("create regout dir");

    let parent = ramp_raster(6, 6).expect("ramp");
    let crop = parent.view(2, 1, 3, 4).expect("view");
    let path = format!("{}/binio_view.bin", outdir);
    write_bin_file(&crop, &path).expect("write view");

    let back = read_raster_file(&path).expect("read view back");
    let expected =
        Raster::from_rows(&[[21u8, 22, 23, 24], [31, 32, 33, 34], [41, 42, 43, 44]]).unwrap();
    rp.compare_raster(&expected, &back);
    rp.compare_values(0.0, back.is_view() as u8 as f64, 0.0);

    assert!(rp.cleanup(), "binio view regression test failed");
}

#[test]
fn binio_truncated_reg() {
    let outdir = regout_dir();
    fs::create_dir_all(&outdir).expect("create regout dir");

    let src = ramp_raster(4, 4).expect("ramp");
    let path = format!("{}/binio_truncated.bin", outdir);
    write_bin_file(&src, &path).expect("write");
    let bytes = fs::read(&path).expect("read bytes");
    fs::write(&path, &bytes[..bytes.len() - 3]).expect("truncate");

    let err = read_bin_file(&path).expect_err("truncated file must fail");
    assert!(matches!(err, IoError::InvalidData(_)), "got {err:?}");

    let missing = format!("{}/binio_does_not_exist.bin", outdir);
    let err = read_bin_file(&missing).expect_err("missing file must fail");
    assert!(matches!(err, IoError::Io(_)), "got {err:?}");
}
