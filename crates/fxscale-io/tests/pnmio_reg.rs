//! PGM and bit-text regression test
//!
//! - PGM file round trip
//! - format detection picks PGM vs bin from leading bytes
//! - bit-text dump of a bin file

use fxscale_io::{
    OutputFormat, detect_format, read_raster_file, textualize_file, write_raster_file,
};
use fxscale_test::{RegParams, checker_raster, regout_dir};
use std::fs;

#[test]
fn pnmio_reg() {
    let mut rp = RegParams::new("pnmio");
    let outdir = regout_dir();
    fs::create_dir_all(&outdir).expect("create regout dir");

    let src = checker_raster(20, 30, 4).expect("checker");
    let path = format!("{}/pnmio_checker.pgm", outdir);
    write_raster_file(&src, &path, OutputFormat::Pgm).expect("write pgm");

    // Test 1: header text
    let bytes = fs::read(&path).expect("read bytes");
    rp.compare_strings(b"P5 30 20 255 ", &bytes[..13]);

    // Test 2: detection
    let detected = detect_format(&path).expect("detect");
    rp.compare_values(1.0, (detected == OutputFormat::Pgm) as u8 as f64, 0.0);

    // Test 3: round trip
    let back = read_raster_file(&path).expect("read pgm");
    rp.compare_raster(&src, &back);

    // Test 4: golden check
    rp.write_raster_and_check(&src, OutputFormat::Pgm)
        .expect("write and check");

    assert!(rp.cleanup(), "pnmio regression test failed");
}

#[test]
fn textualize_reg() {
    let mut rp = RegParams::new("textualize");
    let outdir = regout_dir();
    fs::create_dir_all(&outdir).expect("create regout dir");

    let src = checker_raster(2, 2, 1).expect("checker");
    let bin_path = format!("{}/textualize_in.bin", outdir);
    let txt_path = format!("{}/textualize_out.txt", outdir);
    write_raster_file(&src, &bin_path, OutputFormat::Bin).expect("write bin");

    let count = textualize_file(&bin_path, &txt_path).expect("textualize");
    rp.compare_values(4.0, count as f64, 0.0);

    let text = fs::read(&txt_path).expect("read text");
    rp.compare_strings(b"00000000\n11111111\n11111111\n00000000\n", &text);

    assert!(rp.cleanup(), "textualize regression test failed");
}
