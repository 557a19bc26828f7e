//! Raster view regression test
//!
//! - views alias their parent: edits are visible in both directions
//! - crop rectangles built from corner pairs
//! - out-of-range crops are rejected
//! - a view outlives the handle it was created from

use fxscale_core::{Error, Raster, Rect};
use fxscale_test::{RegParams, ramp_raster};

#[test]
fn view_reg() {
    let mut rp = RegParams::new("view");

    let parent = ramp_raster(8, 8).expect("ramp");
    let rect = Rect::from_corners(2, 3, 5, 6).expect("corners");
    let crop = parent.view_rect(&rect).expect("view");

    // Test 1-2: extent from inclusive corners
    rp.compare_values(4.0, crop.height() as f64, 0.0);
    rp.compare_values(4.0, crop.width() as f64, 0.0);

    // Test 3: upper-left sample is (row 3, col 2)
    rp.compare_values(32.0, crop.get(0, 0).unwrap() as f64, 0.0);

    // Test 4: parent edit seen through view
    parent.set(4, 3, 250).expect("set parent");
    rp.compare_values(250.0, crop.get(1, 1).unwrap() as f64, 0.0);

    // Test 5: view edit seen through parent
    crop.set(3, 3, 7).expect("set view");
    rp.compare_values(7.0, parent.get(6, 5).unwrap() as f64, 0.0);

    // Test 6: edits outside the rectangle do not leak in
    parent.set(0, 0, 99).expect("set outside");
    let expected = Raster::from_rows(&[
        [32u8, 33, 34, 35],
        [42, 250, 44, 45],
        [52, 53, 54, 55],
        [62, 63, 64, 7],
    ])
    .unwrap();
    rp.compare_raster(&expected, &crop);

    assert!(rp.cleanup(), "view regression test failed");
}

#[test]
fn view_bounds_reg() {
    let parent = ramp_raster(4, 6).expect("ramp");

    assert!(parent.view(0, 0, 4, 6).is_ok());
    assert!(matches!(
        parent.view(1, 0, 4, 6),
        Err(Error::OutOfBounds { .. })
    ));
    assert!(matches!(
        parent.view(0, 3, 1, 4),
        Err(Error::OutOfBounds { .. })
    ));
    assert!(matches!(
        parent.view(u32::MAX, 0, 1, 1),
        Err(Error::OutOfBounds { .. })
    ));

    let beyond = Rect::from_corners(0, 0, 6, 3).expect("corners");
    assert!(parent.view_rect(&beyond).is_err());

    assert!(Rect::from_corners(3, 3, 3, 5).is_err());
    assert!(Rect::from_corners(3, 5, 4, 2).is_err());
}

#[test]
fn view_lifetime_reg() {
    let mut rp = RegParams::new("view_lifetime");

    let crop = {
        let parent = ramp_raster(5, 5).expect("ramp");
        parent.view(1, 1, 2, 2).expect("view")
    };
    rp.compare_values(1.0, crop.ref_count() as f64, 0.0);
    rp.compare_values(11.0, crop.get(0, 0).unwrap() as f64, 0.0);

    let copy = crop.deep_clone();
    rp.compare_values(0.0, copy.shares_storage_with(&crop) as u8 as f64, 0.0);
    rp.compare_raster(&crop, &copy);

    assert!(rp.cleanup(), "view lifetime regression test failed");
}
