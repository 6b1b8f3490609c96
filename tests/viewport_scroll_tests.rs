//! Viewport and scroll coordinate tests
//!
//! Tests for verifying scroll clamping, the visible row window, scrollbar
//! reservation and the inverse transforms from stage pixels to cells.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use gridview::layout::{Bucket, GridMetrics, Viewport};
use gridview::GridConfig;
use test_case::test_case;

/// 10,000 rows of 30px with a 600px body and 5 buffer rows
fn ten_thousand_rows() -> Viewport {
    let metrics = GridMetrics {
        row_count: 10_000,
        row_height: 30.0,
        header_height: 40.0,
        summary_height: 0.0,
        scrollbar_thickness: 10.0,
        buffer_rows: 5,
        left_width: 0.0,
        center_width: 500.0,
        right_width: 0.0,
    };
    Viewport::new(metrics, 800.0, 640.0)
}

#[test]
fn test_body_height_excludes_header() {
    let vp = ten_thousand_rows();
    let frame = vp.frame();
    assert_eq!(frame.body_top, 40.0);
    assert_eq!(frame.body_height, 600.0);
    assert!(frame.vertical_bar);
    assert!(!frame.horizontal_bar);
    assert_eq!(frame.max_scroll_y, 300_000.0 - 600.0);
}

#[test_case(0.0 ; "top")]
#[test_case(12_345.0 ; "unaligned offset")]
#[test_case(150_000.0 ; "middle")]
#[test_case(299_000.0 ; "near the end")]
fn test_window_size_is_constant_away_from_the_end(scroll_y: f32) {
    let mut vp = ten_thousand_rows();
    let _ = vp.set_scroll_y(scroll_y);
    vp.calculate_visible_rows();
    // 20 rows on screen plus 5 buffer rows on each side
    assert_eq!(vp.visible_row_end - vp.visible_row_start, 30);
}

#[test]
fn test_window_is_clamped_at_the_last_row() {
    let mut vp = ten_thousand_rows();
    let _ = vp.set_scroll_y(f32::MAX);
    assert_eq!(vp.scroll_y, 299_400.0);
    let (start, end) = vp.calculate_visible_rows();
    assert_eq!(start, 9_975);
    assert_eq!(end, 10_000);
}

#[test]
fn test_window_contains_the_first_on_screen_row() {
    let mut vp = ten_thousand_rows();
    for y in [0.0, 29.0, 30.0, 4_500.5, 77_777.0, 299_400.0] {
        let _ = vp.set_scroll_y(y);
        let (first, _) = vp.on_screen_rows();
        assert!(vp.visible_row_start <= first, "start past first row at {y}");
        assert!(first < vp.visible_row_end, "end before first row at {y}");
        assert!(vp.visible_row_end <= 10_000);
    }
}

#[test_case(-50.0, 0.0 ; "negative clamps to zero")]
#[test_case(1.0e9, 299_466.0 ; "huge clamps to max")]
#[test_case(f32::NAN, 0.0 ; "nan is ignored")]
#[test_case(1_234.0, 1_234.0 ; "in range is kept")]
fn test_set_scroll_y_clamps(target: f32, expected: f32) {
    let mut vp = common::viewport(&GridConfig::default(), 10_000, 1000.0, 600.0);
    let _ = vp.set_scroll_y(target);
    assert_eq!(vp.scroll_y, expected);
}

#[test]
fn test_zero_delta_after_clamp_is_a_no_op() {
    let mut vp = common::viewport(&GridConfig::default(), 10_000, 1000.0, 600.0);
    let first = vp.update_vertical_scroll(1.0e9);
    assert!(first.moved);
    let clamped = vp.scroll_y;
    let second = vp.update_vertical_scroll(0.0);
    assert!(!second.moved);
    assert_eq!(vp.scroll_y, clamped);
}

#[test]
fn test_window_kept_while_on_screen_rows_fit() {
    let mut vp = common::viewport(&GridConfig::default(), 10_000, 1000.0, 600.0);
    // body 534px: 18 rows on screen, capacity 28
    assert_eq!(vp.window_capacity(), 28);
    assert_eq!((vp.visible_row_start, vp.visible_row_end), (0, 28));

    let change = vp.set_scroll_y(300.0);
    assert!(change.moved);
    assert!(!change.window_changed);
    assert_eq!((vp.visible_row_start, vp.visible_row_end), (0, 28));

    let change = vp.set_scroll_y(330.0);
    assert!(change.window_changed);
    assert_eq!((vp.visible_row_start, vp.visible_row_end), (6, 34));
}

#[test]
fn test_empty_dataset() {
    let vp = common::viewport(&GridConfig::default(), 0, 1000.0, 600.0);
    let frame = vp.frame();
    assert_eq!((vp.visible_row_start, vp.visible_row_end), (0, 0));
    assert_eq!(frame.max_scroll_y, 0.0);
    assert!(!frame.vertical_bar);
    assert_eq!(vp.row_at_y(100.0), None);
    assert_eq!(vp.on_screen_rows(), (0, 0));
}

#[test]
fn test_short_dataset_fits_without_scrolling() {
    let mut vp = common::viewport(&GridConfig::default(), 5, 1000.0, 600.0);
    assert_eq!((vp.visible_row_start, vp.visible_row_end), (0, 5));
    assert_eq!(vp.get_scroll_limits().max_scroll_y, 0.0);
    let change = vp.update_vertical_scroll(500.0);
    assert!(!change.moved);
    assert_eq!(vp.scroll_y, 0.0);
}

#[test]
fn test_scrollbars_reserve_space_only_when_present() {
    let config = GridConfig::default();

    let wide = common::viewport(&config, 10_000, 1000.0, 600.0);
    let frame = wide.frame();
    assert!(frame.vertical_bar);
    assert!(!frame.horizontal_bar);
    assert_eq!(frame.center_viewport_width, 1000.0 - 80.0 - 100.0 - 10.0);
    assert_eq!(frame.right_left, 890.0);
    assert_eq!(frame.body_height, 534.0);

    let narrow = common::viewport(&config, 10_000, 500.0, 600.0);
    let frame = narrow.frame();
    assert!(frame.horizontal_bar);
    assert_eq!(frame.center_viewport_width, 310.0);
    assert_eq!(frame.body_height, 524.0);
    assert_eq!(frame.max_scroll_x, 310.0);
}

#[test]
fn test_horizontal_bar_can_force_vertical_bar() {
    // 21 rows of 25px fit in 534px, but not in 524px once the horizontal bar appears
    let config = GridConfig {
        row_height: 25.0,
        ..GridConfig::default()
    };
    let vp = common::viewport(&config, 21, 500.0, 600.0);
    let frame = vp.frame();
    assert!(frame.horizontal_bar);
    assert!(frame.vertical_bar);
    assert_eq!(frame.max_scroll_y, 1.0);
}

#[test_case(35.9, None ; "header")]
#[test_case(36.0, Some(0) ; "first body pixel")]
#[test_case(65.9, Some(0) ; "bottom of first row")]
#[test_case(66.0, Some(1) ; "second row")]
#[test_case(569.9, Some(17) ; "last body pixel")]
#[test_case(570.0, None ; "summary row")]
fn test_row_at_y(y: f32, expected: Option<usize>) {
    let vp = common::viewport(&GridConfig::default(), 10_000, 1000.0, 600.0);
    assert_eq!(vp.row_at_y(y), expected);
}

#[test]
fn test_row_at_y_follows_scroll() {
    let mut vp = common::viewport(&GridConfig::default(), 10_000, 1000.0, 600.0);
    let _ = vp.set_scroll_y(300.0);
    assert_eq!(vp.row_at_y(51.0), Some(10));
}

#[test]
fn test_fixed_columns_ignore_horizontal_scroll() {
    let mut vp = common::viewport(&GridConfig::default(), 10_000, 500.0, 600.0);
    let columns = common::layout(&GridConfig::default());
    let _ = vp.set_scroll_x(150.0);
    assert_eq!(vp.scroll_x, 150.0);

    assert_eq!(vp.column_at_x(10.0, &columns), Some((Bucket::Left, 0)));
    // 80 + 0 lands 150px into the center content → product
    assert_eq!(vp.column_at_x(80.0, &columns), Some((Bucket::Center, 2)));
    assert_eq!(vp.column_at_x(400.0, &columns), Some((Bucket::Right, 5)));
    assert_eq!(vp.column_at_x(495.0, &columns), None);
}

#[test]
fn test_resize_reclamps_scroll() {
    let mut vp = common::viewport(&GridConfig::default(), 100, 1000.0, 600.0);
    let _ = vp.set_scroll_y(f32::MAX);
    assert_eq!(vp.scroll_y, 3000.0 - 534.0);

    vp.resize(1000.0, 1200.0);
    assert_eq!(vp.scroll_y, 3000.0 - 1134.0);
    assert_eq!(vp.visible_row_end, 100);
}

#[test]
fn test_reset_scroll() {
    let mut vp = common::viewport(&GridConfig::default(), 10_000, 500.0, 600.0);
    let _ = vp.set_scroll_x(100.0);
    let _ = vp.set_scroll_y(9_000.0);
    vp.reset_scroll();
    assert_eq!((vp.scroll_x, vp.scroll_y), (0.0, 0.0));
    assert_eq!(vp.visible_row_start, 0);
}
