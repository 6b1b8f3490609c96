//! Shape pool tests
//!
//! Slot reuse as the row window slides, and a bounded shape count over a
//! long scroll through a real grid.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

mod common;

use std::collections::BTreeSet;

use gridview::render::{palette, Band, CellKey, CellPaint, PoolStats, Rect, Scene, ShapeKind, ShapePool};
use gridview::Align;

const COLS: usize = 2;

fn window(rows: std::ops::Range<usize>) -> Vec<CellKey> {
    rows.flat_map(|row| {
        (0..COLS).map(move |col_slot| CellKey {
            row: Some(row),
            col_slot,
            col: col_slot,
        })
    })
    .collect()
}

fn paint(key: &CellKey) -> CellPaint {
    let row = key.row.unwrap_or(0);
    CellPaint {
        rect: Rect::new(key.col_slot as f32 * 100.0, row as f32 * 30.0, 100.0, 30.0),
        fill: palette::WHITE.to_string(),
        stroke: None,
        text: format!("r{row}c{}", key.col),
        text_color: palette::BODY_TEXT.to_string(),
        align: Align::Left,
    }
}

fn assign(pool: &mut ShapePool, scene: &mut Scene, rows: std::ops::Range<usize>, generation: u64) -> PoolStats {
    pool.assign(scene, window(rows), generation, paint)
}

#[test]
fn test_first_assignment_allocates_every_slot() {
    let mut scene = Scene::new();
    let mut pool = ShapePool::new(10, COLS);
    let stats = assign(&mut pool, &mut scene, 0..10, 0);
    assert_eq!(stats.allocated, 20);
    assert_eq!(stats.repainted, 20);
    assert_eq!(stats.reused, 0);
    assert_eq!(stats.hidden, 0);
    // One background and one label per slot
    assert_eq!(scene.len(), 40);
    assert_eq!(scene.visible().count(), 40);
}

#[test]
fn test_sliding_window_repaints_only_entering_rows() {
    let mut scene = Scene::new();
    let mut pool = ShapePool::new(10, COLS);
    assign(&mut pool, &mut scene, 0..10, 0);

    let stats = assign(&mut pool, &mut scene, 3..13, 0);
    assert_eq!(stats.allocated, 0);
    assert_eq!(stats.repainted, 6);
    assert_eq!(stats.reused, 14);
    assert_eq!(stats.hidden, 0);
    assert_eq!(scene.len(), 40);
}

#[test]
fn test_shrinking_window_hides_unused_slots() {
    let mut scene = Scene::new();
    let mut pool = ShapePool::new(10, COLS);
    assign(&mut pool, &mut scene, 0..10, 0);

    let stats = assign(&mut pool, &mut scene, 0..4, 0);
    assert_eq!(stats.reused, 8);
    assert_eq!(stats.hidden, 12);
    assert_eq!(scene.visible().count(), 16);
    assert_eq!(scene.len(), 40);

    // Growing back repaints the hidden slots without allocating
    let stats = assign(&mut pool, &mut scene, 0..10, 0);
    assert_eq!(stats.allocated, 0);
    assert_eq!(stats.repainted, 12);
}

#[test]
fn test_new_generation_repaints_everything() {
    let mut scene = Scene::new();
    let mut pool = ShapePool::new(10, COLS);
    assign(&mut pool, &mut scene, 0..10, 0);
    let stats = assign(&mut pool, &mut scene, 0..10, 1);
    assert_eq!(stats.repainted, 20);
    assert_eq!(stats.reused, 0);
}

#[test]
fn test_only_backgrounds_carry_row_and_column_tags() {
    let mut scene = Scene::new();
    let mut pool = ShapePool::new(4, COLS);
    assign(&mut pool, &mut scene, 2..6, 0);

    for (_, shape) in scene.visible() {
        match shape.kind {
            ShapeKind::Rect => {
                let row = shape.row.unwrap();
                assert!((2..6).contains(&row));
                assert_eq!(shape.rect.y, row as f32 * 30.0);
                assert!(shape.col.is_some());
            }
            ShapeKind::Text => {
                assert_eq!(shape.row, None);
                assert!(shape.text.starts_with('r'));
            }
        }
    }
}

#[test]
fn test_reshape_drops_bindings_but_keeps_shapes() {
    let mut scene = Scene::new();
    let mut pool = ShapePool::new(10, COLS);
    assign(&mut pool, &mut scene, 0..10, 0);
    pool.reshape(5, COLS);
    assert_eq!(pool.ring_rows(), 5);

    let stats = assign(&mut pool, &mut scene, 0..5, 0);
    assert_eq!(stats.allocated, 0);
    assert_eq!(stats.repainted, 10);
    assert_eq!(stats.hidden, 10);
    assert_eq!(scene.len(), 40);
}

#[test]
fn test_long_scroll_keeps_shape_count_constant() {
    let mut grid = common::grid(10_000);
    let initial = grid.pipeline().shape_count();
    assert!(initial > 0);

    let max = grid.viewport().get_scroll_limits().max_scroll_y;
    let mut y = 0.0;
    while y < max {
        y += 97.0;
        grid.set_scroll(0.0, y).unwrap();
        assert_eq!(grid.pipeline().shape_count(), initial, "grew at scroll {y}");
    }
    assert_eq!(grid.viewport().scroll_y, max);
}

#[test]
fn test_body_shapes_match_the_visible_window() {
    let mut grid = common::grid(10_000);
    grid.set_scroll(0.0, 45_000.0).unwrap();
    let (start, end) = (
        grid.viewport().visible_row_start,
        grid.viewport().visible_row_end,
    );
    let rows: BTreeSet<usize> = grid
        .pipeline()
        .layers()
        .iter()
        .filter(|layer| layer.id.band() == Band::Body)
        .flat_map(|layer| layer.scene.visible().filter_map(|(_, s)| s.row))
        .collect();
    assert_eq!(rows, (start..end).collect::<BTreeSet<_>>());
}
