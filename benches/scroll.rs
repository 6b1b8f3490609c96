//! Benchmarks for scrolling and frame flushing over large datasets.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(
    clippy::expect_used,
    clippy::cast_precision_loss,
    clippy::indexing_slicing
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gridview::render::{ManualFrameHost, RecordingBackend};
use gridview::{CellValue, ColumnDescriptor, Dataset, Fixed, Grid, GridConfig, Row};

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

fn dataset(rows: usize) -> Dataset {
    let mut columns = vec![ColumnDescriptor::new("id").with_fixed(Fixed::Left)];
    columns.extend((0..12).map(|i| ColumnDescriptor::new(format!("c{i}")).sortable()));
    columns.push(ColumnDescriptor::new("total").with_fixed(Fixed::Right));

    let data = (0..rows)
        .map(|r| {
            let mut cells = vec![CellValue::Number(r as f64)];
            cells.extend((0..12).map(|c| {
                if c % 3 == 0 {
                    CellValue::Text(REGIONS[(r + c) % REGIONS.len()].to_string())
                } else {
                    CellValue::Number((r * c) as f64 * 0.5)
                }
            }));
            cells.push(CellValue::Number(r as f64 * 3.0));
            Row::new(cells)
        })
        .collect();
    Dataset::new(columns, data)
}

fn grid(rows: usize) -> Grid {
    Grid::new(
        dataset(rows),
        GridConfig::default(),
        1280.0,
        720.0,
        ManualFrameHost::new(),
    )
    .expect("grid")
}

/// Scroll by one wheel notch and flush the frame
fn bench_scroll_and_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll_and_flush");
    for rows in [1_000usize, 100_000] {
        let mut grid = grid(rows);
        let mut backend = RecordingBackend::new(1280, 720);
        let mut direction = 1.0f32;
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| {
                let moved = grid.scroll_by(0.0, black_box(97.0 * direction)).expect("scroll");
                if !moved {
                    direction = -direction;
                }
                if let Some(token) = grid.host_mut().fire() {
                    grid.on_frame(token, 0.0, &mut backend).expect("frame");
                }
                backend.clear();
            });
        });
    }
    group.finish();
}

/// Jump to random far-away offsets, forcing a full window rebind
fn bench_jump_scroll(c: &mut Criterion) {
    let mut grid = grid(100_000);
    let max = grid.viewport().get_scroll_limits().max_scroll_y;
    let mut step = 0u32;
    c.bench_function("jump_scroll_100k", |b| {
        b.iter(|| {
            step = step.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let y = (step % 10_000) as f32 / 10_000.0 * max;
            grid.set_scroll(0.0, black_box(y)).expect("scroll")
        });
    });
}

/// Hover sweep across the body
fn bench_hover(c: &mut Criterion) {
    let mut grid = grid(100_000);
    let mut x = 0.0f32;
    c.bench_function("hover_sweep", |b| {
        b.iter(|| {
            x = (x + 37.0) % 1200.0;
            grid.on_pointer_move(black_box(x), black_box(300.0)).expect("hover")
        });
    });
}

/// Building a grid, which sizes the shape pools
fn bench_create(c: &mut Criterion) {
    let data = dataset(100_000);
    c.bench_function("create_100k", |b| {
        b.iter(|| {
            Grid::new(
                black_box(data.clone()),
                GridConfig::default(),
                1280.0,
                720.0,
                ManualFrameHost::new(),
            )
            .expect("grid")
        });
    });
}

criterion_group!(
    benches,
    bench_scroll_and_flush,
    bench_jump_scroll,
    bench_hover,
    bench_create
);
criterion_main!(benches);
