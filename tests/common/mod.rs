//! Common test fixtures.
//!
//! Builders for datasets, layouts and grids shared by the integration tests.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

use gridview::layout::{split_columns, ColumnLayout, GridMetrics, Viewport};
use gridview::render::{ManualFrameHost, RecordingBackend};
use gridview::{Align, CellValue, ColumnDescriptor, Dataset, Fixed, Grid, GridConfig, Row};

pub const STAGE_WIDTH: f32 = 1000.0;
pub const STAGE_HEIGHT: f32 = 600.0;

/// Six columns: one left-fixed, four center, one right-fixed.
#[must_use]
pub fn sales_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("id")
            .with_width(80.0)
            .with_fixed(Fixed::Left)
            .with_align(Align::Right),
        ColumnDescriptor::new("region")
            .with_display_name("Region")
            .with_width(140.0)
            .sortable()
            .filterable(),
        ColumnDescriptor::new("product")
            .with_display_name("Product")
            .with_width(200.0)
            .sortable()
            .filterable(),
        ColumnDescriptor::new("units")
            .with_display_name("Units")
            .with_width(120.0)
            .sortable()
            .with_align(Align::Right),
        ColumnDescriptor::new("revenue")
            .with_display_name("Revenue")
            .with_width(160.0)
            .sortable()
            .with_align(Align::Right),
        ColumnDescriptor::new("total")
            .with_display_name("Total")
            .with_width(100.0)
            .with_fixed(Fixed::Right)
            .with_align(Align::Right),
    ]
}

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const PRODUCTS: [&str; 3] = ["Widget", "Gadget", "Doohickey"];

/// A deterministic sales dataset with `rows` rows.
#[must_use]
pub fn sales_dataset(rows: usize) -> Dataset {
    let data = (0..rows)
        .map(|i| {
            let units = (i % 50) as f64;
            Row::new(vec![
                CellValue::Number(i as f64),
                CellValue::Text(REGIONS[i % REGIONS.len()].to_string()),
                CellValue::Text(PRODUCTS[i % PRODUCTS.len()].to_string()),
                CellValue::Number(units),
                CellValue::Number(units * 2.5),
                CellValue::Number(units * 3.0),
            ])
        })
        .collect();
    Dataset::new(sales_columns(), data)
}

/// The same dataset as a JSON document.
#[must_use]
pub fn sales_json(rows: usize) -> String {
    let records: Vec<serde_json::Value> = (0..rows)
        .map(|i| {
            let units = (i % 50) as f64;
            serde_json::json!({
                "id": i,
                "region": REGIONS[i % REGIONS.len()],
                "product": PRODUCTS[i % PRODUCTS.len()],
                "units": units,
                "revenue": units * 2.5,
                "total": units * 3.0,
            })
        })
        .collect();
    serde_json::json!({ "columns": sales_columns(), "rows": records }).to_string()
}

#[must_use]
pub fn layout(config: &GridConfig) -> ColumnLayout {
    split_columns(&sales_columns(), config.min_column_width)
}

/// A viewport over `rows` rows of the sales columns.
#[must_use]
pub fn viewport(config: &GridConfig, rows: usize, width: f32, height: f32) -> Viewport {
    let columns = layout(config);
    Viewport::new(GridMetrics::new(config, &columns, rows), width, height)
}

/// A grid on the default stage with a manual frame host.
#[must_use]
pub fn grid(rows: usize) -> Grid {
    grid_with(rows, GridConfig::default())
}

#[must_use]
pub fn grid_with(rows: usize, config: GridConfig) -> Grid {
    Grid::new(
        sales_dataset(rows),
        config,
        STAGE_WIDTH,
        STAGE_HEIGHT,
        ManualFrameHost::new(),
    )
    .expect("grid")
}

/// Fire the outstanding frame, if any. Returns layers painted.
pub fn run_frame(grid: &mut Grid, backend: &mut RecordingBackend) -> usize {
    match grid.host_mut().fire() {
        Some(token) => grid.on_frame(token, 0.0, backend).expect("frame"),
        None => 0,
    }
}

#[must_use]
pub fn backend() -> RecordingBackend {
    RecordingBackend::new(1000, 600)
}
