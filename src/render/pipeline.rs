//! Layered render pipeline.
//!
//! Owns the eleven layer groups and the shape pools inside them. Each
//! `sync_*` method brings one band's shapes up to date and reports which
//! layers changed; [`RenderPipeline::flush`] paints exactly those layers.
//! Scrolling is a translation of the layer, not a repaint of its shapes:
//! only rows entering the visible window touch the pool.

use std::collections::HashMap;

use serde::Serialize;

use super::backend::RenderBackend;
use super::colors::{sorted_header_fill, CssColor};
use super::layers::{Band, Layer, LayerId, LayerSet, ShapeRef};
use super::pool::{CellKey, CellPaint, PoolStats, ShapePool};
use super::shapes::{Rect, Shape, ShapeId, ShapeKind};
use crate::error::Result;
use crate::filter::FilterSummaryState;
use crate::highlight::{Axis, ShapeFills};
use crate::layout::{Bucket, ColumnLayout, ColumnSlot, Frame, Viewport};
use crate::scrollbar::{ScrollbarGeometry, ThumbGeometry};
use crate::types::{CellValue, Dataset, GridConfig, SortDirection};

/// Appended to the label of filterable headers
pub const FILTER_GLYPH: &str = " \u{2261}";

/// Everything a sync pass reads
#[derive(Clone, Copy)]
pub struct SyncContext<'a> {
    pub config: &'a GridConfig,
    pub dataset: &'a Dataset,
    pub columns: &'a ColumnLayout,
    pub viewport: &'a Viewport,
    /// Sorted column and its direction
    pub sort: Option<(usize, SortDirection)>,
    pub filters: &'a FilterSummaryState,
}

/// A visible shape flattened into stage coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeSnapshot {
    pub layer: LayerId,
    pub kind: ShapeKind,
    pub rect: Rect,
    pub fill: CssColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<CssColor>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct ScrollbarShapes {
    track: ShapeId,
    thumb: ShapeId,
}

/// Layer groups, their pools, and content generations
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    layers: Vec<Layer>,
    pools: HashMap<LayerId, ShapePool>,
    scrollbar_shapes: HashMap<LayerId, ScrollbarShapes>,
    body_generation: u64,
    header_generation: u64,
    summary_generation: u64,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn pool_changed(stats: PoolStats) -> bool {
    stats.repainted > 0 || stats.hidden > 0 || stats.allocated > 0
}

fn moved(a: f32, b: f32) -> bool {
    (a - b).abs() > f32::EPSILON
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self {
            layers: LayerId::ALL.into_iter().map(Layer::new).collect(),
            pools: HashMap::new(),
            scrollbar_shapes: HashMap::new(),
            body_generation: 0,
            header_generation: 0,
            summary_generation: 0,
        }
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.index())
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn pool(&self, id: LayerId) -> Option<&ShapePool> {
        self.pools.get(&id)
    }

    /// Total shapes allocated across every layer.
    pub fn shape_count(&self) -> usize {
        self.layers.iter().map(|l| l.scene.len()).sum()
    }

    /// Destroy every shape and pool (new dataset). Everything is dirty.
    pub fn reset(&mut self) -> LayerSet {
        for layer in &mut self.layers {
            layer.scene.clear();
        }
        self.pools.clear();
        self.scrollbar_shapes.clear();
        self.invalidate_content();
        tracing::debug!("render pipeline reset");
        LayerSet::all()
    }

    /// Force every pooled cell to repaint on the next sync (config change).
    pub fn invalidate_content(&mut self) {
        self.invalidate_body();
        self.invalidate_header();
        self.invalidate_summary();
    }

    pub fn invalidate_body(&mut self) {
        self.body_generation += 1;
    }

    pub fn invalidate_header(&mut self) {
        self.header_generation += 1;
    }

    pub fn invalidate_summary(&mut self) {
        self.summary_generation += 1;
    }

    /// Position every layer on the stage and apply per-band styling.
    pub fn arrange(&mut self, frame: &Frame, config: &GridConfig, columns: &ColumnLayout) -> LayerSet {
        let mut dirty = LayerSet::EMPTY;
        for layer in &mut self.layers {
            let (y, height, background, font) = match layer.id.band() {
                Band::Header => (
                    0.0,
                    config.header_height,
                    &config.header_bg_color,
                    &config.header_font,
                ),
                Band::Body => (
                    frame.body_top,
                    frame.body_height,
                    &config.body_bg_color,
                    &config.body_font,
                ),
                Band::Summary => (
                    frame.summary_top,
                    config.effective_summary_height(),
                    &config.summary_bg_color,
                    &config.header_font,
                ),
                Band::Scrollbar => {
                    if layer.background != config.scrollbar_track_color {
                        layer.background.clone_from(&config.scrollbar_track_color);
                        dirty.insert(layer.id);
                    }
                    continue;
                }
            };
            let (x, width) = match layer.id.bucket() {
                Some(Bucket::Left) => (0.0, columns.left_width),
                Some(Bucket::Center) => (frame.center_left, frame.center_viewport_width),
                Some(Bucket::Right) => (frame.right_left, columns.right_width),
                None => continue,
            };
            let clip = Rect::new(x, y, width, height);
            if clip != layer.clip || layer.background != *background || layer.font != *font {
                layer.clip = clip;
                layer.background.clone_from(background);
                layer.font.clone_from(font);
                dirty.insert(layer.id);
            }
        }
        dirty
    }

    /// Translate layers to the scroll offsets. Fixed columns follow only
    /// `scroll_y`; center layers follow `scroll_x` (and `scroll_y` in the
    /// body). All affected layers are updated before anything is flushed.
    pub fn apply_scroll(&mut self, scroll_x: f32, scroll_y: f32) -> LayerSet {
        let mut dirty = LayerSet::EMPTY;
        for layer in &mut self.layers {
            if layer.id.band() == Band::Scrollbar {
                continue;
            }
            let offset_x = if layer.id.scrolls_x() { -scroll_x } else { 0.0 };
            let offset_y = if layer.id.scrolls_y() { -scroll_y } else { 0.0 };
            if moved(layer.offset_x, offset_x) || moved(layer.offset_y, offset_y) {
                layer.offset_x = offset_x;
                layer.offset_y = offset_y;
                dirty.insert(layer.id);
            }
        }
        dirty
    }

    /// Bind the visible row window to body pools.
    pub fn sync_body(&mut self, ctx: &SyncContext<'_>) -> LayerSet {
        let mut dirty = LayerSet::EMPTY;
        let (start, end) = (
            ctx.viewport.visible_row_start,
            ctx.viewport.visible_row_end,
        );
        let ring_rows = ctx.viewport.window_capacity();
        let generation = self.body_generation;
        let config = ctx.config;
        let row_height = config.row_height;

        for bucket in Bucket::ALL {
            let Some(id) = LayerId::for_band(Band::Body, bucket) else {
                continue;
            };
            let slots = ctx.columns.bucket(bucket);
            let pool = self
                .pools
                .entry(id)
                .or_insert_with(|| ShapePool::new(ring_rows, slots.len()));
            pool.reshape(ring_rows, slots.len());
            let Some(layer) = self.layers.get_mut(id.index()) else {
                continue;
            };
            let cells = (start..end).flat_map(move |row| {
                slots.iter().enumerate().map(move |(col_slot, slot)| CellKey {
                    row: Some(row),
                    col_slot,
                    col: slot.index,
                })
            });
            let stats = pool.assign(&mut layer.scene, cells, generation, |key| {
                let row = key.row.unwrap_or(0);
                #[allow(clippy::cast_precision_loss)]
                let y = row as f32 * row_height;
                let fill = if row % 2 == 1 {
                    &config.body_stripe_color
                } else {
                    &config.body_bg_color
                };
                CellPaint {
                    rect: slot_rect(slots.get(key.col_slot), y, row_height),
                    fill: fill.clone(),
                    stroke: Some(config.grid_line_color.clone()),
                    text: ctx
                        .dataset
                        .cell(row, key.col)
                        .map(CellValue::display)
                        .unwrap_or_default(),
                    text_color: config.body_text_color.clone(),
                    align: ctx
                        .dataset
                        .columns
                        .get(key.col)
                        .map(|c| c.align)
                        .unwrap_or_default(),
                }
            });
            if pool_changed(stats) {
                tracing::trace!(
                    layer = ?id,
                    repainted = stats.repainted,
                    reused = stats.reused,
                    hidden = stats.hidden,
                    "body pool synced"
                );
                dirty.insert(id);
            }
        }
        dirty
    }

    /// Header cells: label, sort indicator and filter glyph.
    pub fn sync_header(&mut self, ctx: &SyncContext<'_>) -> LayerSet {
        let generation = self.header_generation;
        let config = ctx.config;
        let height = config.header_height;
        self.sync_band(Band::Header, ctx, generation, true, |slot, col| {
            let column = ctx.dataset.columns.get(col);
            let direction = match ctx.sort {
                Some((sorted, direction)) if sorted == col => direction,
                _ => SortDirection::None,
            };
            let fill = if direction == SortDirection::None {
                config.header_bg_color.clone()
            } else {
                sorted_header_fill(&config.header_bg_color)
            };
            let mut text = column.map(|c| c.label().to_string()).unwrap_or_default();
            text.push_str(direction.indicator());
            if column.is_some_and(|c| c.filterable) {
                text.push_str(FILTER_GLYPH);
            }
            CellPaint {
                rect: slot_rect(slot, 0.0, height),
                fill,
                stroke: Some(config.grid_line_color.clone()),
                text,
                text_color: config.header_text_color.clone(),
                align: column.map(|c| c.align).unwrap_or_default(),
            }
        })
    }

    /// Summary cells showing each column's aggregate, or nothing when the
    /// summary row is hidden.
    pub fn sync_summary(&mut self, ctx: &SyncContext<'_>) -> LayerSet {
        let generation = self.summary_generation;
        let config = ctx.config;
        let height = config.summary_height;
        self.sync_band(
            Band::Summary,
            ctx,
            generation,
            config.show_summary,
            |slot, col| {
                let column = ctx.dataset.columns.get(col);
                CellPaint {
                    rect: slot_rect(slot, 0.0, height),
                    fill: config.summary_bg_color.clone(),
                    stroke: Some(config.grid_line_color.clone()),
                    text: column
                        .and_then(|c| ctx.filters.grouping(&c.key))
                        .unwrap_or_default()
                        .to_string(),
                    text_color: config.summary_text_color.clone(),
                    align: column.map(|c| c.align).unwrap_or_default(),
                }
            },
        )
    }

    /// One row of cells per bucket (header or summary band).
    fn sync_band<F>(
        &mut self,
        band: Band,
        ctx: &SyncContext<'_>,
        generation: u64,
        shown: bool,
        mut paint: F,
    ) -> LayerSet
    where
        F: FnMut(Option<&ColumnSlot>, usize) -> CellPaint,
    {
        let mut dirty = LayerSet::EMPTY;
        for bucket in Bucket::ALL {
            let Some(id) = LayerId::for_band(band, bucket) else {
                continue;
            };
            let slots = ctx.columns.bucket(bucket);
            let pool = self
                .pools
                .entry(id)
                .or_insert_with(|| ShapePool::new(1, slots.len()));
            pool.reshape(1, slots.len());
            let Some(layer) = self.layers.get_mut(id.index()) else {
                continue;
            };
            let count = if shown { slots.len() } else { 0 };
            let cells = slots
                .iter()
                .take(count)
                .enumerate()
                .map(|(col_slot, slot)| CellKey {
                    row: None,
                    col_slot,
                    col: slot.index,
                });
            let stats = pool.assign(&mut layer.scene, cells, generation, |key| {
                paint(slots.get(key.col_slot), key.col)
            });
            if pool_changed(stats) {
                dirty.insert(id);
            }
        }
        dirty
    }

    /// Track and thumb shapes for both scrollbars. A missing scrollbar
    /// collapses its layer to an empty clip.
    pub fn sync_scrollbars(&mut self, geometry: &ScrollbarGeometry, config: &GridConfig) -> LayerSet {
        let mut dirty = LayerSet::EMPTY;
        let bars = [
            (LayerId::ScrollbarVertical, geometry.vertical),
            (LayerId::ScrollbarHorizontal, geometry.horizontal),
        ];
        for (id, bar) in bars {
            let Some(layer) = self.layers.get_mut(id.index()) else {
                continue;
            };
            let shapes = *self.scrollbar_shapes.entry(id).or_insert_with(|| ScrollbarShapes {
                track: layer.scene.add(Shape::hidden(ShapeKind::Rect)),
                thumb: layer.scene.add(Shape::hidden(ShapeKind::Rect)),
            });
            let before = (
                layer.clip,
                layer.scene.get(shapes.track).cloned(),
                layer.scene.get(shapes.thumb).cloned(),
            );
            match bar {
                Some(g) => place_scrollbar(layer, shapes, &g, config),
                None => {
                    layer.clip = Rect::default();
                    for shape_id in [shapes.track, shapes.thumb] {
                        if let Some(shape) = layer.scene.get_mut(shape_id) {
                            shape.visible = false;
                        }
                    }
                }
            }
            let after = (
                layer.clip,
                layer.scene.get(shapes.track).cloned(),
                layer.scene.get(shapes.thumb).cloned(),
            );
            if before != after {
                dirty.insert(id);
            }
        }
        dirty
    }

    /// Paint the dirty layers. Returns how many were painted.
    pub fn flush(&self, dirty: LayerSet, backend: &mut dyn RenderBackend) -> Result<usize> {
        let mut painted = 0;
        for id in dirty.iter() {
            let Some(layer) = self.layer(id) else {
                continue;
            };
            if layer.clip.is_empty() {
                continue;
            }
            backend.paint_layer(layer)?;
            painted += 1;
        }
        if painted > 0 {
            backend.finish_frame();
        }
        tracing::trace!(painted, requested = dirty.len(), "flushed layers");
        Ok(painted)
    }

    /// Visible shapes inside their layer's clip, in stage coordinates.
    pub fn snapshot(&self) -> Vec<ShapeSnapshot> {
        let mut out = Vec::new();
        for layer in &self.layers {
            if layer.clip.is_empty() {
                continue;
            }
            let (dx, dy) = layer.to_stage(0.0, 0.0);
            for (_, shape) in layer.scene.visible() {
                let rect = shape.rect.translate(dx, dy);
                if !rect.intersects(&layer.clip) {
                    continue;
                }
                out.push(ShapeSnapshot {
                    layer: layer.id,
                    kind: shape.kind,
                    rect,
                    fill: shape.fill.clone(),
                    stroke: shape.stroke.clone(),
                    text: shape.text.clone(),
                    row: shape.row,
                    col: shape.col,
                });
            }
        }
        out
    }
}

fn slot_rect(slot: Option<&ColumnSlot>, y: f32, height: f32) -> Rect {
    slot.map_or(Rect::new(0.0, y, 0.0, height), |s| {
        Rect::new(s.x, y, s.width, height)
    })
}

fn place_scrollbar(layer: &mut Layer, shapes: ScrollbarShapes, g: &ThumbGeometry, config: &GridConfig) {
    layer.clip = g.track;
    if let Some(track) = layer.scene.get_mut(shapes.track) {
        track.rect = Rect::new(0.0, 0.0, g.track.width, g.track.height);
        track.fill.clone_from(&config.scrollbar_track_color);
        track.visible = true;
    }
    if let Some(thumb) = layer.scene.get_mut(shapes.thumb) {
        thumb.rect = g.thumb.translate(-g.track.x, -g.track.y);
        thumb.fill.clone_from(&config.scrollbar_thumb_color);
        thumb.visible = true;
    }
}

impl ShapeFills for RenderPipeline {
    fn tagged_shapes(&self, axis: Axis, index: usize) -> Vec<ShapeRef> {
        self.layers
            .iter()
            .filter(|layer| layer.id.band() != Band::Scrollbar)
            .flat_map(|layer| {
                layer
                    .scene
                    .visible()
                    .filter(move |(_, shape)| {
                        shape.kind == ShapeKind::Rect
                            && match axis {
                                Axis::Row => shape.row == Some(index),
                                Axis::Column => shape.col == Some(index),
                            }
                    })
                    .map(move |(shape, _)| ShapeRef {
                        layer: layer.id,
                        shape,
                    })
            })
            .collect()
    }

    fn fill_of(&self, shape: ShapeRef) -> Option<String> {
        self.layer(shape.layer)?
            .scene
            .get(shape.shape)
            .map(|s| s.fill.clone())
    }

    fn set_fill(&mut self, shape: ShapeRef, fill: &str) -> bool {
        let Some(target) = self
            .layers
            .get_mut(shape.layer.index())
            .and_then(|layer| layer.scene.get_mut(shape.shape))
        else {
            return false;
        };
        if target.fill != fill {
            target.fill = fill.to_string();
        }
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::layout::{split_columns, GridMetrics};
    use crate::render::backend::RecordingBackend;
    use crate::types::{ColumnDescriptor, Fixed, Row};

    fn fixture(rows: usize) -> (GridConfig, Dataset, ColumnLayout, Viewport) {
        let config = GridConfig::default();
        let columns = vec![
            ColumnDescriptor::new("id").with_width(60.0).with_fixed(Fixed::Left),
            ColumnDescriptor::new("name").with_width(200.0),
            ColumnDescriptor::new("total").with_width(100.0).with_fixed(Fixed::Right),
        ];
        let data = (0..rows)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let n = i as f64;
                Row::new(vec![
                    CellValue::Number(n),
                    CellValue::Text(format!("row {i}")),
                    CellValue::Number(n * 2.0),
                ])
            })
            .collect();
        let dataset = Dataset::new(columns, data);
        let layout = split_columns(&dataset.columns, config.min_column_width);
        let viewport = Viewport::new(
            GridMetrics::new(&config, &layout, rows),
            800.0,
            400.0,
        );
        (config, dataset, layout, viewport)
    }

    #[test]
    fn test_scroll_reuses_slots() {
        let (config, dataset, layout, mut viewport) = fixture(1000);
        let filters = FilterSummaryState::new();
        let mut pipeline = RenderPipeline::new();
        let ctx = SyncContext {
            config: &config,
            dataset: &dataset,
            columns: &layout,
            viewport: &viewport,
            sort: None,
            filters: &filters,
        };
        pipeline.sync_body(&ctx);
        let allocated = pipeline.shape_count();

        let _ = viewport.update_vertical_scroll(3000.0);
        let ctx = SyncContext {
            config: &config,
            dataset: &dataset,
            columns: &layout,
            viewport: &viewport,
            sort: None,
            filters: &filters,
        };
        pipeline.sync_body(&ctx);
        assert!(viewport.visible_row_start > 0);
        assert_eq!(pipeline.shape_count(), allocated);
    }

    #[test]
    fn test_apply_scroll_moves_only_scrolling_layers() {
        let mut pipeline = RenderPipeline::new();
        let dirty = pipeline.apply_scroll(10.0, 20.0);
        assert!(dirty.contains(LayerId::BodyCenter));
        assert!(dirty.contains(LayerId::BodyLeft));
        assert!(dirty.contains(LayerId::HeaderCenter));
        assert!(!dirty.contains(LayerId::HeaderLeft));
        assert!(!dirty.contains(LayerId::SummaryRight));
        let left = pipeline.layer(LayerId::BodyLeft).unwrap();
        assert_eq!((left.offset_x, left.offset_y), (0.0, -20.0));
        let center = pipeline.layer(LayerId::BodyCenter).unwrap();
        assert_eq!((center.offset_x, center.offset_y), (-10.0, -20.0));
    }

    #[test]
    fn test_flush_paints_only_dirty_layers() {
        let (config, dataset, layout, viewport) = fixture(10);
        let filters = FilterSummaryState::new();
        let mut pipeline = RenderPipeline::new();
        pipeline.arrange(&viewport.frame(), &config, &layout);
        let mut backend = RecordingBackend::new(800, 400);
        let ctx = SyncContext {
            config: &config,
            dataset: &dataset,
            columns: &layout,
            viewport: &viewport,
            sort: None,
            filters: &filters,
        };
        let dirty = pipeline.sync_header(&ctx);
        let painted = pipeline.flush(dirty, &mut backend).unwrap();
        assert_eq!(painted, 3);
        assert_eq!(backend.frames, 1);
        assert!(backend
            .painted_layers()
            .iter()
            .all(|l| l.band() == Band::Header));
    }

    #[test]
    fn test_sorted_header_shows_indicator() {
        let (config, dataset, layout, viewport) = fixture(3);
        let filters = FilterSummaryState::new();
        let mut pipeline = RenderPipeline::new();
        pipeline.arrange(&viewport.frame(), &config, &layout);
        let ctx = SyncContext {
            config: &config,
            dataset: &dataset,
            columns: &layout,
            viewport: &viewport,
            sort: Some((1, SortDirection::Descending)),
            filters: &filters,
        };
        pipeline.sync_header(&ctx);
        let texts: Vec<String> = pipeline
            .snapshot()
            .into_iter()
            .filter(|s| s.layer == LayerId::HeaderCenter && s.kind == ShapeKind::Text)
            .map(|s| s.text)
            .collect();
        assert_eq!(texts, vec![format!("name{}", SortDirection::Descending.indicator())]);
    }
}
