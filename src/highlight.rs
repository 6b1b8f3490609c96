//! Hover highlighting of whole rows and columns.
//!
//! Two independent axes, each either inactive or active on one index. On
//! activation every background shape tagged with that row (or column) in
//! any layer gets the highlight fill; the fill it had before is recorded
//! once so deactivation restores it exactly. Rows are painted first and
//! columns last, so a cell in both the hovered row and the hovered column
//! ends up with the column color.
//!
//! The engine never creates or destroys shapes. It only rewrites fills of
//! shapes the render pipeline already owns, through [`ShapeFills`].

use std::collections::{HashMap, HashSet};

use crate::render::layers::{LayerSet, ShapeRef};
use crate::types::GridConfig;

/// Highlight axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

/// State of one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisState {
    #[default]
    Inactive,
    Active(usize),
}

impl AxisState {
    fn from_index(index: Option<usize>) -> Self {
        index.map_or(Self::Inactive, Self::Active)
    }
}

/// Access to tagged shape fills, implemented by the render pipeline
pub trait ShapeFills {
    /// Every shape, across all layers, tagged with `index` on `axis`.
    fn tagged_shapes(&self, axis: Axis, index: usize) -> Vec<ShapeRef>;

    /// Current fill of a shape.
    fn fill_of(&self, shape: ShapeRef) -> Option<String>;

    /// Overwrite a shape's fill. Returns false if the shape does not exist.
    fn set_fill(&mut self, shape: ShapeRef, fill: &str) -> bool;
}

/// Row/column hover highlight state
#[derive(Debug, Default, Clone)]
pub struct HighlightEngine {
    row: AxisState,
    col: AxisState,
    /// Shapes carrying the row fill (never also in `col_rects`)
    row_rects: Vec<ShapeRef>,
    /// Shapes carrying the column fill
    col_rects: Vec<ShapeRef>,
    /// Fill each highlighted shape had before highlighting
    origins: HashMap<ShapeRef, String>,
}

impl HighlightEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self) -> AxisState {
        self.row
    }

    pub fn col(&self) -> AxisState {
        self.col
    }

    pub fn is_active(&self) -> bool {
        self.row != AxisState::Inactive || self.col != AxisState::Inactive
    }

    pub fn row_rects(&self) -> &[ShapeRef] {
        &self.row_rects
    }

    pub fn col_rects(&self) -> &[ShapeRef] {
        &self.col_rects
    }

    /// Recorded pre-highlight fill of a shape.
    pub fn origin_fill(&self, shape: ShapeRef) -> Option<&str> {
        self.origins.get(&shape).map(String::as_str)
    }

    /// Move the hover to `(row, col)`. Returns the layers whose shapes changed.
    pub fn set_hover(
        &mut self,
        row: Option<usize>,
        col: Option<usize>,
        target: &mut dyn ShapeFills,
        config: &GridConfig,
    ) -> LayerSet {
        let row = AxisState::from_index(row);
        let col = AxisState::from_index(col);
        if row == self.row && col == self.col {
            return LayerSet::EMPTY;
        }
        let mut dirty = self.restore(target);
        self.row = row;
        self.col = col;
        dirty |= self.apply(target, config);
        dirty
    }

    /// Restore every fill and set both axes inactive.
    pub fn deactivate(&mut self, target: &mut dyn ShapeFills) -> LayerSet {
        self.row = AxisState::Inactive;
        self.col = AxisState::Inactive;
        self.restore(target)
    }

    /// Restore fills but remember the active axes, so the pipeline can
    /// repaint pooled shapes without baking highlight colors into them.
    pub fn suspend(&mut self, target: &mut dyn ShapeFills) -> LayerSet {
        self.restore(target)
    }

    /// Re-apply the remembered axes after a [`suspend`](Self::suspend).
    pub fn reapply(&mut self, target: &mut dyn ShapeFills, config: &GridConfig) -> LayerSet {
        let mut dirty = self.restore(target);
        dirty |= self.apply(target, config);
        dirty
    }

    /// Drop all state without touching shapes (the shapes themselves are gone).
    pub fn forget(&mut self) {
        self.row = AxisState::Inactive;
        self.col = AxisState::Inactive;
        self.row_rects.clear();
        self.col_rects.clear();
        self.origins.clear();
    }

    fn record_origin(&mut self, shape: ShapeRef, target: &dyn ShapeFills) {
        if self.origins.contains_key(&shape) {
            return;
        }
        if let Some(fill) = target.fill_of(shape) {
            self.origins.insert(shape, fill);
        }
    }

    fn apply(&mut self, target: &mut dyn ShapeFills, config: &GridConfig) -> LayerSet {
        let mut dirty = LayerSet::EMPTY;
        let mut seen = HashSet::new();

        if let AxisState::Active(index) = self.row {
            for shape in target.tagged_shapes(Axis::Row, index) {
                if !seen.insert(shape) {
                    continue;
                }
                self.record_origin(shape, target);
                if target.set_fill(shape, &config.row_highlight_color) {
                    self.row_rects.push(shape);
                    dirty.insert(shape.layer);
                }
            }
        }

        if let AxisState::Active(index) = self.col {
            let mut col_seen = HashSet::new();
            for shape in target.tagged_shapes(Axis::Column, index) {
                if !col_seen.insert(shape) {
                    continue;
                }
                self.record_origin(shape, target);
                if target.set_fill(shape, &config.col_highlight_color) {
                    self.col_rects.push(shape);
                    dirty.insert(shape.layer);
                }
            }
            // Intersection cells now carry the column fill
            if !self.row_rects.is_empty() {
                self.row_rects.retain(|s| !col_seen.contains(s));
            }
        }

        if !dirty.is_empty() {
            tracing::trace!(
                rows = self.row_rects.len(),
                cols = self.col_rects.len(),
                "highlight applied"
            );
        }
        dirty
    }

    fn restore(&mut self, target: &mut dyn ShapeFills) -> LayerSet {
        let mut dirty = LayerSet::EMPTY;
        for (shape, fill) in self.origins.drain() {
            if target.set_fill(shape, &fill) {
                dirty.insert(shape.layer);
            }
        }
        self.row_rects.clear();
        self.col_rects.clear();
        dirty
    }
}
