//! Shape object pool.
//!
//! Each layer group gets one pool of cell slots. A slot is a background
//! rectangle plus a text shape. Slots are keyed by `(row mod ring_rows,
//! column slot)`, so when the visible window slides only the rows that
//! entered it are repainted; the rest keep their binding untouched and the
//! layer translation does the scrolling. Slots that are not needed are
//! hidden, never destroyed.

use super::colors::CssColor;
use super::shapes::{Rect, Scene, Shape, ShapeId, ShapeKind};
use crate::types::Align;

/// A cell a group wants on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellKey {
    /// Data row (`None` for header and summary cells)
    pub row: Option<usize>,
    /// Position of the column inside its bucket
    pub col_slot: usize,
    /// Declared column index
    pub col: usize,
}

/// Content painted into a slot when its binding changes
#[derive(Debug, Clone, PartialEq)]
pub struct CellPaint {
    /// Layer-local bounds
    pub rect: Rect,
    pub fill: CssColor,
    pub stroke: Option<CssColor>,
    pub text: String,
    pub text_color: CssColor,
    pub align: Align,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SlotBinding {
    row: Option<usize>,
    col: usize,
    generation: u64,
}

#[derive(Debug, Clone)]
struct PoolSlot {
    background: ShapeId,
    label: ShapeId,
    binding: Option<SlotBinding>,
}

/// Counters from one [`ShapePool::assign`] pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Slots whose binding was already correct
    pub reused: usize,
    /// Slots repainted for a new row/column/generation
    pub repainted: usize,
    /// Slots hidden because nothing needed them
    pub hidden: usize,
    /// Slots created in this pass
    pub allocated: usize,
}

/// Reusable cell slots for one layer group
#[derive(Debug, Clone)]
pub struct ShapePool {
    slots: Vec<PoolSlot>,
    ring_rows: usize,
    cols: usize,
}

impl ShapePool {
    /// Create an empty pool for a window of `ring_rows` rows by `cols` columns.
    ///
    /// Shapes are created lazily on the first [`assign`](Self::assign).
    pub fn new(ring_rows: usize, cols: usize) -> Self {
        Self {
            slots: Vec::new(),
            ring_rows: ring_rows.max(1),
            cols,
        }
    }

    /// Number of slots created so far.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn ring_rows(&self) -> usize {
        self.ring_rows
    }

    /// Change the window shape. Existing shapes are kept for reuse but
    /// every binding is dropped, because slot keys change meaning.
    pub fn reshape(&mut self, ring_rows: usize, cols: usize) {
        let ring_rows = ring_rows.max(1);
        if ring_rows == self.ring_rows && cols == self.cols {
            return;
        }
        tracing::debug!(
            from_rows = self.ring_rows,
            to_rows = ring_rows,
            cols,
            "reshaping shape pool"
        );
        self.ring_rows = ring_rows;
        self.cols = cols;
        for slot in &mut self.slots {
            slot.binding = None;
        }
    }

    fn slot_index(&self, key: &CellKey) -> usize {
        (key.row.unwrap_or(0) % self.ring_rows) * self.cols + key.col_slot
    }

    /// Bind every requested cell to a slot, repainting only changed slots,
    /// and hide slots that are no longer needed.
    pub fn assign<I, F>(
        &mut self,
        scene: &mut Scene,
        cells: I,
        generation: u64,
        mut paint: F,
    ) -> PoolStats
    where
        I: IntoIterator<Item = CellKey>,
        F: FnMut(&CellKey) -> CellPaint,
    {
        let mut stats = PoolStats::default();
        let mut touched = vec![false; self.slots.len()];

        for key in cells {
            let index = self.slot_index(&key);
            while self.slots.len() <= index {
                let background = scene.add(Shape::hidden(ShapeKind::Rect));
                let label = scene.add(Shape::hidden(ShapeKind::Text));
                self.slots.push(PoolSlot {
                    background,
                    label,
                    binding: None,
                });
                touched.push(false);
                stats.allocated += 1;
            }
            let binding = SlotBinding {
                row: key.row,
                col: key.col,
                generation,
            };
            let Some(slot) = self.slots.get_mut(index) else {
                continue;
            };
            if let Some(flag) = touched.get_mut(index) {
                *flag = true;
            }
            if slot.binding == Some(binding) {
                stats.reused += 1;
                continue;
            }
            let content = paint(&key);
            if let Some(bg) = scene.get_mut(slot.background) {
                bg.rect = content.rect;
                bg.fill = content.fill;
                bg.stroke = content.stroke;
                bg.row = key.row;
                bg.col = Some(key.col);
                bg.visible = true;
            }
            if let Some(label) = scene.get_mut(slot.label) {
                label.rect = content.rect;
                label.text = content.text;
                label.fill = content.text_color;
                label.align = content.align;
                label.visible = true;
            }
            slot.binding = Some(binding);
            stats.repainted += 1;
        }

        for (slot, used) in self.slots.iter_mut().zip(touched) {
            if used || slot.binding.is_none() && !is_visible(scene, slot.background) {
                continue;
            }
            for id in [slot.background, slot.label] {
                if let Some(shape) = scene.get_mut(id) {
                    shape.visible = false;
                    shape.row = None;
                    shape.col = None;
                }
            }
            slot.binding = None;
            stats.hidden += 1;
        }

        if stats.allocated > 0 {
            tracing::debug!(
                allocated = stats.allocated,
                capacity = self.slots.len(),
                "grew shape pool"
            );
        }
        stats
    }
}

fn is_visible(scene: &Scene, id: ShapeId) -> bool {
    scene.get(id).is_some_and(|s| s.visible)
}
