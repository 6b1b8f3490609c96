//! Render backend trait for pluggable painting implementations.
//!
//! The pipeline owns shapes and decides which layers are dirty; a backend
//! only knows how to paint one layer into its clip rectangle. Canvas 2D is
//! the browser backend; [`RecordingBackend`] is used natively.

use super::layers::{Layer, LayerId};
use crate::error::Result;

/// Trait for render backends
pub trait RenderBackend {
    /// Resize the render surface (logical size and device pixel ratio)
    fn resize(&mut self, width: u32, height: u32, dpr: f32);

    /// Repaint a single layer. Only the layer's clip rectangle is touched.
    fn paint_layer(&mut self, layer: &Layer) -> Result<()>;

    /// Called once after every dirty layer of a frame has been painted
    fn finish_frame(&mut self) {}

    /// Get the current width
    fn width(&self) -> u32;

    /// Get the current height
    fn height(&self) -> u32;
}

/// What a [`RecordingBackend`] saw for one painted layer
#[derive(Debug, Clone, PartialEq)]
pub struct PaintRecord {
    pub layer: LayerId,
    /// Visible shapes painted
    pub shapes: usize,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Backend that paints nothing and remembers every layer it was asked to paint
#[derive(Debug, Default, Clone)]
pub struct RecordingBackend {
    width: u32,
    height: u32,
    /// Paint calls in order
    pub records: Vec<PaintRecord>,
    /// Number of flushes that painted at least one layer
    pub frames: usize,
}

impl RecordingBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Layers painted since the last [`clear`](Self::clear).
    pub fn painted_layers(&self) -> Vec<LayerId> {
        self.records.iter().map(|r| r.layer).collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn resize(&mut self, width: u32, height: u32, _dpr: f32) {
        self.width = width;
        self.height = height;
    }

    fn paint_layer(&mut self, layer: &Layer) -> Result<()> {
        self.records.push(PaintRecord {
            layer: layer.id,
            shapes: layer.scene.visible().count(),
            offset_x: layer.offset_x,
            offset_y: layer.offset_y,
        });
        Ok(())
    }

    fn finish_frame(&mut self) {
        self.frames += 1;
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
