//! Retained-mode rendering with pluggable backends.
//!
//! This module provides:
//! - Shape primitives and per-layer scenes
//! - The shape object pool that recycles cell shapes on scroll
//! - Layer groups and the batched redraw scheduler
//! - The render pipeline that keeps layers in sync with grid state
//! - Canvas 2D backend (browser) and a recording backend (native)
//! - Color validation and the default palette

pub mod backend;
pub mod canvas;
pub mod colors;
pub mod layers;
pub mod pipeline;
pub mod pool;
pub mod scheduler;
pub mod shapes;

// Re-export commonly used types
pub use backend::{PaintRecord, RecordingBackend, RenderBackend};
#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;
pub use colors::{normalize_color, palette, CssColor};
pub use layers::{Band, Layer, LayerId, LayerSet, ShapeRef};
pub use pipeline::{RenderPipeline, ShapeSnapshot, SyncContext};
pub use pool::{CellKey, CellPaint, PoolStats, ShapePool};
pub use scheduler::{FrameHost, FrameScheduler, FrameToken, ManualFrameHost};
pub use shapes::{Rect, Scene, Shape, ShapeId, ShapeKind};
