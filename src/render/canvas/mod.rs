//! Canvas 2D rendering backend.
//!
//! Layers are painted through the HTML Canvas 2D API via web-sys. Text
//! fitting is platform independent and lives in [`text`].

mod text;

#[cfg(target_arch = "wasm32")]
mod painter;

pub use text::fit_text;

#[cfg(target_arch = "wasm32")]
pub use painter::CanvasPainter;
