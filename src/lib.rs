//! gridview - virtualized data grid for the web
//!
//! Draws large tables onto a retained-mode Canvas 2D surface via WebAssembly:
//! - Left/center/right column groups with fixed columns
//! - Only the visible row window is materialized; cell shapes are pooled
//!   and reassigned as the window moves
//! - Row and column hover highlighting
//! - Custom scrollbars, batched wheel scrolling, one redraw per frame
//! - Filter and summary popovers placed inside the viewport
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView } from 'gridview';
//! await init();
//! const view = new GridView(canvas, JSON.stringify({ columns, rows }), config, dpr);
//! view.onEvent((event) => console.log(event.type, event));
//! ```

pub mod debounce;
pub mod error;
pub mod filter;
pub mod highlight;
pub mod layout;
pub mod popover;
pub mod render;
pub mod scrollbar;
pub mod types;
pub mod viewer;

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub use viewer::GridView;
pub use viewer::{ClickOutcome, Grid, HitTarget};

pub use error::{GridError, Result};
pub use types::*;

/// Decode a dataset document and report its column and row counts as JSON,
/// so hosts can validate input before constructing a view.
///
/// # Errors
/// Returns an error if the document is not a valid dataset.
#[wasm_bindgen(js_name = "inspectDataset")]
pub fn inspect_dataset(json: &str) -> std::result::Result<String, JsValue> {
    let dataset = Dataset::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&serde_json::json!({
        "columns": dataset.columns.len(),
        "rows": dataset.row_count(),
    }))
    .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
