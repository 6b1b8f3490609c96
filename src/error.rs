//! Structured error types for gridview.
//!
//! Every fallible operation in the crate returns [`Result`] with a [`GridError`].

/// All errors that can occur while decoding, configuring or drawing a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Dataset or config JSON could not be decoded.
    #[error("JSON decoding: {0}")]
    Json(#[from] serde_json::Error),

    /// A config value is out of range or unparsable.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A column key does not name any declared column.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A dropped payload could not be understood.
    #[error("Invalid drag payload: {0}")]
    DragPayload(String),

    /// The drawing surface or container is not available.
    #[error("Drawing surface unavailable: {0}")]
    MissingSurface(String),

    /// Painting a layer failed.
    #[error("Render error: {0}")]
    Render(String),

    /// The grid was used after teardown.
    #[error("Grid has been torn down")]
    TornDown,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
