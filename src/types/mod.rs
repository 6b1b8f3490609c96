//! Data types shared across the grid: columns, rows, config and events.

mod column;
mod config;
mod dataset;
mod drag;
mod events;
mod summary;

pub use column::*;
pub use config::*;
pub use dataset::*;
pub use drag::*;
pub use events::*;
pub use summary::*;
