//! Layout engine for column placement and viewport management.
//!
//! This module handles:
//! - Splitting columns into left-fixed, center and right-fixed buckets
//! - Scroll offsets, scroll limits and scrollbar reservation
//! - The visible row window (with buffer rows)
//! - Inverse transforms from stage pixels back to rows and columns

mod columns;
mod viewport;

pub use columns::{column_width, split_columns, Bucket, ColumnLayout, ColumnSlot};
pub use viewport::{Frame, GridMetrics, ScrollChange, ScrollLimits, Viewport};
