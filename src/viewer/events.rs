//! Pointer hit testing.
//!
//! Maps a stage point to what lies under it: a scrollbar part, a header
//! cell or one of its triggers, a summary cell, or a body cell. Scrollbars
//! are tested first because they are drawn over the groups.

use crate::layout::{Bucket, ColumnLayout, Viewport};
use crate::scrollbar::{ScrollAxis, ScrollbarGeometry, ScrollbarHit};
use crate::types::{ColumnDescriptor, GridConfig};

/// Width of the filter trigger at the right edge of a filterable header
pub const FILTER_TRIGGER_WIDTH: f32 = 20.0;

/// What the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    None,
    Scrollbar(ScrollAxis, ScrollbarHit),
    /// Header cell body (sort on click)
    HeaderCell(usize),
    /// Filter trigger inside a filterable header cell
    FilterTrigger(usize),
    /// Summary cell (opens the summary popover)
    SummaryTrigger(usize),
    Cell { row: usize, col: usize },
}

impl HitTarget {
    /// Row and column a hover over this target should highlight.
    pub fn hover_axes(self) -> (Option<usize>, Option<usize>) {
        match self {
            Self::Cell { row, col } => (Some(row), Some(col)),
            Self::HeaderCell(col) | Self::FilterTrigger(col) | Self::SummaryTrigger(col) => {
                (None, Some(col))
            }
            Self::None | Self::Scrollbar(..) => (None, None),
        }
    }
}

/// Stage x of a column's right edge, after scrolling.
fn column_right_edge(viewport: &Viewport, columns: &ColumnLayout, col: usize) -> Option<f32> {
    let frame = viewport.frame();
    let (bucket, slot) = columns.locate(col)?;
    Some(match bucket {
        Bucket::Left => slot.right(),
        Bucket::Center => frame.center_left + slot.right() - viewport.scroll_x,
        Bucket::Right => frame.right_left + slot.right(),
    })
}

/// Resolve a stage point.
pub fn hit_test(
    viewport: &Viewport,
    columns: &ColumnLayout,
    scrollbars: &ScrollbarGeometry,
    descriptors: &[ColumnDescriptor],
    config: &GridConfig,
    x: f32,
    y: f32,
) -> HitTarget {
    if !x.is_finite() || !y.is_finite() {
        return HitTarget::None;
    }
    if let Some((axis, hit)) = scrollbars.hit(x, y) {
        return HitTarget::Scrollbar(axis, hit);
    }
    let frame = viewport.frame();
    let Some((_, col)) = viewport.column_at_x(x, columns) else {
        return HitTarget::None;
    };

    if y >= 0.0 && y < frame.body_top {
        let filterable = descriptors.get(col).is_some_and(|c| c.filterable);
        if filterable {
            if let Some(right) = column_right_edge(viewport, columns, col) {
                if x >= right - FILTER_TRIGGER_WIDTH {
                    return HitTarget::FilterTrigger(col);
                }
            }
        }
        return HitTarget::HeaderCell(col);
    }

    let summary_height = config.effective_summary_height();
    if summary_height > 0.0 && y >= frame.summary_top && y < frame.summary_top + summary_height {
        return HitTarget::SummaryTrigger(col);
    }

    match viewport.row_at_y(y) {
        Some(row) => HitTarget::Cell { row, col },
        None => HitTarget::None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::layout::{split_columns, GridMetrics};
    use crate::types::Fixed;

    fn setup() -> (GridConfig, Vec<ColumnDescriptor>, ColumnLayout, Viewport) {
        let config = GridConfig::default();
        let descriptors = vec![
            ColumnDescriptor::new("id").with_width(80.0).with_fixed(Fixed::Left),
            ColumnDescriptor::new("region").with_width(150.0).filterable(),
            ColumnDescriptor::new("sales").with_width(150.0),
        ];
        let layout = split_columns(&descriptors, config.min_column_width);
        let viewport = Viewport::new(GridMetrics::new(&config, &layout, 100), 600.0, 400.0);
        (config, descriptors, layout, viewport)
    }

    #[test]
    fn test_header_and_filter_trigger() {
        let (config, desc, layout, vp) = setup();
        let bars = ScrollbarGeometry::default();
        // Region spans 80..230 on stage
        assert_eq!(
            hit_test(&vp, &layout, &bars, &desc, &config, 100.0, 10.0),
            HitTarget::HeaderCell(1)
        );
        assert_eq!(
            hit_test(&vp, &layout, &bars, &desc, &config, 225.0, 10.0),
            HitTarget::FilterTrigger(1)
        );
        // Sales is not filterable
        assert_eq!(
            hit_test(&vp, &layout, &bars, &desc, &config, 375.0, 10.0),
            HitTarget::HeaderCell(2)
        );
    }

    #[test]
    fn test_body_cell_accounts_for_scroll() {
        let (config, desc, layout, mut vp) = setup();
        let bars = ScrollbarGeometry::default();
        let _ = vp.set_scroll_y(300.0);
        // Body starts at 36; y = 36 + 15 lands in row 10 after scrolling 300px
        assert_eq!(
            hit_test(&vp, &layout, &bars, &desc, &config, 10.0, 51.0),
            HitTarget::Cell { row: 10, col: 0 }
        );
    }

    #[test]
    fn test_summary_row() {
        let (config, desc, layout, vp) = setup();
        let bars = ScrollbarGeometry::default();
        let frame = vp.frame();
        assert_eq!(
            hit_test(&vp, &layout, &bars, &desc, &config, 90.0, frame.summary_top + 5.0),
            HitTarget::SummaryTrigger(1)
        );
    }
}
