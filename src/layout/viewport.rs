//! Viewport state: scroll offsets, stage size and the visible row window.
//!
//! The viewport is the only owner of `scroll_x`/`scroll_y`. Everything that
//! depends on them (group translations, scrollbar thumbs, hit testing) reads
//! them from here.

use super::{Bucket, ColumnLayout};
use crate::types::GridConfig;

/// Size inputs the viewport needs to compute limits and visible rows
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridMetrics {
    pub row_count: usize,
    pub row_height: f32,
    pub header_height: f32,
    /// 0 when the summary row is hidden
    pub summary_height: f32,
    pub scrollbar_thickness: f32,
    pub buffer_rows: usize,
    pub left_width: f32,
    pub center_width: f32,
    pub right_width: f32,
}

impl GridMetrics {
    pub fn new(config: &GridConfig, columns: &ColumnLayout, row_count: usize) -> Self {
        Self {
            row_count,
            row_height: config.row_height,
            header_height: config.header_height,
            summary_height: config.effective_summary_height(),
            scrollbar_thickness: config.scrollbar_thickness,
            buffer_rows: config.buffer_rows,
            left_width: columns.left_width,
            center_width: columns.center_width,
            right_width: columns.right_width,
        }
    }

    /// Total height of all body rows.
    #[allow(clippy::cast_precision_loss)]
    pub fn content_height(&self) -> f32 {
        self.row_count as f32 * self.row_height
    }
}

/// Stage regions derived from the metrics and stage size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub stage_width: f32,
    pub stage_height: f32,
    /// Top of the body region (= header height)
    pub body_top: f32,
    /// Visible body height, excluding header, summary and horizontal scrollbar
    pub body_height: f32,
    pub summary_top: f32,
    /// Left edge of the center group (= left fixed width)
    pub center_left: f32,
    /// Visible width of the center group
    pub center_viewport_width: f32,
    /// Left edge of the right fixed group
    pub right_left: f32,
    pub vertical_bar: bool,
    pub horizontal_bar: bool,
    pub max_scroll_x: f32,
    pub max_scroll_y: f32,
}

/// Maximum scroll offsets on each axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollLimits {
    pub max_scroll_x: f32,
    pub max_scroll_y: f32,
}

/// What a scroll update changed
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollChange {
    /// The offset actually moved after clamping
    pub moved: bool,
    /// The visible row window was recomputed
    pub window_changed: bool,
}

/// Viewport state - the visible area of the grid
#[derive(Debug, Clone)]
pub struct Viewport {
    /// Horizontal scroll of the center group
    pub scroll_x: f32,
    /// Vertical scroll of all body groups
    pub scroll_y: f32,
    /// First row of the materialized window (inclusive)
    pub visible_row_start: usize,
    /// End of the materialized window (exclusive)
    pub visible_row_end: usize,
    pub stage_width: f32,
    pub stage_height: f32,
    metrics: GridMetrics,
}

/// Row index containing `y`.
/// The cast is safe: `y` is finite and non-negative, and the result saturates.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn row_index(y: f32, row_height: f32) -> usize {
    if !y.is_finite() || y <= 0.0 || row_height <= 0.0 {
        return 0;
    }
    (y / row_height).floor() as usize
}

/// Number of rows needed to cover `height`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rows_to_cover(height: f32, row_height: f32) -> usize {
    if !height.is_finite() || height <= 0.0 || row_height <= 0.0 {
        return 0;
    }
    (height / row_height).ceil() as usize
}

impl Viewport {
    pub fn new(metrics: GridMetrics, stage_width: f32, stage_height: f32) -> Self {
        let mut viewport = Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            visible_row_start: 0,
            visible_row_end: 0,
            stage_width: stage_width.max(0.0),
            stage_height: stage_height.max(0.0),
            metrics,
        };
        viewport.calculate_visible_rows();
        viewport
    }

    pub fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    /// Replace the size inputs (new dataset, new columns, new config).
    /// Scroll offsets are re-clamped and the row window recomputed.
    pub fn set_metrics(&mut self, metrics: GridMetrics) {
        self.metrics = metrics;
        self.clamp_scroll();
        self.calculate_visible_rows();
    }

    /// Resize the stage.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.stage_width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        self.stage_height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        self.clamp_scroll();
        self.calculate_visible_rows();
    }

    /// Compute stage regions, scrollbar presence and scroll limits.
    ///
    /// A scrollbar's thickness is reserved only when that scrollbar exists,
    /// and the two bars depend on each other: a horizontal bar steals body
    /// height, which can make a vertical bar necessary and vice versa.
    pub fn frame(&self) -> Frame {
        let m = &self.metrics;
        let thickness = m.scrollbar_thickness;
        let content_height = m.content_height();
        let avail_height = (self.stage_height - m.header_height - m.summary_height).max(0.0);
        let avail_width = (self.stage_width - m.left_width - m.right_width).max(0.0);

        let mut vertical_bar = content_height > avail_height;
        let horizontal_bar =
            m.center_width > avail_width - if vertical_bar { thickness } else { 0.0 };
        if horizontal_bar && !vertical_bar {
            vertical_bar = content_height > avail_height - thickness;
        }

        let h_reserve = if horizontal_bar { thickness } else { 0.0 };
        let v_reserve = if vertical_bar { thickness } else { 0.0 };
        let body_height = (avail_height - h_reserve).max(0.0);
        let center_viewport_width = (avail_width - v_reserve).max(0.0);

        Frame {
            stage_width: self.stage_width,
            stage_height: self.stage_height,
            body_top: m.header_height,
            body_height,
            summary_top: m.header_height + body_height,
            center_left: m.left_width,
            center_viewport_width,
            right_left: m.left_width + center_viewport_width,
            vertical_bar,
            horizontal_bar,
            max_scroll_x: (m.center_width - center_viewport_width).max(0.0),
            max_scroll_y: (content_height - body_height).max(0.0),
        }
    }

    pub fn get_scroll_limits(&self) -> ScrollLimits {
        let frame = self.frame();
        ScrollLimits {
            max_scroll_x: frame.max_scroll_x,
            max_scroll_y: frame.max_scroll_y,
        }
    }

    /// Recompute the visible row window around the current scroll position.
    ///
    /// `start = floor(scroll_y / row_height) - buffer` (clamped at 0) and
    /// `end = start + ceil(body_height / row_height) + 2 * buffer`
    /// (clamped at the row count). Returns `(start, end)`, end exclusive.
    pub fn calculate_visible_rows(&mut self) -> (usize, usize) {
        let m = self.metrics;
        let frame = self.frame();
        let first = row_index(self.scroll_y, m.row_height);
        let start = first.saturating_sub(m.buffer_rows).min(m.row_count);
        let span = rows_to_cover(frame.body_height, m.row_height)
            .saturating_add(m.buffer_rows.saturating_mul(2));
        let end = start.saturating_add(span).min(m.row_count);
        self.visible_row_start = start;
        self.visible_row_end = end;
        (start, end)
    }

    /// Longest window `calculate_visible_rows` can produce for the current stage.
    pub fn window_capacity(&self) -> usize {
        let frame = self.frame();
        rows_to_cover(frame.body_height, self.metrics.row_height)
            .saturating_add(self.metrics.buffer_rows.saturating_mul(2))
            .max(1)
    }

    /// Rows geometrically on screen, end exclusive, ignoring the buffer.
    pub fn on_screen_rows(&self) -> (usize, usize) {
        let m = &self.metrics;
        let frame = self.frame();
        let first = row_index(self.scroll_y, m.row_height).min(m.row_count);
        let last = rows_to_cover(self.scroll_y + frame.body_height, m.row_height).min(m.row_count);
        (first, last.max(first))
    }

    /// Keep the current window while the on-screen rows still fit inside it;
    /// otherwise recompute. Returns true when the window moved.
    pub fn refresh_visible_rows(&mut self) -> bool {
        let (first, last) = self.on_screen_rows();
        let inside = first >= self.visible_row_start
            && last <= self.visible_row_end
            && (first < self.visible_row_end || self.metrics.row_count == 0);
        if inside {
            return false;
        }
        let before = (self.visible_row_start, self.visible_row_end);
        let after = self.calculate_visible_rows();
        before != after
    }

    /// Clamp scroll offsets into `[0, max]` on both axes.
    pub fn clamp_scroll(&mut self) {
        let limits = self.get_scroll_limits();
        self.scroll_x = clamp_offset(self.scroll_x, limits.max_scroll_x);
        self.scroll_y = clamp_offset(self.scroll_y, limits.max_scroll_y);
    }

    /// Scroll vertically by `delta_y`, clamped into `[0, max_scroll_y]`.
    pub fn update_vertical_scroll(&mut self, delta_y: f32) -> ScrollChange {
        let delta = if delta_y.is_finite() { delta_y } else { 0.0 };
        let target = self.scroll_y + delta;
        self.set_scroll_y(target)
    }

    /// Scroll horizontally by `delta_x`, clamped into `[0, max_scroll_x]`.
    pub fn update_horizontal_scroll(&mut self, delta_x: f32) -> ScrollChange {
        let delta = if delta_x.is_finite() { delta_x } else { 0.0 };
        let target = self.scroll_x + delta;
        self.set_scroll_x(target)
    }

    /// Jump to an absolute vertical offset (clamped).
    pub fn set_scroll_y(&mut self, y: f32) -> ScrollChange {
        let limits = self.get_scroll_limits();
        let new_y = clamp_offset(y, limits.max_scroll_y);
        let moved = (new_y - self.scroll_y).abs() > f32::EPSILON;
        self.scroll_y = new_y;
        let window_changed = moved && self.refresh_visible_rows();
        ScrollChange {
            moved,
            window_changed,
        }
    }

    /// Jump to an absolute horizontal offset (clamped).
    pub fn set_scroll_x(&mut self, x: f32) -> ScrollChange {
        let limits = self.get_scroll_limits();
        let new_x = clamp_offset(x, limits.max_scroll_x);
        let moved = (new_x - self.scroll_x).abs() > f32::EPSILON;
        self.scroll_x = new_x;
        ScrollChange {
            moved,
            window_changed: false,
        }
    }

    /// Back to the top-left corner.
    pub fn reset_scroll(&mut self) {
        self.scroll_x = 0.0;
        self.scroll_y = 0.0;
        self.calculate_visible_rows();
    }

    /// Body row under a stage y coordinate (header/summary/out of range → None).
    pub fn row_at_y(&self, y: f32) -> Option<usize> {
        let frame = self.frame();
        if !y.is_finite() || y < frame.body_top || y >= frame.body_top + frame.body_height {
            return None;
        }
        let row = row_index(y - frame.body_top + self.scroll_y, self.metrics.row_height);
        (row < self.metrics.row_count).then_some(row)
    }

    /// Column under a stage x coordinate, with the bucket it belongs to.
    ///
    /// Fixed buckets ignore `scroll_x`; the center bucket adds it back.
    pub fn column_at_x(&self, x: f32, columns: &ColumnLayout) -> Option<(Bucket, usize)> {
        if !x.is_finite() || x < 0.0 {
            return None;
        }
        let frame = self.frame();
        let (bucket, local_x) = if x < frame.center_left {
            (Bucket::Left, x)
        } else if x < frame.right_left {
            (Bucket::Center, x - frame.center_left + self.scroll_x)
        } else if x < frame.right_left + self.metrics.right_width {
            (Bucket::Right, x - frame.right_left)
        } else {
            return None;
        };
        columns.column_at_x(bucket, local_x).map(|col| (bucket, col))
    }
}

fn clamp_offset(value: f32, max: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, max.max(0.0))
}
