//! Synthetic scrollbars and wheel input.
//!
//! Thumb sizing follows the proportional formula
//! `thumb = max(min_thumb, track² / content)` and thumb position is a
//! linear interpolation of scroll progress over the track travel. Dragging
//! maps pointer deltas back into scroll space through the inverse of that
//! interpolation. Wheel deltas go through [`wheel_to_scroll`] and a
//! [`WheelAccumulator`] before they reach the viewport.

use crate::layout::{Frame, GridMetrics};
use crate::render::shapes::Rect;
use crate::types::{Modifiers, WheelModifier};

/// Scroll axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollAxis {
    Vertical,
    Horizontal,
}

/// Proportional thumb length, or `None` when there is nothing to scroll.
///
/// Not clamped to the track: callers that draw the thumb cap it at the
/// track length themselves.
pub fn thumb_length(track: f32, content: f32, min_thumb: f32) -> Option<f32> {
    if !track.is_finite() || !content.is_finite() || track <= 0.0 || content <= 0.0 {
        return None;
    }
    Some((track * track / content).max(min_thumb))
}

/// Distance of the thumb from the start of its track.
pub fn thumb_offset(scroll: f32, max_scroll: f32, track: f32, thumb: f32) -> f32 {
    if max_scroll <= 0.0 || !scroll.is_finite() {
        return 0.0;
    }
    let travel = (track - thumb).max(0.0);
    (scroll / max_scroll).clamp(0.0, 1.0) * travel
}

/// Scroll distance corresponding to moving the thumb by `delta` pixels.
pub fn scroll_for_thumb_delta(delta: f32, max_scroll: f32, track: f32, thumb: f32) -> f32 {
    let travel = track - thumb;
    if travel <= 0.0 || max_scroll <= 0.0 || !delta.is_finite() {
        return 0.0;
    }
    delta * max_scroll / travel
}

/// Stage-space rectangles of one scrollbar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbGeometry {
    pub axis: ScrollAxis,
    pub track: Rect,
    pub thumb: Rect,
    pub max_scroll: f32,
}

impl ThumbGeometry {
    /// Track length along the scroll axis.
    pub fn track_length(&self) -> f32 {
        match self.axis {
            ScrollAxis::Vertical => self.track.height,
            ScrollAxis::Horizontal => self.track.width,
        }
    }

    /// Thumb length along the scroll axis.
    pub fn thumb_length(&self) -> f32 {
        match self.axis {
            ScrollAxis::Vertical => self.thumb.height,
            ScrollAxis::Horizontal => self.thumb.width,
        }
    }

    /// Pick the coordinate along this axis.
    pub fn along(&self, x: f32, y: f32) -> f32 {
        match self.axis {
            ScrollAxis::Vertical => y,
            ScrollAxis::Horizontal => x,
        }
    }

    /// Classify a stage point against this scrollbar.
    pub fn hit(&self, x: f32, y: f32) -> Option<ScrollbarHit> {
        if !self.track.contains(x, y) {
            return None;
        }
        if self.thumb.contains(x, y) {
            return Some(ScrollbarHit::Thumb);
        }
        let (pos, thumb_start) = match self.axis {
            ScrollAxis::Vertical => (y, self.thumb.y),
            ScrollAxis::Horizontal => (x, self.thumb.x),
        };
        Some(if pos < thumb_start {
            ScrollbarHit::TrackBefore
        } else {
            ScrollbarHit::TrackAfter
        })
    }
}

/// Where a pointer landed on a scrollbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollbarHit {
    Thumb,
    /// Track area above/left of the thumb
    TrackBefore,
    /// Track area below/right of the thumb
    TrackAfter,
}

/// Both scrollbars for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollbarGeometry {
    pub vertical: Option<ThumbGeometry>,
    pub horizontal: Option<ThumbGeometry>,
}

impl ScrollbarGeometry {
    /// Build the scrollbars that exist for this frame. A bar exists only
    /// while its axis can actually scroll.
    pub fn compute(
        frame: &Frame,
        metrics: &GridMetrics,
        scroll_x: f32,
        scroll_y: f32,
        min_thumb: f32,
    ) -> Self {
        let thickness = metrics.scrollbar_thickness;
        let vertical = if frame.vertical_bar && frame.max_scroll_y > 0.0 {
            let track = Rect::new(
                frame.stage_width - thickness,
                frame.body_top,
                thickness,
                frame.body_height,
            );
            thumb_length(track.height, metrics.content_height(), min_thumb).map(|len| {
                let len = len.min(track.height);
                let offset = thumb_offset(scroll_y, frame.max_scroll_y, track.height, len);
                ThumbGeometry {
                    axis: ScrollAxis::Vertical,
                    track,
                    thumb: Rect::new(track.x, track.y + offset, thickness, len),
                    max_scroll: frame.max_scroll_y,
                }
            })
        } else {
            None
        };
        let horizontal = if frame.horizontal_bar && frame.max_scroll_x > 0.0 {
            let track = Rect::new(
                frame.center_left,
                frame.stage_height - thickness,
                frame.center_viewport_width,
                thickness,
            );
            thumb_length(track.width, metrics.center_width, min_thumb).map(|len| {
                let len = len.min(track.width);
                let offset = thumb_offset(scroll_x, frame.max_scroll_x, track.width, len);
                ThumbGeometry {
                    axis: ScrollAxis::Horizontal,
                    track,
                    thumb: Rect::new(track.x + offset, track.y, len, thickness),
                    max_scroll: frame.max_scroll_x,
                }
            })
        } else {
            None
        };
        Self {
            vertical,
            horizontal,
        }
    }

    pub fn get(&self, axis: ScrollAxis) -> Option<&ThumbGeometry> {
        match axis {
            ScrollAxis::Vertical => self.vertical.as_ref(),
            ScrollAxis::Horizontal => self.horizontal.as_ref(),
        }
    }

    /// First scrollbar under a stage point.
    pub fn hit(&self, x: f32, y: f32) -> Option<(ScrollAxis, ScrollbarHit)> {
        [self.vertical, self.horizontal]
            .into_iter()
            .flatten()
            .find_map(|g| g.hit(x, y).map(|hit| (g.axis, hit)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ThumbDrag {
    axis: ScrollAxis,
    /// Pointer position along the axis at press time
    origin: f32,
    /// Scroll offset at press time
    start_scroll: f32,
}

/// Tracks an in-progress thumb drag
#[derive(Debug, Default, Clone)]
pub struct ScrollbarController {
    drag: Option<ThumbDrag>,
}

impl ScrollbarController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_axis(&self) -> Option<ScrollAxis> {
        self.drag.map(|d| d.axis)
    }

    /// Record the pointer origin and current scroll offset.
    pub fn begin_drag(&mut self, axis: ScrollAxis, pointer: f32, scroll: f32) {
        tracing::trace!(?axis, pointer, scroll, "thumb drag started");
        self.drag = Some(ThumbDrag {
            axis,
            origin: pointer,
            start_scroll: scroll,
        });
    }

    /// Absolute scroll target for the pointer's current position along the
    /// drag axis. The viewport clamps it.
    pub fn drag_to(&self, pointer: f32, geometry: &ThumbGeometry) -> Option<(ScrollAxis, f32)> {
        let drag = self.drag?;
        if drag.axis != geometry.axis {
            return None;
        }
        let delta = scroll_for_thumb_delta(
            pointer - drag.origin,
            geometry.max_scroll,
            geometry.track_length(),
            geometry.thumb_length(),
        );
        Some((drag.axis, drag.start_scroll + delta))
    }

    /// Finish the drag. Returns true when one was active.
    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }
}

/// Map a wheel event to `(dx, dy)` scroll deltas.
///
/// Native horizontal deltas pass through. With the configured modifier held,
/// a purely vertical gesture scrolls horizontally instead.
pub fn wheel_to_scroll(
    delta_x: f32,
    delta_y: f32,
    modifiers: Modifiers,
    horizontal_modifier: WheelModifier,
) -> (f32, f32) {
    let dx = if delta_x.is_finite() { delta_x } else { 0.0 };
    let dy = if delta_y.is_finite() { delta_y } else { 0.0 };
    if modifiers.holds(horizontal_modifier) && dx == 0.0 {
        (dy, 0.0)
    } else {
        (dx, dy)
    }
}

/// `WheelEvent.deltaMode` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDeltaMode {
    Pixel,
    Line,
    Page,
}

impl WheelDeltaMode {
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }

    /// Convert a delta in this mode into pixels.
    pub fn to_pixels(self, delta: f32, line: f32, page: f32) -> f32 {
        match self {
            Self::Pixel => delta,
            Self::Line => delta * line,
            Self::Page => delta * page,
        }
    }
}

/// Batches small, frequent wheel deltas.
///
/// Deltas are summed and released once the accumulated magnitude reaches
/// the threshold or the minimum interval since the last release has passed.
#[derive(Debug, Clone)]
pub struct WheelAccumulator {
    threshold: f32,
    interval_ms: f64,
    dx: f32,
    dy: f32,
    last_dispatch_ms: Option<f64>,
}

impl WheelAccumulator {
    pub fn new(threshold: f32, interval_ms: f64) -> Self {
        Self {
            threshold,
            interval_ms,
            dx: 0.0,
            dy: 0.0,
            last_dispatch_ms: None,
        }
    }

    /// Apply new tunables; pending deltas are kept.
    pub fn configure(&mut self, threshold: f32, interval_ms: f64) {
        self.threshold = threshold;
        self.interval_ms = interval_ms;
    }

    /// Deltas not dispatched yet.
    pub fn pending(&self) -> Option<(f32, f32)> {
        (self.dx != 0.0 || self.dy != 0.0).then_some((self.dx, self.dy))
    }

    fn interval_elapsed(&self, now_ms: f64) -> bool {
        self.last_dispatch_ms
            .map_or(true, |last| now_ms - last >= self.interval_ms)
    }

    fn take(&mut self, now_ms: f64) -> Option<(f32, f32)> {
        let pending = self.pending()?;
        self.dx = 0.0;
        self.dy = 0.0;
        self.last_dispatch_ms = Some(now_ms);
        Some(pending)
    }

    /// Add a delta; returns the accumulated deltas when they should be
    /// applied now.
    pub fn push(&mut self, dx: f32, dy: f32, now_ms: f64) -> Option<(f32, f32)> {
        if dx.is_finite() {
            self.dx += dx;
        }
        if dy.is_finite() {
            self.dy += dy;
        }
        let magnitude = self.dx.abs().max(self.dy.abs());
        if magnitude >= self.threshold || self.interval_elapsed(now_ms) {
            self.take(now_ms)
        } else {
            None
        }
    }

    /// Release leftovers once the interval has passed (called on the next frame).
    pub fn flush(&mut self, now_ms: f64) -> Option<(f32, f32)> {
        if self.interval_elapsed(now_ms) {
            self.take(now_ms)
        } else {
            None
        }
    }

    /// Drop pending deltas.
    pub fn reset(&mut self) {
        self.dx = 0.0;
        self.dy = 0.0;
        self.last_dispatch_ms = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_thumb_length_formula() {
        assert_eq!(thumb_length(600.0, 300_000.0, 20.0), Some(20.0));
        assert_eq!(thumb_length(600.0, 1200.0, 20.0), Some(300.0));
        assert_eq!(thumb_length(600.0, 0.0, 20.0), None);
    }

    #[test]
    fn test_thumb_offset_ends() {
        assert_eq!(thumb_offset(0.0, 1000.0, 600.0, 100.0), 0.0);
        assert_eq!(thumb_offset(1000.0, 1000.0, 600.0, 100.0), 500.0);
        assert_eq!(thumb_offset(10.0, 0.0, 600.0, 100.0), 0.0);
    }

    #[test]
    fn test_drag_inverse_mapping() {
        let geometry = ThumbGeometry {
            axis: ScrollAxis::Vertical,
            track: Rect::new(0.0, 0.0, 10.0, 600.0),
            thumb: Rect::new(0.0, 0.0, 10.0, 100.0),
            max_scroll: 1000.0,
        };
        let mut ctl = ScrollbarController::new();
        ctl.begin_drag(ScrollAxis::Vertical, 50.0, 200.0);
        // 250px of thumb travel is half of 500px travel
        let (_, target) = ctl.drag_to(300.0, &geometry).unwrap();
        assert_eq!(target, 700.0);
        assert!(ctl.end_drag());
        assert!(ctl.drag_to(310.0, &geometry).is_none());
    }

    #[test]
    fn test_shift_wheel_scrolls_horizontally() {
        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        assert_eq!(
            wheel_to_scroll(0.0, 40.0, shift, WheelModifier::Shift),
            (40.0, 0.0)
        );
        assert_eq!(
            wheel_to_scroll(0.0, 40.0, Modifiers::default(), WheelModifier::Shift),
            (0.0, 40.0)
        );
        assert_eq!(
            wheel_to_scroll(12.0, 3.0, Modifiers::default(), WheelModifier::Shift),
            (12.0, 3.0)
        );
    }

    #[test]
    fn test_accumulator_threshold_and_interval() {
        let mut acc = WheelAccumulator::new(4.0, 16.0);
        // First delta dispatches: no previous dispatch
        assert_eq!(acc.push(0.0, 1.0, 0.0), Some((0.0, 1.0)));
        // Small deltas within the interval accumulate
        assert_eq!(acc.push(0.0, 1.0, 2.0), None);
        assert_eq!(acc.push(0.0, 1.0, 4.0), None);
        // Threshold reached
        assert_eq!(acc.push(0.0, 2.0, 6.0), Some((0.0, 4.0)));
        assert_eq!(acc.push(0.0, 1.0, 8.0), None);
        assert_eq!(acc.flush(10.0), None);
        assert_eq!(acc.flush(30.0), Some((0.0, 1.0)));
        assert!(acc.pending().is_none());
    }

    #[test]
    fn test_delta_modes() {
        assert_eq!(WheelDeltaMode::from_dom(1).to_pixels(3.0, 30.0, 600.0), 90.0);
        assert_eq!(WheelDeltaMode::from_dom(2).to_pixels(1.0, 30.0, 600.0), 600.0);
        assert_eq!(WheelDeltaMode::from_dom(0).to_pixels(7.0, 30.0, 600.0), 7.0);
    }
}
