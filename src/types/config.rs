use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::render::colors::{normalize_color, palette};

/// Modifier key that turns a vertical wheel gesture into horizontal scrolling
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum WheelModifier {
    #[default]
    Shift,
    Alt,
    Ctrl,
}

/// Modifier keys held during an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub fn holds(self, modifier: WheelModifier) -> bool {
        match modifier {
            WheelModifier::Shift => self.shift,
            WheelModifier::Alt => self.alt,
            WheelModifier::Ctrl => self.ctrl,
        }
    }
}

/// Style and behavior configuration for the grid.
///
/// Every field has a default so hosts can send partial objects. Changing the
/// config on a live grid triggers a redraw, never a remount.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    // Header
    pub header_height: f32,
    pub header_bg_color: String,
    pub header_text_color: String,
    pub header_font: String,

    // Body
    pub row_height: f32,
    pub body_bg_color: String,
    /// Background for odd rows
    pub body_stripe_color: String,
    pub body_text_color: String,
    pub body_font: String,
    pub grid_line_color: String,

    // Summary row
    pub show_summary: bool,
    pub summary_height: f32,
    pub summary_bg_color: String,
    pub summary_text_color: String,

    // Hover highlight
    pub row_highlight_color: String,
    pub col_highlight_color: String,

    // Scrollbars
    pub scrollbar_thickness: f32,
    pub min_thumb_size: f32,
    pub scrollbar_track_color: String,
    pub scrollbar_thumb_color: String,

    // Layout and scrolling tunables
    pub min_column_width: f32,
    pub buffer_rows: usize,
    /// Accumulated wheel distance (px) that forces a dispatch
    pub wheel_threshold: f32,
    /// Minimum time (ms) between two wheel dispatches
    pub wheel_interval_ms: f64,
    pub horizontal_wheel_modifier: WheelModifier,

    // Popovers
    pub popover_margin: f32,

    /// Quiet period (ms) before a resize is applied
    pub resize_debounce_ms: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            header_height: 36.0,
            header_bg_color: palette::HEADER_BG.to_string(),
            header_text_color: palette::HEADER_TEXT.to_string(),
            header_font: "600 13px -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif"
                .to_string(),
            row_height: 30.0,
            body_bg_color: palette::WHITE.to_string(),
            body_stripe_color: palette::STRIPE.to_string(),
            body_text_color: palette::BODY_TEXT.to_string(),
            body_font: "13px -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif"
                .to_string(),
            grid_line_color: palette::GRID_LINE.to_string(),
            show_summary: true,
            summary_height: 30.0,
            summary_bg_color: palette::SUMMARY_BG.to_string(),
            summary_text_color: palette::HEADER_TEXT.to_string(),
            row_highlight_color: palette::ROW_HIGHLIGHT.to_string(),
            col_highlight_color: palette::COL_HIGHLIGHT.to_string(),
            scrollbar_thickness: 10.0,
            min_thumb_size: 20.0,
            scrollbar_track_color: palette::SCROLLBAR_TRACK.to_string(),
            scrollbar_thumb_color: palette::SCROLLBAR_THUMB.to_string(),
            min_column_width: 80.0,
            buffer_rows: 5,
            wheel_threshold: 4.0,
            wheel_interval_ms: 16.0,
            horizontal_wheel_modifier: WheelModifier::Shift,
            popover_margin: 5.0,
            resize_debounce_ms: 100.0,
        }
    }
}

impl GridConfig {
    /// Decode a (possibly partial) config from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.validate()?;
        config.normalize_colors();
        Ok(config)
    }

    /// Rewrite colors into a form Canvas 2D accepts (`FF0000` → `#FF0000`).
    pub fn normalize_colors(&mut self) {
        for color in [
            &mut self.header_bg_color,
            &mut self.header_text_color,
            &mut self.body_bg_color,
            &mut self.body_stripe_color,
            &mut self.body_text_color,
            &mut self.grid_line_color,
            &mut self.summary_bg_color,
            &mut self.summary_text_color,
            &mut self.row_highlight_color,
            &mut self.col_highlight_color,
            &mut self.scrollbar_track_color,
            &mut self.scrollbar_thumb_color,
        ] {
            if let Some(normalized) = normalize_color(color) {
                *color = normalized;
            }
        }
    }

    /// Height of the summary row, or 0 when it is hidden.
    pub fn effective_summary_height(&self) -> f32 {
        if self.show_summary {
            self.summary_height
        } else {
            0.0
        }
    }

    /// Reject sizes that would break layout math and colors the canvas cannot use.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("rowHeight", self.row_height),
            ("minColumnWidth", self.min_column_width),
            ("minThumbSize", self.min_thumb_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(GridError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        let non_negative = [
            ("headerHeight", self.header_height),
            ("summaryHeight", self.summary_height),
            ("scrollbarThickness", self.scrollbar_thickness),
            ("wheelThreshold", self.wheel_threshold),
            ("popoverMargin", self.popover_margin),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(GridError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("wheelIntervalMs", self.wheel_interval_ms),
            ("resizeDebounceMs", self.resize_debounce_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(GridError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        let colors = [
            ("headerBgColor", &self.header_bg_color),
            ("headerTextColor", &self.header_text_color),
            ("bodyBgColor", &self.body_bg_color),
            ("bodyStripeColor", &self.body_stripe_color),
            ("bodyTextColor", &self.body_text_color),
            ("gridLineColor", &self.grid_line_color),
            ("summaryBgColor", &self.summary_bg_color),
            ("summaryTextColor", &self.summary_text_color),
            ("rowHighlightColor", &self.row_highlight_color),
            ("colHighlightColor", &self.col_highlight_color),
            ("scrollbarTrackColor", &self.scrollbar_track_color),
            ("scrollbarThumbColor", &self.scrollbar_thumb_color),
        ];
        for (name, value) in colors {
            if normalize_color(value).is_none() {
                return Err(GridError::InvalidConfig(format!(
                    "{name} is not a color: {value:?}"
                )));
            }
        }
        Ok(())
    }
}
