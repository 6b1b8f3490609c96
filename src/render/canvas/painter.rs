//! Canvas 2D backend.
//!
//! Paints one layer at a time: clip to the layer's stage rectangle, clear it,
//! fill the layer background, then draw the layer's visible shapes with the
//! layer translation applied.

use std::collections::HashMap;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::text::fit_text;
use crate::error::{GridError, Result};
use crate::render::backend::RenderBackend;
use crate::render::layers::Layer;
use crate::render::shapes::{Shape, ShapeKind};
use crate::types::Align;

/// Horizontal text inset inside a cell
const CELL_PADDING: f64 = 8.0;
const TEXT_MEASURE_CACHE_CAP: usize = 4096;

/// Canvas 2D painter
pub struct CanvasPainter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: u32,
    height: u32,
    dpr: f32,
    /// `font\ntext` → measured width
    text_widths: HashMap<String, f64>,
}

impl CanvasPainter {
    /// Create a painter from an HtmlCanvasElement
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| GridError::MissingSurface("failed to get 2d context".into()))?
            .ok_or_else(|| GridError::MissingSurface("no 2d context available".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| GridError::MissingSurface("not a CanvasRenderingContext2d".into()))?;
        let width = canvas.width();
        let height = canvas.height();
        Ok(Self {
            canvas,
            ctx,
            width,
            height,
            dpr: 1.0,
            text_widths: HashMap::new(),
        })
    }

    /// Helper to get crisp pixel position for 1px lines
    fn crisp(x: f64) -> f64 {
        x.floor() + 0.5
    }

    fn measure(&mut self, font: &str, text: &str) -> f64 {
        let key = format!("{font}\n{text}");
        if let Some(width) = self.text_widths.get(&key) {
            return *width;
        }
        let width = self.ctx.measure_text(text).map_or(0.0, |m| m.width());
        if self.text_widths.len() >= TEXT_MEASURE_CACHE_CAP {
            self.text_widths.clear();
        }
        self.text_widths.insert(key, width);
        width
    }

    fn draw_rect(&self, shape: &Shape, x: f64, y: f64) {
        let w = f64::from(shape.rect.width);
        let h = f64::from(shape.rect.height);
        if !shape.fill.is_empty() {
            self.ctx.set_fill_style_str(&shape.fill);
            self.ctx.fill_rect(x, y, w, h);
        }
        if let Some(stroke) = &shape.stroke {
            // Right and bottom edges only, so neighbours do not double up
            self.ctx.begin_path();
            self.ctx.set_stroke_style_str(stroke);
            self.ctx.set_line_width(1.0);
            self.ctx.move_to(Self::crisp(x + w - 1.0), y);
            self.ctx.line_to(Self::crisp(x + w - 1.0), y + h);
            self.ctx.move_to(x, Self::crisp(y + h - 1.0));
            self.ctx.line_to(x + w, Self::crisp(y + h - 1.0));
            self.ctx.stroke();
        }
    }

    fn draw_text(&mut self, shape: &Shape, font: &str, x: f64, y: f64) {
        let w = f64::from(shape.rect.width);
        let h = f64::from(shape.rect.height);
        let available = w - 2.0 * CELL_PADDING;
        if available <= 0.0 || shape.text.is_empty() {
            return;
        }
        let text = {
            let mut measure = |s: &str| self.measure(font, s);
            fit_text(&shape.text, available, &mut measure).into_owned()
        };
        if text.is_empty() {
            return;
        }
        let tx = match shape.align {
            Align::Left => x + CELL_PADDING,
            Align::Center => x + w / 2.0,
            Align::Right => x + w - CELL_PADDING,
        };
        self.ctx.set_fill_style_str(&shape.fill);
        self.ctx.set_text_align(shape.align.as_css());
        let _ = self.ctx.fill_text(&text, tx, y + h / 2.0);
    }
}

impl RenderBackend for CanvasPainter {
    fn resize(&mut self, width: u32, height: u32, dpr: f32) {
        self.width = width;
        self.height = height;
        self.dpr = dpr;
        self.text_widths.clear();

        // Set canvas buffer size to physical pixels
        self.canvas.set_width(width);
        self.canvas.set_height(height);

        // Scale context for DPR (all drawing uses logical coordinates after this)
        let _ = self.ctx.reset_transform();
        let _ = self.ctx.scale(f64::from(dpr), f64::from(dpr));
    }

    fn paint_layer(&mut self, layer: &Layer) -> Result<()> {
        let clip = layer.clip;
        let (cx, cy) = (f64::from(clip.x), f64::from(clip.y));
        let (cw, ch) = (f64::from(clip.width), f64::from(clip.height));

        self.ctx.save();
        self.ctx.begin_path();
        self.ctx.rect(cx, cy, cw, ch);
        self.ctx.clip();
        self.ctx.clear_rect(cx, cy, cw, ch);
        if !layer.background.is_empty() {
            self.ctx.set_fill_style_str(&layer.background);
            self.ctx.fill_rect(cx, cy, cw, ch);
        }
        self.ctx.set_font(&layer.font);
        self.ctx.set_text_baseline("middle");

        let (ox, oy) = layer.to_stage(0.0, 0.0);
        for (_, shape) in layer.scene.visible() {
            let stage = shape.rect.translate(ox, oy);
            if !stage.intersects(&clip) {
                continue;
            }
            let (x, y) = (f64::from(stage.x), f64::from(stage.y));
            match shape.kind {
                ShapeKind::Rect => self.draw_rect(shape, x, y),
                ShapeKind::Text => self.draw_text(shape, &layer.font, x, y),
            }
        }
        self.ctx.restore();
        Ok(())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
