//! Retained-mode shape primitives.
//!
//! A [`Scene`] is a flat arena of shapes owned by one layer. Shapes are
//! addressed by [`ShapeId`] and are never removed, only hidden, so ids stay
//! valid for as long as the layer lives.

use serde::Serialize;

use super::colors::CssColor;
use crate::types::Align;

/// Axis-aligned rectangle in layer-local pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    /// Filled (and optionally stroked) rectangle
    Rect,
    /// Single line of text laid out inside `rect`
    Text,
}

/// A drawable primitive
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub rect: Rect,
    /// Fill color; for text shapes this is the text color
    pub fill: CssColor,
    pub stroke: Option<CssColor>,
    pub text: String,
    pub align: Align,
    pub visible: bool,
    /// Data row this shape currently shows, if any
    pub row: Option<usize>,
    /// Declared column this shape currently shows, if any
    pub col: Option<usize>,
}

impl Shape {
    pub fn rect(rect: Rect, fill: impl Into<CssColor>) -> Self {
        Self {
            kind: ShapeKind::Rect,
            rect,
            fill: fill.into(),
            stroke: None,
            text: String::new(),
            align: Align::Left,
            visible: true,
            row: None,
            col: None,
        }
    }

    pub fn text(rect: Rect, text: impl Into<String>, color: impl Into<CssColor>) -> Self {
        Self {
            kind: ShapeKind::Text,
            text: text.into(),
            ..Self::rect(rect, color)
        }
    }

    /// A hidden placeholder, used when growing pools.
    pub fn hidden(kind: ShapeKind) -> Self {
        Self {
            kind,
            visible: false,
            ..Self::rect(Rect::default(), String::new())
        }
    }
}

/// Stable handle to a shape inside one scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ShapeId(pub usize);

/// Arena of shapes belonging to one layer
#[derive(Debug, Clone, Default)]
pub struct Scene {
    shapes: Vec<Shape>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, shape: Shape) -> ShapeId {
        self.shapes.push(shape);
        ShapeId(self.shapes.len() - 1)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.0)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Visible shapes in insertion (= paint) order.
    pub fn visible(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.shapes
            .iter()
            .enumerate()
            .filter(|(_, s)| s.visible)
            .map(|(i, s)| (ShapeId(i), s))
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}
