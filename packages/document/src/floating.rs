//! # Floating Layer
//!
//! Freely positioned images overlaid on the flow layer. Coordinates are in
//! canvas pixels relative to the canvas inner box (padding excluded).

use serde::{Deserialize, Serialize};

use crate::document::MIN_IMAGE_WIDTH;

/// Slack for float rounding in `x + width <= inner`
const BOUNDS_TOLERANCE: f64 = 1e-9;

/// Kind of floating item (only images today)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatingKind {
    #[default]
    Image,
}

/// Freely positioned image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatingItem {
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: FloatingKind,

    pub src: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,

    #[serde(default)]
    pub z_index: i64,
}

/// Position and size of a floating item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Width / height, 1.0 for degenerate rects
    pub fn aspect_ratio(&self) -> f64 {
        if self.height > 0.0 && self.width > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Bring the rect inside a canvas of the given inner width
    ///
    /// Width is floored at `MIN_IMAGE_WIDTH` and capped at the inner width,
    /// then `x` is clamped to `[0, inner - width]` and `y` to `>= 0`.
    pub fn clamp_within(self, inner_width: f64) -> Rect {
        let width = clamp_width(self.width, inner_width);
        Rect {
            x: clamp_x(self.x, width, inner_width),
            y: clamp_y(self.y),
            width,
            height: if self.height.is_finite() && self.height > 0.0 {
                self.height
            } else {
                MIN_IMAGE_WIDTH
            },
        }
    }
}

pub fn clamp_width(width: f64, inner_width: f64) -> f64 {
    let max = inner_width.max(MIN_IMAGE_WIDTH);
    if width.is_finite() {
        width.clamp(MIN_IMAGE_WIDTH, max)
    } else {
        MIN_IMAGE_WIDTH
    }
}

pub fn clamp_x(x: f64, width: f64, inner_width: f64) -> f64 {
    let max = (inner_width - width).max(0.0);
    if x.is_finite() {
        x.clamp(0.0, max)
    } else {
        0.0
    }
}

pub fn clamp_y(y: f64) -> f64 {
    if y.is_finite() {
        y.max(0.0)
    } else {
        0.0
    }
}

impl FloatingItem {
    pub fn image(id: impl Into<String>, src: impl Into<String>, rect: Rect, z_index: i64) -> Self {
        Self {
            id: id.into(),
            kind: FloatingKind::Image,
            src: src.into(),
            alt: None,
            caption: None,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            z_index,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }

    /// True when the item satisfies the canvas bounds invariants
    pub fn is_within(&self, inner_width: f64) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width >= MIN_IMAGE_WIDTH
            && self.x + self.width <= inner_width + BOUNDS_TOLERANCE
    }
}
