//! Rectangle and viewport math shared by the overlay renderer and the
//! tooltip controller. Rects produced by a [`crate::layout::LayoutProvider`]
//! are in document coordinates; the viewport converts between document and
//! viewport space using its scroll offsets.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
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

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Scrollable viewport over the laid-out document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// Document-coordinate rect to viewport coordinates (what
    /// `getBoundingClientRect` reports in a browser).
    pub fn to_viewport(&self, rect: Rect) -> Rect {
        rect.translated(-self.scroll_x, -self.scroll_y)
    }

    /// Viewport-coordinate rect to document coordinates.
    pub fn to_document(&self, rect: Rect) -> Rect {
        rect.translated(self.scroll_x, self.scroll_y)
    }
}
