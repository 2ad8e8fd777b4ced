/// Axis-aligned rectangles in playfield units (y grows downward).

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            top: y,
            left: x,
            bottom: y + height,
            right: x + width,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        intersects(self, other)
    }
}

/// Separating-axis test. Rectangles that only share an edge are apart.
pub fn intersects(r1: &Rect, r2: &Rect) -> bool {
    !(r2.left >= r1.right
        || r2.right <= r1.left
        || r2.top >= r1.bottom
        || r2.bottom <= r1.top)
}
