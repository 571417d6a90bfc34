//! Plain geometry in AppKit screen coordinates (bottom-left origin, y up).

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Grows both dimensions by `delta` (negative shrinks), never below zero.
    pub fn grow(self, delta: f64) -> Self {
        Self {
            width: (self.width + delta).max(0.0),
            height: (self.height + delta).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Edges count as inside, matching how the bar windows hit-test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.max_x()
            && point.y >= self.y
            && point.y <= self.max_y()
    }

    /// Moves every edge outward by `delta`. A negative delta shrinks the rect
    /// around its center; the size never goes below zero.
    pub fn inflate(&self, delta: f64) -> Rect {
        let width = (self.width + 2.0 * delta).max(0.0);
        let height = (self.height + 2.0 * delta).max(0.0);
        Rect::new(
            self.center_x() - width / 2.0,
            self.y + self.height / 2.0 - height / 2.0,
            width,
            height,
        )
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.max_x().max(other.max_x()) - x,
            self.max_y().max(other.max_y()) - y,
        )
    }

    /// A rect of `size` horizontally centered in `self` whose top edge is
    /// flush with `self`'s top edge.
    pub fn hanging_from_top(&self, size: Size) -> Rect {
        Rect::new(
            self.x + (self.width - size.width) / 2.0,
            self.max_y() - size.height,
            size.width,
            size.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_edge_inclusive() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 30.0)));
        assert!(!r.contains(Point::new(30.1, 20.0)));
        assert!(!r.contains(Point::new(20.0, 9.9)));
    }

    #[test]
    fn inflate_grows_each_side() {
        let r = Rect::new(100.0, 50.0, 40.0, 20.0).inflate(4.0);
        assert_eq!(r, Rect::new(96.0, 46.0, 48.0, 28.0));
    }

    #[test]
    fn inflate_negative_clamps_at_zero() {
        let r = Rect::new(0.0, 0.0, 4.0, 4.0).inflate(-10.0);
        assert_eq!(r.width, 0.0);
        assert_eq!(r.height, 0.0);
        assert_eq!(r.center_x(), 2.0);
    }

    #[test]
    fn union_covers_both() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 10.0, 10.0);
        assert_eq!(a.union(&b), Rect::new(0.0, -5.0, 15.0, 15.0));
    }

    #[test]
    fn hanging_from_top_centers_and_aligns_top() {
        let screen = Rect::new(0.0, 0.0, 1440.0, 900.0);
        let r = screen.hanging_from_top(Size::new(160.0, 30.0));
        assert_eq!(r, Rect::new(640.0, 870.0, 160.0, 30.0));
        assert_eq!(r.max_y(), screen.max_y());
    }

    #[test]
    fn size_grow_never_negative() {
        assert_eq!(Size::new(2.0, 10.0).grow(-4.0), Size::new(0.0, 6.0));
    }
}
