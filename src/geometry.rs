//! Structures used to map areas on the screen

use serde::{Deserialize, Serialize};
use std::{cmp, fmt};
use x11rb::protocol::xproto::ConfigureWindowAux;

// =============================== Point ==============================
// ====================================================================

/// A position relative to the root window
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub(crate) struct Point {
    /// X-coordinate
    pub(crate) x: i32,
    /// Y-coordinate
    pub(crate) y: i32,
}

impl Point {
    /// Create a new [`Point`]
    pub(crate) const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Check if [`Point`] is contained within the given [`Rectangle`]
    pub(crate) const fn is_inside(self, rect: Rectangle) -> bool {
        rect.is_inside(self)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "x: {}, y: {}", self.x, self.y)
    }
}

// ============================= Rectangle ============================
// ====================================================================

/// An area on the screen. Sizes are signed so that intermediate layout
/// arithmetic may dip below zero before it is clamped.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub(crate) struct Rectangle {
    /// Left edge
    pub(crate) x: i32,
    /// Top edge
    pub(crate) y: i32,
    /// Width, excluding any border
    pub(crate) w: i32,
    /// Height, excluding any border
    pub(crate) h: i32,
}

impl Rectangle {
    /// Create a new [`Rectangle`]
    pub(crate) const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Return the top-left corner
    pub(crate) const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Return the center of the [`Rectangle`]
    pub(crate) const fn center(&self) -> Point {
        Point::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Right edge (exclusive)
    pub(crate) const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Bottom edge (exclusive)
    pub(crate) const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Test whether the given [`Point`] is contained within the [`Rectangle`]
    pub(crate) const fn is_inside(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Test whether the given [`Rectangle`] is contained within another
    pub(crate) const fn contains(&self, rect: Self) -> bool {
        rect.x >= self.x
            && rect.y >= self.y
            && rect.right() <= self.right()
            && rect.bottom() <= self.bottom()
    }

    /// Area shared by two [`Rectangle`]s, zero when they do not overlap
    pub(crate) fn intersection_area(&self, other: &Self) -> i32 {
        let w = cmp::max(
            0,
            cmp::min(self.right(), other.right()) - cmp::max(self.x, other.x),
        );
        let h = cmp::max(
            0,
            cmp::min(self.bottom(), other.bottom()) - cmp::max(self.y, other.y),
        );
        w * h
    }

    /// Same origin and size
    pub(crate) const fn same_as(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.w == other.w && self.h == other.h
    }

    /// Convert to a [`ConfigureWindowAux`] carrying a border width
    pub(crate) fn to_aux(self, border: u32) -> ConfigureWindowAux {
        ConfigureWindowAux::new()
            .x(self.x)
            .y(self.y)
            .width(cmp::max(self.w, 1) as u32)
            .height(cmp::max(self.h, 1) as u32)
            .border_width(border)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.w, self.h, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rectangle};

    #[test]
    fn intersection_of_disjoint_rectangles_is_empty() {
        let a = Rectangle::new(0, 0, 100, 100);
        let b = Rectangle::new(100, 0, 100, 100);
        assert_eq!(a.intersection_area(&b), 0);
    }

    #[test]
    fn intersection_of_overlapping_rectangles() {
        let a = Rectangle::new(0, 0, 100, 100);
        let b = Rectangle::new(50, 50, 100, 100);
        assert_eq!(a.intersection_area(&b), 2500);
        assert_eq!(b.intersection_area(&a), 2500);
    }

    #[test]
    fn point_inside_is_half_open() {
        let r = Rectangle::new(10, 10, 20, 20);
        assert!(Point::new(10, 10).is_inside(r));
        assert!(Point::new(29, 29).is_inside(r));
        assert!(!Point::new(30, 10).is_inside(r));
    }

    #[test]
    fn contains_inner_rectangle() {
        let outer = Rectangle::new(0, 0, 1920, 1080);
        assert!(outer.contains(Rectangle::new(10, 10, 100, 100)));
        assert!(!outer.contains(Rectangle::new(1900, 10, 100, 100)));
        assert_eq!(outer.center(), Point::new(960, 540));
    }
}
