//! Structures used to map areas on the screen

use serde::{Deserialize, Serialize};
use std::{fmt, ops::Sub, str::FromStr};
use x11rb::protocol::xproto::ConfigureWindowAux;

use crate::error::Error;

// ============================== Padding =============================
// ====================================================================

/// Space reserved on each edge of a monitor before windows are tiled
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Padding {
    /// Padding on the top
    pub(crate) top:    u32,
    /// Padding on the right
    pub(crate) right:  u32,
    /// Padding on the bottom
    pub(crate) bottom: u32,
    /// Padding on the left
    pub(crate) left:   u32,
}

impl Padding {
    /// Create a new [`Padding`]
    pub(crate) const fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self { top, right, bottom, left }
    }

    /// Read the padding of one [`Edge`]
    pub(crate) const fn get(&self, edge: Edge) -> u32 {
        match edge {
            Edge::Top => self.top,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
        }
    }

    /// Change the padding of one [`Edge`]
    pub(crate) fn set(&mut self, edge: Edge, value: u32) {
        match edge {
            Edge::Top => self.top = value,
            Edge::Right => self.right = value,
            Edge::Bottom => self.bottom = value,
            Edge::Left => self.left = value,
        }
    }
}

/// One side of a [`Rectangle`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl FromStr for Edge {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "right" => Ok(Self::Right),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            _ => Err(Error::InvalidDirection(s.to_owned())),
        }
    }
}

// =============================== Point ==============================
// ====================================================================

/// A location on the screen. When this is used with a [`Rectangle`], it
/// represents the top-left corner
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
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:+}{:+}", self.x, self.y)
    }
}

// ============================= Dimension ============================
// ====================================================================

/// The width and height of a [`Rectangle`]
///
/// These are signed so that layout arithmetic on tiny monitors can dip below
/// zero without wrapping; they are clamped when sent to the X server.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub(crate) struct Dimension {
    /// Width of the rectangle
    pub(crate) width:  i32,
    /// Height of the rectangle
    pub(crate) height: i32,
}

impl Dimension {
    /// Create a new [`Dimension`]
    pub(crate) const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ============================= Rectangle ============================
// ====================================================================

/// Equivalent to `xcb_rectangle_t`
///
/// Ordering compares the origin first (`x`, then `y`), which is the order
/// monitors are listed in.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub(crate) struct Rectangle {
    /// Represents the top-left corner of the rectangle
    pub(crate) point:     Point,
    /// The width and height of the rectangle
    pub(crate) dimension: Dimension,
}

impl Rectangle {
    /// Create a new [`Rectangle`]
    pub(crate) const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            point:     Point::new(x, y),
            dimension: Dimension::new(width, height),
        }
    }

    /// Shorthand for the `x` coordinate
    pub(crate) const fn x(&self) -> i32 {
        self.point.x
    }

    /// Shorthand for the `y` coordinate
    pub(crate) const fn y(&self) -> i32 {
        self.point.y
    }

    /// Shorthand for the width
    pub(crate) const fn width(&self) -> i32 {
        self.dimension.width
    }

    /// Shorthand for the height
    pub(crate) const fn height(&self) -> i32 {
        self.dimension.height
    }

    /// Test whether the given [`Point`] is contained within the [`Rectangle`].
    /// The right and bottom edges are exclusive so adjacent monitors never
    /// both claim a point.
    pub(crate) const fn contains(&self, point: Point) -> bool {
        point.x >= self.point.x
            && point.x < self.point.x + self.dimension.width
            && point.y >= self.point.y
            && point.y < self.point.y + self.dimension.height
    }

    /// Create a [`ConfigureWindowAux`] placing a window at this rectangle
    pub(crate) fn to_aux(self) -> ConfigureWindowAux {
        ConfigureWindowAux::new()
            .x(self.point.x)
            .y(self.point.y)
            .width(self.dimension.width.max(1) as u32)
            .height(self.dimension.height.max(1) as u32)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.dimension, self.point)
    }
}

impl Sub<Padding> for Rectangle {
    type Output = Self;

    fn sub(self, padding: Padding) -> Self::Output {
        let size = |value: u32| i32::try_from(value).unwrap_or(i32::MAX);

        Self::Output {
            point:     Point {
                x: self.point.x.saturating_add(size(padding.left)),
                y: self.point.y.saturating_add(size(padding.top)),
            },
            dimension: Dimension {
                width:  self
                    .dimension
                    .width
                    .saturating_sub(size(padding.left.saturating_add(padding.right))),
                height: self
                    .dimension
                    .height
                    .saturating_sub(size(padding.top.saturating_add(padding.bottom))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Edge, Padding, Point, Rectangle};

    #[test]
    fn padding_shrinks_rectangle() {
        let rect = Rectangle::new(0, 0, 1920, 1080);
        let padded = rect - Padding::new(20, 5, 10, 15);
        assert_eq!(padded, Rectangle::new(15, 20, 1900, 1050));
    }

    #[test]
    fn oversized_padding_saturates() {
        let rect = Rectangle::new(0, 0, 1920, 1080);
        let padded = rect - Padding::new(u32::MAX, 5, 5, u32::MAX);
        assert_eq!(padded, Rectangle::new(i32::MAX, i32::MAX, 1920 - i32::MAX, 1080 - i32::MAX));
    }

    #[test]
    fn contains_is_half_open() {
        let rect = Rectangle::new(1920, 0, 1280, 1024);
        assert!(rect.contains(Point::new(1920, 0)));
        assert!(rect.contains(Point::new(3199, 1023)));
        assert!(!rect.contains(Point::new(3200, 0)));
        assert!(!rect.contains(Point::new(1919, 10)));
        assert!(rect.contains(Point::new(2000, 1000)));
    }

    #[test]
    fn ordered_by_origin() {
        let mut rects = vec![
            Rectangle::new(1920, 0, 1280, 1024),
            Rectangle::new(0, 1080, 1920, 1080),
            Rectangle::new(0, 0, 1920, 1080),
        ];
        rects.sort();
        assert_eq!(rects, vec![
            Rectangle::new(0, 0, 1920, 1080),
            Rectangle::new(0, 1080, 1920, 1080),
            Rectangle::new(1920, 0, 1280, 1024),
        ]);
    }

    #[test]
    fn display() {
        assert_eq!(Rectangle::new(10, -5, 640, 480).to_string(), "640x480+10-5");
    }

    #[test]
    fn edges() {
        let mut padding = Padding::default();
        padding.set("left".parse::<Edge>().unwrap(), 30);
        assert_eq!(padding.get(Edge::Left), 30);
        assert_eq!(padding.get(Edge::Right), 0);
        assert!("middle".parse::<Edge>().is_err());
    }
}
