//! Tiling layouts: turn a monitor's area and settings into one rectangle per
//! window.
//!
//! Both layouts split the area into a *root* band holding the first
//! `root_count` windows and a *sub* band holding the rest. The root band
//! takes `ratio` of the area and sits on the leading edge unless the layout
//! is mirrored. Each band is cut into equal segments with the last one
//! absorbing the remainder of the integer division.

use crate::{
    core::{Identify, Xid},
    geometry::Rectangle,
};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// A named tiling layout
/// Variants are listed in cycling order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum Layout {
    /// Roots on the left, subs stacked on the right
    Vertical,
    /// Roots on top, subs side by side at the bottom
    Horizontal,
}

impl Identify for Layout {
    fn id(&self) -> Xid {
        *self as Xid
    }
}

/// Everything a [`Layout`] needs to know about a monitor
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LayoutParams {
    /// The monitor geometry, already reduced by its padding
    pub(crate) area:         Rectangle,
    /// Requested number of root windows
    pub(crate) root_count:   usize,
    /// Fraction of the area given to the root band
    pub(crate) ratio:        f64,
    /// Put the root band on the trailing edge
    pub(crate) mirrored:     bool,
    /// Space between two windows
    pub(crate) window_gap:   u32,
    /// Border drawn by the server around each window
    pub(crate) border_width: u32,
}

impl Layout {
    /// The layouts a monitor starts with, in cycling order
    pub(crate) fn defaults() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Compute a rectangle for each of `count` windows, in ring order
    pub(crate) fn arrange(self, params: &LayoutParams, count: usize) -> Vec<Rectangle> {
        match self {
            Self::Vertical => vertical(params, count),
            Self::Horizontal => {
                let transposed = LayoutParams {
                    area: transpose(params.area),
                    ..*params
                };
                vertical(&transposed, count)
                    .into_iter()
                    .map(transpose)
                    .collect()
            },
        }
    }
}

/// Swap the axes of a [`Rectangle`]
const fn transpose(rect: Rectangle) -> Rectangle {
    Rectangle::new(rect.y(), rect.x(), rect.height(), rect.width())
}

/// Roots split along the height on the left, subs split along the height on
/// the right
fn vertical(params: &LayoutParams, count: usize) -> Vec<Rectangle> {
    let area = params.area;

    match count {
        0 => return vec![],
        1 => return vec![area],
        _ => {},
    }

    let roots = params.root_count.clamp(1, count);
    let subs = count - roots;
    let border = to_i32(params.border_width).saturating_mul(2);
    let gap = to_i32(params.window_gap);

    let mut windows = Vec::with_capacity(count);

    let split = (f64::from(area.width()) * params.ratio) as i32;
    let (x, w) = match (subs, params.mirrored) {
        (0, _) => (area.x(), area.width().saturating_sub(border)),
        (_, false) => (area.x(), split.saturating_sub(border)),
        (_, true) => (
            area.x().saturating_add(area.width() - split),
            split.saturating_sub(border),
        ),
    };
    column(&mut windows, area, x, w, roots, border, gap);

    if subs > 0 {
        let x = if params.mirrored {
            area.x()
        } else {
            area.x().saturating_add(split).saturating_add(gap)
        };
        let w = area
            .width()
            .saturating_sub(border)
            .saturating_sub(split)
            .saturating_sub(gap);
        column(&mut windows, area, x, w, subs, border, gap);
    }

    windows
}

/// Stack `n` windows of width `w` at `x`, splitting the height of `area`
/// into equal segments. The last one takes what's left
fn column(
    windows: &mut Vec<Rectangle>,
    area: Rectangle,
    x: i32,
    w: i32,
    n: usize,
    border: i32,
    gap: i32,
) {
    let segment = area.height() / n as i32;
    let bottom = area.y().saturating_add(area.height());
    let mut y = area.y();

    for i in 1..=n {
        let h = if i == n {
            bottom.saturating_sub(y)
        } else {
            segment
        };

        windows.push(Rectangle::new(x, y, w, h.saturating_sub(border)));
        y = y.saturating_add(segment).saturating_add(gap);
    }
}

/// Sizes above `i32::MAX` are treated as `i32::MAX`
fn to_i32(size: u32) -> i32 {
    i32::try_from(size).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{Layout, LayoutParams};
    use crate::geometry::Rectangle;

    fn params() -> LayoutParams {
        LayoutParams {
            area:         Rectangle::new(0, 0, 1920, 1080),
            root_count:   1,
            ratio:        0.65,
            mirrored:     false,
            window_gap:   1,
            border_width: 5,
        }
    }

    #[test]
    fn names() {
        assert_eq!(Layout::Vertical.to_string(), "vertical");
        assert_eq!("horizontal".parse::<Layout>().unwrap(), Layout::Horizontal);
        assert!("spiral".parse::<Layout>().is_err());
    }

    #[test]
    fn no_windows() {
        assert!(Layout::Vertical.arrange(&params(), 0).is_empty());
        assert!(Layout::Horizontal.arrange(&params(), 0).is_empty());
    }

    #[test]
    fn single_window_fills_area() {
        let mut params = params();
        params.area = Rectangle::new(10, 20, 1900, 1050);
        params.mirrored = true;
        params.root_count = 3;
        params.ratio = 0.2;

        for layout in Layout::defaults() {
            assert_eq!(layout.arrange(&params, 1), vec![params.area]);
        }
    }

    #[test]
    fn vertical_three_windows() {
        assert_eq!(Layout::Vertical.arrange(&params(), 3), vec![
            Rectangle::new(0, 0, 1238, 1070),
            Rectangle::new(1249, 0, 661, 530),
            Rectangle::new(1249, 541, 661, 529),
        ]);
    }

    #[test]
    fn vertical_mirrored() {
        let mut params = params();
        params.mirrored = true;

        assert_eq!(Layout::Vertical.arrange(&params, 3), vec![
            Rectangle::new(672, 0, 1238, 1070),
            Rectangle::new(0, 0, 661, 530),
            Rectangle::new(0, 541, 661, 529),
        ]);
    }

    #[test]
    fn horizontal_three_windows() {
        assert_eq!(Layout::Horizontal.arrange(&params(), 3), vec![
            Rectangle::new(0, 0, 1910, 692),
            Rectangle::new(0, 703, 950, 367),
            Rectangle::new(961, 703, 949, 367),
        ]);
    }

    #[test]
    fn horizontal_mirrored() {
        let mut params = params();
        params.mirrored = true;

        assert_eq!(Layout::Horizontal.arrange(&params, 3), vec![
            Rectangle::new(0, 378, 1910, 692),
            Rectangle::new(0, 0, 950, 367),
            Rectangle::new(961, 0, 949, 367),
        ]);
    }

    #[test]
    fn huge_sizes_saturate() {
        let mut params = params();
        params.window_gap = u32::MAX;
        params.border_width = u32::MAX;

        for layout in Layout::defaults() {
            let rects = layout.arrange(&params, 3);
            assert_eq!(rects.len(), 3);
            assert!(rects.iter().all(|r| r.width() <= 0 || r.height() <= 0));
        }
    }

    #[test]
    fn all_roots_tile_the_height() {
        let mut params = params();
        params.root_count = 3;
        params.mirrored = true;

        // Mirroring has no effect without subs
        let rects = Layout::Vertical.arrange(&params, 3);
        assert_eq!(rects, vec![
            Rectangle::new(0, 0, 1910, 350),
            Rectangle::new(0, 361, 1910, 350),
            Rectangle::new(0, 722, 1910, 348),
        ]);

        let last = rects[2];
        assert_eq!(last.y() + last.height() + 10, 1080);
    }

    #[test]
    fn root_count_is_clamped() {
        let mut params = params();
        params.root_count = 5;
        assert_eq!(Layout::Horizontal.arrange(&params, 2), vec![
            Rectangle::new(0, 0, 950, 1070),
            Rectangle::new(961, 0, 949, 1070),
        ]);
    }
}
