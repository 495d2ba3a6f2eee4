//! Pixel rectangles and placed frames

use serde::{Deserialize, Serialize};

/// An axis-aligned pixel region.
///
/// Used both for free-space bookkeeping inside a page and for the bounds of
/// placed sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Area in pixels
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Whether a `w`x`h` region fits inside this rectangle
    pub fn fits(&self, w: u32, h: u32) -> bool {
        w <= self.w && h <= self.h
    }

    /// Whether the two rectangles share any pixel
    pub fn overlaps(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// A rectangle placed on a specific atlas page.
///
/// Owned by exactly one entry and never moved until that entry is invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    /// Index of the page holding the pixels
    pub page: usize,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Frame {
    pub fn new(page: usize, rect: Rect) -> Self {
        Self {
            page,
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
        }
    }

    /// Bounds of the frame within its page
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_edges_touching() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        let c = Rect::new(0, 10, 10, 10);
        assert!(!a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_overlap_intersecting() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(9, 9, 5, 5);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_empty_never_overlaps() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 0, 3);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_contains_and_fits() {
        let page = Rect::new(0, 0, 2048, 2048);
        assert!(page.contains(&Rect::new(2000, 2000, 48, 48)));
        assert!(!page.contains(&Rect::new(2000, 2000, 49, 48)));
        assert!(page.fits(2048, 2048));
        assert!(!page.fits(2049, 1));
    }

    #[test]
    fn test_frame_rect_roundtrip_fields() {
        let frame = Frame::new(3, Rect::new(1, 2, 3, 4));
        assert_eq!(frame.page, 3);
        assert_eq!(frame.rect(), Rect::new(1, 2, 3, 4));
    }
}
