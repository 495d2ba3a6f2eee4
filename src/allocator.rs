//! Best-fit free-rectangle allocator
//!
//! Each page keeps a list of free rectangles. Placing a region picks the free
//! rectangle that wastes the least area, splits off a right and a bottom
//! remainder and then runs one merge pass over the list.
//!
//! The bottom remainder only spans the *placed* width, so the lower-right
//! corner of every imperfect split is never tracked as free again. Packing
//! density and layouts depend on this, so it is kept as is.

use crate::rect::Rect;

/// Free space of a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeList {
    rects: Vec<Rect>,
}

impl FreeList {
    /// A free list covering a whole `width`x`height` page.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            rects: vec![Rect::new(0, 0, width, height)],
        }
    }

    /// Drop all bookkeeping and track the whole page as free again.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.rects.clear();
        self.rects.push(Rect::new(0, 0, width, height));
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Total free area currently tracked
    pub fn free_area(&self) -> u64 {
        self.rects.iter().map(Rect::area).sum()
    }

    /// Index of the best-fitting free rectangle for a `w`x`h` region.
    ///
    /// Best fit minimises the wasted area; on ties the earliest rectangle in
    /// the list wins.
    pub fn find_best(&self, w: u32, h: u32) -> Option<usize> {
        let needed = w as u64 * h as u64;
        let mut best: Option<(usize, u64)> = None;

        for (index, rect) in self.rects.iter().enumerate() {
            if !rect.fits(w, h) {
                continue;
            }
            let waste = rect.area() - needed;
            match best {
                Some((_, best_waste)) if best_waste <= waste => {}
                _ => best = Some((index, waste)),
            }
        }

        best.map(|(index, _)| index)
    }

    /// Place a `w`x`h` region, returning its bounds.
    ///
    /// Returns `None` when no free rectangle can hold the region; the caller
    /// is expected to open a new page.
    pub fn place(&mut self, w: u32, h: u32) -> Option<Rect> {
        let index = self.find_best(w, h)?;
        let free = self.rects.remove(index);

        let right = Rect::new(free.x + w, free.y, free.w - w, h);
        let bottom = Rect::new(free.x, free.y + h, w, free.h - h);

        for remainder in [right, bottom] {
            if !remainder.is_empty() {
                self.rects.push(remainder);
            }
        }

        self.merge_pass();

        Some(Rect::new(free.x, free.y, w, h))
    }

    /// One pairwise merge pass over the free list.
    ///
    /// Not iterated to a fixed point: some chains only coalesce after later
    /// insertions.
    fn merge_pass(&mut self) {
        let mut i = 0;
        while i < self.rects.len() {
            let mut j = i + 1;
            while j < self.rects.len() {
                match merge(&self.rects[i], &self.rects[j]) {
                    Some(merged) => {
                        self.rects[i] = merged;
                        self.rects.remove(j);
                    }
                    None => j += 1,
                }
            }
            i += 1;
        }
    }
}

/// Merge two free rectangles that share a full edge.
fn merge(a: &Rect, b: &Rect) -> Option<Rect> {
    if a.x == b.x && a.w == b.w {
        if a.bottom() == b.y {
            return Some(Rect::new(a.x, a.y, a.w, a.h + b.h));
        }
        if b.bottom() == a.y {
            return Some(Rect::new(a.x, b.y, a.w, a.h + b.h));
        }
    }

    if a.y == b.y && a.h == b.h {
        if a.right() == b.x {
            return Some(Rect::new(a.x, a.y, a.w + b.w, a.h));
        }
        if b.right() == a.x {
            return Some(Rect::new(b.x, a.y, a.w + b.w, a.h));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_split() {
        let mut free = FreeList::new(2048, 2048);
        let placed = free.place(50, 50).unwrap();

        assert_eq!(placed, Rect::new(0, 0, 50, 50));
        assert_eq!(
            free.rects(),
            &[Rect::new(50, 0, 1998, 50), Rect::new(0, 50, 50, 1998)]
        );
        // The lower-right region is not tracked
        let leaked = Rect::new(50, 50, 1998, 1998);
        assert!(free.rects().iter().all(|r| !r.overlaps(&leaked)));
    }

    #[test]
    fn test_exact_fit_leaves_nothing() {
        let mut free = FreeList::new(64, 32);
        assert_eq!(free.place(64, 32), Some(Rect::new(0, 0, 64, 32)));
        assert!(free.is_empty());
        assert_eq!(free.place(1, 1), None);
    }

    #[test]
    fn test_full_width_drops_right_remainder() {
        let mut free = FreeList::new(100, 100);
        free.place(100, 10).unwrap();
        assert_eq!(free.rects(), &[Rect::new(0, 10, 100, 90)]);
    }

    #[test]
    fn test_best_fit_prefers_least_waste() {
        let mut free = FreeList {
            rects: vec![
                Rect::new(0, 0, 100, 100),
                Rect::new(200, 0, 12, 12),
                Rect::new(300, 0, 10, 20),
            ],
        };
        // 10x10 wastes 44 in the 12x12 and 100 in the 10x20
        assert_eq!(free.find_best(10, 10), Some(1));
        assert_eq!(free.place(10, 10).unwrap(), Rect::new(200, 0, 10, 10));
    }

    #[test]
    fn test_best_fit_tie_takes_first() {
        let free = FreeList {
            rects: vec![
                Rect::new(0, 0, 20, 10),
                Rect::new(100, 0, 10, 20),
            ],
        };
        assert_eq!(free.find_best(10, 10), Some(0));
    }

    #[test]
    fn test_no_fit_returns_none() {
        let mut free = FreeList::new(32, 32);
        assert_eq!(free.place(33, 1), None);
        assert_eq!(free.rects(), &[Rect::new(0, 0, 32, 32)]);
    }

    #[test]
    fn test_merge_vertical() {
        let a = Rect::new(10, 0, 5, 5);
        let b = Rect::new(10, 5, 5, 7);
        assert_eq!(merge(&a, &b), Some(Rect::new(10, 0, 5, 12)));
        assert_eq!(merge(&b, &a), Some(Rect::new(10, 0, 5, 12)));
    }

    #[test]
    fn test_merge_horizontal() {
        let a = Rect::new(0, 3, 4, 6);
        let b = Rect::new(4, 3, 2, 6);
        assert_eq!(merge(&a, &b), Some(Rect::new(0, 3, 6, 6)));
        assert_eq!(merge(&b, &a), Some(Rect::new(0, 3, 6, 6)));
    }

    #[test]
    fn test_merge_requires_matching_edge() {
        let a = Rect::new(0, 0, 4, 6);
        let b = Rect::new(4, 0, 2, 5);
        assert_eq!(merge(&a, &b), None);
        let c = Rect::new(0, 7, 4, 6);
        assert_eq!(merge(&a, &c), None);
    }

    #[test]
    fn test_merge_pass_coalesces_split_remainders() {
        // Two equal-height rows side by side collapse into one
        let mut free = FreeList {
            rects: vec![Rect::new(0, 0, 10, 10)],
        };
        free.rects.push(Rect::new(10, 0, 10, 10));
        free.rects.push(Rect::new(20, 0, 5, 10));
        free.merge_pass();
        assert_eq!(free.rects(), &[Rect::new(0, 0, 25, 10)]);
    }

    #[test]
    fn test_placements_never_overlap() {
        let mut free = FreeList::new(256, 256);
        let mut placed: Vec<Rect> = Vec::new();
        let sizes = [(30, 40), (17, 9), (64, 64), (5, 90), (33, 33), (12, 70), (90, 11)];

        for round in 0..20 {
            let (w, h) = sizes[round % sizes.len()];
            if let Some(rect) = free.place(w, h) {
                for other in &placed {
                    assert!(!rect.overlaps(other), "{:?} overlaps {:?}", rect, other);
                }
                for f in free.rects() {
                    assert!(!rect.overlaps(f), "{:?} still listed free as {:?}", rect, f);
                }
                placed.push(rect);
            }
        }

        assert!(placed.len() > 5);
        let page = Rect::new(0, 0, 256, 256);
        assert!(placed.iter().all(|r| page.contains(r)));
    }
}
