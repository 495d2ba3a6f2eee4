//! Atlas pages and the page manager
//!
//! Pages are fixed-size RGBA surfaces. They are only ever appended during a
//! session; a reset clears their pixels and free lists but keeps them around
//! so later overflows reuse them before allocating more.

use crate::allocator::FreeList;
use crate::error::{AtlasError, Result};
use crate::rect::{Frame, Rect};
use image::{imageops, Rgba, RgbaImage};

/// Default edge length of a page in pixels
pub const DEFAULT_PAGE_SIZE: u32 = 2048;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// One square backing surface plus its free space.
#[derive(Debug, Clone)]
pub struct Page {
    image: RgbaImage,
    free: FreeList,
}

impl Page {
    fn new(size: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(size, size, TRANSPARENT),
            free: FreeList::new(size, size),
        }
    }

    /// The page's pixels
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Free rectangles still tracked on this page
    pub fn free_list(&self) -> &FreeList {
        &self.free
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = TRANSPARENT;
        }
        let (w, h) = self.image.dimensions();
        self.free.reset(w, h);
    }
}

/// Ordered list of pages with a single current page receiving placements.
#[derive(Debug, Clone)]
pub struct PageManager {
    size: u32,
    pages: Vec<Page>,
    current: usize,
}

impl Default for PageManager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageManager {
    /// Create a manager holding one empty `size`x`size` page.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            pages: vec![Page::new(size)],
            current: 0,
        }
    }

    /// Edge length of every page
    pub fn page_size(&self) -> u32 {
        self.size
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Index of the page currently receiving placements
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Place a `w`x`h` region.
    ///
    /// Never runs out of space: when the current page cannot hold the region
    /// the next page is opened. Only regions that could not fit on an empty
    /// page are rejected.
    pub fn insert(&mut self, w: u32, h: u32) -> Result<Frame> {
        if w == 0 || h == 0 || w > self.size || h > self.size {
            return Err(AtlasError::InvalidRegion { w, h, page_size: self.size });
        }

        if let Some(rect) = self.pages[self.current].free.place(w, h) {
            return Ok(Frame::new(self.current, rect));
        }

        self.ensure_capacity();

        self.pages[self.current]
            .free
            .place(w, h)
            .map(|rect| Frame::new(self.current, rect))
            .ok_or(AtlasError::InvalidRegion { w, h, page_size: self.size })
    }

    /// Move on to a fresh page with its whole area free.
    ///
    /// Pages kept from before a reset are reused in order; past the end a new
    /// page is appended.
    pub fn ensure_capacity(&mut self) {
        self.current += 1;
        if self.current == self.pages.len() {
            self.pages.push(Page::new(self.size));
            log::info!(
                "opened atlas page {} ({}x{})",
                self.current,
                self.size,
                self.size
            );
        } else {
            self.pages[self.current].free.reset(self.size, self.size);
            log::debug!("reusing atlas page {}", self.current);
        }
    }

    /// Clear every page and rewind to the first one.
    pub fn reset(&mut self) {
        for page in &mut self.pages {
            page.clear();
        }
        self.current = 0;
        log::info!("reset {} atlas page(s)", self.pages.len());
    }

    /// Copy `image` into the page area described by `frame`.
    ///
    /// Pixels are replaced rather than blended; the frame owns its area.
    pub fn blit(&mut self, frame: &Frame, image: &RgbaImage) -> Result<()> {
        let count = self.pages.len();
        let page = self
            .pages
            .get_mut(frame.page)
            .ok_or(AtlasError::NoSuchPage { index: frame.page, count })?;

        let area = Rect::new(frame.x, frame.y, image.width().min(frame.w), image.height().min(frame.h));
        if area.w == image.width() && area.h == image.height() {
            imageops::replace(&mut page.image, image, frame.x as i64, frame.y as i64);
        } else {
            let view = imageops::crop_imm(image, 0, 0, area.w, area.h).to_image();
            imageops::replace(&mut page.image, &view, frame.x as i64, frame.y as i64);
        }
        Ok(())
    }
}
