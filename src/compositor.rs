//! Layered sprite composition onto a scratch surface
//!
//! Layers are drawn source-over onto a cleared scratch buffer, centred on the
//! scratch anchor plus their offset. Pure black is then keyed out and the
//! result trimmed to the smallest box holding every visible pixel; only that
//! box goes to the atlas.

use crate::rect::Rect;
use image::{imageops, Rgba, RgbaImage};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Default scratch surface size
pub const DEFAULT_SCRATCH_SIZE: (u32, u32) = (100, 100);

/// One bitmap to draw.
#[derive(Debug, Clone, Copy)]
pub struct Layer<'a> {
    pub image: &'a RgbaImage,
    /// Part of `image` to draw; `None` for all of it
    pub source: Option<Rect>,
    /// Nudge of the layer's centre from the anchor
    pub offset: (i32, i32),
}

impl Layer<'_> {
    fn source_rect(&self) -> Rect {
        self.source
            .unwrap_or_else(|| Rect::new(0, 0, self.image.width(), self.image.height()))
    }
}

/// Reusable drawing surface for composition.
#[derive(Debug, Clone)]
pub struct Scratch {
    image: RgbaImage,
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new(DEFAULT_SCRATCH_SIZE.0, DEFAULT_SCRATCH_SIZE.1)
    }
}

impl Scratch {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, TRANSPARENT),
        }
    }

    /// Centre point every layer is positioned against
    pub fn anchor(&self) -> (i32, i32) {
        ((self.image.width() / 2) as i32, (self.image.height() / 2) as i32)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }
}

/// A composited sprite cut down to its visible pixels.
#[derive(Debug, Clone)]
pub struct TrimmedSprite {
    pub image: RgbaImage,
    /// Where the trimmed pixels sat on the scratch surface
    pub bounds: Rect,
    /// Top-left of the trimmed pixels relative to the anchor
    pub origin: (i32, i32),
}

/// Outcome of composing one frame.
#[derive(Debug, Clone)]
pub enum Composed {
    /// Nothing to draw
    NoLayers,
    /// Layers were drawn but no pixel stayed visible
    Blank,
    Sprite(TrimmedSprite),
}

/// Draw `layers` in order and trim the result.
pub fn compose(scratch: &mut Scratch, layers: &[Layer<'_>]) -> Composed {
    if layers.is_empty() {
        return Composed::NoLayers;
    }

    scratch.clear();
    let (ax, ay) = scratch.anchor();

    for layer in layers {
        let source = layer.source_rect();
        let x = ax + layer.offset.0 - (source.w / 2) as i32;
        let y = ay + layer.offset.1 - (source.h / 2) as i32;
        draw_layer(&mut scratch.image, layer.image, source, x, y);
    }

    apply_key_color(&mut scratch.image);

    match opaque_bounds(&scratch.image) {
        None => Composed::Blank,
        Some(bounds) => {
            let image = imageops::crop_imm(&scratch.image, bounds.x, bounds.y, bounds.w, bounds.h).to_image();
            Composed::Sprite(TrimmedSprite {
                image,
                bounds,
                origin: (bounds.x as i32 - ax, bounds.y as i32 - ay),
            })
        }
    }
}

/// Draw the `source` part of `image` with its top-left at (`x`, `y`).
///
/// Pixels falling outside the canvas are clipped.
pub fn draw_layer(canvas: &mut RgbaImage, image: &RgbaImage, source: Rect, x: i32, y: i32) {
    let (canvas_w, canvas_h) = (canvas.width() as i32, canvas.height() as i32);

    for sy in 0..source.h {
        let dest_y = y + sy as i32;
        if dest_y < 0 {
            continue;
        }
        if dest_y >= canvas_h {
            break;
        }

        for sx in 0..source.w {
            let dest_x = x + sx as i32;
            if dest_x < 0 {
                continue;
            }
            if dest_x >= canvas_w {
                break;
            }

            let src = image.get_pixel(source.x + sx, source.y + sy);
            if src[3] == 0 {
                continue;
            }

            let dst = canvas.get_pixel(dest_x as u32, dest_y as u32);
            let blended = source_over(src, dst);
            canvas.put_pixel(dest_x as u32, dest_y as u32, blended);
        }
    }
}

/// Standard alpha compositing of `src` over `dst`.
fn source_over(src: &Rgba<u8>, dst: &Rgba<u8>) -> Rgba<u8> {
    if src[3] == 255 {
        return *src;
    }

    let src_alpha = src[3] as f32 / 255.0;
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha <= 0.0 {
        return TRANSPARENT;
    }

    let channel = |i: usize| {
        let s = src[i] as f32 / 255.0;
        let d = dst[i] as f32 / 255.0;
        let c = (s * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (c * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Force every pure-black pixel fully transparent, whatever its alpha.
pub fn apply_key_color(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        if pixel[0] == 0 && pixel[1] == 0 && pixel[2] == 0 {
            *pixel = TRANSPARENT;
        }
    }
}

/// Smallest rectangle containing every pixel with non-zero alpha.
pub fn opaque_bounds(image: &RgbaImage) -> Option<Rect> {
    let mut min = (u32::MAX, u32::MAX);
    let mut max = (0u32, 0u32);
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        found = true;
        min = (min.0.min(x), min.1.min(y));
        max = (max.0.max(x), max.1.max(y));
    }

    found.then(|| Rect::new(min.0, min.1, max.0 - min.0 + 1, max.1 - min.1 + 1))
}

/// Whether no pixel of `image` is visible
pub fn is_fully_transparent(image: &RgbaImage) -> bool {
    image.pixels().all(|p| p[3] == 0)
}
