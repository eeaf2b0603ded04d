//! An in-memory tri-colour framebuffer, and the palette images pasted onto it.

use std::convert::Infallible;

use embedded_graphics::{
    prelude::{DrawTarget, OriginDimensions, Point, Size},
    Pixel,
};
use embedded_graphics_core::pixelcolor::PixelColor;
use serde::Deserialize;

/// The colours an Inky pHAT can show, in palette order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriColor {
    #[default]
    White,
    Black,
    Red,
}

impl PixelColor for TriColor {
    type Raw = ();
}

impl TriColor {
    /// Every colour, in palette order.
    pub const ALL: [TriColor; 3] = [TriColor::White, TriColor::Black, TriColor::Red];

    /// Palette index of this colour.
    pub fn index(self) -> u8 {
        match self {
            TriColor::White => 0,
            TriColor::Black => 1,
            TriColor::Red => 2,
        }
    }

    /// Nominal RGB value of this colour.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            TriColor::White => [255, 255, 255],
            TriColor::Black => [0, 0, 0],
            TriColor::Red => [255, 0, 0],
        }
    }

    /// The palette entry this RGBA value is exactly, if any.
    /// Transparent pixels are never in the palette.
    pub fn exact(rgba: [u8; 4]) -> Option<TriColor> {
        let [r, g, b, a] = rgba;
        if a < 128 {
            return None;
        }
        Self::ALL.into_iter().find(|c| c.rgb() == [r, g, b])
    }

    /// The palette entry closest to this RGB value.
    pub fn nearest(rgb: [u8; 3]) -> TriColor {
        let distance = |c: &TriColor| -> u32 {
            c.rgb()
                .iter()
                .zip(rgb.iter())
                .map(|(a, b)| {
                    let d = *a as i32 - *b as i32;
                    (d * d) as u32
                })
                .sum()
        };
        Self::ALL
            .into_iter()
            .min_by_key(distance)
            .unwrap_or_default()
    }
}

/// A paletted image: each pixel is a panel colour, or None if it is outside the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    size: Size,
    pixels: Vec<Option<TriColor>>,
}

impl IndexedImage {
    /// Wrap row-major pixels. Returns None if the pixel count does not match the size.
    pub fn new(size: Size, pixels: Vec<Option<TriColor>>) -> Option<Self> {
        if pixels.len() != (size.width * size.height) as usize {
            return None;
        }
        Some(IndexedImage { size, pixels })
    }

    /// An image of a single colour.
    pub fn filled(size: Size, color: TriColor) -> Self {
        IndexedImage {
            size,
            pixels: vec![Some(color); (size.width * size.height) as usize],
        }
    }

    /// Map RGBA pixels onto the palette; anything not exactly a panel colour is left out.
    pub fn from_rgba(size: Size, rgba: &[u8]) -> Self {
        let pixels = rgba
            .chunks_exact(4)
            .map(|px| TriColor::exact([px[0], px[1], px[2], px[3]]))
            .collect();
        IndexedImage { size, pixels }
    }

    /// Map RGBA pixels onto the nearest panel colour.
    pub fn quantized(size: Size, rgba: &[u8]) -> Self {
        let pixels = rgba
            .chunks_exact(4)
            .map(|px| Some(TriColor::nearest([px[0], px[1], px[2]])))
            .collect();
        IndexedImage { size, pixels }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// The palette value at the point, or None if it is out of bounds or outside the palette.
    pub fn pixel(&self, p: Point) -> Option<TriColor> {
        index_of(self.size, p).and_then(|i| self.pixels[i])
    }

    /// Nearest-neighbour resize.
    pub fn resize(&self, size: Size) -> Self {
        if size == self.size {
            return self.clone();
        }
        let (sw, sh) = (self.size.width as u64, self.size.height as u64);
        let (dw, dh) = (size.width as u64, size.height as u64);
        let mut pixels = Vec::with_capacity((dw * dh) as usize);
        for y in 0..dh {
            let sy = if sh == 0 { 0 } else { (y * sh / dh).min(sh - 1) };
            for x in 0..dw {
                let sx = if sw == 0 { 0 } else { (x * sw / dw).min(sw - 1) };
                let pixel = if sw == 0 || sh == 0 {
                    None
                } else {
                    self.pixels[(sy * sw + sx) as usize]
                };
                pixels.push(pixel);
            }
        }
        IndexedImage { size, pixels }
    }
}

/// A one-bit-per-pixel image selecting which pixels of a paste are copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    size: Size,
    bits: Vec<bool>,
}

impl Mask {
    /// True iff the point is inside the mask and set.
    pub fn contains(&self, p: Point) -> bool {
        index_of(self.size, p).map_or(false, |i| self.bits[i])
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

/// Create a transparency mask for a paletted image.
///
/// A pixel is set iff its palette value is one of `allowed`;
/// every other pixel (including ones outside the palette) is left clear.
pub fn create_mask(source: &IndexedImage, allowed: &[TriColor]) -> Mask {
    let bits = source
        .pixels
        .iter()
        .map(|p| p.map_or(false, |c| allowed.contains(&c)))
        .collect();
    Mask {
        size: source.size,
        bits,
    }
}

/// A framebuffer the size of the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    size: Size,
    pixels: Vec<TriColor>,
}

impl Canvas {
    /// A blank (white) canvas.
    pub fn new(size: Size) -> Self {
        Canvas {
            size,
            pixels: vec![TriColor::White; (size.width * size.height) as usize],
        }
    }

    /// A canvas initialised from a background, stretched to fit.
    /// Pixels outside the palette become white.
    pub fn from_background(background: &IndexedImage, size: Size) -> Self {
        let pixels = background
            .resize(size)
            .pixels
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        Canvas { size, pixels }
    }

    pub fn pixel(&self, p: Point) -> Option<TriColor> {
        index_of(self.size, p).map(|i| self.pixels[i])
    }

    /// Pixels in row-major order.
    pub fn pixels(&self) -> &[TriColor] {
        &self.pixels
    }

    /// Copy the pixels of `image` selected by `mask` onto the canvas, with the image's
    /// top-left corner at `origin`. Pixels falling off the canvas are dropped.
    pub fn paste(&mut self, image: &IndexedImage, origin: Point, mask: &Mask) {
        let size = image.size();
        for y in 0..size.height as i32 {
            for x in 0..size.width as i32 {
                let p = Point::new(x, y);
                if !mask.contains(p) {
                    continue;
                }
                if let Some(color) = image.pixel(p) {
                    self.set(origin + p, color);
                }
            }
        }
    }

    fn set(&mut self, p: Point, color: TriColor) {
        if let Some(i) = index_of(self.size, p) {
            self.pixels[i] = color;
        }
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Canvas {
    type Color = TriColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            self.set(p, color);
        }
        Ok(())
    }
}

/// Row-major index of a point, if it is in bounds.
fn index_of(size: Size, p: Point) -> Option<usize> {
    if p.x < 0 || p.y < 0 || p.x as u32 >= size.width || p.y as u32 >= size.height {
        return None;
    }
    Some(p.y as usize * size.width as usize + p.x as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::{
        primitives::{Line, Primitive, PrimitiveStyle},
        Drawable,
    };

    fn palette_strip() -> IndexedImage {
        IndexedImage::new(
            Size::new(4, 1),
            vec![
                Some(TriColor::White),
                Some(TriColor::Black),
                Some(TriColor::Red),
                None,
            ],
        )
        .expect("pixel count matches")
    }

    #[test]
    fn mask_selects_allowed_palette_entries() {
        let image = palette_strip();
        let mask = create_mask(&image, &[TriColor::Black, TriColor::Red]);
        let set: Vec<bool> = (0..4).map(|x| mask.contains(Point::new(x, 0))).collect();
        assert_eq!(set, vec![false, true, true, false]);
        assert_eq!(mask.count(), 2);

        let all = create_mask(&image, &TriColor::ALL);
        assert_eq!(all.count(), 3);
        assert!(!all.contains(Point::new(3, 0)));

        let none = create_mask(&image, &[]);
        assert_eq!(none.count(), 0);
    }

    #[test]
    fn exact_palette_mapping() {
        let rgba = [
            255, 255, 255, 255, // white
            0, 0, 0, 255, // black
            255, 0, 0, 255, // red
            255, 0, 0, 0, // transparent red
            12, 200, 40, 255, // green
        ];
        let image = IndexedImage::from_rgba(Size::new(5, 1), &rgba);
        let colors: Vec<_> = (0..5).map(|x| image.pixel(Point::new(x, 0))).collect();
        assert_eq!(
            colors,
            vec![
                Some(TriColor::White),
                Some(TriColor::Black),
                Some(TriColor::Red),
                None,
                None
            ]
        );
    }

    #[test]
    fn nearest_colour() {
        assert_eq!(TriColor::nearest([250, 240, 245]), TriColor::White);
        assert_eq!(TriColor::nearest([20, 10, 30]), TriColor::Black);
        assert_eq!(TriColor::nearest([200, 30, 20]), TriColor::Red);
    }

    #[test]
    fn resize_nearest_neighbour() {
        let image = IndexedImage::new(
            Size::new(2, 1),
            vec![Some(TriColor::Black), Some(TriColor::Red)],
        )
        .unwrap();
        let big = image.resize(Size::new(4, 2));
        for y in 0..2 {
            assert_eq!(big.pixel(Point::new(0, y)), Some(TriColor::Black));
            assert_eq!(big.pixel(Point::new(1, y)), Some(TriColor::Black));
            assert_eq!(big.pixel(Point::new(2, y)), Some(TriColor::Red));
            assert_eq!(big.pixel(Point::new(3, y)), Some(TriColor::Red));
        }
    }

    #[test]
    fn paste_copies_only_masked_pixels() {
        let mut canvas = Canvas::new(Size::new(6, 2));
        let image = palette_strip();
        let mask = create_mask(&image, &[TriColor::Black, TriColor::Red]);
        canvas.paste(&image, Point::new(3, 1), &mask);

        assert_eq!(canvas.pixel(Point::new(3, 1)), Some(TriColor::White));
        assert_eq!(canvas.pixel(Point::new(4, 1)), Some(TriColor::Black));
        assert_eq!(canvas.pixel(Point::new(5, 1)), Some(TriColor::Red));
        // Top row untouched.
        assert!((0..6).all(|x| canvas.pixel(Point::new(x, 0)) == Some(TriColor::White)));
    }

    #[test]
    fn drawing_clips_to_canvas() {
        let mut canvas = Canvas::new(Size::new(10, 10));
        Line::new(Point::new(-5, 5), Point::new(20, 5))
            .into_styled(PrimitiveStyle::with_stroke(TriColor::Red, 1))
            .draw(&mut canvas)
            .expect("infallible");
        assert!((0..10).all(|x| canvas.pixel(Point::new(x, 5)) == Some(TriColor::Red)));
        assert_eq!(canvas.pixel(Point::new(0, 4)), Some(TriColor::White));
        assert_eq!(canvas.pixel(Point::new(10, 5)), None);
    }
}
