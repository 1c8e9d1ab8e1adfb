use std::io::Write;

use crate::error::{Error, Result};

/// A single RGB sample.
///
/// No codec here stores the alpha channel: encoders drop it and decoders always produce
/// opaque colors (`a == 255`). Equality compares alpha too, so an image only survives an
/// encode/decode round trip unchanged when all of its pixels are opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Opacity, 255 is fully opaque
    pub a: u8,
}

impl Color {
    /// Opaque black, the fill color of freshly decoded images.
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Stores a single frame of image data as a rectangular grid of colors.
///
/// Rows are stored top to bottom, so `line(0)` is the topmost visual row. Decoded images
/// are always fully opaque, see [`Color`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Image {
    /// Creates a `width` x `height` image filled with `fill`.
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Wraps row-major pixel data. Fails if `pixels` is not exactly `width * height` long.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Result<Self> {
        if pixel_count(width, height)? != pixels.len() {
            return Err(Error::InternalError(
                "Pixel count does not match image dimensions",
            ));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Returns row `y`. Panics if `y` is out of bounds.
    pub fn line(&self, y: u32) -> &[Color] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    /// Returns row `y` mutably. Panics if `y` is out of bounds.
    pub fn line_mut(&mut self, y: u32) -> &mut [Color] {
        let start = y as usize * self.width as usize;
        &mut self.pixels[start..start + self.width as usize]
    }

    /// Color at column `x` of row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.line(y)[x as usize]
    }

    /// Replaces the color at column `x` of row `y`.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.line_mut(y)[x as usize] = color;
    }
}

/// `width * height` as a `usize`, failing instead of overflowing.
pub(crate) fn pixel_count(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(Error::UnsupportedFeature(
            "Image dimensions exceed addressable memory",
        ))
}

/// Used to decode an image. This trait can be implemented for any image format I want to decode.
pub trait ImageDecoder<'data> {
    /// Supplies the decoder with the encoded image data
    fn new(image_data: &'data [u8]) -> Self;
    /// Decodes the image
    fn decode(&self) -> Result<Image>;
}

/// Used to encode an image. This trait can be implemented for any image format I want to encode.
pub trait ImageEncoder<'image> {
    /// Supplies the encoder with an image to encode.
    fn new(image: &'image Image) -> Self;

    /// Encodes the image into `writer`.
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()>;
}

#[test]
fn lines_are_row_major() {
    let mut image = Image::new(3, 2, Color::BLACK);
    image.set_pixel(2, 1, Color::rgb(1, 2, 3));

    assert_eq!(image.line(0), &[Color::BLACK; 3]);
    assert_eq!(image.line(1)[2], Color::rgb(1, 2, 3));
    assert_eq!(image.pixels()[5], Color::rgb(1, 2, 3));
    assert_eq!(image.pixel(2, 1), Color::rgb(1, 2, 3));
}

#[test]
fn from_pixels_rejects_wrong_length() {
    assert!(Image::from_pixels(2, 2, vec![Color::BLACK; 3]).is_err());

    let image = Image::from_pixels(2, 2, vec![Color::BLACK; 4]).unwrap();
    assert_eq!((image.width(), image.height()), (2, 2));
}

#[test]
fn empty_image_has_no_pixels() {
    let image = Image::new(0, 7, Color::BLACK);
    assert!(image.pixels().is_empty());
    assert!(image.line(6).is_empty());
}
