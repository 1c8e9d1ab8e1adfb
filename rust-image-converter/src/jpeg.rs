use std::io::Write;

use jpeg_decoder::PixelFormat;
use jpeg_encoder::ColorType;
use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    image::{Color, Image, ImageDecoder, ImageEncoder},
};

/// Quality used when none is configured.
pub const DEFAULT_QUALITY: u8 = 90;

/// JPEG decoder backed by the `jpeg-decoder` crate
pub struct JPEGDecoder<'data> {
    image_data: &'data [u8],
}

impl<'data> ImageDecoder<'data> for JPEGDecoder<'data> {
    /// Initializes the JPEG decoder from a byte slice
    fn new(image_data: &'data [u8]) -> Self {
        Self { image_data }
    }

    fn decode(&self) -> Result<Image> {
        let mut decoder = jpeg_decoder::Decoder::new(self.image_data);
        let data = decoder.decode()?;
        let info = decoder
            .info()
            .ok_or(Error::InternalError("JPEG decoder returned no image info"))?;
        trace!(?info, "decoded JPEG");

        let pixels: Vec<Color> = match info.pixel_format {
            PixelFormat::RGB24 => data
                .chunks_exact(3)
                .map(|rgb| Color::rgb(rgb[0], rgb[1], rgb[2]))
                .collect(),
            PixelFormat::L8 => data.iter().map(|&l| Color::rgb(l, l, l)).collect(),
            other => {
                debug!(pixel_format = ?other, "unsupported JPEG pixel format");
                return Err(Error::UnsupportedFeature(
                    "Only RGB and 8-bit grayscale JPEG images are supported",
                ));
            }
        };

        Image::from_pixels(u32::from(info.width), u32::from(info.height), pixels)
    }
}

/// JPEG encoder backed by the `jpeg-encoder` crate
pub struct JPEGEncoder<'image> {
    image: &'image Image,
    quality: u8,
}

impl<'image> JPEGEncoder<'image> {
    /// Sets the encoding quality, 1 to 100.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }
}

impl<'image> ImageEncoder<'image> for JPEGEncoder<'image> {
    fn new(image: &'image Image) -> Self {
        Self {
            image,
            quality: DEFAULT_QUALITY,
        }
    }

    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let too_large =
            || Error::UnsupportedFeature("JPEG images are limited to 65535 pixels per side");
        let width = u16::try_from(self.image.width()).map_err(|_| too_large())?;
        let height = u16::try_from(self.image.height()).map_err(|_| too_large())?;

        let data: Vec<u8> = self
            .image
            .pixels()
            .iter()
            .flat_map(|pixel| [pixel.r, pixel.g, pixel.b])
            .collect();

        let encoder = jpeg_encoder::Encoder::new(writer, self.quality);
        encoder.encode(&data, width, height, ColorType::Rgb)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Color, expected: Color) {
        let near = |a: u8, b: u8| a.abs_diff(b) <= 8;
        assert!(
            near(actual.r, expected.r) && near(actual.g, expected.g) && near(actual.b, expected.b),
            "{actual:?} is not close to {expected:?}"
        );
    }

    #[test]
    fn roundtrip_keeps_size_and_approximate_colors() {
        let mut image = Image::new(32, 16, Color::rgb(200, 40, 40));
        for y in 0..16 {
            for x in 16..32 {
                image.set_pixel(x, y, Color::rgb(30, 60, 220));
            }
        }

        let mut bytes = vec![];
        JPEGEncoder::new(&image).quality(100).encode(&mut bytes).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = JPEGDecoder::new(&bytes).decode().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 16));
        assert_close(decoded.pixel(4, 8), Color::rgb(200, 40, 40));
        assert_close(decoded.pixel(27, 8), Color::rgb(30, 60, 220));
    }

    #[test]
    fn grayscale_is_expanded() {
        let luma = vec![128u8; 8 * 8];
        let mut bytes = vec![];
        jpeg_encoder::Encoder::new(&mut bytes, 100)
            .encode(&luma, 8, 8, ColorType::Luma)
            .unwrap();

        let decoded = JPEGDecoder::new(&bytes).decode().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
        assert_close(decoded.pixel(3, 3), Color::rgb(128, 128, 128));
    }

    #[test]
    fn oversized_image_is_rejected() {
        let image = Image::new(70_000, 1, Color::BLACK);
        let mut bytes = vec![];
        assert!(matches!(
            JPEGEncoder::new(&image).encode(&mut bytes),
            Err(Error::UnsupportedFeature(_))
        ));
        assert!(bytes.is_empty());
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            JPEGDecoder::new(b"not a jpeg").decode(),
            Err(Error::JpegDecode(_))
        ));
    }
}
