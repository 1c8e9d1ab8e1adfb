use std::io::Write;

use tracing::trace;

use crate::{
    error::{Error, Result},
    image::{pixel_count, Color, Image, ImageDecoder, ImageEncoder},
};

const MAX_VALUE: u32 = 255;

/// PPM encoder. Always writes the binary P6 variant.
pub struct PPMEncoder<'image> {
    image: &'image Image,
}

impl<'image> ImageEncoder<'image> for PPMEncoder<'image> {
    fn new(image: &'image Image) -> Self {
        Self { image }
    }

    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        write!(
            writer,
            "P6\n{} {}\n{}\n",
            self.image.width(),
            self.image.height(),
            MAX_VALUE
        )?;

        let mut scanline = Vec::with_capacity(self.image.width() as usize * 3);
        for y in 0..self.image.height() {
            scanline.clear();
            for pixel in self.image.line(y) {
                scanline.extend_from_slice(&[pixel.r, pixel.g, pixel.b]);
            }
            writer.write_all(&scanline)?;
        }
        Ok(())
    }
}

/// PPM decoder for both the binary (P6) and plain text (P3) variants
pub struct PPMDecoder<'data> {
    image_data: &'data [u8],
}

impl<'data> ImageDecoder<'data> for PPMDecoder<'data> {
    fn new(image_data: &'data [u8]) -> Self {
        Self { image_data }
    }

    fn decode(&self) -> Result<Image> {
        let mut reader = HeaderReader {
            data: self.image_data,
            position: 0,
        };

        let binary = match reader.next_token()? {
            b"P6" => true,
            b"P3" => false,
            _ => return Err(Error::Malformed("Not a PPM image")),
        };
        let width = reader.next_number()?;
        let height = reader.next_number()?;
        let max_value = reader.next_number()?;
        if max_value != MAX_VALUE {
            return Err(Error::UnsupportedFeature(
                "Only PPM images with a maximum value of 255 are supported",
            ));
        }

        let count = pixel_count(width, height)?;
        trace!(width, height, binary, "decoding PPM");

        let pixels = if binary {
            // Exactly one whitespace byte separates the header from the samples.
            match self.image_data.get(reader.position) {
                Some(byte) if byte.is_ascii_whitespace() => {}
                Some(_) => {
                    return Err(Error::Malformed(
                        "PPM maximum value must be followed by whitespace",
                    ))
                }
                None => return Err(Error::Truncated),
            }
            let start = reader.position + 1;
            let samples = count
                .checked_mul(3)
                .and_then(|len| self.image_data.get(start..)?.get(..len))
                .ok_or(Error::Truncated)?;
            samples
                .chunks_exact(3)
                .map(|rgb| Color::rgb(rgb[0], rgb[1], rgb[2]))
                .collect()
        } else {
            let mut pixels = Vec::with_capacity(count.min(self.image_data.len()));
            for _ in 0..count {
                let r = reader.next_sample()?;
                let g = reader.next_sample()?;
                let b = reader.next_sample()?;
                pixels.push(Color::rgb(r, g, b));
            }
            pixels
        };

        Image::from_pixels(width, height, pixels)
    }
}

/// Splits a PPM header into whitespace separated tokens, skipping `#` comments.
struct HeaderReader<'data> {
    data: &'data [u8],
    position: usize,
}

impl<'data> HeaderReader<'data> {
    fn next_token(&mut self) -> Result<&'data [u8]> {
        loop {
            match self.data.get(self.position) {
                None => return Err(Error::Truncated),
                Some(b'#') => {
                    while !matches!(self.data.get(self.position), None | Some(b'\n')) {
                        self.position += 1;
                    }
                }
                Some(byte) if byte.is_ascii_whitespace() => self.position += 1,
                Some(_) => break,
            }
        }

        let start = self.position;
        while matches!(self.data.get(self.position), Some(byte) if !byte.is_ascii_whitespace() && *byte != b'#')
        {
            self.position += 1;
        }
        Ok(&self.data[start..self.position])
    }

    fn next_number(&mut self) -> Result<u32> {
        let token = self.next_token()?;
        std::str::from_utf8(token)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or(Error::Malformed("PPM header field is not a number"))
    }

    fn next_sample(&mut self) -> Result<u8> {
        let value = self.next_number()?;
        u8::try_from(value).map_err(|_| Error::Malformed("PPM sample exceeds maximum value"))
    }
}
