mod header;

use std::io::{Cursor, Write};

use tracing::{debug, trace};

pub use header::{
    row_stride, Compression, FileHeader, InfoHeader, PixelLayout, LEGACY_IMPORTANT_COLORS,
    PIXEL_DATA_OFFSET, SIGNATURE,
};

use crate::{
    error::{Error, Result},
    image::{Color, Image, ImageDecoder, ImageEncoder},
};

/// Decodes uncompressed 24-bit BMP images
pub struct BMPDecoder<'data> {
    image_data: &'data [u8],
}

impl<'data> ImageDecoder<'data> for BMPDecoder<'data> {
    fn new(image_data: &'data [u8]) -> Self {
        Self { image_data }
    }

    fn decode(&self) -> Result<Image> {
        let mut reader = Cursor::new(self.image_data);
        let file_header = FileHeader::read(&mut reader)?;
        let info_header = InfoHeader::read(&mut reader)?;

        if file_header.signature != SIGNATURE {
            return Err(Error::Malformed("BMP image does not start with BM"));
        }
        let layout = info_header.pixel_layout()?;
        if file_header.data_offset < PIXEL_DATA_OFFSET {
            return Err(Error::Malformed("BMP pixel data overlaps its headers"));
        }

        let stride = row_stride(layout.width as usize);
        let data_length = stride
            .checked_mul(layout.height as usize)
            .ok_or(Error::UnsupportedFeature(
                "BMP dimensions exceed addressable memory",
            ))?;
        if data_length != info_header.data_length as usize {
            debug!(
                declared = info_header.data_length,
                computed = data_length,
                "BMP header declares a different pixel data length"
            );
        }
        if file_header.total_length as usize != self.image_data.len() {
            debug!(
                declared = file_header.total_length,
                actual = self.image_data.len(),
                "BMP header declares a different file length"
            );
        }

        let pixel_data = self
            .image_data
            .get(file_header.data_offset as usize..)
            .and_then(|data| data.get(..data_length))
            .ok_or(Error::Truncated)?;

        let mut image = Image::new(layout.width, layout.height, Color::BLACK);
        if stride == 0 || layout.height == 0 {
            return Ok(image);
        }

        trace!(?layout, stride, "decoding BMP rows");
        for (row, scanline) in pixel_data.chunks_exact(stride).enumerate() {
            let row = row as u32;
            let y = if layout.top_down {
                row
            } else {
                layout.height - 1 - row
            };

            for (pixel, bgr) in image.line_mut(y).iter_mut().zip(scanline.chunks_exact(3)) {
                pixel.b = bgr[0];
                pixel.g = bgr[1];
                pixel.r = bgr[2];
            }
        }

        Ok(image)
    }
}

/// Encodes images as uncompressed, bottom-up 24-bit BMP files
pub struct BMPEncoder<'image> {
    image: &'image Image,
    legacy_important_colors: bool,
}

impl<'image> BMPEncoder<'image> {
    /// Writes 0x01000000 into the important-colors field instead of 0, matching files from
    /// older versions of this converter byte for byte.
    pub fn legacy_important_colors(mut self, enabled: bool) -> Self {
        self.legacy_important_colors = enabled;
        self
    }
}

impl<'image> ImageEncoder<'image> for BMPEncoder<'image> {
    fn new(image: &'image Image) -> Self {
        Self {
            image,
            legacy_important_colors: false,
        }
    }

    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let mut info_header = InfoHeader::for_image(self.image.width(), self.image.height())?;
        if self.legacy_important_colors {
            info_header.important_colors = LEGACY_IMPORTANT_COLORS;
        }
        let file_header = FileHeader::for_info(&info_header)?;

        file_header.write(writer)?;
        info_header.write(writer)?;

        // Padding bytes past width * 3 are never touched and stay zero.
        let mut scanline = vec![0u8; row_stride(self.image.width() as usize)];
        for y in (0..self.image.height()).rev() {
            for (bgr, pixel) in scanline.chunks_exact_mut(3).zip(self.image.line(y)) {
                bgr[0] = pixel.b;
                bgr[1] = pixel.g;
                bgr[2] = pixel.r;
            }
            writer.write_all(&scanline)?;
        }

        Ok(())
    }
}
