use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::error::{Error, Result};

/// Size of the file header in bytes.
pub const FILE_HEADER_LENGTH: u32 = 14;
/// Size of the info header in bytes.
pub const INFO_HEADER_LENGTH: u32 = 40;
/// Offset of the pixel data when no color table follows the headers.
pub const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_LENGTH + INFO_HEADER_LENGTH;
/// Magic bytes at the start of every BMP file.
pub const SIGNATURE: [u8; 2] = *b"BM";
/// The only bit depth this codec handles.
pub const BITS_PER_PIXEL: u16 = 24;
/// 300 dpi
pub const PIXELS_PER_METER: i32 = 11811;
/// Value older writers stored in the important-colors field.
pub const LEGACY_IMPORTANT_COLORS: u32 = 0x0100_0000;

/// Values of the info header's compression field.
#[derive(PartialEq, FromPrimitive, Debug, Clone, Copy)]
#[allow(missing_docs)]
pub enum Compression {
    Rgb = 0,
    Rle8 = 1,
    Rle4 = 2,
    Bitfields = 3,
    Jpeg = 4,
    Png = 5,
    AlphaBitfields = 6,
    Cmyk = 11,
    CmykRle8 = 12,
    CmykRle4 = 13,
}

/// Number of bytes a 24-bit row of `width` pixels occupies, padded to a multiple of 4.
pub const fn row_stride(width: usize) -> usize {
    4 * ((width * 3 + 3) / 4)
}

fn too_large() -> Error {
    Error::UnsupportedFeature("Image is too large for a BMP file")
}

/// The 14 byte header every BMP file starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Always `BM` in files this codec accepts
    pub signature: [u8; 2],
    /// Size of the whole file in bytes
    pub total_length: u32,
    /// Unused, written as 0
    pub reserved: u32,
    /// Offset from the start of the file to the pixel data
    pub data_offset: u32,
}

impl FileHeader {
    /// Builds the file header for pixel data described by `info`.
    pub fn for_info(info: &InfoHeader) -> Result<Self> {
        let total_length = PIXEL_DATA_OFFSET
            .checked_add(info.data_length)
            .ok_or_else(too_large)?;

        Ok(Self {
            signature: SIGNATURE,
            total_length,
            reserved: 0,
            data_offset: PIXEL_DATA_OFFSET,
        })
    }

    /// Reads the header from the start of `reader`.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut signature = [0u8; 2];
        reader.read_exact(&mut signature)?;

        Ok(Self {
            signature,
            total_length: reader.read_u32::<LittleEndian>()?,
            reserved: reader.read_u32::<LittleEndian>()?,
            data_offset: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Writes the header, little-endian and without padding.
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.signature)?;
        writer.write_u32::<LittleEndian>(self.total_length)?;
        writer.write_u32::<LittleEndian>(self.reserved)?;
        writer.write_u32::<LittleEndian>(self.data_offset)
    }
}

/// The classic 40 byte BITMAPINFOHEADER.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct InfoHeader {
    pub header_length: u32,
    pub width: i32,
    /// Positive for bottom-up rows, negative for top-down rows.
    pub height: i32,
    pub plane_count: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub data_length: u32,
    pub resolution_horizontal: i32,
    pub resolution_vertical: i32,
    pub colors_used: u32,
    pub important_colors: u32,
}

/// Dimensions and row order of a validated info header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct PixelLayout {
    pub width: u32,
    pub height: u32,
    pub top_down: bool,
}

impl InfoHeader {
    /// Builds an uncompressed 24-bit info header for a `width` x `height` image.
    pub fn for_image(width: u32, height: u32) -> Result<Self> {
        let signed_width = i32::try_from(width).map_err(|_| too_large())?;
        let signed_height = i32::try_from(height).map_err(|_| too_large())?;
        let data_length = u32::try_from(row_stride(width as usize))
            .ok()
            .and_then(|stride| stride.checked_mul(height))
            .ok_or_else(too_large)?;

        Ok(Self {
            header_length: INFO_HEADER_LENGTH,
            width: signed_width,
            height: signed_height,
            plane_count: 1,
            bits_per_pixel: BITS_PER_PIXEL,
            compression: Compression::Rgb as u32,
            data_length,
            resolution_horizontal: PIXELS_PER_METER,
            resolution_vertical: PIXELS_PER_METER,
            colors_used: 0,
            important_colors: 0,
        })
    }

    /// Reads the header from `reader`, directly after the file header.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            header_length: reader.read_u32::<LittleEndian>()?,
            width: reader.read_i32::<LittleEndian>()?,
            height: reader.read_i32::<LittleEndian>()?,
            plane_count: reader.read_u16::<LittleEndian>()?,
            bits_per_pixel: reader.read_u16::<LittleEndian>()?,
            compression: reader.read_u32::<LittleEndian>()?,
            data_length: reader.read_u32::<LittleEndian>()?,
            resolution_horizontal: reader.read_i32::<LittleEndian>()?,
            resolution_vertical: reader.read_i32::<LittleEndian>()?,
            colors_used: reader.read_u32::<LittleEndian>()?,
            important_colors: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Writes the header, little-endian and without padding.
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.header_length)?;
        writer.write_i32::<LittleEndian>(self.width)?;
        writer.write_i32::<LittleEndian>(self.height)?;
        writer.write_u16::<LittleEndian>(self.plane_count)?;
        writer.write_u16::<LittleEndian>(self.bits_per_pixel)?;
        writer.write_u32::<LittleEndian>(self.compression)?;
        writer.write_u32::<LittleEndian>(self.data_length)?;
        writer.write_i32::<LittleEndian>(self.resolution_horizontal)?;
        writer.write_i32::<LittleEndian>(self.resolution_vertical)?;
        writer.write_u32::<LittleEndian>(self.colors_used)?;
        writer.write_u32::<LittleEndian>(self.important_colors)
    }

    /// Checks that the pixel data is something this codec can read, uncompressed 24-bit RGB.
    pub fn pixel_layout(&self) -> Result<PixelLayout> {
        if self.header_length < INFO_HEADER_LENGTH {
            return Err(Error::Malformed("BMP info header is shorter than 40 bytes"));
        }
        if self.header_length > INFO_HEADER_LENGTH {
            return Err(Error::UnsupportedFeature(
                "Only the 40 byte BMP info header is supported",
            ));
        }
        if self.plane_count != 1 {
            return Err(Error::Malformed("BMP plane count must be 1"));
        }
        if self.bits_per_pixel != BITS_PER_PIXEL {
            return Err(Error::UnsupportedFeature(
                "Only 24 bits per pixel BMP images are supported",
            ));
        }

        match Compression::from_u32(self.compression) {
            Some(Compression::Rgb) => {}
            Some(_) => {
                return Err(Error::UnsupportedFeature(
                    "Compressed BMP images are not supported",
                ))
            }
            None => return Err(Error::Malformed("Unknown BMP compression type")),
        }

        if self.width < 0 {
            return Err(Error::Malformed("BMP width is negative"));
        }

        Ok(PixelLayout {
            width: self.width.unsigned_abs(),
            height: self.height.unsigned_abs(),
            top_down: self.height < 0,
        })
    }
}
