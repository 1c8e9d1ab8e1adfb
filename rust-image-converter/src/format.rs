use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use tracing::{debug, warn};

use crate::{
    bmp::{BMPDecoder, BMPEncoder},
    error::Result,
    image::{Image, ImageDecoder, ImageEncoder},
    jpeg::{JPEGDecoder, JPEGEncoder, DEFAULT_QUALITY},
    ppm::{PPMDecoder, PPMEncoder},
};

/// Settings applied when an image is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    /// JPEG quality, 1 to 100
    pub jpeg_quality: u8,
    /// Write the legacy 0x01000000 important-colors value into BMP headers
    pub bmp_legacy_important_colors: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_QUALITY,
            bmp_legacy_important_colors: false,
        }
    }
}

/// The image formats the converter can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Portable pixmap
    Ppm,
    /// Windows bitmap
    Bmp,
    /// JPEG/JFIF
    Jpeg,
}

/// The decode and encode entry points of one format.
#[derive(Clone, Copy)]
pub struct Codec {
    /// Decodes a complete encoded image
    pub decode: fn(&[u8]) -> Result<Image>,
    /// Encodes an image into a writer
    pub encode: fn(&Image, &SaveOptions, &mut dyn Write) -> Result<()>,
}

impl Format {
    /// Picks a format from the file extension. Matching is case-sensitive.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        match path.as_ref().extension()?.to_str()? {
            "jpg" | "jpeg" => Some(Format::Jpeg),
            "ppm" => Some(Format::Ppm),
            "bmp" => Some(Format::Bmp),
            _ => None,
        }
    }

    /// The codec functions for this format.
    pub fn codec(self) -> Codec {
        match self {
            Format::Ppm => Codec {
                decode: |data| PPMDecoder::new(data).decode(),
                encode: |image, _, writer| PPMEncoder::new(image).encode(writer),
            },
            Format::Bmp => Codec {
                decode: |data| BMPDecoder::new(data).decode(),
                encode: |image, options, writer| {
                    BMPEncoder::new(image)
                        .legacy_important_colors(options.bmp_legacy_important_colors)
                        .encode(writer)
                },
            },
            Format::Jpeg => Codec {
                decode: |data| JPEGDecoder::new(data).decode(),
                encode: |image, options, writer| {
                    JPEGEncoder::new(image)
                        .quality(options.jpeg_quality)
                        .encode(writer)
                },
            },
        }
    }

    /// Reads and decodes the image file at `path`.
    pub fn load<P: AsRef<Path>>(self, path: P) -> Result<Image> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        debug!(format = ?self, path = %path.display(), bytes = data.len(), "loading image");
        (self.codec().decode)(&data)
    }

    /// Encodes `image` into a new file at `path`. A partially written file is removed on failure.
    pub fn save<P: AsRef<Path>>(self, path: P, image: &Image, options: &SaveOptions) -> Result<()> {
        let path = path.as_ref();
        debug!(format = ?self, path = %path.display(), "saving image");

        let mut writer = BufWriter::new(File::create(path)?);
        let result = (self.codec().encode)(image, options, &mut writer)
            .and_then(|()| writer.flush().map_err(Into::into));

        if result.is_err() {
            drop(writer);
            if let Err(err) = fs::remove_file(path) {
                warn!(path = %path.display(), %err, "failed to remove partial output");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, image::Color};

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path("a/b/photo.jpg"), Some(Format::Jpeg));
        assert_eq!(Format::from_path("photo.jpeg"), Some(Format::Jpeg));
        assert_eq!(Format::from_path("scan.ppm"), Some(Format::Ppm));
        assert_eq!(Format::from_path("icon.bmp"), Some(Format::Bmp));
        assert_eq!(Format::from_path("notes.xyz"), None);
        assert_eq!(Format::from_path("bmp"), None);
        assert_eq!(Format::from_path(""), None);
    }

    #[test]
    fn extension_matching_is_case_sensitive() {
        assert_eq!(Format::from_path("PHOTO.JPG"), None);
        assert_eq!(Format::from_path("icon.Bmp"), None);
    }

    #[test]
    fn codecs_roundtrip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let image = Image::new(3, 2, Color::rgb(10, 200, 30));

        for (name, format) in [("a.bmp", Format::Bmp), ("a.ppm", Format::Ppm)] {
            let path = dir.path().join(name);
            format.save(&path, &image, &SaveOptions::default()).unwrap();
            assert_eq!(format.load(&path).unwrap(), image);
        }
    }

    #[test]
    fn failed_save_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.jpg");
        let image = Image::new(70_000, 1, Color::BLACK);

        let result = Format::Jpeg.save(&path, &image, &SaveOptions::default());
        assert!(matches!(result, Err(Error::UnsupportedFeature(_))));
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Format::Bmp.load(dir.path().join("missing.bmp")),
            Err(Error::Io(_))
        ));
    }
}
