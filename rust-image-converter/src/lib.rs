#![warn(missing_docs)]

//! Reads and writes PPM, BMP and JPEG images and converts between them.
mod error;
pub use error::{Error, Result};

/// Decoder and encoder for 24-bit BMP images
pub mod bmp;
/// Loads an image in one format and saves it in another
pub mod convert;
/// Picks a codec from a file extension
pub mod format;
/// Defines the in-memory image and the codec traits
pub mod image;
/// Decoder and encoder for JPEG images
pub mod jpeg;
/// Decoder and encoder for PPM images
pub mod ppm;
