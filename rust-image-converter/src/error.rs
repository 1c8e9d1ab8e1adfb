use std::io;

/// Result type returned by every codec in this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Describes an error encountered while reading or writing an image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The image is malformed in some way. The string describes how.
    #[error("malformed image: {0}")]
    Malformed(&'static str),
    /// A feature is not supported by the codec
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(&'static str),
    /// The image data ended before everything its header declared was read
    #[error("unexpected end of image data")]
    Truncated,
    /// The codec had a problem
    #[error("internal codec error: {0}")]
    InternalError(&'static str),
    /// There was an error reading or writing the image
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
    /// The JPEG decoder rejected the image
    #[error("JPEG decoding failed: {0}")]
    JpegDecode(#[from] jpeg_decoder::Error),
    /// The JPEG encoder rejected the image
    #[error("JPEG encoding failed: {0}")]
    JpegEncode(#[from] jpeg_encoder::EncodingError),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::Truncated,
            _ => Error::Io(err),
        }
    }
}

#[test]
fn eof_is_reported_as_truncation() {
    let err: Error = io::Error::from(io::ErrorKind::UnexpectedEof).into();
    assert!(matches!(err, Error::Truncated));

    let err: Error = io::Error::from(io::ErrorKind::PermissionDenied).into();
    assert!(matches!(err, Error::Io(_)));
}
