use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    error::Error,
    format::{Format, SaveOptions},
    image::Image,
};

/// Why a conversion did not complete.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The input file's extension names no supported format
    #[error("Unknown input image format")]
    UnknownInputFormat(PathBuf),
    /// The output file's extension names no supported format
    #[error("Unknown output image format")]
    UnknownOutputFormat(PathBuf),
    /// The input image could not be read
    #[error("Loading failed: {0}")]
    Load(#[source] Error),
    /// The output image could not be written
    #[error("Saving failed: {0}")]
    Save(#[source] Error),
}

impl ConvertError {
    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConvertError::UnknownInputFormat(_) => 1,
            ConvertError::UnknownOutputFormat(_) => 2,
            ConvertError::Load(_) => 4,
            ConvertError::Save(_) => 5,
        }
    }
}

/// Loads `input` and saves it to `output`, picking both formats from the file extensions.
///
/// Both formats are resolved before anything is read. Returns the converted image.
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &SaveOptions,
) -> Result<Image, ConvertError> {
    let (input, output) = (input.as_ref(), output.as_ref());

    let input_format = Format::from_path(input)
        .ok_or_else(|| ConvertError::UnknownInputFormat(input.to_path_buf()))?;
    let output_format = Format::from_path(output)
        .ok_or_else(|| ConvertError::UnknownOutputFormat(output.to_path_buf()))?;

    let image = input_format.load(input).map_err(ConvertError::Load)?;
    info!(
        width = image.width(),
        height = image.height(),
        from = ?input_format,
        to = ?output_format,
        "converting"
    );
    output_format
        .save(output, &image, options)
        .map_err(ConvertError::Save)?;

    Ok(image)
}
