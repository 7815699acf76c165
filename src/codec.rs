use crate::errors::{LithoError, Result};
use crate::settings::Settings;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder, ImageReader, RgbImage};
use std::io::Cursor;

#[derive(Debug, Clone, Copy)]
pub struct DecodeLimits {
    pub max_megapixels: u64,
}

impl From<&Settings> for DecodeLimits {
    fn from(settings: &Settings) -> Self {
        Self {
            max_megapixels: settings.max_megapixels,
        }
    }
}

fn decoding_error(e: impl std::fmt::Display) -> LithoError {
    LithoError::DecodingError {
        message: e.to_string(),
    }
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(decoding_error)?;
    if reader.format().is_none() {
        return Err(decoding_error("unrecognized image format"));
    }
    Ok(reader)
}

/// Decodes uploaded bytes into an 8-bit RGB image.
///
/// The format is sniffed from the content, not from the file name. Alpha is
/// dropped and animated formats yield their first frame.
pub fn decode_upload(bytes: &[u8], limits: DecodeLimits) -> Result<RgbImage> {
    if bytes.is_empty() {
        return Err(LithoError::EmptyUpload);
    }

    // Check dimensions from the header before allocating the full frame
    let (width, height) = reader(bytes)?.into_dimensions().map_err(decoding_error)?;
    let megapixels = (width as u64 * height as u64) / 1_000_000;
    if megapixels > limits.max_megapixels {
        return Err(LithoError::ImageTooLarge {
            megapixels,
            limit: limits.max_megapixels,
        });
    }

    let decoded = reader(bytes)?.decode().map_err(decoding_error)?;
    tracing::debug!(width, height, color = ?decoded.color(), "decoded upload");
    Ok(decoded.into_rgb8())
}

fn write_png(raw: &[u8], width: u32, height: u32, color: ExtendedColorType) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(raw, width, height, color)
        .map_err(|e| LithoError::EncodeError {
            message: e.to_string(),
        })?;
    Ok(out)
}

pub fn encode_rgb_png(image: &RgbImage) -> Result<Vec<u8>> {
    write_png(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgb8)
}

/// Single-channel PNG, used for height maps.
pub fn encode_gray_png(image: &GrayImage) -> Result<Vec<u8>> {
    write_png(image.as_raw(), image.width(), image.height(), ExtendedColorType::L8)
}

pub fn to_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
