//! Decoding uploads and encoding annotated output.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// JPEG quality used when staging an upload for the workflow call.
pub const STAGING_JPEG_QUALITY: u8 = 95;

/// JPEG quality of the annotated image returned to the client.
pub const ANNOTATED_JPEG_QUALITY: u8 = 90;

/// Decode uploaded bytes into an upright RGB image.
///
/// The format is sniffed from the bytes, EXIF orientation is applied when
/// present, and any color mode is converted to 8-bit RGB.
pub fn decode_upload(bytes: &[u8]) -> MediaResult<RgbImage> {
    if bytes.is_empty() {
        return Err(MediaError::EmptyData);
    }

    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format();
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| MediaError::DecodeFailed(e.to_string()))?;

    // A broken EXIF block should not reject an otherwise valid image
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut image = DynamicImage::from_decoder(decoder).map_err(|e| MediaError::DecodeFailed(e.to_string()))?;
    image.apply_orientation(orientation);

    debug!(
        ?format,
        ?orientation,
        width = image.width(),
        height = image.height(),
        "Decoded upload"
    );

    Ok(image.into_rgb8())
}

/// Encode an RGB image as JPEG.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> MediaResult<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(image)?;
    Ok(buf)
}

/// Wrap JPEG bytes in a `data:` URL.
pub fn jpeg_data_url(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}
