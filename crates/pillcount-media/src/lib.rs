//! Image handling for the PillCount service.
//!
//! This crate provides:
//! - Upload decoding with EXIF orientation and RGB normalization
//! - Box and label annotation of detections
//! - JPEG encoding and `data:` URL assembly for the JSON response

pub mod annotate;
pub mod codec;
pub mod error;
pub mod font;

pub use annotate::{annotate, Annotator, BOX_COLOR, LABEL_CHAR_WIDTH, STROKE_WIDTH};
pub use codec::{decode_upload, encode_jpeg, jpeg_data_url, ANNOTATED_JPEG_QUALITY, STAGING_JPEG_QUALITY};
pub use error::{MediaError, MediaResult};
pub use font::LabelFont;
