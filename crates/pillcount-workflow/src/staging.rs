//! Temporary on-disk copy of an upload.

use std::io::Write;
use std::path::Path;

use image::RgbImage;
use pillcount_media::{encode_jpeg, STAGING_JPEG_QUALITY};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::WorkflowResult;

/// A JPEG copy of an image in a temporary file.
///
/// The file is removed when the value is dropped, whether or not the
/// workflow call that used it succeeded.
#[derive(Debug)]
pub struct StagedImage {
    file: NamedTempFile,
}

impl StagedImage {
    /// Encode `image` as JPEG into a fresh `.jpg` temp file.
    pub fn stage(image: &RgbImage) -> WorkflowResult<Self> {
        let jpeg = encode_jpeg(image, STAGING_JPEG_QUALITY)?;

        let mut file = tempfile::Builder::new()
            .prefix("pillcount-")
            .suffix(".jpg")
            .tempfile()?;
        file.write_all(&jpeg)?;
        file.flush()?;

        debug!(path = %file.path().display(), bytes = jpeg.len(), "Staged upload");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_file_is_jpeg() {
        let staged = StagedImage::stage(&RgbImage::new(8, 6)).unwrap();
        assert_eq!(staged.path().extension().and_then(|e| e.to_str()), Some("jpg"));
        let bytes = std::fs::read(staged.path()).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_staged_file_removed_on_drop() {
        let staged = StagedImage::stage(&RgbImage::new(4, 4)).unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        drop(staged);
        assert!(!path.exists());
    }
}
