//! Label font loading.
//!
//! A scalable system font is preferred. When none can be loaded the
//! annotator falls back to the 8x8 bitmap glyphs from `font8x8`, so a
//! missing font never fails a request.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// Pixel height of outline-font labels.
pub const LABEL_FONT_SIZE: f32 = 16.0;

/// Font files probed, in order, when no explicit path is configured.
pub const FONT_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BITMAP_ADVANCE: i32 = 9;
// Centers the 8px glyphs in a 16px line
const BITMAP_TOP_PADDING: i32 = 4;

/// Font used to render box labels.
pub enum LabelFont {
    /// TrueType/OpenType font rendered at [`LABEL_FONT_SIZE`].
    Outline(FontVec),
    /// Built-in 8x8 bitmap glyphs.
    Bitmap,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelFont::Outline(_) => f.write_str("LabelFont::Outline"),
            LabelFont::Bitmap => f.write_str("LabelFont::Bitmap"),
        }
    }
}

impl LabelFont {
    /// Load the first usable font: `explicit` first, then [`FONT_CANDIDATES`].
    pub fn load(explicit: Option<&Path>) -> Self {
        let candidates = explicit
            .map(Path::to_path_buf)
            .into_iter()
            .chain(FONT_CANDIDATES.iter().map(PathBuf::from));

        for path in candidates {
            match Self::from_file(&path) {
                Ok(font) => {
                    info!(path = %path.display(), "Loaded label font");
                    return font;
                }
                Err(e) => debug!(path = %path.display(), error = %e, "Label font unavailable"),
            }
        }

        warn!("No label font could be loaded, using built-in bitmap font");
        LabelFont::Bitmap
    }

    /// Load using `LABEL_FONT_PATH` when set.
    pub fn from_env() -> Self {
        let explicit = std::env::var_os("LABEL_FONT_PATH").map(PathBuf::from);
        Self::load(explicit.as_deref())
    }

    /// Load a font file. Collections (`.ttc`) use their first face.
    pub fn from_file(path: &Path) -> MediaResult<Self> {
        let bytes = std::fs::read(path)?;
        FontVec::try_from_vec_and_index(bytes, 0)
            .map(LabelFont::Outline)
            .map_err(|e| MediaError::DecodeFailed(format!("font {}: {}", path.display(), e)))
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, LabelFont::Bitmap)
    }

    /// Draw `text` with its top-left corner at (`x`, `y`), clipped to the canvas.
    pub fn draw_text(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, text: &str) {
        match self {
            LabelFont::Outline(font) => {
                draw_text_mut(canvas, color, x, y, PxScale::from(LABEL_FONT_SIZE), font, text)
            }
            LabelFont::Bitmap => draw_bitmap_text(canvas, color, x, y, text),
        }
    }
}

fn draw_bitmap_text(canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, text: &str) {
    let (width, height) = canvas.dimensions();
    let top = y.saturating_add(BITMAP_TOP_PADDING);

    for (i, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        let left = x.saturating_add((i as i32).saturating_mul(BITMAP_ADVANCE));

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8i32 {
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                let px = left.saturating_add(col);
                let py = top.saturating_add(row as i32);
                if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                    canvas.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}
