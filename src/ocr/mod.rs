//! Username extraction from lobby screenshots.
//!
//! The pipeline is screenshot → pre-processing → Tesseract → per-line
//! username extraction. The OCR engine itself is a black box; all of the
//! decision logic lives in [`extract`].

pub mod engine;
pub mod extract;
pub mod preprocess;

pub use extract::{extract_users, scan_transcript};
pub use preprocess::Filter;

use anyhow::Result;
use image::DynamicImage;

/// Reader that extracts player usernames from a Minecraft lobby screenshot.
pub struct ScreenReader {
    raw: DynamicImage,
    filter: Filter,
}

impl ScreenReader {
    pub fn new(raw: DynamicImage, filter: Filter) -> Self {
        Self { raw, filter }
    }

    /// Runs the full pipeline: clean image → OCR → username extraction.
    ///
    /// Ambiguous lines contribute two candidates (see [`extract_users`]), so
    /// the result can be longer than the number of visual lines.
    pub fn usernames(&self) -> Result<Vec<String>> {
        let clean = preprocess::clean_image(&self.raw, self.filter);
        let transcript = engine::recognize_text(&clean)?;
        log::debug!("OCR transcript:\n{}", transcript);
        Ok(scan_transcript(&transcript).collect())
    }
}
