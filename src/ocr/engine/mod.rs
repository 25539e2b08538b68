mod parse;
mod tesseract;

use anyhow::{Context, Result};
use image::RgbImage;
use std::io::Write;
use tracing::{debug, info};

use super::{Quad, ScriptFamily};

pub use tesseract::list_tesseract_languages;

/// One recognized text instance as reported by an engine, before empty
/// detections are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub polygon: Quad,
    pub text: String,
    pub confidence: f32,
}

/// A constructed recognizer for one script family. Implementations must be
/// usable from several requests at once through a shared reference.
pub trait TextReader: Send + Sync {
    fn read_text(&self, image: &RgbImage) -> Result<Vec<RawDetection>>;
}

/// Builds readers for the pool. Construction may be slow (model loading).
pub trait ReaderFactory: Send + Sync {
    type Reader: TextReader;

    fn create(&self, family: ScriptFamily) -> Result<Self::Reader>;
}

/// Reader backed by the `tesseract` command line tool.
#[derive(Debug, Clone)]
pub struct TesseractReader {
    family: ScriptFamily,
    languages: String,
}

impl TextReader for TesseractReader {
    fn read_text(&self, image: &RgbImage) -> Result<Vec<RawDetection>> {
        let mut tmp = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .with_context(|| "failed to create temp file for OCR")?;
        image
            .write_to(&mut tmp, image::ImageFormat::Png)
            .with_context(|| "failed to write temp image for OCR")?;
        tmp.flush().ok();

        let tsv = tesseract::run_tesseract_tsv(tmp.path(), &self.languages)?;
        let lines = parse::parse_tsv_lines(&tsv);
        debug!("'{}' reader found {} line(s)", self.family, lines.len());
        Ok(lines)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TesseractFactory;

impl ReaderFactory for TesseractFactory {
    type Reader = TesseractReader;

    fn create(&self, family: ScriptFamily) -> Result<TesseractReader> {
        let languages = tesseract::require_languages(family.tesseract_languages())?;
        info!(
            "initialized tesseract reader for '{}' ({})",
            family, languages
        );
        Ok(TesseractReader { family, languages })
    }
}
