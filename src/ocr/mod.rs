mod detect;
mod engine;
mod geom;
mod pool;
mod scripts;

use serde::Serialize;

pub use detect::TextDetector;
pub use engine::{
    RawDetection, ReaderFactory, TesseractFactory, TesseractReader, TextReader,
    list_tesseract_languages,
};
pub use geom::{Point, Quad, Rect};
pub use pool::ReaderPool;
pub use scripts::ScriptFamily;

/// One detected instance of text. `text` is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRegion {
    pub polygon: Quad,
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    pub regions: Vec<TextRegion>,
    pub script: Option<ScriptFamily>,
}

impl DetectionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Winning family name, or `"unknown"` when nothing was detected.
    pub fn label(&self) -> &'static str {
        self.script.map(|family| family.as_str()).unwrap_or("unknown")
    }

    pub fn texts(&self) -> Vec<String> {
        self.regions.iter().map(|region| region.text.clone()).collect()
    }
}
