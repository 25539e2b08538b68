use image::RgbImage;
use tracing::{info, warn};

use super::engine::{RawDetection, ReaderFactory, TextReader};
use super::pool::ReaderPool;
use super::{DetectionResult, ScriptFamily, TextRegion};
use crate::error::{Result, TranslateImageError};
use crate::render::decode_rgb;

/// Runs every configured script family's reader against an image and keeps
/// the best-scoring output.
pub struct TextDetector<F: ReaderFactory> {
    pool: ReaderPool<F>,
    families: Vec<ScriptFamily>,
}

impl<F: ReaderFactory> TextDetector<F> {
    pub fn new(factory: F, families: Vec<ScriptFamily>) -> Self {
        Self {
            pool: ReaderPool::new(factory),
            families,
        }
    }

    pub fn pool(&self) -> &ReaderPool<F> {
        &self.pool
    }

    /// Decodes once, then tries each family in order. Only a decode failure
    /// aborts; reader failures drop that family from the candidates.
    pub fn detect(&self, image_bytes: &[u8]) -> Result<DetectionResult> {
        let image = decode_rgb(image_bytes)?;
        Ok(self.detect_image(&image))
    }

    pub fn detect_image(&self, image: &RgbImage) -> DetectionResult {
        let outcomes = self
            .families
            .iter()
            .map(|&family| (family, self.run_family(family, image)));
        let candidates = outcomes.filter_map(|(family, outcome)| match outcome {
            Ok(regions) => Some((family, regions)),
            Err(err) => {
                warn!("skipping '{}' reader: {}", family, err);
                None
            }
        });
        select_best(candidates)
    }

    fn run_family(&self, family: ScriptFamily, image: &RgbImage) -> Result<Vec<TextRegion>> {
        let reader = self.pool.get_reader(family)?;
        let raw = reader
            .read_text(image)
            .map_err(|err| TranslateImageError::DetectionBackend {
                family,
                reason: format!("{:#}", err),
            })?;
        Ok(to_regions(raw))
    }
}

fn to_regions(raw: Vec<RawDetection>) -> Vec<TextRegion> {
    raw.into_iter()
        .filter_map(|detection| {
            let text = detection.text.trim();
            if text.is_empty() {
                return None;
            }
            Some(TextRegion {
                polygon: detection.polygon,
                text: text.to_string(),
                confidence: detection.confidence.clamp(0.0, 1.0),
            })
        })
        .collect()
}

/// `region count × average confidence`; equals the confidence sum.
pub(crate) fn score(regions: &[TextRegion]) -> f64 {
    if regions.is_empty() {
        return 0.0;
    }
    let avg = regions.iter().map(|r| r.confidence as f64).sum::<f64>() / regions.len() as f64;
    regions.len() as f64 * avg
}

/// Folds candidates in order with a strict `>` against the best so far,
/// starting from zero: empty (and zero-scoring) families never win and the
/// earliest family keeps a tie.
pub(crate) fn select_best(
    candidates: impl IntoIterator<Item = (ScriptFamily, Vec<TextRegion>)>,
) -> DetectionResult {
    let mut best = DetectionResult::empty();
    let mut best_score = 0.0f64;

    for (family, regions) in candidates {
        if regions.is_empty() {
            continue;
        }
        let family_score = score(&regions);
        info!(
            "reader '{}': {} region(s), avg confidence {:.2}, score {:.2}",
            family,
            regions.len(),
            family_score / regions.len() as f64,
            family_score
        );
        if family_score > best_score {
            best_score = family_score;
            best = DetectionResult {
                regions,
                script: Some(family),
            };
        }
    }

    info!(
        "best result: {} text region(s) from '{}' (score {:.2})",
        best.regions.len(),
        best.label(),
        best_score
    );
    best
}
