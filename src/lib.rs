use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub mod error;
pub mod languages;
pub mod logging;
pub mod ocr;
pub mod paths;
pub mod prefs;
pub mod render;
pub mod server;
pub mod settings;
pub mod translate;
#[cfg(test)]
mod test_util;

pub use error::TranslateImageError;

use crate::languages::LanguageCatalog;
use crate::ocr::{ReaderFactory, ScriptFamily, TesseractFactory, TextDetector, TextRegion};
use crate::prefs::UserPrefs;
use crate::render::{FontBook, Renderer};
use crate::settings::Settings;
use crate::translate::{AUTO_SOURCE, BackendImpl, BatchTranslator, TranslationBackend};

const SUMMARY_LIMIT: usize = 10;

/// Detect → translate → render, with every stage on a blocking worker.
pub struct ImageTranslator<F: ReaderFactory = TesseractFactory, B: TranslationBackend = BackendImpl> {
    detector: Arc<TextDetector<F>>,
    translator: Arc<BatchTranslator<B>>,
    renderer: Arc<Renderer>,
    prefs: Arc<UserPrefs>,
}

impl<F: ReaderFactory, B: TranslationBackend> Clone for ImageTranslator<F, B> {
    fn clone(&self) -> Self {
        Self {
            detector: self.detector.clone(),
            translator: self.translator.clone(),
            renderer: self.renderer.clone(),
            prefs: self.prefs.clone(),
        }
    }
}

impl ImageTranslator {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let backend = translate::build_backend(settings)
            .with_context(|| "failed to configure translation backend")?;
        let fonts = FontBook::load(settings.font_path.as_deref(), settings.font_family.as_deref());
        let prefs = UserPrefs::new(settings.prefs_path(), settings.default_language.clone());
        Ok(Self::new(
            TextDetector::new(TesseractFactory, settings.families.clone()),
            BatchTranslator::new(backend),
            Renderer::new(fonts, settings.border_width),
            prefs,
        ))
    }
}

impl<F, B> ImageTranslator<F, B>
where
    F: ReaderFactory + 'static,
    B: TranslationBackend + 'static,
{
    pub fn new(
        detector: TextDetector<F>,
        translator: BatchTranslator<B>,
        renderer: Renderer,
        prefs: UserPrefs,
    ) -> Self {
        Self {
            detector: Arc::new(detector),
            translator: Arc::new(translator),
            renderer: Arc::new(renderer),
            prefs: Arc::new(prefs),
        }
    }

    pub fn prefs(&self) -> Arc<UserPrefs> {
        self.prefs.clone()
    }

    /// Translates the text in `image_bytes` into `lang`, or the user's
    /// stored language when no override is given.
    pub async fn translate_image(
        &self,
        user_id: u64,
        image_bytes: Vec<u8>,
        lang: Option<String>,
    ) -> error::Result<TranslateOutcome> {
        let image_bytes: Arc<[u8]> = image_bytes.into();

        let detector = self.detector.clone();
        let bytes = image_bytes.clone();
        let detection = run_blocking(move || detector.detect(&bytes)).await??;
        if detection.regions.is_empty() {
            info!("no text detected");
            return Ok(TranslateOutcome::NoText);
        }
        let Some(script) = detection.script else {
            return Ok(TranslateOutcome::NoText);
        };
        info!(
            "detected {} region(s) with the '{}' reader",
            detection.regions.len(),
            script
        );

        let lang = match lang {
            Some(lang) => lang,
            None => {
                let prefs = self.prefs.clone();
                run_blocking(move || prefs.get_lang(user_id)).await?
            }
        };

        let originals = detection.texts();
        let translator = self.translator.clone();
        let texts = originals.clone();
        let target = lang.clone();
        let translations =
            run_blocking(move || translator.translate_batch(&texts, &target, AUTO_SOURCE)).await?;
        debug!("translated {} text(s) into {}", translations.len(), lang);

        let renderer = self.renderer.clone();
        let regions = Arc::new(detection.regions);
        let render_regions = regions.clone();
        let render_texts = translations.clone();
        let png = run_blocking(move || {
            renderer.render_translated_image(&image_bytes, &render_regions, &render_texts)
        })
        .await??;

        Ok(TranslateOutcome::Translated(Translation {
            script,
            lang,
            regions: Arc::unwrap_or_clone(regions),
            originals,
            translations,
            png,
        }))
    }
}

async fn run_blocking<T, F>(task: F) -> error::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| TranslateImageError::Worker(err.to_string()))
}

#[derive(Debug)]
pub enum TranslateOutcome {
    NoText,
    Translated(Translation),
}

#[derive(Debug, Clone)]
pub struct Translation {
    pub script: ScriptFamily,
    pub lang: String,
    pub regions: Vec<TextRegion>,
    pub originals: Vec<String>,
    pub translations: Vec<String>,
    /// Rendered image, PNG encoded.
    pub png: Vec<u8>,
}

impl Translation {
    pub fn summary(&self) -> String {
        format_summary(
            self.script.as_str(),
            &self.lang,
            self.regions.len(),
            &self.originals,
            &self.translations,
        )
    }
}

/// Header naming the script, language and region count, then one line per
/// string that changed, capped at ten.
pub fn format_summary(
    script: &str,
    lang: &str,
    region_count: usize,
    originals: &[String],
    translations: &[String],
) -> String {
    let language = LanguageCatalog.display_name(lang);
    let changed: Vec<String> = originals
        .iter()
        .zip(translations)
        .filter(|(orig, trans)| orig.trim() != trans.trim())
        .map(|(orig, trans)| format!("\"{}\" → \"{}\"", orig, trans))
        .collect();

    let mut lines = vec![format!(
        "Detected: {} → Translated to: {} ({} text region(s) found)",
        script, language, region_count
    )];
    lines.extend(changed.iter().take(SUMMARY_LIMIT).cloned());
    if changed.len() > SUMMARY_LIMIT {
        lines.push(format!("... and {} more", changed.len() - SUMMARY_LIMIT));
    }
    lines.join("\n")
}
