mod google;
mod libre;

use anyhow::{Result, anyhow};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, warn};

use crate::error::TranslateImageError;
use crate::settings::Settings;

pub use google::GoogleBackend;
pub use libre::LibreTranslateBackend;

pub const AUTO_SOURCE: &str = "auto";

/// Opaque string translation service.
///
/// Calls are synchronous. Network backends drive their requests on the
/// current tokio runtime, so they must be invoked from a blocking worker
/// (`tokio::task::spawn_blocking`), never directly from an async task.
pub trait TranslationBackend: Send + Sync {
    /// One request for the whole batch. `None` entries mean the service had
    /// no translation for that element.
    fn translate_batch(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<Option<String>>>;

    fn translate_text(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Option<String>> {
        let mut out = self.translate_batch(&[text.to_string()], source_lang, target_lang)?;
        Ok(out.pop().flatten())
    }
}

/// Best-effort batch translation: never fails, falls back to per-element
/// calls when the batch call fails and to the original text when an element
/// cannot be translated.
pub struct BatchTranslator<B: TranslationBackend> {
    backend: B,
}

impl<B: TranslationBackend> BatchTranslator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn translate_batch(&self, texts: &[String], target_lang: &str, source_lang: &str) -> Vec<String> {
        if texts.is_empty() {
            return Vec::new();
        }

        let pending: Vec<usize> = (0..texts.len())
            .filter(|&idx| !texts[idx].trim().is_empty())
            .collect();
        let mut output = texts.to_vec();
        if pending.is_empty() {
            return output;
        }

        let batch: Vec<String> = pending.iter().map(|&idx| texts[idx].clone()).collect();
        match self.backend.translate_batch(&batch, source_lang, target_lang) {
            Ok(results) if results.len() == batch.len() => {
                for (&idx, result) in pending.iter().zip(results) {
                    output[idx] = non_empty_or(result, &texts[idx]);
                }
            }
            outcome => {
                let reason = match outcome {
                    Ok(results) => format!(
                        "backend returned {} result(s) for {} text(s)",
                        results.len(),
                        batch.len()
                    ),
                    Err(err) => format!("{:#}", err),
                };
                let err = TranslateImageError::translation_backend(reason);
                error!("{}, falling back to individual translations", err);
                for &idx in &pending {
                    output[idx] = self.translate_text(&texts[idx], target_lang, source_lang);
                }
            }
        }
        output
    }

    pub fn translate_text(&self, text: &str, target_lang: &str, source_lang: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        match self.backend.translate_text(text, source_lang, target_lang) {
            Ok(result) => non_empty_or(result, text),
            Err(err) => {
                let err = TranslateImageError::translation_backend(format!("{:#}", err));
                warn!("{} for text '{}'", err, excerpt(text, 50));
                text.to_string()
            }
        }
    }
}

fn non_empty_or(result: Option<String>, original: &str) -> String {
    match result {
        Some(value) if !value.is_empty() => value,
        _ => original.to_string(),
    }
}

pub(crate) fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Google,
    LibreTranslate,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Google => "google",
            BackendKind::LibreTranslate => "libretranslate",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "google" => Ok(BackendKind::Google),
            "libretranslate" | "libre" => Ok(BackendKind::LibreTranslate),
            other => Err(anyhow!(
                "unknown translator backend '{}' (expected google or libretranslate)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub enum BackendImpl {
    Google(GoogleBackend),
    LibreTranslate(LibreTranslateBackend),
}

impl TranslationBackend for BackendImpl {
    fn translate_batch(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<Option<String>>> {
        match self {
            BackendImpl::Google(backend) => backend.translate_batch(texts, source_lang, target_lang),
            BackendImpl::LibreTranslate(backend) => {
                backend.translate_batch(texts, source_lang, target_lang)
            }
        }
    }

    fn translate_text(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Option<String>> {
        match self {
            BackendImpl::Google(backend) => backend.translate_text(text, source_lang, target_lang),
            BackendImpl::LibreTranslate(backend) => {
                backend.translate_text(text, source_lang, target_lang)
            }
        }
    }
}

pub fn build_backend(settings: &Settings) -> Result<BackendImpl> {
    let timeout = Duration::from_secs(settings.translator_timeout_secs);
    let endpoint = settings.translator_endpoint.clone();
    match settings.translator_backend {
        BackendKind::Google => Ok(BackendImpl::Google(GoogleBackend::new(endpoint, timeout))),
        BackendKind::LibreTranslate => {
            let endpoint = endpoint
                .ok_or_else(|| anyhow!("[translator] endpoint is required for libretranslate"))?;
            Ok(BackendImpl::LibreTranslate(LibreTranslateBackend::new(
                endpoint,
                settings.translator_api_key.clone(),
                timeout,
            )))
        }
    }
}

/// Drives an async request to completion from a blocking worker thread.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let handle = tokio::runtime::Handle::try_current()
        .map_err(|_| anyhow!("translation backend must run inside a tokio runtime"))?;
    Ok(handle.block_on(future))
}
