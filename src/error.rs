use thiserror::Error;

use crate::ocr::ScriptFamily;

pub type Result<T> = std::result::Result<T, TranslateImageError>;

#[derive(Debug, Error)]
pub enum TranslateImageError {
    /// A script reader could not be constructed. The family stays disabled
    /// until the process restarts.
    #[error("failed to initialize '{family}' reader: {reason}")]
    Initialization { family: ScriptFamily, reason: String },

    /// A constructed reader failed while recognizing one image.
    #[error("'{family}' reader failed: {reason}")]
    DetectionBackend { family: ScriptFamily, reason: String },

    #[error("translation backend failed: {0}")]
    TranslationBackend(String),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("unsupported image type: {0}")]
    UnsupportedImage(String),

    #[error("failed to render translated image: {0}")]
    Rendering(String),

    #[error("worker task failed: {0}")]
    Worker(String),
}

impl TranslateImageError {
    /// Backend failure that the batch translator recovers from.
    pub(crate) fn translation_backend(reason: impl std::fmt::Display) -> Self {
        TranslateImageError::TranslationBackend(reason.to_string())
    }

    pub(crate) fn rendering(reason: impl std::fmt::Display) -> Self {
        TranslateImageError::Rendering(reason.to_string())
    }

    /// Whether the caller supplied bad input rather than the pipeline failing.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TranslateImageError::Decode(_) | TranslateImageError::UnsupportedImage(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_failures_are_server_side() {
        let err = TranslateImageError::translation_backend("quota exceeded");
        assert!(matches!(&err, TranslateImageError::TranslationBackend(reason) if reason == "quota exceeded"));
        assert_eq!(err.to_string(), "translation backend failed: quota exceeded");
        assert!(!err.is_client_error());
        assert!(TranslateImageError::UnsupportedImage("image/bmp".to_string()).is_client_error());
    }
}
