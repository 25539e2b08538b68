use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::sync::Arc;
use tracing::error;

use crate::error::TranslateImageError;
use crate::languages::LanguageCatalog;
use crate::ocr::ReaderFactory;
use crate::prefs::UserPrefs;
use crate::translate::TranslationBackend;
use crate::{ImageTranslator, TranslateOutcome};

use super::models::{LangResponse, RegionPayload, SetLangRequest, TranslateRequest, TranslateResponse};

const NO_TEXT_SUMMARY: &str = "No text was detected in that image.";

#[derive(Debug)]
pub(crate) struct ServerError {
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl ServerError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::internal(err.to_string())
    }
}

impl From<TranslateImageError> for ServerError {
    fn from(err: TranslateImageError) -> Self {
        if err.is_client_error() {
            ServerError::bad_request(err.to_string())
        } else {
            error!("image translation failed: {}", err);
            ServerError::internal(err.to_string())
        }
    }
}

pub(crate) async fn translate_request<F, B>(
    translator: &ImageTranslator<F, B>,
    catalog: &LanguageCatalog,
    request: TranslateRequest,
) -> Result<TranslateResponse, ServerError>
where
    F: ReaderFactory + 'static,
    B: TranslationBackend + 'static,
{
    let bytes = BASE64
        .decode(request.data_base64.trim())
        .map_err(|err| ServerError::bad_request(format!("invalid data_base64: {}", err)))?;
    if bytes.is_empty() {
        return Err(ServerError::bad_request("data_base64 is empty"));
    }
    let lang = match request.lang.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Some(resolve_language(catalog, value)?.to_string()),
        _ => None,
    };

    match translator.translate_image(request.user_id, bytes, lang).await? {
        TranslateOutcome::NoText => Ok(TranslateResponse {
            script: "unknown".to_string(),
            lang: None,
            regions: Vec::new(),
            summary: NO_TEXT_SUMMARY.to_string(),
            data_base64: None,
        }),
        TranslateOutcome::Translated(result) => {
            let summary = result.summary();
            let regions = result
                .regions
                .iter()
                .zip(&result.translations)
                .map(|(region, translated)| RegionPayload {
                    polygon: region.polygon,
                    text: region.text.clone(),
                    translated: translated.clone(),
                    confidence: region.confidence,
                })
                .collect();
            Ok(TranslateResponse {
                script: result.script.as_str().to_string(),
                lang: Some(result.lang),
                regions,
                summary,
                data_base64: Some(BASE64.encode(&result.png)),
            })
        }
    }
}

/// Preference file IO runs on a blocking worker.
pub(crate) async fn current_lang(
    prefs: Arc<UserPrefs>,
    catalog: &LanguageCatalog,
    user_id: u64,
) -> Result<LangResponse, ServerError> {
    let code = tokio::task::spawn_blocking(move || prefs.get_lang(user_id))
        .await
        .map_err(worker_failed)?;
    let name = catalog.display_name(&code).to_string();
    Ok(LangResponse { user_id, code, name })
}

pub(crate) async fn update_lang(
    prefs: Arc<UserPrefs>,
    catalog: &LanguageCatalog,
    user_id: u64,
    request: SetLangRequest,
) -> Result<LangResponse, ServerError> {
    let code = resolve_language(catalog, &request.language)?;
    tokio::task::spawn_blocking(move || prefs.set_lang(user_id, code))
        .await
        .map_err(worker_failed)??;
    Ok(LangResponse {
        user_id,
        code: code.to_string(),
        name: catalog.display_name(code).to_string(),
    })
}

fn worker_failed(err: tokio::task::JoinError) -> ServerError {
    TranslateImageError::Worker(err.to_string()).into()
}

fn resolve_language(catalog: &LanguageCatalog, input: &str) -> Result<&'static str, ServerError> {
    catalog
        .resolve(input)
        .ok_or_else(|| ServerError::bad_request(format!("unknown language '{}'", input.trim())))
}
