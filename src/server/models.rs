use serde::{Deserialize, Serialize};

use crate::ocr::Quad;

#[derive(Debug, Deserialize)]
pub(crate) struct TranslateRequest {
    pub(crate) user_id: u64,
    pub(crate) data_base64: String,
    #[serde(default)]
    pub(crate) lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TranslateResponse {
    pub(crate) script: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) lang: Option<String>,
    pub(crate) regions: Vec<RegionPayload>,
    pub(crate) summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data_base64: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegionPayload {
    pub(crate) polygon: Quad,
    pub(crate) text: String,
    pub(crate) translated: String,
    pub(crate) confidence: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SetLangRequest {
    pub(crate) language: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LangResponse {
    pub(crate) user_id: u64,
    pub(crate) code: String,
    pub(crate) name: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct LanguagesQuery {
    pub(crate) q: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}
