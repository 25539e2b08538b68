use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{TranslationBackend, block_on};

/// LibreTranslate-compatible `/translate` endpoint, which accepts the whole
/// batch in one request.
#[derive(Debug, Clone)]
pub struct LibreTranslateBackend {
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct LibreRequest<'a> {
    q: &'a [String],
    source: &'a str,
    target: String,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LibreResponse {
    #[serde(rename = "translatedText")]
    translated_text: Vec<Option<String>>,
}

impl LibreTranslateBackend {
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            endpoint,
            api_key,
            timeout,
        }
    }
}

impl TranslationBackend for LibreTranslateBackend {
    fn translate_batch(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<Option<String>>> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .with_context(|| "failed to build http client")?;
        let body = LibreRequest {
            q: texts,
            source: source_lang,
            target: map_target_lang(target_lang),
            format: "text",
            api_key: self.api_key.as_deref(),
        };
        block_on(async {
            let response = client
                .post(&self.endpoint)
                .json(&body)
                .send()
                .await
                .with_context(|| "failed to call libretranslate")?;
            let status = response.status();
            let text = response
                .text()
                .await
                .with_context(|| "failed to read libretranslate response")?;
            if !status.is_success() {
                return Err(anyhow!("libretranslate error ({}): {}", status, text.trim()));
            }
            parse_response(&text)
        })?
    }
}

fn parse_response(body: &str) -> Result<Vec<Option<String>>> {
    let parsed: LibreResponse =
        serde_json::from_str(body).with_context(|| "invalid libretranslate response")?;
    Ok(parsed.translated_text)
}

/// LibreTranslate names Chinese variants differently from the catalog.
fn map_target_lang(code: &str) -> String {
    match code {
        "zh-CN" => "zh".to_string(),
        "zh-TW" => "zt".to_string(),
        other => other.to_lowercase(),
    }
}
