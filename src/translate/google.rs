use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use super::{TranslationBackend, block_on};

const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Google's public web translation endpoint. It has no batch API, so a
/// batch is a sequence of single requests. A failed request leaves its
/// element untranslated; the batch fails only when every request failed.
#[derive(Debug, Clone)]
pub struct GoogleBackend {
    endpoint: String,
    timeout: Duration,
}

impl GoogleBackend {
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            timeout,
        }
    }

    async fn request(
        &self,
        client: &reqwest::Client,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Option<String>> {
        let response = client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .with_context(|| "failed to call google translate")?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| "failed to read google translate response")?;
        if !status.is_success() {
            return Err(anyhow!("google translate error ({}): {}", status, body.trim()));
        }
        let value: Value =
            serde_json::from_str(&body).with_context(|| "invalid google translate response")?;
        Ok(extract_translation(&value))
    }

    fn client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .with_context(|| "failed to build http client")
    }
}

impl TranslationBackend for GoogleBackend {
    fn translate_batch(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<Option<String>>> {
        let client = self.client()?;
        let results = block_on(async {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.request(&client, text, source_lang, target_lang).await);
            }
            out
        })?;
        collect_batch(results)
    }
}

fn collect_batch(results: Vec<Result<Option<String>>>) -> Result<Vec<Option<String>>> {
    if results.iter().all(Result::is_err) {
        if let Some(Err(err)) = results.into_iter().next() {
            return Err(err.context("every google translate request failed"));
        }
        return Ok(Vec::new());
    }
    Ok(results
        .into_iter()
        .enumerate()
        .map(|(idx, result)| match result {
            Ok(value) => value,
            Err(err) => {
                warn!("google translate failed for element {}: {:#}", idx, err);
                None
            }
        })
        .collect())
}

/// The response is `[[["translated", "original", ...], ...], ...]`, one inner
/// entry per sentence.
fn extract_translation(value: &Value) -> Option<String> {
    let sentences = value.get(0)?.as_array()?;
    let joined: String = sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .collect();
    if joined.is_empty() { None } else { Some(joined) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_sentence_segments() {
        let value = json!([
            [["Hola. ", "Hello. ", null, null, 10], ["Adiós", "Bye", null, null, 10]],
            null,
            "en"
        ]);
        assert_eq!(extract_translation(&value).as_deref(), Some("Hola. Adiós"));
    }

    #[test]
    fn missing_sentences_mean_no_translation() {
        assert_eq!(extract_translation(&json!([null, null, "en"])), None);
        assert_eq!(extract_translation(&json!({"error": "x"})), None);
    }

    #[test]
    fn one_failed_request_only_drops_its_element() {
        let results = vec![
            Ok(Some("Hola".to_string())),
            Err(anyhow!("google translate error (429): slow down")),
            Ok(None),
        ];
        assert_eq!(
            collect_batch(results).expect("batch"),
            vec![Some("Hola".to_string()), None, None]
        );
    }

    #[test]
    fn batch_fails_when_every_request_failed() {
        let results = vec![Err(anyhow!("timeout")), Err(anyhow!("timeout"))];
        let err = collect_batch(results).unwrap_err();
        assert!(format!("{:#}", err).contains("every google translate request failed"));
        assert!(collect_batch(Vec::new()).expect("empty").is_empty());
    }

    #[test]
    fn batch_outside_runtime_is_an_error() {
        let backend = GoogleBackend::new(None, Duration::from_secs(1));
        let err = backend
            .translate_batch(&["hello".to_string()], "auto", "es")
            .unwrap_err();
        assert!(err.to_string().contains("tokio runtime"));
    }
}
