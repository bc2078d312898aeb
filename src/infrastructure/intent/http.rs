//! Remote intent extraction over HTTP

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::query::{Entity, Extraction, Intent, IntentExtractor};
use crate::domain::DomainError;

const SERVICE: &str = "intent";

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    intent: String,
    #[serde(default)]
    entities: Vec<Entity>,
    #[serde(default)]
    confidence: f32,
}

/// Client for an external understanding service
///
/// Sends `{"text": ...}` and expects `{"intent", "entities", "confidence"}`.
#[derive(Debug, Clone)]
pub struct HttpIntentExtractor {
    client: reqwest::Client,
    url: String,
}

impl HttpIntentExtractor {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl IntentExtractor for HttpIntentExtractor {
    async fn extract(&self, text: &str) -> Result<Extraction, DomainError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ExtractRequest { text })
            .send()
            .await
            .map_err(|e| DomainError::service_unavailable(SERVICE, format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::service_unavailable(
                SERVICE,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let body: ExtractResponse = response.json().await.map_err(|e| {
            DomainError::service_unavailable(SERVICE, format!("Failed to parse response: {}", e))
        })?;

        let intent = Intent::from_label(&body.intent);
        if intent == Intent::Unknown {
            return Err(DomainError::intent_unresolved(format!(
                "Service returned intent '{}'",
                body.intent
            )));
        }

        Ok(Extraction {
            intent,
            entities: body.entities,
            confidence: body.confidence,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::EntityKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn extractor(server: &MockServer) -> HttpIntentExtractor {
        HttpIntentExtractor::new(format!("{}/extract", server.uri()), Duration::from_millis(500))
            .unwrap()
    }

    #[tokio::test]
    async fn test_extract_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/extract"))
            .and(body_json(json!({ "text": "find image datasets" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "intent": "search_datasets",
                "entities": [
                    { "kind": "category", "value": "vision" },
                    { "kind": "keyword", "value": "photos" }
                ],
                "confidence": 0.9
            })))
            .mount(&server)
            .await;

        let extraction = extractor(&server)
            .await
            .extract("find image datasets")
            .await
            .unwrap();

        assert_eq!(extraction.intent, Intent::SearchDatasets);
        assert_eq!(extraction.first(EntityKind::Category), Some("vision"));
        assert_eq!(extraction.first(EntityKind::Keyword), Some("photos"));
    }

    #[tokio::test]
    async fn test_unknown_intent_is_unresolved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "intent": "unknown" })))
            .mount(&server)
            .await;

        let result = extractor(&server).await.extract("???").await;
        assert!(matches!(result, Err(DomainError::IntentUnresolved { .. })));
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = extractor(&server).await.extract("text").await;
        assert!(matches!(result, Err(DomainError::ServiceUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "intent": "search" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let result = extractor(&server).await.extract("text").await;
        assert!(matches!(result, Err(DomainError::ServiceUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_is_unavailable() {
        let extractor =
            HttpIntentExtractor::new("http://127.0.0.1:1/extract", Duration::from_millis(200))
                .unwrap();

        let result = extractor.extract("text").await;
        assert!(matches!(result, Err(DomainError::ServiceUnavailable { .. })));
    }
}
