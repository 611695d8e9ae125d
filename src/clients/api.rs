//! Remote data-API strategy.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

use super::{mock_record, AcquisitionStrategy, ProfileSource};
use crate::config::ApiSettings;
use crate::error::{AcquireError, AcquireResult};
use crate::normalize::{normalize, NormalizedRecord};

const USER_AGENT: &str = concat!("profacquire/", env!("CARGO_PKG_VERSION"));

/// Upstream error bodies are truncated to this many characters.
const MAX_DETAIL_CHARS: usize = 200;

/// Fetches profiles from a remote profile data API with a bearer credential.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> AcquireResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout())
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    async fn fetch(&self, identifier: &str) -> AcquireResult<NormalizedRecord> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AcquireError::Config("API key not configured (set PROXYCURL_API_KEY)".to_string())
        })?;

        info!("Requesting profile from API: {}", identifier);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", identifier)])
            .bearer_auth(api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Profile API returned {} for {}", status, identifier);
            return Err(AcquireError::Upstream {
                status: status.as_u16(),
                detail: truncate(&body),
            });
        }

        match response.json::<Value>().await? {
            Value::Object(map) => Ok(normalize(map)),
            other => Err(AcquireError::Upstream {
                status: status.as_u16(),
                detail: format!("expected a JSON object, got {}", truncate(&other.to_string())),
            }),
        }
    }
}

fn truncate(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= MAX_DETAIL_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_DETAIL_CHARS).collect();
        format!("{}...", head)
    }
}

#[async_trait]
impl ProfileSource for ApiClient {
    fn strategy(&self) -> AcquisitionStrategy {
        AcquisitionStrategy::Api
    }

    async fn get_profile(&self, identifier: &str, mock: bool) -> AcquireResult<NormalizedRecord> {
        if mock {
            return Ok(mock_record());
        }
        self.fetch(identifier).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PROFILE_URL: &str = "https://www.linkedin.com/in/janedoe";

    fn client(server: &MockServer, api_key: Option<&str>) -> ApiClient {
        ApiClient::new(&ApiSettings {
            endpoint: format!("{}/proxycurl/api/v2/linkedin", server.uri()),
            api_key: api_key.map(str::to_string),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_success_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/proxycurl/api/v2/linkedin"))
            .and(query_param("url", PROFILE_URL))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "full_name": "Jane Doe",
                "headline": "",
                "profile_pic_url": "https://example.com/pic.jpg",
                "people_also_viewed": [{"name": "John"}],
                "experiences": [{"title": "Engineer", "logo_url": null, "company": "Acme"}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let record = client(&server, Some("test-key"))
            .get_profile(PROFILE_URL, false)
            .await
            .unwrap();

        assert_eq!(
            record.into_value(),
            json!({
                "full_name": "Jane Doe",
                "experiences": [{"title": "Engineer", "company": "Acme"}],
            })
        );
    }

    #[tokio::test]
    async fn test_non_success_is_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Profile not found"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server, Some("test-key"))
            .get_profile(PROFILE_URL, false)
            .await
            .unwrap_err();

        match &err {
            AcquireError::Upstream { status, detail } => {
                assert_eq!(*status, 404);
                assert_eq!(detail, "Profile not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.user_message(), "profile not found");
    }

    #[tokio::test]
    async fn test_mock_mode_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let api = client(&server, None);
        let first = api.get_profile(PROFILE_URL, true).await.unwrap();
        let second = api.get_profile(PROFILE_URL, true).await.unwrap();
        assert_eq!(first, mock_record());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let server = MockServer::start().await;
        let err = client(&server, None)
            .get_profile(PROFILE_URL, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AcquireError::Config(_)));
    }

    #[test]
    fn test_truncate_long_detail() {
        let long = "x".repeat(500);
        let detail = truncate(&long);
        assert_eq!(detail.chars().count(), MAX_DETAIL_CHARS + 3);
        assert!(detail.ends_with("..."));
    }
}
