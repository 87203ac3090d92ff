// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! reqwest-backed implementation of [`SurveyApi`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use polling_config::PollingConfig;
use polling_core::{
    AvailableSurveysSnapshot, EventOutcome, PollingError, SurveyApi, SurveyDetails, SurveyId,
};
use reqwest::{Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::endpoints::Endpoints;

/// Failure prefix for the read endpoints.
const LOAD_CONTEXT: &str = "Failed to load";
/// Failure prefix for event submission.
const EVENT_CONTEXT: &str = "Failed to log event";

/// Response envelope of the survey detail endpoint.
#[derive(Debug, Deserialize)]
struct DetailsEnvelope {
    #[serde(default)]
    data: Option<SurveyDetails>,
}

/// HTTP client for the Polling survey and event API.
#[derive(Debug, Clone)]
pub struct PollingApiClient {
    http: reqwest::Client,
    endpoints: Arc<Endpoints>,
}

impl PollingApiClient {
    pub fn new(endpoints: Arc<Endpoints>, timeout: Duration) -> Result<Self, PollingError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PollingError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { http, endpoints })
    }

    pub fn from_config(
        config: &PollingConfig,
        endpoints: Arc<Endpoints>,
    ) -> Result<Self, PollingError> {
        Self::new(
            endpoints,
            Duration::from_secs(config.endpoints.request_timeout_secs),
        )
    }

    pub fn endpoints(&self) -> &Arc<Endpoints> {
        &self.endpoints
    }

    async fn get_json<T: DeserializeOwned + Default>(
        &self,
        url: Url,
        decode_context: &str,
    ) -> Result<T, PollingError> {
        let response = self.http.get(url).send().await.map_err(transport_error)?;
        let body = read_success_body(response, LOAD_CONTEXT).await?;
        decode(&body, decode_context)
    }
}

#[async_trait]
impl SurveyApi for PollingApiClient {
    async fn available_surveys(&self) -> Result<AvailableSurveysSnapshot, PollingError> {
        let url = self.endpoints.available_surveys_url()?;
        let snapshot: AvailableSurveysSnapshot = self.get_json(url, "available surveys").await?;
        debug!(count = snapshot.count(), "available surveys fetched");
        Ok(snapshot)
    }

    async fn survey_details(&self, survey_id: &SurveyId) -> Result<SurveyDetails, PollingError> {
        let url = self.endpoints.survey_details_url(survey_id)?;
        let envelope: Option<DetailsEnvelope> = self.get_json(url, "survey details").await?;
        let details = envelope.and_then(|e| e.data).unwrap_or_default();
        debug!(
            survey_id = %survey_id,
            status = details.user_survey_status.as_deref().unwrap_or("<none>"),
            "survey details fetched"
        );
        Ok(details)
    }

    async fn log_event(&self, name: &str, value: &str) -> Result<EventOutcome, PollingError> {
        let url = self.endpoints.event_url()?;
        let response = self
            .http
            .post(url)
            .form(&[("event", name), ("value", value)])
            .send()
            .await
            .map_err(transport_error)?;
        let body = read_success_body(response, EVENT_CONTEXT).await?;
        let outcome: EventOutcome = decode(&body, "event response")?;
        debug!(
            event = name,
            triggers = outcome.triggers().len(),
            "event logged"
        );
        Ok(outcome)
    }
}

fn transport_error(e: reqwest::Error) -> PollingError {
    PollingError::Transport {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

async fn read_success_body(response: Response, context: &str) -> Result<String, PollingError> {
    let status = response.status();
    if !status.is_success() {
        debug!(status = %status, context, "non-success response");
        return Err(PollingError::Status {
            context: context.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(|e| PollingError::Transport {
        message: format!("failed to read response body: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Decodes a JSON body. An empty body decodes to `T::default()`.
fn decode<T: DeserializeOwned + Default>(body: &str, context: &str) -> Result<T, PollingError> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(body).map_err(|e| PollingError::Decode {
        context: context.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::Credentials;
    use wiremock::matchers::{body_string, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> PollingApiClient {
        let endpoints = Endpoints::new(base_url, base_url, Credentials::new("cust-1", "key-1"))
            .unwrap();
        PollingApiClient::new(Arc::new(endpoints), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn available_surveys_success() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "data": [
                {"survey_uuid": "s1", "name": "First", "user_survey_status": "available"},
                {"survey_uuid": "s2", "name": "Second", "reward": {"value": 10}}
            ]
        });

        Mock::given(method("GET"))
            .and(path("/api/sdk/surveys/available"))
            .and(query_param("customer_id", "cust-1"))
            .and(query_param("api_key", "key-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let snapshot = test_client(&server.uri()).available_surveys().await.unwrap();
        assert_eq!(snapshot.count(), 2);
        assert_eq!(snapshot.items[0].survey_uuid.as_deref(), Some("s1"));
        assert_eq!(snapshot.items[1].extra["reward"]["value"], 10);
    }

    #[tokio::test]
    async fn available_surveys_non_success_is_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/sdk/surveys/available"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .available_surveys()
            .await
            .unwrap_err();
        assert!(matches!(err, PollingError::Status { status: 503, .. }));
        assert_eq!(err.failure_message(), "Failed to load: 503");
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/sdk/surveys/available"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"data\": ["))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .available_surveys()
            .await
            .unwrap_err();
        assert!(matches!(err, PollingError::Decode { .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        // A port that was just free; MockServer instances are pooled and keep
        // listening after drop.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let uri = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = test_client(&uri).available_surveys().await.unwrap_err();
        assert!(matches!(err, PollingError::Transport { .. }));
        assert_eq!(err.failure_message(), "Network error.");
    }

    #[tokio::test]
    async fn survey_details_unwraps_data() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/sdk/surveys/s-42"))
            .and(query_param("customer_id", "cust-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"survey_uuid": "s-42", "user_survey_status": "available"}
            })))
            .mount(&server)
            .await;

        let details = test_client(&server.uri())
            .survey_details(&SurveyId::from("s-42"))
            .await
            .unwrap();
        assert!(details.is_available());
    }

    #[tokio::test]
    async fn survey_details_without_data_is_not_available() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/sdk/surveys/gone"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let details = test_client(&server.uri())
            .survey_details(&SurveyId::from("gone"))
            .await
            .unwrap();
        assert!(!details.is_available());
    }

    #[tokio::test]
    async fn log_event_posts_form_and_returns_triggers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/events/collect"))
            .and(query_param("user", "cust-1"))
            .and(query_param("api_key", "key-1"))
            .and(body_string("event=Purchase&value=1299"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "triggered_surveys": [{
                    "survey": {"survey_uuid": "s1", "name": "Checkout"},
                    "delayed_timestamp": "2026-03-01T10:00:00Z",
                    "delay": 0
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = test_client(&server.uri())
            .log_event("Purchase", "1299")
            .await
            .unwrap();
        assert_eq!(outcome.triggers().len(), 1);
        assert_eq!(outcome.triggers()[0].survey.survey_uuid, "s1");
    }

    #[tokio::test]
    async fn log_event_with_empty_body_has_no_triggers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/events/collect"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let outcome = test_client(&server.uri())
            .log_event("Session", "")
            .await
            .unwrap();
        assert!(outcome.triggers().is_empty());
    }

    #[tokio::test]
    async fn log_event_failure_uses_event_context() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/events/collect"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .log_event("Session", "")
            .await
            .unwrap_err();
        assert_eq!(err.failure_message(), "Failed to log event: 401");
    }

    #[tokio::test]
    async fn requests_use_current_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/sdk/surveys/available"))
            .and(query_param("customer_id", "cust-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        client.endpoints().set_customer_id("cust-2");
        let snapshot = client.available_surveys().await.unwrap();
        assert_eq!(snapshot.count(), 0);
    }
}
