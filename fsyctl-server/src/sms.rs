//! Outbound SMS via the Semaphore gateway
//!
//! Handlers talk to an `SmsGateway` so tests can substitute a recorder.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Semaphore message endpoint
pub const SEMAPHORE_BASE_URL: &str = "https://api.semaphore.co/api/v4/messages";

const GATEWAY_TIMEOUT_SECS: u64 = 15;

/// Gateway failure
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("SMS gateway unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("SMS gateway rejected the message: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Send `message` to `number`; returns the gateway's response body.
    async fn send(&self, number: &str, message: &str) -> Result<Value, SmsError>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    apikey: &'a str,
    number: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sendername: Option<&'a str>,
}

/// HTTP client for Semaphore
pub struct SemaphoreClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    sender_name: Option<String>,
}

impl SemaphoreClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        sender_name: Option<String>,
    ) -> Result<Self, SmsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(GATEWAY_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            sender_name,
        })
    }
}

#[async_trait]
impl SmsGateway for SemaphoreClient {
    async fn send(&self, number: &str, message: &str) -> Result<Value, SmsError> {
        let body = SendRequest {
            apikey: &self.api_key,
            number,
            message,
            sendername: self.sender_name.as_deref(),
        };

        let response = self.http.post(&self.base_url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let result: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if !status.is_success() {
            return Err(SmsError::Rejected(rejection_reason(&result, status)));
        }
        // Some gateway errors come back as 200 with an error object
        if result.get("status").and_then(Value::as_str).is_some_and(|s| s != "ok")
            && result.get("message_id").is_none()
        {
            return Err(SmsError::Rejected(rejection_reason(&result, status)));
        }

        tracing::info!(number, "SMS accepted by gateway");
        Ok(result)
    }
}

fn rejection_reason(result: &Value, status: reqwest::StatusCode) -> String {
    result
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| format!("HTTP {}", status))
}

/// Test gateway that records sends and returns a canned result
#[cfg(test)]
#[derive(Default)]
pub struct RecordingGateway {
    pub sent: std::sync::Mutex<Vec<(String, String)>>,
    pub fail_with: Option<String>,
}

#[cfg(test)]
#[async_trait]
impl SmsGateway for RecordingGateway {
    async fn send(&self, number: &str, message: &str) -> Result<Value, SmsError> {
        if let Some(reason) = &self.fail_with {
            return Err(SmsError::Rejected(reason.clone()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((number.to_string(), message.to_string()));
        Ok(serde_json::json!([{ "message_id": 1, "status": "Queued" }]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_gateway_fields() {
        let body = SendRequest {
            apikey: "k",
            number: "09171234567",
            message: "See you at FSY",
            sendername: Some("FSY"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["apikey"], "k");
        assert_eq!(json["number"], "09171234567");
        assert_eq!(json["sendername"], "FSY");
    }

    #[test]
    fn sender_name_is_optional() {
        let body = SendRequest {
            apikey: "k",
            number: "1",
            message: "m",
            sendername: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sendername").is_none());
    }

    #[test]
    fn rejection_prefers_gateway_message() {
        let body = serde_json::json!({ "message": "Invalid number" });
        assert_eq!(
            rejection_reason(&body, reqwest::StatusCode::BAD_REQUEST),
            "Invalid number"
        );
        assert_eq!(
            rejection_reason(&Value::Null, reqwest::StatusCode::BAD_GATEWAY),
            "HTTP 502 Bad Gateway"
        );
    }

    #[tokio::test]
    async fn unreachable_gateway_is_transport_error() {
        let client = SemaphoreClient::new("http://127.0.0.1:9/messages", "k", None).unwrap();
        let err = client.send("1", "m").await.unwrap_err();
        assert!(matches!(err, SmsError::Transport(_)));
    }

    #[tokio::test]
    async fn recorder_captures_sends() {
        let gateway = RecordingGateway::default();
        gateway.send("0917", "hello").await.unwrap();
        assert_eq!(gateway.sent.lock().unwrap().len(), 1);
    }
}
