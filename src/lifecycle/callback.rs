// ABOUTME: Delivery of lifecycle callback responses.
// ABOUTME: CallbackSender trait and the HTTP PUT implementation.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

use super::CallbackResponse;

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("failed to encode callback response: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("callback request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("callback endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Reports the outcome of a lifecycle event back to its source.
#[async_trait]
pub trait CallbackSender: Send + Sync {
    async fn send(&self, url: &str, response: &CallbackResponse) -> Result<(), CallbackError>;
}

/// Sends callbacks as an HTTP PUT of the JSON body.
///
/// The response URL is pre-signed for an empty content type, so the header
/// is sent but left blank.
#[derive(Debug, Clone, Default)]
pub struct HttpCallback {
    http: reqwest::Client,
}

impl HttpCallback {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CallbackSender for HttpCallback {
    async fn send(&self, url: &str, response: &CallbackResponse) -> Result<(), CallbackError> {
        let body = serde_json::to_vec(response)?;
        tracing::debug!("Callback body: {}", String::from_utf8_lossy(&body));

        let resp = self
            .http
            .put(url)
            .header(CONTENT_TYPE, "")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        tracing::info!("Callback status code: {}", status);
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(CallbackError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
