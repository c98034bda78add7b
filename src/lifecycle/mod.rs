// ABOUTME: Infrastructure lifecycle events that trigger deployments.
// ABOUTME: Event and callback payload types plus the handler that acts on them.

mod callback;
mod handler;

pub use callback::{CallbackError, CallbackSender, HttpCallback};
pub use handler::EventHandler;

use serde::{Deserialize, Serialize};

use crate::types::PhysicalResourceId;

/// Kind of lifecycle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl RequestType {
    /// Whether this request deploys the artifact.
    pub fn deploys(self) -> bool {
        matches!(self, RequestType::Create | RequestType::Update)
    }
}

/// Properties supplied with the custom resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceProperties {
    #[serde(rename = "artifactS3Url", default)]
    pub artifact_url: Option<String>,
}

/// A lifecycle event as delivered to the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default)]
    pub physical_resource_id: Option<PhysicalResourceId>,
    #[serde(default)]
    pub resource_properties: ResourceProperties,
}

/// The parts of a payload needed to answer it.
///
/// Read field by field from raw JSON, so a payload that is not a well-formed
/// [`LifecycleEvent`] can still be answered as long as it names a
/// `ResponseURL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventEnvelope {
    pub request_type: Option<RequestType>,
    pub response_url: Option<String>,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub physical_resource_id: Option<PhysicalResourceId>,
}

impl EventEnvelope {
    pub fn from_value(payload: &serde_json::Value) -> Self {
        let text = |key: &str| {
            payload
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };
        Self {
            request_type: payload
                .get("RequestType")
                .and_then(|v| RequestType::deserialize(v).ok()),
            response_url: text("ResponseURL"),
            stack_id: text("StackId").unwrap_or_default(),
            request_id: text("RequestId").unwrap_or_default(),
            logical_resource_id: text("LogicalResourceId").unwrap_or_default(),
            physical_resource_id: text("PhysicalResourceId").map(PhysicalResourceId::new),
        }
    }
}

impl From<&LifecycleEvent> for EventEnvelope {
    fn from(event: &LifecycleEvent) -> Self {
        Self {
            request_type: Some(event.request_type),
            response_url: Some(event.response_url.clone()),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            physical_resource_id: event.physical_resource_id.clone(),
        }
    }
}

/// Outcome reported back to the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// Body sent to the event's response URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallbackResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub physical_resource_id: PhysicalResourceId,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: Option<serde_json::Value>,
}

impl CallbackResponse {
    /// Build a response for `event`.
    ///
    /// The physical resource id is the one the event carries, or
    /// `log_stream` for a resource that does not have one yet.
    pub fn for_event(
        event: &LifecycleEvent,
        status: ResponseStatus,
        reason: Option<String>,
        log_stream: &str,
    ) -> Self {
        Self::for_envelope(&EventEnvelope::from(event), status, reason, log_stream)
    }

    pub fn for_envelope(
        event: &EventEnvelope,
        status: ResponseStatus,
        reason: Option<String>,
        log_stream: &str,
    ) -> Self {
        Self {
            status,
            reason,
            physical_resource_id: event
                .physical_resource_id
                .clone()
                .unwrap_or_else(|| PhysicalResourceId::new(log_stream)),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data: None,
        }
    }
}
