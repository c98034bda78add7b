// ABOUTME: Handles lifecycle events by running deployments and reporting back.
// ABOUTME: Errors never escape; every answerable event gets a callback.

use std::sync::Arc;

use serde::Deserialize;

use crate::config::Config;
use crate::deploy::{Collaborators, run_deployment};
use crate::diagnostics::Diagnostics;
use crate::types::ObjectLocation;

use super::{
    CallbackResponse, CallbackSender, EventEnvelope, LifecycleEvent, RequestType, ResponseStatus,
};

/// What a deployment needs, or why it could not be set up.
type Deployer = Result<(Config, Collaborators), String>;

/// Runs a deployment for Create and Update events and acknowledges Delete.
#[derive(Clone)]
pub struct EventHandler {
    deployer: Deployer,
    callback: Arc<dyn CallbackSender>,
}

impl EventHandler {
    pub fn new(
        config: Config,
        collaborators: Collaborators,
        callback: Arc<dyn CallbackSender>,
    ) -> Self {
        Self {
            deployer: Ok((config, collaborators)),
            callback,
        }
    }

    /// A handler whose configuration could not be loaded.
    ///
    /// Create and Update report FAILED with `reason`; Delete still succeeds.
    pub fn misconfigured(reason: impl Into<String>, callback: Arc<dyn CallbackSender>) -> Self {
        Self {
            deployer: Err(reason.into()),
            callback,
        }
    }

    /// Handle a raw event payload.
    ///
    /// A payload that is not a well-formed event is answered from whatever
    /// fields it has: SUCCESS for Delete, FAILED otherwise.
    pub async fn handle_payload(
        &self,
        payload: &serde_json::Value,
        log_stream: &str,
    ) -> ResponseStatus {
        match LifecycleEvent::deserialize(payload) {
            Ok(event) => self.handle(&event, log_stream).await,
            Err(e) => {
                let envelope = EventEnvelope::from_value(payload);
                tracing::error!(
                    request_id = %envelope.request_id,
                    "Malformed lifecycle event: {}",
                    e
                );
                let (status, reason) = if envelope.request_type == Some(RequestType::Delete) {
                    (ResponseStatus::Success, None)
                } else {
                    (
                        ResponseStatus::Failed,
                        Some(format!("malformed lifecycle event: {e}")),
                    )
                };
                self.respond(&envelope, status, reason, log_stream).await;
                status
            }
        }
    }

    /// Handle one event and send the callback.
    ///
    /// Returns the reported status. A callback that cannot be delivered is
    /// logged and otherwise ignored.
    pub async fn handle(&self, event: &LifecycleEvent, log_stream: &str) -> ResponseStatus {
        tracing::info!(
            request_id = %event.request_id,
            "Lifecycle event triggered handler: {:?}",
            event.request_type
        );

        let (status, reason) = if event.request_type.deploys() {
            match self.deploy(event).await {
                Ok(()) => (ResponseStatus::Success, None),
                Err(reason) => {
                    tracing::error!(
                        request_id = %event.request_id,
                        "An unexpected error occurred, marking the deployment as a failure: {}",
                        reason
                    );
                    (ResponseStatus::Failed, Some(reason))
                }
            }
        } else {
            tracing::info!(
                "Event type is {:?}. Nothing is done for this event type.",
                event.request_type
            );
            (ResponseStatus::Success, None)
        };

        self.respond(&EventEnvelope::from(event), status, reason, log_stream)
            .await;
        status
    }

    async fn respond(
        &self,
        event: &EventEnvelope,
        status: ResponseStatus,
        reason: Option<String>,
        log_stream: &str,
    ) {
        let Some(url) = event.response_url.as_deref() else {
            tracing::error!(
                request_id = %event.request_id,
                "Event has no ResponseURL; cannot report {:?}",
                status
            );
            return;
        };

        let response = CallbackResponse::for_envelope(event, status, reason, log_stream);
        if let Err(e) = self.callback.send(url, &response).await {
            tracing::error!(
                request_id = %event.request_id,
                "Could not send response for event type {:?}: {}",
                event.request_type,
                e
            );
        }
    }

    async fn deploy(&self, event: &LifecycleEvent) -> Result<(), String> {
        let (config, collaborators) = self
            .deployer
            .as_ref()
            .map_err(|reason| format!("configuration is invalid: {reason}"))?;

        let url = event
            .resource_properties
            .artifact_url
            .as_deref()
            .ok_or_else(|| "event has no artifactS3Url resource property".to_string())?;
        let artifact = ObjectLocation::parse(url).map_err(|e| e.to_string())?;

        let mut diag = Diagnostics::default();
        let summary = run_deployment(config, artifact, collaborators, &mut diag)
            .await
            .map_err(|e| format!("{} failed: {}", e.stage(), e))?;

        tracing::info!(
            "All done: {} uploaded, {} deleted, {} warning(s)",
            summary.uploaded,
            summary.deleted,
            diag.warnings().len()
        );
        Ok(())
    }
}
