// ABOUTME: Hosted mode: serves lifecycle events from the function runtime.
// ABOUTME: Each event runs through the shared EventHandler, which always answers it.

use std::sync::Arc;

use lambda_runtime::{LambdaEvent, service_fn};
use webapp_deploy::config::Config;
use webapp_deploy::deploy::Collaborators;
use webapp_deploy::lifecycle::{EventHandler, HttpCallback};

/// Set by the function runtime; its presence selects hosted mode.
pub const RUNTIME_API_VAR: &str = "AWS_LAMBDA_RUNTIME_API";

/// Serve events until the runtime shuts the process down.
///
/// A bad configuration does not stop the loop: events are still answered,
/// with deployments reported as FAILED.
pub async fn serve() -> Result<(), lambda_runtime::Error> {
    let callback = Arc::new(HttpCallback::new());
    let handler = match Config::from_env() {
        Ok(config) => {
            let collaborators = Collaborators::for_config(&config).await;
            EventHandler::new(config, collaborators, callback)
        }
        Err(e) => {
            tracing::error!("Invalid configuration, deployments will fail: {}", e);
            EventHandler::misconfigured(e.to_string(), callback)
        }
    };
    let handler = Arc::new(handler);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<serde_json::Value>| {
        let handler = Arc::clone(&handler);
        async move {
            let log_stream = event.context.env_config.log_stream.clone();
            let status = handler.handle_payload(&event.payload, &log_stream).await;
            Ok::<_, lambda_runtime::Error>(serde_json::json!({ "Status": status }))
        }
    }))
    .await
}
