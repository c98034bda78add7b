// ABOUTME: Command module aggregator for the webapp-deploy binary.
// ABOUTME: Re-exports the CLI deploy command and the hosted event loop.

mod deploy;
mod serve;

pub use deploy::deploy;
pub use serve::{RUNTIME_API_VAR, serve};
