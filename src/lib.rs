// ABOUTME: Library root for webapp-deploy - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod archive;
pub mod cdn;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod output;
pub mod publish;
pub mod storage;
pub mod types;
