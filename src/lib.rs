// privacy-confirm - data subject request filing and confirmation
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod database;
pub mod privacy;
pub mod telemetry;

// Re-export key types for easy access
pub use crate::config::{config, PrivacyConfirmConfig};
#[cfg(feature = "database")]
pub use crate::database::DatabaseManager;
pub use privacy::{
    ConfirmError, ConfirmInput, ConfirmationWorkflow, PrivacyRequest, RequestIntake, RequestStatus,
    RequestStore, RequestType,
};
pub use telemetry::{create_request_span, generate_correlation_id, init_telemetry};
