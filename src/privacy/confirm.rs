//! Privacy request confirmation.
//!
//! A data subject proves control of an email address by presenting the
//! plaintext token that was mailed when the request was filed. The token is
//! only accepted while the request is pending and younger than
//! [`CONFIRM_TOKEN_TTL_HOURS`] hours.
//!
//! Known weakness: there is no lock between loading the pending row and
//! writing its new status. Two simultaneous confirmations of the same token
//! can both pass the pending check, and the store resolves the writes
//! last-write-wins.

use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

use super::clock::Clock;
use super::email::email_to_punycode;
use super::errors::ConfirmError;
use super::form::Form;
use super::state_machine::RequestEvent;
use super::store::{RequestFilter, RequestStore};
use super::token::TokenHasher;
use super::types::{ConfirmInput, PrivacyRequest};
use crate::telemetry::{create_request_span, generate_correlation_id};

pub const CONFIRM_TOKEN_TTL_HOURS: i64 = 24;

/// Validity window of a confirmation token.
pub fn confirm_token_ttl() -> Duration {
    Duration::hours(CONFIRM_TOKEN_TTL_HOURS)
}

pub struct ConfirmationWorkflow {
    store: Arc<dyn RequestStore>,
    clock: Arc<dyn Clock>,
    hasher: TokenHasher,
    form: Form,
}

impl ConfirmationWorkflow {
    pub fn new(store: Arc<dyn RequestStore>, clock: Arc<dyn Clock>, hasher: TokenHasher) -> Self {
        Self {
            store,
            clock,
            hasher,
            form: Form::confirm(),
        }
    }

    /// Confirm the pending request for `input.email`.
    ///
    /// At most one status write happens per call. `NoPendingRequest` is
    /// returned for a missing request, a non-pending request and a wrong
    /// token alike.
    pub async fn confirm_request(&self, input: ConfirmInput) -> Result<PrivacyRequest, ConfirmError> {
        let span = create_request_span("confirm_request", None, &generate_correlation_id());
        self.confirm(input).instrument(span).await
    }

    async fn confirm(&self, mut input: ConfirmInput) -> Result<PrivacyRequest, ConfirmError> {
        input.email = email_to_punycode(&input.email).into_owned();

        let data = self.form.filter(&HashMap::from(&input));
        self.form.validate(&data).map_err(|errors| {
            info!(error_count = errors.len(), "Confirmation input rejected by form validation");
            ConfirmError::ValidationFailed(errors)
        })?;
        let input = ConfirmInput::from(data);

        let Some(mut request) = self
            .store
            .load(&RequestFilter::pending_for(input.email.clone()))
            .await?
        else {
            info!("No pending request for email");
            return Err(ConfirmError::NoPendingRequest);
        };

        // Only pending requests with a token can be confirmed
        if !request.status.is_pending() || !request.has_token() {
            info!(request_id = ?request.id, status = %request.status, "Request is not confirmable");
            return Err(ConfirmError::NoPendingRequest);
        }
        let stored_hash = request.confirm_token.clone().unwrap_or_default();

        let created_at = request.confirm_token_created_at.unwrap_or(request.requested_at);
        let now = self.clock.now();

        if now - created_at >= confirm_token_ttl() {
            self.invalidate(&mut request).await;
            return Err(ConfirmError::TokenExpired);
        }

        let token_matches = match self.hasher.verify(&input.confirm_token, &stored_hash) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(request_id = ?request.id, error = %e, "Stored confirmation hash unusable");
                false
            }
        };

        if !token_matches {
            info!(request_id = ?request.id, "Confirmation token mismatch");
            return Err(ConfirmError::NoPendingRequest);
        }

        let transition = request
            .apply(RequestEvent::Confirm)
            .map_err(|_| ConfirmError::NoPendingRequest)?;
        let confirmed = self.store.store(&request).await?;

        info!(
            request_id = ?confirmed.id,
            from = %transition.previous,
            to = %transition.next,
            "Privacy request confirmed"
        );
        Ok(confirmed)
    }

    /// Mark an expired request invalidated.
    ///
    /// A failed write is logged and otherwise ignored: the subject still gets
    /// the expiry message. The row then stays pending and the next attempt
    /// retries the invalidation.
    async fn invalidate(&self, request: &mut PrivacyRequest) {
        let Ok(transition) = request.apply(RequestEvent::Invalidate) else {
            return;
        };

        match self.store.store(request).await {
            Ok(_) => warn!(
                request_id = ?request.id,
                from = %transition.previous,
                to = %transition.next,
                "Confirmation token expired, request invalidated"
            ),
            Err(e) => error!(
                request_id = ?request.id,
                error = %e,
                "Failed to persist invalidation of expired request"
            ),
        }
    }
}
