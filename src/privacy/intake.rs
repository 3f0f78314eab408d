use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, Instrument};

use super::clock::Clock;
use super::email::email_to_punycode;
use super::errors::IntakeError;
use super::form::Form;
use super::store::{RequestFilter, RequestStore};
use super::token::{generate_token, TokenHasher};
use super::types::{PrivacyRequest, RequestStatus, RequestType};
use crate::telemetry::{create_request_span, generate_correlation_id};

/// A freshly filed request and the plaintext token to deliver.
///
/// The token exists only here; the store holds its hash.
#[derive(Debug, Clone)]
pub struct IssuedRequest {
    pub request: PrivacyRequest,
    pub token: String,
}

pub struct RequestIntake {
    store: Arc<dyn RequestStore>,
    clock: Arc<dyn Clock>,
    hasher: TokenHasher,
    form: Form,
}

impl RequestIntake {
    pub fn new(store: Arc<dyn RequestStore>, clock: Arc<dyn Clock>, hasher: TokenHasher) -> Self {
        Self {
            store,
            clock,
            hasher,
            form: Form::request(),
        }
    }

    /// File a pending request for `email`.
    pub async fn submit_request(
        &self,
        email: &str,
        request_type: RequestType,
    ) -> Result<IssuedRequest, IntakeError> {
        let span = create_request_span("submit_request", None, &generate_correlation_id());
        self.submit(email, request_type).instrument(span).await
    }

    async fn submit(&self, email: &str, request_type: RequestType) -> Result<IssuedRequest, IntakeError> {
        let email = email_to_punycode(email).into_owned();

        let data = self
            .form
            .filter(&HashMap::from([("email".to_string(), email)]));
        self.form.validate(&data).map_err(IntakeError::ValidationFailed)?;
        let email = data.get("email").cloned().unwrap_or_default();

        if self
            .store
            .load(&RequestFilter::pending_for(email.clone()))
            .await?
            .is_some()
        {
            info!(request_type = %request_type, "Pending request already open for email");
            return Err(IntakeError::PendingRequestExists);
        }

        let token = generate_token();
        let now = self.clock.now();

        let request = PrivacyRequest {
            id: None,
            email,
            request_type,
            status: RequestStatus::Pending,
            requested_at: now,
            confirm_token: Some(self.hasher.hash(&token)?),
            confirm_token_created_at: Some(now),
        };

        let request = self.store.store(&request).await?;
        info!(request_id = ?request.id, request_type = %request_type, "Privacy request filed");

        Ok(IssuedRequest { request, token })
    }

    /// Every request on file for `email`, newest first.
    pub async fn find_requests(&self, email: &str) -> Result<Vec<PrivacyRequest>, IntakeError> {
        let email = email_to_punycode(email).into_owned();
        Ok(self.store.list(&RequestFilter::by_email(email)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privacy::clock::SystemClock;
    use crate::privacy::store::InMemoryRequestStore;
    use crate::privacy::token::HashingConfig;

    fn intake(store: Arc<InMemoryRequestStore>) -> RequestIntake {
        let hasher = TokenHasher::new(HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        RequestIntake::new(store, Arc::new(SystemClock), hasher)
    }

    #[tokio::test]
    async fn test_submit_stores_hash_not_token() {
        let store = Arc::new(InMemoryRequestStore::new());
        let issued = intake(store.clone())
            .submit_request("a@example.com", RequestType::Export)
            .await
            .unwrap();

        let row = store.get(issued.request.id.unwrap()).await.unwrap();
        let hash = row.confirm_token.unwrap();
        assert_ne!(hash, issued.token);
        assert!(!hash.contains(&issued.token));
        assert_eq!(row.status, RequestStatus::Pending);
        assert_eq!(row.confirm_token_created_at, Some(row.requested_at));
    }

    #[tokio::test]
    async fn test_second_pending_request_refused() {
        let store = Arc::new(InMemoryRequestStore::new());
        let intake = intake(store.clone());
        intake
            .submit_request("user@bücher.example", RequestType::Export)
            .await
            .unwrap();

        let err = intake
            .submit_request("user@xn--bcher-kva.example", RequestType::Remove)
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::PendingRequestExists));
        assert_eq!(err.message_key(), crate::privacy::errors::PENDING_REQUEST_OPEN);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_email_refused() {
        let store = Arc::new(InMemoryRequestStore::new());
        let err = intake(store.clone())
            .submit_request("nobody", RequestType::Export)
            .await
            .unwrap_err();

        assert!(matches!(err, IntakeError::ValidationFailed(_)));
        assert_eq!(err.messages(), vec!["Invalid field: Email Address".to_string()]);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_find_requests_normalizes_email() {
        let store = Arc::new(InMemoryRequestStore::new());
        let intake = intake(store);
        intake
            .submit_request("user@BÜCHER.example", RequestType::Remove)
            .await
            .unwrap();

        let found = intake.find_requests("user@xn--bcher-kva.example").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].request_type, RequestType::Remove);
    }
}
