// Request store port and its adapters.

pub mod file;
pub mod memory;
#[cfg(feature = "database")]
pub mod sqlite;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::errors::StoreError;
use super::types::{PrivacyRequest, RequestStatus};

pub use file::JsonFileRequestStore;
pub use memory::InMemoryRequestStore;
#[cfg(feature = "database")]
pub use sqlite::SqliteRequestStore;

/// Row filter. `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub email: Option<String>,
    pub status: Option<RequestStatus>,
}

impl RequestFilter {
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            status: None,
        }
    }

    pub fn pending_for(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            status: Some(RequestStatus::Pending),
        }
    }

    pub fn matches(&self, request: &PrivacyRequest) -> bool {
        self.email.as_deref().is_none_or(|email| request.email == email)
            && self.status.is_none_or(|status| request.status == status)
    }
}

/// Persistence for privacy requests.
///
/// Each call is atomic on its own. Nothing here makes a load followed by a
/// store atomic; concurrent writers to one row resolve last-write-wins.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Most recently created request matching `filter`.
    async fn load(&self, filter: &RequestFilter) -> Result<Option<PrivacyRequest>, StoreError>;

    /// Insert when `id` is `None`, otherwise overwrite the row with that id.
    /// Returns the stored record with its id set.
    async fn store(&self, request: &PrivacyRequest) -> Result<PrivacyRequest, StoreError>;

    /// All requests matching `filter`, newest first.
    async fn list(&self, filter: &RequestFilter) -> Result<Vec<PrivacyRequest>, StoreError>;
}
