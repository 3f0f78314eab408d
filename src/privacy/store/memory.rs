use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RequestFilter, RequestStore};
use crate::privacy::errors::StoreError;
use crate::privacy::types::PrivacyRequest;

#[derive(Debug, Default)]
struct Rows {
    next_id: i64,
    requests: Vec<PrivacyRequest>,
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryRequestStore {
    rows: RwLock<Rows>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current copy of the row with `id`.
    pub async fn get(&self, id: i64) -> Option<PrivacyRequest> {
        self.rows
            .read()
            .await
            .requests
            .iter()
            .find(|r| r.id == Some(id))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.requests.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn load(&self, filter: &RequestFilter) -> Result<Option<PrivacyRequest>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .requests
            .iter()
            .filter(|r| filter.matches(r))
            .max_by_key(|r| r.id)
            .cloned())
    }

    async fn store(&self, request: &PrivacyRequest) -> Result<PrivacyRequest, StoreError> {
        let mut rows = self.rows.write().await;

        match request.id {
            Some(id) => {
                let slot = rows
                    .requests
                    .iter_mut()
                    .find(|r| r.id == Some(id))
                    .ok_or(StoreError::NotFound { id })?;
                *slot = request.clone();
                Ok(request.clone())
            }
            None => {
                rows.next_id += 1;
                let mut stored = request.clone();
                stored.id = Some(rows.next_id);
                rows.requests.push(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn list(&self, filter: &RequestFilter) -> Result<Vec<PrivacyRequest>, StoreError> {
        let rows = self.rows.read().await;
        let mut matching: Vec<_> = rows
            .requests
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(matching)
    }
}
