use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{RequestFilter, RequestStore};
use crate::privacy::errors::StoreError;
use crate::privacy::types::PrivacyRequest;

const LEDGER_VERSION: u32 = 1;

/// On-disk layout of the request file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RequestLedger {
    version: u32,
    next_id: i64,
    requests: Vec<PrivacyRequest>,
}

impl Default for RequestLedger {
    fn default() -> Self {
        Self {
            version: LEDGER_VERSION,
            next_id: 0,
            requests: Vec::new(),
        }
    }
}

/// Store backed by a single JSON file.
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so a crash never leaves a half-written ledger behind.
#[derive(Debug)]
pub struct JsonFileRequestStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileRequestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    async fn read_ledger(&self) -> Result<RequestLedger, StoreError> {
        if !fs::try_exists(&self.path).await? {
            debug!(file = ?self.path, "No request file yet, starting empty");
            return Ok(RequestLedger::default());
        }

        let contents = fs::read_to_string(&self.path).await?;
        let ledger: RequestLedger = serde_json::from_str(&contents)?;

        if ledger.version != LEDGER_VERSION {
            return Err(StoreError::Corrupt {
                reason: format!(
                    "unsupported ledger version {} (expected {})",
                    ledger.version, LEDGER_VERSION
                ),
            });
        }

        Ok(ledger)
    }

    async fn write_ledger(&self, ledger: &RequestLedger) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let serialized = serde_json::to_string_pretty(ledger)?;
        let temp_file = format!("{}.tmp", self.path.display());
        fs::write(&temp_file, serialized).await?;
        fs::rename(&temp_file, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RequestStore for JsonFileRequestStore {
    async fn load(&self, filter: &RequestFilter) -> Result<Option<PrivacyRequest>, StoreError> {
        let _guard = self.lock.read().await;
        let ledger = self.read_ledger().await?;
        Ok(ledger
            .requests
            .into_iter()
            .filter(|r| filter.matches(r))
            .max_by_key(|r| r.id))
    }

    async fn store(&self, request: &PrivacyRequest) -> Result<PrivacyRequest, StoreError> {
        let _guard = self.lock.write().await;
        let mut ledger = self.read_ledger().await?;

        let stored = match request.id {
            Some(id) => {
                let slot = ledger
                    .requests
                    .iter_mut()
                    .find(|r| r.id == Some(id))
                    .ok_or(StoreError::NotFound { id })?;
                *slot = request.clone();
                request.clone()
            }
            None => {
                ledger.next_id += 1;
                let mut stored = request.clone();
                stored.id = Some(ledger.next_id);
                ledger.requests.push(stored.clone());
                stored
            }
        };

        self.write_ledger(&ledger).await?;

        info!(
            request_id = ?stored.id,
            status = %stored.status,
            file = ?self.path,
            "Request saved"
        );

        Ok(stored)
    }

    async fn list(&self, filter: &RequestFilter) -> Result<Vec<PrivacyRequest>, StoreError> {
        let _guard = self.lock.read().await;
        let ledger = self.read_ledger().await?;
        let mut matching: Vec<_> = ledger
            .requests
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(matching)
    }
}
