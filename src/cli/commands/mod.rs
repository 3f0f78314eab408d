use anyhow::Result;
use std::sync::Arc;

use crate::config::{PrivacyConfirmConfig, StoreBackend};
use crate::privacy::{
    Clock, ConfirmationWorkflow, JsonFileRequestStore, PrivacyRequest, RequestIntake, RequestStore,
    SystemClock, TokenHasher,
};

pub mod confirm;
pub mod form;
pub mod request;
pub mod show;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Collaborators shared by the commands, built from configuration.
pub struct Services {
    pub store: Arc<dyn RequestStore>,
    pub clock: Arc<dyn Clock>,
    pub hasher: TokenHasher,
}

impl Services {
    pub async fn from_config(config: &PrivacyConfirmConfig) -> Result<Self> {
        Ok(Self {
            store: open_store(config).await?,
            clock: Arc::new(SystemClock),
            hasher: TokenHasher::new(config.hashing)?,
        })
    }

    pub fn intake(&self) -> RequestIntake {
        RequestIntake::new(self.store.clone(), self.clock.clone(), self.hasher.clone())
    }

    pub fn confirmation(&self) -> ConfirmationWorkflow {
        ConfirmationWorkflow::new(self.store.clone(), self.clock.clone(), self.hasher.clone())
    }
}

/// Open the configured request store.
pub async fn open_store(config: &PrivacyConfirmConfig) -> Result<Arc<dyn RequestStore>> {
    match config.store.backend {
        StoreBackend::File => {
            tracing::debug!(file = ?config.store.file_path, "Using file request store");
            Ok(Arc::new(JsonFileRequestStore::new(config.store.file_path.clone())))
        }
        #[cfg(feature = "database")]
        StoreBackend::Sqlite => {
            let db_config = config
                .database
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("store.backend = \"sqlite\" requires a [database] section"))?;
            let manager = crate::database::DatabaseManager::new(db_config).await?;
            Ok(Arc::new(manager.request_store()))
        }
        #[cfg(not(feature = "database"))]
        StoreBackend::Sqlite => anyhow::bail!(
            "store.backend = \"sqlite\" needs privacy-confirm built with the `database` feature"
        ),
    }
}

/// One-line summary of a request for terminal output.
pub fn describe(request: &PrivacyRequest) -> String {
    format!(
        "#{} {} {} ({}), filed {}",
        request.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
        request.email,
        request.request_type,
        request.status,
        request.requested_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}
