use anyhow::{anyhow, Result};

use super::{describe, Command, Services};
use crate::privacy::{ConfirmError, ConfirmInput};

pub struct ConfirmCommand {
    services: Services,
    email: String,
    token: String,
}

impl ConfirmCommand {
    pub fn new(services: Services, email: String, token: String) -> Self {
        Self {
            services,
            email,
            token,
        }
    }
}

impl Command for ConfirmCommand {
    async fn execute(&self) -> Result<()> {
        let input = ConfirmInput::new(self.email.clone(), self.token.clone());

        match self.services.confirmation().confirm_request(input).await {
            Ok(request) => {
                println!("✅ Request confirmed: {}", describe(&request));
                Ok(())
            }
            Err(ConfirmError::Storage(e)) => Err(e.into()),
            Err(e) => {
                for message in e.messages() {
                    println!("❌ {message}");
                }
                Err(anyhow!("confirmation failed ({})", e.message_key()))
            }
        }
    }
}
