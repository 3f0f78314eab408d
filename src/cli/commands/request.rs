use anyhow::{anyhow, Result};

use super::{describe, Command, Services};
use crate::privacy::{IntakeError, RequestType};

pub struct RequestCommand {
    services: Services,
    email: String,
    request_type: String,
}

impl RequestCommand {
    pub fn new(services: Services, email: String, request_type: String) -> Self {
        Self {
            services,
            email,
            request_type,
        }
    }
}

impl Command for RequestCommand {
    async fn execute(&self) -> Result<()> {
        let request_type: RequestType = self.request_type.parse().map_err(|e: String| anyhow!(e))?;

        match self
            .services
            .intake()
            .submit_request(&self.email, request_type)
            .await
        {
            Ok(issued) => {
                println!("✅ Request filed: {}", describe(&issued.request));
                println!("🔑 Confirmation token: {}", issued.token);
                println!("   Deliver this token to the data subject; it is valid for 24 hours.");
                Ok(())
            }
            Err(e @ (IntakeError::ValidationFailed(_) | IntakeError::PendingRequestExists)) => {
                for message in e.messages() {
                    println!("❌ {message}");
                }
                Err(anyhow!("request was not filed"))
            }
            Err(e) => Err(e.into()),
        }
    }
}
