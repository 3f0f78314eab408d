use anyhow::Result;

use super::{describe, Command, Services};

pub struct ShowCommand {
    services: Services,
    email: String,
}

impl ShowCommand {
    pub fn new(services: Services, email: String) -> Self {
        Self { services, email }
    }
}

impl Command for ShowCommand {
    async fn execute(&self) -> Result<()> {
        let requests = self.services.intake().find_requests(&self.email).await?;

        if requests.is_empty() {
            println!("📋 No requests on file for {}", self.email);
            return Ok(());
        }

        println!("📋 {} request(s):", requests.len());
        for request in &requests {
            println!("   {}", describe(request));
        }
        Ok(())
    }
}
