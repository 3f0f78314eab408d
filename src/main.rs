use anyhow::Result;
use clap::Parser;

use privacy_confirm::cli::commands::{
    confirm::ConfirmCommand, form::FormCommand, request::RequestCommand, show::ShowCommand, Command,
    Services,
};
use privacy_confirm::cli::{Cli, Commands};
use privacy_confirm::config::{config as global_config, PrivacyConfirmConfig};
use privacy_confirm::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let _ = PrivacyConfirmConfig::load_env_file();
            PrivacyConfirmConfig::load_from(path)?
        }
        None => global_config()?.clone(),
    };

    init_telemetry(&config.observability)?;

    match cli.command {
        Commands::Request { email, request_type } => {
            let services = Services::from_config(&config).await?;
            RequestCommand::new(services, email, request_type).execute().await
        }
        Commands::Confirm { email, token } => {
            let services = Services::from_config(&config).await?;
            ConfirmCommand::new(services, email, token).execute().await
        }
        Commands::Form { method, query } => FormCommand::new(method, query).execute().await,
        Commands::Show { email } => {
            let services = Services::from_config(&config).await?;
            ShowCommand::new(services, email).execute().await
        }
    }
}
