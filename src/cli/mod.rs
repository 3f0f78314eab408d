use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "privacy-confirm")]
#[command(about = "File and confirm data subject privacy requests")]
#[command(long_about = "privacy-confirm files export and erasure requests, issues the emailed \
                       confirmation token, and confirms requests when the subject presents that \
                       token within 24 hours.")]
pub struct Cli {
    /// Configuration file (defaults to privacy-confirm.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// File a new privacy request and print its confirmation token
    Request {
        /// Email address of the data subject
        #[arg(long)]
        email: String,
        /// Request type
        #[arg(long = "type", default_value = "export", help = "Request type: export or remove")]
        request_type: String,
    },
    /// Confirm a pending request with the token from the confirmation email
    Confirm {
        /// Email address the request was filed under
        #[arg(long)]
        email: String,
        /// Confirmation token
        #[arg(long)]
        token: String,
    },
    /// Print the confirmation form as JSON
    Form {
        /// Method of the invocation; GET pre-fills the token from the query
        #[arg(long, default_value = "GET")]
        method: String,
        /// Raw query string, e.g. "confirm_token=abc123"
        #[arg(long, default_value = "")]
        query: String,
    },
    /// List every request filed for an email address
    Show {
        /// Email address to look up
        #[arg(long)]
        email: String,
    },
}
