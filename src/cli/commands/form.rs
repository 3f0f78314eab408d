use anyhow::{anyhow, Result};

use super::Command;
use crate::privacy::{load_form, parse_query, HttpMethod};

pub struct FormCommand {
    method: String,
    query: String,
}

impl FormCommand {
    pub fn new(method: String, query: String) -> Self {
        Self { method, query }
    }
}

impl Command for FormCommand {
    async fn execute(&self) -> Result<()> {
        let method: HttpMethod = self.method.parse().map_err(|e: String| anyhow!(e))?;
        let form = load_form(method, &parse_query(&self.query));
        println!("{}", serde_json::to_string_pretty(&form)?);
        Ok(())
    }
}
