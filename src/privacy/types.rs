use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Status of a privacy request, persisted as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum RequestStatus {
    Invalidated,
    Pending,
    Confirmed,
    Completed,
}

impl RequestStatus {
    pub fn code(self) -> i8 {
        match self {
            RequestStatus::Invalidated => -1,
            RequestStatus::Pending => 0,
            RequestStatus::Confirmed => 1,
            RequestStatus::Completed => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(RequestStatus::Invalidated),
            0 => Some(RequestStatus::Pending),
            1 => Some(RequestStatus::Confirmed),
            2 => Some(RequestStatus::Completed),
            _ => None,
        }
    }

    pub fn is_pending(self) -> bool {
        self == RequestStatus::Pending
    }
}

impl From<RequestStatus> for i8 {
    fn from(status: RequestStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i8> for RequestStatus {
    type Error = String;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        RequestStatus::from_code(code as i64).ok_or_else(|| format!("unknown request status {code}"))
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequestStatus::Invalidated => "invalidated",
            RequestStatus::Pending => "pending",
            RequestStatus::Confirmed => "confirmed",
            RequestStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// What the data subject asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Export,
    Remove,
}

impl RequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestType::Export => "export",
            RequestType::Remove => "remove",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "export" => Ok(RequestType::Export),
            "remove" => Ok(RequestType::Remove),
            other => Err(format!("unknown request type '{other}' (expected export or remove)")),
        }
    }
}

/// A data subject's export or erasure request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacyRequest {
    /// Assigned by the store on first write
    pub id: Option<i64>,
    pub email: String,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    /// Argon2 PHC string, never the plaintext token
    pub confirm_token: Option<String>,
    pub confirm_token_created_at: Option<DateTime<Utc>>,
}

impl PrivacyRequest {
    pub fn has_token(&self) -> bool {
        self.confirm_token
            .as_deref()
            .is_some_and(|hash| !hash.is_empty())
    }
}

/// Raw key/value payload submitted by the data subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub confirm_token: String,
    /// Any further form fields, passed through the filter untouched
    #[serde(flatten)]
    pub extra: HashMap<String, String>,
}

impl ConfirmInput {
    pub fn new(email: impl Into<String>, confirm_token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            confirm_token: confirm_token.into(),
            extra: HashMap::new(),
        }
    }
}
