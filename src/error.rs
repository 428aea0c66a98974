// Fetch error taxonomy shared by every provider call.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single fetch operation for one data kind.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure: connect, timeout, body read.
    #[error("network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status, unparseable body or a missing/invalid field.
    #[error("upstream error from {url}: {reason}")]
    Upstream { url: String, reason: String },

    /// Every fallback tier of a multi-provider operation failed.
    #[error("all providers exhausted for {operation}: {}", .attempts.join("; "))]
    AllProvidersExhausted {
        operation: &'static str,
        attempts: Vec<String>,
    },
}

impl FetchError {
    pub fn upstream(url: impl Into<String>, reason: impl Into<String>) -> Self {
        FetchError::Upstream {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Network { .. } => ErrorKind::Network,
            FetchError::Upstream { .. } => ErrorKind::Upstream,
            FetchError::AllProvidersExhausted { .. } => ErrorKind::AllProvidersExhausted,
        }
    }
}

/// Serializable tag for [`FetchError`]; what the snapshot keeps per failed kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Network,
    Upstream,
    AllProvidersExhausted,
}
