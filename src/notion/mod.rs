use async_trait::async_trait;
use reqwest::StatusCode;

use crate::record::SubscriptionRecord;

pub mod client;
pub mod types;

pub use client::NotionSource;
pub use types::ApiErrorBody;

/// Anything that can produce the current list of subscription records.
#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    async fn fetch_records(&self) -> Result<Vec<SubscriptionRecord>, FetchError>;
}

/// Failure to reach or decode the data source. Callers treat every variant
/// the same way ("data unavailable"); the variants exist for logs.
#[derive(Debug)]
pub enum FetchError {
    MissingToken,
    MissingDatabase,
    Http(reqwest::Error),
    Timeout,
    Api {
        status: StatusCode,
        error: ApiErrorBody,
    },
    Decode(serde_json::Error),
    #[cfg(test)]
    MockQueueEmpty,
}

impl FetchError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Http(err)
        }
    }

    /// Short machine-friendly label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::MissingToken | FetchError::MissingDatabase => "config",
            FetchError::Http(_) | FetchError::Timeout => "network",
            FetchError::Api { .. } => "api",
            FetchError::Decode(_) => "decode",
            #[cfg(test)]
            FetchError::MockQueueEmpty => "mock",
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::MissingToken => write!(f, "NOTION_TOKEN is not set"),
            FetchError::MissingDatabase => write!(f, "NOTION_DATABASE_ID is not set"),
            FetchError::Http(err) => write!(f, "http error: {err}"),
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::Api { status, error } => {
                write!(f, "api error {status}: {}", error.message)
            }
            FetchError::Decode(err) => write!(f, "decode error: {err}"),
            #[cfg(test)]
            FetchError::MockQueueEmpty => write!(f, "mock source response queue is empty"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(err) => Some(err),
            FetchError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
pub use mock::MockSource;
