use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid credentials file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// API consumer key and secret.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    #[serde(rename = "ck")]
    pub consumer_key: String,
    #[serde(rename = "cs")]
    pub consumer_secret: String,
}

impl Credentials {
    /// Parse a credentials file of the form `{"ck": "...", "cs": "..."}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or lacks either key.
    pub fn from_file(path: &Path) -> Result<Self, CredentialsError> {
        let body = std::fs::read_to_string(path).map_err(|source| CredentialsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| CredentialsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load credentials if available. Any problem is logged and yields `None`.
    #[must_use]
    pub fn load_optional(path: &Path) -> Option<Self> {
        match Self::from_file(path) {
            Ok(creds) if creds.consumer_key.is_empty() || creds.consumer_secret.is_empty() => {
                warn!(path = %path.display(), "Credentials file has an empty key or secret");
                None
            }
            Ok(creds) => Some(creds),
            Err(CredentialsError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                warn!(path = %path.display(), "Credentials file not found");
                None
            }
            Err(e) => {
                warn!("{e}");
                None
            }
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .finish()
    }
}
