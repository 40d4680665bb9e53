//! Authorization credential

use crate::error::CredentialLoadError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Value sent as the `Authorization` header of every replayed request
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    authorization: String,
}

impl Credential {
    pub fn new(authorization: impl Into<String>) -> Self {
        Self {
            authorization: authorization.into(),
        }
    }

    /// Load the credential from a `{ "authorization": "..." }` document
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CredentialLoadError> {
        let path = path.as_ref();
        let content = fs::read(path)
            .await
            .map_err(|e| CredentialLoadError::read(path, e))?;

        let credential: Credential = serde_json::from_slice(&content)
            .map_err(|e| CredentialLoadError::parse(path, e))?;

        debug!("Loaded credential from {:?}", path);
        Ok(credential)
    }

    /// The raw header value
    pub fn authorization(&self) -> &str {
        &self.authorization
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("authorization", &"<redacted>")
            .finish()
    }
}
