//! Durable credential storage.
//!
//! The store holds the immutable client credentials and the long-lived
//! refresh token. At most one refresh token exists at a time: setting a new
//! one overwrites the old.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::credentials::ClientCredentials;
use crate::error::{AuthError, AuthResult};

/// Durable key-value storage for the token lifecycle.
///
/// Implementations must persist the refresh token across restarts (the
/// in-memory variant exists for tests and ephemeral deployments).
pub trait CredentialStore: Send + Sync {
    /// Returns the OAuth client credentials.
    fn client_credentials(&self) -> AuthResult<ClientCredentials>;

    /// Returns the stored refresh token, if any.
    fn refresh_token(&self) -> AuthResult<Option<String>>;

    /// Stores a refresh token, overwriting any previous one.
    fn set_refresh_token(&self, token: &str) -> AuthResult<()>;

    /// Discards the stored refresh token.
    fn clear_refresh_token(&self) -> AuthResult<()>;
}

/// In-memory [`CredentialStore`] implementation.
#[derive(Debug)]
pub struct MemoryCredentialStore {
    credentials: ClientCredentials,
    refresh_token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Creates a store with the given credentials and no refresh token.
    pub fn new(credentials: ClientCredentials) -> Self {
        Self {
            credentials,
            refresh_token: Mutex::new(None),
        }
    }

    /// Creates a store pre-populated with a refresh token.
    pub fn with_refresh_token(credentials: ClientCredentials, token: impl Into<String>) -> Self {
        Self {
            credentials,
            refresh_token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn client_credentials(&self) -> AuthResult<ClientCredentials> {
        Ok(self.credentials.clone())
    }

    fn refresh_token(&self) -> AuthResult<Option<String>> {
        Ok(self.refresh_token.lock().unwrap().clone())
    }

    fn set_refresh_token(&self, token: &str) -> AuthResult<()> {
        *self.refresh_token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear_refresh_token(&self) -> AuthResult<()> {
        *self.refresh_token.lock().unwrap() = None;
        Ok(())
    }
}

/// On-disk record of the credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    client_id: String,
    client_secret: String,
    refresh_token: Option<String>,
    updated_at: DateTime<Utc>,
}

/// File-backed [`CredentialStore`] implementation.
///
/// The record is stored as JSON. Writes go to a temp file first, then
/// rename, and the file gets restrictive permissions on Unix.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    record: RwLock<StoredRecord>,
}

impl FileCredentialStore {
    /// Opens (or initializes) a store at the given path.
    ///
    /// If the file exists and was written for the same client ID, the
    /// stored refresh token is kept. A stored token minted for different
    /// credentials is discarded, since the token endpoint would reject it.
    pub fn new(path: impl Into<PathBuf>, credentials: ClientCredentials) -> AuthResult<Self> {
        let path = path.into();

        let mut record = StoredRecord {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            refresh_token: None,
            updated_at: Utc::now(),
        };

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                AuthError::storage(format!("failed to read credential file: {}", e))
            })?;
            let stored: StoredRecord = serde_json::from_str(&content).map_err(|e| {
                AuthError::storage(format!("failed to parse credential file: {}", e))
            })?;

            if stored.client_id == record.client_id {
                record.refresh_token = stored.refresh_token;
                record.updated_at = stored.updated_at;
                debug!("loaded credential store from {:?}", path);
            } else {
                info!(
                    "client_id changed, discarding refresh token stored in {:?}",
                    path
                );
            }
        }

        Ok(Self {
            path,
            record: RwLock::new(record),
        })
    }

    /// Returns the storage path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the record to disk (temp file, then rename).
    fn save(&self, record: &StoredRecord) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::storage(format!("failed to create credential directory: {}", e))
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(record)
            .map_err(|e| AuthError::internal(format!("failed to serialize record: {}", e)))?;

        fs::write(&temp_path, &content)
            .map_err(|e| AuthError::storage(format!("failed to write credential file: {}", e)))?;

        fs::rename(&temp_path, &self.path)
            .map_err(|e| AuthError::storage(format!("failed to rename credential file: {}", e)))?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        debug!("saved credential store to {:?}", self.path);
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn client_credentials(&self) -> AuthResult<ClientCredentials> {
        let record = self.record.read().unwrap();
        Ok(ClientCredentials::new(
            record.client_id.clone(),
            record.client_secret.clone(),
        ))
    }

    fn refresh_token(&self) -> AuthResult<Option<String>> {
        Ok(self.record.read().unwrap().refresh_token.clone())
    }

    fn set_refresh_token(&self, token: &str) -> AuthResult<()> {
        let mut record = self.record.write().unwrap();
        record.refresh_token = Some(token.to_string());
        record.updated_at = Utc::now();
        self.save(&record)?;
        info!("persisted refresh token to {:?}", self.path);
        Ok(())
    }

    fn clear_refresh_token(&self) -> AuthResult<()> {
        let mut record = self.record.write().unwrap();
        record.refresh_token = None;
        record.updated_at = Utc::now();
        self.save(&record)?;
        info!("cleared refresh token in {:?}", self.path);
        Ok(())
    }
}
