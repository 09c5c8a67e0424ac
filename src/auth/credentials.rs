//! Durable credential persistence.
//!
//! Exactly three entries are stored: the bearer token, the serialized user
//! profile, and the serialized role list. The session layer always saves
//! the full snapshot, but each entry is written independently so one
//! failing write cannot take the others down with it.
//!
//! The storage medium is pluggable through [`SecretBackend`]: the OS
//! keychain for real devices, per-entry files where no keychain is
//! available, and an in-memory map for tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use keyring::Entry;
use tokio::sync::Mutex;
use tokio::task;
use tracing::warn;

use crate::models::UserProfile;

use super::token::normalize_token_str;

/// Fixed entry names, shared by every backend.
const TOKEN_KEY: &str = "handbook.token";
const USER_KEY: &str = "handbook.user";
const ROLES_KEY: &str = "handbook.roles";

/// Keychain service name for [`KeyringBackend`].
const SERVICE_NAME: &str = "handbook-client";

/// Async key-value storage for credential entries.
///
/// `get` returns `Ok(None)` for a missing entry; errors are reserved for
/// the storage medium itself being unavailable. Deleting a missing entry
/// is not an error.
#[async_trait]
pub trait SecretBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Store credentials in the OS keychain.
pub struct KeyringBackend {
    service: String,
}

impl KeyringBackend {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Use a custom keychain service name (one per app flavor).
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(service: &str, key: &str) -> Result<Entry> {
        Entry::new(service, key).context("Failed to create keyring entry")
    }
}

impl Default for KeyringBackend {
    fn default() -> Self {
        Self::new()
    }
}

// Keychain calls can block on the platform secret service, so they run on
// the blocking pool.
#[async_trait]
impl SecretBackend for KeyringBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let service = self.service.clone();
        let key = key.to_string();
        task::spawn_blocking(move || match Self::entry(&service, &key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read entry from keychain"),
        })
        .await
        .context("Keychain read task failed")?
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let service = self.service.clone();
        let key = key.to_string();
        let value = value.to_string();
        task::spawn_blocking(move || {
            Self::entry(&service, &key)?
                .set_password(&value)
                .context("Failed to store entry in keychain")
        })
        .await
        .context("Keychain write task failed")?
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let service = self.service.clone();
        let key = key.to_string();
        task::spawn_blocking(move || match Self::entry(&service, &key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete entry from keychain"),
        })
        .await
        .context("Keychain delete task failed")?
    }
}

/// Store each entry as a file under an app-scoped data directory.
///
/// Fallback for platforms without a usable keychain.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new() -> Result<Self> {
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(Self {
            dir: data_dir.join(SERVICE_NAME),
        })
    }

    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl SecretBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        task::spawn_blocking(move || {
            if !path.exists() {
                return Ok(None);
            }
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read credential file: {}", path.display()))?;
            Ok(Some(contents))
        })
        .await
        .context("Credential read task failed")?
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key);
        let value = value.to_string();
        task::spawn_blocking(move || {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, value)
                .with_context(|| format!("Failed to write credential file: {}", path.display()))
        })
        .await
        .context("Credential write task failed")?
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        task::spawn_blocking(move || {
            if path.exists() {
                std::fs::remove_file(&path).with_context(|| {
                    format!("Failed to delete credential file: {}", path.display())
                })?;
            }
            Ok(())
        })
        .await
        .context("Credential delete task failed")?
    }
}

/// Keep entries in memory only. Nothing survives the process; intended for
/// tests and previews.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SecretBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Snapshot returned by [`CredentialStore::load`].
#[derive(Debug, Clone, Default)]
pub struct StoredCredentials {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub roles: Vec<String>,
}

/// Persistence for the current session's credentials.
pub struct CredentialStore {
    backend: Arc<dyn SecretBackend>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn SecretBackend>) -> Self {
        Self { backend }
    }

    /// OS-keychain-backed store with the default service name.
    pub fn keyring() -> Self {
        Self::new(Arc::new(KeyringBackend::new()))
    }

    /// In-memory store; useful in consumer tests.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::default()))
    }

    /// Persist the full credential snapshot.
    ///
    /// An absent value deletes its entry: a token that normalizes to
    /// nothing, a missing user, an empty role list. The three writes are
    /// issued concurrently and all run to completion; the first failure,
    /// if any, is returned once the rest have settled.
    pub async fn save(
        &self,
        token: Option<&str>,
        user: Option<&UserProfile>,
        roles: &[String],
    ) -> Result<()> {
        let token = token.and_then(normalize_token_str);
        let user_json = match user {
            Some(user) => {
                Some(serde_json::to_string(user).context("Failed to serialize user profile")?)
            }
            None => None,
        };
        let roles_json = if roles.is_empty() {
            None
        } else {
            Some(serde_json::to_string(roles).context("Failed to serialize roles")?)
        };

        let (token_result, user_result, roles_result) = tokio::join!(
            self.put(TOKEN_KEY, token.as_deref()),
            self.put(USER_KEY, user_json.as_deref()),
            self.put(ROLES_KEY, roles_json.as_deref()),
        );
        token_result.and(user_result).and(roles_result)
    }

    /// Read the persisted snapshot.
    ///
    /// The token is normalized on the way out. An unparseable user or role
    /// entry degrades to its default (logged); backend errors propagate.
    pub async fn load(&self) -> Result<StoredCredentials> {
        let (token, user, roles) = tokio::join!(
            self.backend.get(TOKEN_KEY),
            self.backend.get(USER_KEY),
            self.backend.get(ROLES_KEY),
        );

        let token = token?.as_deref().and_then(normalize_token_str);
        let user = user?.and_then(|raw| match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Discarding unparseable stored user profile");
                None
            }
        });
        let roles = roles?
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(roles) => Some(roles),
                Err(e) => {
                    warn!(error = %e, "Discarding unparseable stored roles");
                    None
                }
            })
            .unwrap_or_default();

        Ok(StoredCredentials { token, user, roles })
    }

    /// Delete all three entries, concurrently, settling them all before
    /// reporting the first failure.
    pub async fn clear(&self) -> Result<()> {
        let (token, user, roles) = tokio::join!(
            self.backend.delete(TOKEN_KEY),
            self.backend.delete(USER_KEY),
            self.backend.delete(ROLES_KEY),
        );
        token.and(user).and(roles)
    }

    async fn put(&self, key: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => self.backend.set(key, value).await,
            None => self.backend.delete(key).await,
        }
    }
}
