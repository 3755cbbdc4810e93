//! Durable storage for the device token and the session credential.
//!
//! [`TokenStore`] is a typed view over any [`KeyValueStore`]. Two backends are
//! provided: [`MemoryStore`] for tests and short-lived processes, and
//! [`JsonFileStore`] which keeps all keys in one JSON document on disk.

use async_trait::async_trait;
use medconf_common::{storage_error, DeviceToken, KeyValueStore, MedconfError, SessionCredential};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::error::PushError;

/// Key under which the device messaging token is cached.
pub const DEVICE_TOKEN_KEY: &str = "fcmToken";

/// Key under which the authentication layer stores the session credential.
pub const SESSION_CREDENTIAL_KEY: &str = "userToken";

/// In-process key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, MedconfError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), MedconfError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), MedconfError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Key-value store persisted as a single JSON object.
///
/// The file is read lazily on first access and rewritten on every mutation
/// through a temporary file and a rename, so a crash never leaves a torn file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Option<BTreeMap<String, String>>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, MedconfError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(storage_error(format!(
                "failed to read {}: {}",
                self.path.display(),
                err
            ))),
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), MedconfError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(entries)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Persisted {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }

    async fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> (T, bool),
    ) -> Result<T, MedconfError> {
        let mut guard = self.entries.lock().await;
        let mut next = match guard.as_ref() {
            Some(entries) => entries.clone(),
            None => self.load().await?,
        };
        let (value, dirty) = f(&mut next);
        // The cached map only ever mirrors what is on disk.
        if dirty {
            self.persist(&next).await?;
        }
        *guard = Some(next);
        Ok(value)
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, MedconfError> {
        self.with_entries(|entries| (entries.get(key).cloned(), false))
            .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), MedconfError> {
        self.with_entries(|entries| {
            let changed = entries.get(key).map(String::as_str) != Some(value);
            entries.insert(key.to_string(), value.to_string());
            ((), changed)
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), MedconfError> {
        self.with_entries(|entries| ((), entries.remove(key).is_some()))
            .await
    }
}

/// Typed access to the two values the notification core persists.
///
/// Cloning is cheap; clones share the same backing store. Empty strings are
/// read back as absent.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn device_token(&self) -> Result<Option<DeviceToken>, PushError> {
        Ok(self
            .read_non_empty(DEVICE_TOKEN_KEY)
            .await?
            .map(DeviceToken::new))
    }

    /// Replaces whatever token was cached before.
    pub async fn set_device_token(&self, token: &DeviceToken) -> Result<(), PushError> {
        self.inner.set(DEVICE_TOKEN_KEY, token.as_str()).await?;
        Ok(())
    }

    pub async fn clear_device_token(&self) -> Result<(), PushError> {
        self.inner.remove(DEVICE_TOKEN_KEY).await?;
        Ok(())
    }

    pub async fn session_credential(&self) -> Result<Option<SessionCredential>, PushError> {
        Ok(self
            .read_non_empty(SESSION_CREDENTIAL_KEY)
            .await?
            .map(SessionCredential::new))
    }

    pub async fn set_session_credential(
        &self,
        credential: &SessionCredential,
    ) -> Result<(), PushError> {
        self.inner
            .set(SESSION_CREDENTIAL_KEY, credential.as_str())
            .await?;
        Ok(())
    }

    pub async fn clear_session_credential(&self) -> Result<(), PushError> {
        self.inner.remove(SESSION_CREDENTIAL_KEY).await?;
        Ok(())
    }

    async fn read_non_empty(&self, key: &str) -> Result<Option<String>, PushError> {
        Ok(self
            .inner
            .get(key)
            .await?
            .filter(|value| !value.trim().is_empty()))
    }
}
