//! Storage for OAuth requests awaiting their redirect.
//!
//! Before the browser leaves for the authorization server, the request
//! metadata is stashed here under its `state` value so the flow can pick up
//! where it left off once the callback arrives.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{OAuthError, Result};

/// Default pending-request file name within the data directory.
pub const PENDING_FILE: &str = "pending-oauth.json";

/// A sign-in that has been started but not yet completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOAuthRequest {
    /// CSRF state, also the storage key.
    pub state: String,
    pub service_id: String,
    pub provider_id: String,
    #[serde(default)]
    pub requested_scopes: Vec<String>,
    /// Where to send the user once the credential exists.
    pub return_url: String,
    /// PKCE verifier matching the challenge sent with the request.
    pub code_verifier: String,
    pub created_at: DateTime<Utc>,
}

impl PendingOAuthRequest {
    /// Whether the request is older than `ttl` at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }
}

/// Key/value surface for pending OAuth requests.
#[async_trait]
pub trait PendingRequestStore: Send + Sync + std::fmt::Debug {
    /// Store a request under its state, replacing any previous entry.
    async fn save(&self, request: &PendingOAuthRequest) -> Result<()>;

    /// Remove and return the request stored under `state`.
    async fn take(&self, state: &str) -> Result<Option<PendingOAuthRequest>>;

    /// Drop the request stored under `state`, if any.
    async fn remove(&self, state: &str) -> Result<()> {
        self.take(state).await.map(|_| ())
    }

    /// All stored requests, ordered by state.
    async fn list(&self) -> Result<Vec<PendingOAuthRequest>>;
}

/// Shared pending store for use across async contexts.
pub type SharedPendingStore = Arc<dyn PendingRequestStore>;

type PendingMap = BTreeMap<String, PendingOAuthRequest>;

// ============================================================================
// FilePendingStore
// ============================================================================

/// JSON-file-backed pending store.
#[derive(Debug)]
pub struct FilePendingStore {
    path: PathBuf,
    cache: RwLock<Option<PendingMap>>,
}

impl FilePendingStore {
    /// Store pending requests in `data_dir/pending-oauth.json`.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_path(data_dir.join(PENDING_FILE))
    }

    /// Store pending requests at a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            cache: RwLock::new(None),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<PendingMap> {
        if !self.path.exists() {
            return Ok(PendingMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| OAuthError::Storage(format!("Failed to read pending file: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| OAuthError::Serialization(format!("Failed to parse pending file: {}", e)))
    }

    fn write_file(&self, map: &PendingMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                OAuthError::Storage(format!("Failed to create pending directory: {}", e))
            })?;
        }
        let json = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, json)
            .map_err(|e| OAuthError::Storage(format!("Failed to write pending file: {}", e)))
    }

    /// Run `f` against a copy of the map and persist it.
    ///
    /// The cache only takes the new map once the file write succeeded.
    async fn update<T>(&self, f: impl FnOnce(&mut PendingMap) -> T) -> Result<T> {
        let mut cache = self.cache.write().await;
        let mut map = match cache.as_ref() {
            Some(map) => map.clone(),
            None => self.read_file()?,
        };
        let out = f(&mut map);
        self.write_file(&map)?;
        *cache = Some(map);
        Ok(out)
    }
}

#[async_trait]
impl PendingRequestStore for FilePendingStore {
    async fn save(&self, request: &PendingOAuthRequest) -> Result<()> {
        self.update(|map| {
            map.insert(request.state.clone(), request.clone());
        })
        .await?;
        tracing::info!(
            provider_id = %request.provider_id,
            service_id = %request.service_id,
            "Pending OAuth request saved to {}",
            self.path.display()
        );
        Ok(())
    }

    async fn take(&self, state: &str) -> Result<Option<PendingOAuthRequest>> {
        self.update(|map| map.remove(state)).await
    }

    async fn list(&self) -> Result<Vec<PendingOAuthRequest>> {
        {
            let cache = self.cache.read().await;
            if let Some(map) = cache.as_ref() {
                return Ok(map.values().cloned().collect());
            }
        }
        let map = self.read_file()?;
        let out = map.values().cloned().collect();
        *self.cache.write().await = Some(map);
        Ok(out)
    }
}

// ============================================================================
// InMemoryPendingStore (for testing)
// ============================================================================

/// In-memory pending store for testing.
#[derive(Debug, Default)]
pub struct InMemoryPendingStore {
    requests: RwLock<PendingMap>,
}

impl InMemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingRequestStore for InMemoryPendingStore {
    async fn save(&self, request: &PendingOAuthRequest) -> Result<()> {
        self.requests
            .write()
            .await
            .insert(request.state.clone(), request.clone());
        Ok(())
    }

    async fn take(&self, state: &str) -> Result<Option<PendingOAuthRequest>> {
        Ok(self.requests.write().await.remove(state))
    }

    async fn list(&self) -> Result<Vec<PendingOAuthRequest>> {
        Ok(self.requests.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn request(state: &str) -> PendingOAuthRequest {
        PendingOAuthRequest {
            state: state.to_string(),
            service_id: "sheets".to_string(),
            provider_id: "google-sheets".to_string(),
            requested_scopes: vec!["https://www.googleapis.com/auth/drive.file".to_string()],
            return_url: "https://app.example.com/w/42".to_string(),
            code_verifier: "verifier".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_file_save_and_take() {
        let temp = tempdir().unwrap();
        let store = FilePendingStore::new(temp.path());

        store.save(&request("s1")).await.unwrap();
        assert!(store.path().exists());

        let taken = store.take("s1").await.unwrap().unwrap();
        assert_eq!(taken.provider_id, "google-sheets");
        assert!(store.take("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let temp = tempdir().unwrap();
        FilePendingStore::new(temp.path())
            .save(&request("s1"))
            .await
            .unwrap();

        let reopened = FilePendingStore::new(temp.path());
        let all = reopened.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].state, "s1");
        assert_eq!(all[0].return_url, "https://app.example.com/w/42");
    }

    #[tokio::test]
    async fn test_file_remove() {
        let temp = tempdir().unwrap();
        let store = FilePendingStore::new(temp.path());
        store.save(&request("a")).await.unwrap();
        store.save(&request("b")).await.unwrap();

        store.remove("a").await.unwrap();
        let states: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.state)
            .collect();
        assert_eq!(states, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(PENDING_FILE);
        std::fs::write(&path, "not json").unwrap();

        let store = FilePendingStore::with_path(path);
        let err = store.list().await.unwrap_err();
        assert!(matches!(err, OAuthError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let temp = tempdir().unwrap();
        let store = FilePendingStore::new(temp.path());
        store.save(&request("kept")).await.unwrap();

        // Parent "directory" is a regular file, so every write fails.
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let broken = FilePendingStore::with_path(blocker.join(PENDING_FILE));

        let err = broken.save(&request("lost")).await.unwrap_err();
        assert!(matches!(err, OAuthError::Storage(_)));
        assert!(broken.list().await.unwrap().is_empty());

        // A failed take keeps the entry in the cache as well.
        let map_path = temp.path().join(PENDING_FILE);
        let reopened = FilePendingStore::with_path(map_path.clone());
        assert_eq!(reopened.list().await.unwrap().len(), 1);
        std::fs::remove_file(&map_path).unwrap();
        std::fs::create_dir(&map_path).unwrap();
        assert!(reopened.take("kept").await.is_err());
        let states: Vec<_> = reopened
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.state)
            .collect();
        assert_eq!(states, vec!["kept".to_string()]);
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryPendingStore::new();
        store.save(&request("x")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert!(store.take("x").await.unwrap().is_some());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[test]
    fn test_expiry() {
        let mut req = request("s");
        let now = Utc::now();
        req.created_at = now - Duration::minutes(11);
        assert!(req.is_expired_at(now, Duration::minutes(10)));

        req.created_at = now - Duration::minutes(2);
        assert!(!req.is_expired_at(now, Duration::minutes(10)));
    }
}
