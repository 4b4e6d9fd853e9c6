//! Built-in token storage backends.

use crate::{Error, Result, TokenPair, TokenStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::fs;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredTokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// Volatile in-process store.
///
/// The default backend: suitable for tests and for sessions that should not
/// outlive the process. Clones share the same underlying slots.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<Mutex<StoredTokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut StoredTokens) -> T) -> T {
        let mut inner = self
            .inner
            .lock()
            .expect("Failed to acquire token store lock");
        f(&mut inner)
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn access(&self) -> Result<Option<String>> {
        Ok(self.with_inner(|t| t.access.clone()))
    }

    async fn refresh(&self) -> Result<Option<String>> {
        Ok(self.with_inner(|t| t.refresh.clone()))
    }

    async fn store(&self, tokens: &TokenPair) -> Result<()> {
        self.with_inner(|t| {
            t.access = Some(tokens.access.clone());
            t.refresh = Some(tokens.refresh.clone());
        });
        Ok(())
    }

    async fn store_access(&self, access: &str) -> Result<()> {
        self.with_inner(|t| t.access = Some(access.to_string()));
        Ok(())
    }

    async fn clear_access(&self) -> Result<()> {
        self.with_inner(|t| t.access = None);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.with_inner(|t| *t = StoredTokens::default());
        Ok(())
    }
}

/// Stores the token pair as a JSON session file, for native frontends that
/// keep a login across runs.
///
/// The file holds `{"access": ..., "refresh": ...}` and is created with
/// owner-only permissions on unix. A missing file reads as an empty store;
/// clearing the store removes the file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Session file under the platform data directory
    /// (`~/.local/share/learnx/session.json` on Linux).
    pub fn default_path() -> Result<PathBuf> {
        let dirs =
            directories::ProjectDirs::from("app", "LearnX", "learnx").ok_or(Error::NoDataDir)?;
        Ok(dirs.data_dir().join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoredTokens> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(StoredTokens::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, tokens: &StoredTokens) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&self.path, serde_json::to_vec_pretty(tokens)?).await?;

        // Session tokens are credentials: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, permissions).await?;
        }

        debug!("Session file written to: {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn access(&self) -> Result<Option<String>> {
        Ok(self.load().await?.access)
    }

    async fn refresh(&self) -> Result<Option<String>> {
        Ok(self.load().await?.refresh)
    }

    async fn store(&self, tokens: &TokenPair) -> Result<()> {
        self.save(&StoredTokens {
            access: Some(tokens.access.clone()),
            refresh: Some(tokens.refresh.clone()),
        })
        .await
    }

    async fn store_access(&self, access: &str) -> Result<()> {
        let mut current = self.load().await?;
        current.access = Some(access.to_string());
        self.save(&current).await
    }

    async fn clear_access(&self) -> Result<()> {
        let mut current = self.load().await?;
        current.access = None;
        self.save(&current).await
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Session file removed: {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
