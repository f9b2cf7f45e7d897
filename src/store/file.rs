//! File-backed document store.
//!
//! Keeps the collection in a [`MemoryStore`] and rewrites a JSON snapshot
//! after every write. The snapshot is written to a sibling temp file and
//! renamed into place. A write whose snapshot fails is rolled back in
//! memory, so the collection never holds a change the file lacks.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::memory::MemoryStore;
use super::query::UserFilter;
use super::UserStore;
use crate::error::StoreResult;
use crate::exercise::{User, UserSummary};

/// Store persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`, loading the snapshot if it exists.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let inner = MemoryStore::new(name);

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let users: Vec<User> = serde_json::from_slice(&bytes)?;
                let count = users.len();
                for user in users {
                    inner.insert(user)?;
                }
                info!(path = %path.display(), users = count, "loaded store snapshot");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "starting empty store");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            path,
            inner,
            write_lock: Mutex::new(()),
        })
    }

    /// Snapshot file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Caller must hold `write_lock`.
    async fn persist(&self) -> StoreResult<()> {
        let users = self.inner.snapshot();
        let bytes = serde_json::to_vec_pretty(&users)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(users = users.len(), bytes = bytes.len(), "snapshot written");
        Ok(())
    }
}

#[async_trait]
impl UserStore for FileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn create_user(&self, username: &str) -> StoreResult<User> {
        let _guard = self.write_lock.lock().await;

        let user = self.inner.create_user(username).await?;
        if let Err(e) = self.persist().await {
            warn!(id = %user.id, error = %e, "snapshot failed, discarding new user");
            self.inner.remove(&user.id);
            return Err(e);
        }
        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<UserSummary>> {
        self.inner.list_users().await
    }

    async fn find_user(&self, filter: &UserFilter) -> StoreResult<Option<User>> {
        self.inner.find_user(filter).await
    }

    #[instrument(skip(self, user), fields(path = %self.path.display(), id = %user.id))]
    async fn save_user(&self, user: &User) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        let previous = self.inner.find(&UserFilter::id(user.id));
        self.inner.save_user(user).await?;
        if let Err(e) = self.persist().await {
            warn!(error = %e, "snapshot failed, restoring previous document");
            if let Some(previous) = previous {
                self.inner.replace(&previous)?;
            }
            return Err(e);
        }
        Ok(())
    }
}
