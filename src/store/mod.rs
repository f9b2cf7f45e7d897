//! User/exercise document store.
//!
//! This module handles:
//! - The [`UserStore`] interface consumed by the HTTP layer
//! - Username-or-identifier lookup queries
//! - In-memory and file-backed implementations
//! - Opening a store from a connection string

pub mod file;
pub mod memory;
pub mod query;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use strum::{Display, EnumString};
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::exercise::{User, UserSummary};

pub use file::FileStore;
pub use memory::MemoryStore;
pub use query::{Clause, UserFilter};

/// Persistent user collection.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug {
    /// Insert a new user with no exercises. Fails on duplicate usernames.
    async fn create_user(&self, username: &str) -> StoreResult<User>;

    /// All users without their exercises, in natural order.
    async fn list_users(&self) -> StoreResult<Vec<UserSummary>>;

    /// First user matching the filter.
    async fn find_user(&self, filter: &UserFilter) -> StoreResult<Option<User>>;

    /// Replace the stored document for `user.id`.
    async fn save_user(&self, user: &User) -> StoreResult<()>;
}

/// Connection string scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Scheme {
    /// Volatile in-process store.
    Memory,
    /// JSON snapshot on disk.
    File,
}

/// Parsed connection string: `memory://<name>` or `file://<path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUrl {
    /// In-process store with a database name.
    Memory(String),
    /// File-backed store at a path.
    File(PathBuf),
}

impl FromStr for StoreUrl {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || StoreError::UnsupportedUrl(s.to_string());

        let (scheme, location) = s.split_once("://").ok_or_else(unsupported)?;
        let scheme = Scheme::from_str(&scheme.to_ascii_lowercase()).map_err(|_| unsupported())?;
        if location.is_empty() {
            return Err(unsupported());
        }

        Ok(match scheme {
            Scheme::Memory => StoreUrl::Memory(location.to_string()),
            Scheme::File => StoreUrl::File(PathBuf::from(location)),
        })
    }
}

/// Open the store named by a connection string.
pub async fn connect(url: &str) -> StoreResult<Arc<dyn UserStore>> {
    let store: Arc<dyn UserStore> = match url.parse::<StoreUrl>()? {
        StoreUrl::Memory(name) => {
            let store = MemoryStore::new(name);
            info!(database = %store.name(), "using in-memory store");
            Arc::new(store)
        }
        StoreUrl::File(path) => {
            let store = FileStore::open(path).await?;
            info!(path = %store.path().display(), "using file store");
            Arc::new(store)
        }
    };
    Ok(store)
}
