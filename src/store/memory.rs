//! In-process document store backed by concurrent maps.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, instrument};

use super::query::{Clause, UserFilter};
use super::UserStore;
use crate::error::{StoreError, StoreResult};
use crate::exercise::schema::validate_username;
use crate::exercise::{ObjectId, User, UserSummary};

/// Stored document plus its natural (insertion) position.
#[derive(Debug, Clone)]
struct Document {
    seq: u64,
    user: User,
}

/// User collection with a unique index on `username`.
///
/// Saves replace the whole document; concurrent saves to one user are
/// last-write-wins.
#[derive(Debug, Default)]
pub struct MemoryStore {
    name: String,
    documents: DashMap<ObjectId, Document>,
    usernames: DashMap<String, ObjectId>,
    sequence: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Database name from the connection string.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store holds no users.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Insert a fully-formed user, enforcing the username index.
    pub fn insert(&self, user: User) -> StoreResult<User> {
        validate_username(&user.username)?;

        match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey {
                field: "username",
                value: user.username,
            }),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
                self.documents.insert(
                    user.id,
                    Document {
                        seq,
                        user: user.clone(),
                    },
                );
                Ok(user)
            }
        }
    }

    /// Replace a stored user document.
    pub fn replace(&self, user: &User) -> StoreResult<()> {
        let mut doc = self
            .documents
            .get_mut(&user.id)
            .ok_or(StoreError::DocumentNotFound(user.id))?;
        doc.user = user.clone();
        Ok(())
    }

    /// Drop a user and its username index entry.
    pub fn remove(&self, id: &ObjectId) -> Option<User> {
        let (_, doc) = self.documents.remove(id)?;
        self.usernames.remove_if(&doc.user.username, |_, owner| owner == id);
        Some(doc.user)
    }

    /// All users in natural order.
    pub fn snapshot(&self) -> Vec<User> {
        let mut docs: Vec<Document> = self.documents.iter().map(|d| d.value().clone()).collect();
        docs.sort_by_key(|d| d.seq);
        docs.into_iter().map(|d| d.user).collect()
    }

    /// First user satisfying the earliest matching clause.
    pub fn find(&self, filter: &UserFilter) -> Option<User> {
        filter.clauses().iter().find_map(|clause| match clause {
            Clause::Username(name) => {
                let id = *self.usernames.get(name)?;
                self.documents.get(&id).map(|d| d.user.clone())
            }
            Clause::Id(id) => self.documents.get(id).map(|d| d.user.clone()),
        })
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    #[instrument(skip(self), fields(store = %self.name))]
    async fn create_user(&self, username: &str) -> StoreResult<User> {
        let user = self.insert(User::new(username))?;
        debug!(id = %user.id, "user created");
        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<UserSummary>> {
        Ok(self.snapshot().iter().map(UserSummary::from).collect())
    }

    async fn find_user(&self, filter: &UserFilter) -> StoreResult<Option<User>> {
        Ok(self.find(filter))
    }

    #[instrument(skip(self, user), fields(store = %self.name, id = %user.id))]
    async fn save_user(&self, user: &User) -> StoreResult<()> {
        self.replace(user)?;
        debug!(exercises = user.exercises.len(), "user saved");
        Ok(())
    }
}
