//! In-memory user store.
//!
//! A `BTreeMap` behind a `std::sync::RwLock`. Readers share the lock; every
//! mutation, id assignment included, holds the write half, so two concurrent
//! creates can never be handed the same id.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

/// A stored user. The id is assigned by the store and never changes.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub age: i64,
}

/// A create/update payload. Any `id` the client sends is ignored.
///
/// Missing fields fall back to empty values so that validation, not the
/// JSON decoder, reports them.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct NewUser {
    pub name: String,
    pub age: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user store lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(_: PoisonError<T>) -> Self { Self::Poisoned }
}

#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<BTreeMap<u64, User>>,
}

impl UserStore {
    pub fn new() -> Self { Self::default() }

    /// The store every process starts with.
    pub fn seeded() -> Self {
        let users = [(1, "Alice", 25), (2, "Bob", 30), (3, "Charlie", 35)]
            .into_iter()
            .map(|(id, name, age)| (id, User { id, name: name.to_owned(), age }))
            .collect();
        Self { users: RwLock::new(users) }
    }

    /// All users, ordered by id.
    pub fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.read()?.values().cloned().collect())
    }

    pub fn get(&self, id: u64) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// Inserts a validated candidate under `max(id) + 1`, or `1` when empty.
    pub fn create(&self, candidate: NewUser) -> Result<User, StoreError> {
        let mut users = self.write()?;
        let id = users.last_key_value().map_or(1, |(id, _)| id + 1);
        let user = User { id, name: candidate.name, age: candidate.age };
        users.insert(id, user.clone());
        Ok(user)
    }

    /// Replaces the user at `id`. Returns `false` when there is none.
    pub fn update(&self, id: u64, candidate: NewUser) -> Result<bool, StoreError> {
        let mut users = self.write()?;
        match users.get_mut(&id) {
            Some(slot) => {
                *slot = User { id, name: candidate.name, age: candidate.age };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes the user at `id`. Returns `false` when there is none.
    pub fn delete(&self, id: u64) -> Result<bool, StoreError> {
        Ok(self.write()?.remove(&id).is_some())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<u64, User>>, StoreError> {
        Ok(self.users.read()?)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<u64, User>>, StoreError> {
        Ok(self.users.write()?)
    }

    /// Panics on another thread while holding the write lock.
    #[cfg(test)]
    pub(crate) fn poison(self: &std::sync::Arc<Self>) {
        let store = std::sync::Arc::clone(self);
        let _ = std::thread::spawn(move || {
            let _guard = store.users.write();
            panic!("poison the store");
        })
        .join();
    }
}
