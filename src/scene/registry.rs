//! Named Registries
//!
//! Name-keyed, shared storage for actors and loaded resources.
//!
//! Insertion and removal take the write lock, so they are mutually
//! exclusive. Lookups take the read lock and hand out `Arc` clones, so a
//! caller never holds the lock across its own work.

use std::any::Any;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use rustc_hash::FxHashMap;

use crate::errors::{Result, TundraError};

/// Heterogeneous registry whose entries can be downcast on lookup.
pub type AnyRegistry = Registry<dyn Any + Send + Sync>;

/// Thread-safe map from unique names to shared entries.
pub struct Registry<T: ?Sized> {
    label: &'static str,
    inner: RwLock<FxHashMap<String, Arc<T>>>,
}

impl<T: ?Sized> Registry<T> {
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            inner: RwLock::new(FxHashMap::default()),
        }
    }

    /// Label used in error messages and logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// [Write] Registers an entry under a new name.
    ///
    /// Fails with [`TundraError::DuplicateName`] when the name is taken; the
    /// existing entry is left untouched.
    pub fn insert_arc(&self, name: &str, entry: Arc<T>) -> Result<Arc<T>> {
        let mut guard = self.inner.write();
        if guard.contains_key(name) {
            return Err(TundraError::DuplicateName {
                registry: self.label,
                name: name.to_string(),
            });
        }
        guard.insert(name.to_string(), Arc::clone(&entry));
        log::trace!("{}: registered '{name}'", self.label);
        Ok(entry)
    }

    /// [Write] Returns the entry registered under `name`, or registers the
    /// one built by `make`.
    ///
    /// The check and the insert happen under one write lock, so concurrent
    /// callers asking for the same name all receive the same entry and
    /// `make` runs at most once.
    pub fn get_or_insert_arc_with(&self, name: &str, make: impl FnOnce() -> Arc<T>) -> Arc<T> {
        let mut guard = self.inner.write();
        if let Some(existing) = guard.get(name) {
            return Arc::clone(existing);
        }
        let entry = make();
        guard.insert(name.to_string(), Arc::clone(&entry));
        log::trace!("{}: registered '{name}'", self.label);
        entry
    }

    /// [Read] Looks up an entry by name.
    pub fn get(&self, name: &str) -> Result<Arc<T>> {
        self.inner
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| TundraError::NotFound {
                registry: self.label,
                name: name.to_string(),
            })
    }

    /// [Read] Looks up an entry, returning `None` when absent.
    pub fn try_get(&self, name: &str) -> Option<Arc<T>> {
        self.inner.read().get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().contains_key(name)
    }

    /// [Write] Removes an entry. Outstanding `Arc`s stay valid.
    pub fn remove(&self, name: &str) -> Option<Arc<T>> {
        let removed = self.inner.write().remove(name);
        if removed.is_some() {
            log::trace!("{}: erased '{name}'", self.label);
        }
        removed
    }

    /// [Write] Removes every entry.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Names of all entries, sorted for deterministic iteration.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// [Read - Advanced] Acquires the read guard for batch access.
    pub fn read_lock(&self) -> RwLockReadGuard<'_, FxHashMap<String, Arc<T>>> {
        self.inner.read()
    }
}

impl<T> Registry<T> {
    /// [Write] Registers a value under a new name.
    pub fn insert(&self, name: &str, value: T) -> Result<Arc<T>> {
        self.insert_arc(name, Arc::new(value))
    }

    /// [Write] Shared entry for `name`, created by `make` when absent.
    pub fn get_or_insert_with(&self, name: &str, make: impl FnOnce() -> T) -> Arc<T> {
        self.get_or_insert_arc_with(name, || Arc::new(make()))
    }
}

impl AnyRegistry {
    /// [Write] Registers a value of any shareable type.
    pub fn insert_any<U: Any + Send + Sync>(&self, name: &str, value: U) -> Result<Arc<U>> {
        let entry: Arc<U> = Arc::new(value);
        let erased: Arc<dyn Any + Send + Sync> = entry.clone();
        self.insert_arc(name, erased)?;
        Ok(entry)
    }

    /// [Write] Shared entry for `name`, created by `make` when absent.
    ///
    /// Fails with [`TundraError::TypeMismatch`] when the existing entry holds
    /// another type.
    pub fn get_or_insert_any_with<U: Any + Send + Sync>(&self, name: &str, make: impl FnOnce() -> U) -> Result<Arc<U>> {
        self.get_or_insert_arc_with(name, || -> Arc<dyn Any + Send + Sync> { Arc::new(make()) })
            .downcast::<U>()
            .map_err(|_| TundraError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<U>(),
            })
    }

    /// [Read] Looks up an entry and downcasts it to `U`.
    ///
    /// Fails when the name is absent or the entry holds another type.
    pub fn get_as<U: Any + Send + Sync>(&self, name: &str) -> Result<Arc<U>> {
        self.get(name)?
            .downcast::<U>()
            .map_err(|_| TundraError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<U>(),
            })
    }
}
