//! Session store adapter: typed JSON access to a string key-value medium.
//!
//! The medium lives as long as the process, the way browser session storage
//! lives as long as the tab. Read failures never escape this module: a value
//! that does not parse is logged and replaced with the caller's fallback.

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, instrument};

use crate::error::StoreError;
use crate::util::trunc_for_log;

pub const PREFERENCES_KEY: &str = "quizPreferences";
pub const RESULTS_KEY: &str = "quizResults";

/// Raw string storage underneath the typed adapter.
pub trait SessionStore {
    fn get_raw(&self, key: &str) -> Option<String>;
    fn set_raw(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl SessionStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_raw(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[derive(Debug, Default)]
pub struct SessionStorage<S = MemoryStore> {
    inner: S,
}

impl<S: SessionStore> SessionStorage<S> {
    /// Parse the value under `key`. `Ok(None)` when the key is absent or empty.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.inner.get_raw(key) {
            Some(raw) if !raw.is_empty() => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Malformed { key: key.to_string(), source }),
            _ => Ok(None),
        }
    }

    /// Like `try_get`, but corruption degrades to `fallback` with a diagnostic.
    #[instrument(level = "debug", skip(self, fallback))]
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.try_get(key) {
            Ok(Some(v)) => v,
            Ok(None) => fallback,
            Err(e) => {
                let raw = self.inner.get_raw(key).unwrap_or_default();
                error!(target: "store", %key, error = %e, raw = %trunc_for_log(&raw, 80), "Failed to parse session value; using fallback");
                fallback
            }
        }
    }

    #[instrument(level = "debug", skip(self, value))]
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => {
                debug!(target: "store", %key, bytes = raw.len(), "Session value written");
                self.inner.set_raw(key, raw);
            }
            Err(source) => {
                let e = StoreError::Serialize { key: key.to_string(), source };
                error!(target: "store", %key, error = %e, "Session value not written");
            }
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, key: &str) {
        self.inner.remove(key);
    }

    /// Run `on_missing` once and return false if any key is absent or empty.
    pub fn ensure_keys<F: FnOnce()>(&self, keys: &[&str], on_missing: F) -> bool {
        let missing = keys
            .iter()
            .find(|key| self.inner.get_raw(key).map_or(true, |raw| raw.is_empty()));
        match missing {
            Some(key) => {
                debug!(target: "store", %key, "Required session key missing; redirecting");
                on_missing();
                false
            }
            None => true,
        }
    }

    /// Direct access to the medium, for tests that need to plant raw values.
    #[cfg(test)]
    pub fn medium_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}
