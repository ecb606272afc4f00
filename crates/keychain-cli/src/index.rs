//! Key index - the set of known secret names
//!
//! Keychains cannot enumerate their entries, so the names of stored secrets
//! are tracked separately in one more keychain entry. On the wire the index
//! is a JSON object mapping every name to `true`: `{"api-token":true}`.
//!
//! Every read and mutation reloads the index first. Each invocation is its
//! own process, so the persisted entry is the shared state. There is no
//! locking: two processes racing on `add`/`remove` can lose an update.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::backend::CredentialStore;
use crate::error::{Result, StoreError};

/// Index of key names persisted as a single keychain entry
pub struct KeyIndex<'a> {
    backend: &'a dyn CredentialStore,
    service: String,
    account: String,
    entries: BTreeSet<String>,
}

impl<'a> KeyIndex<'a> {
    /// Create an empty, unsaved index
    pub fn new(backend: &'a dyn CredentialStore, service: &str, account: &str) -> Self {
        Self {
            backend,
            service: service.to_string(),
            account: account.to_string(),
            entries: BTreeSet::new(),
        }
    }

    /// Load the persisted index, initialising an empty one on first run
    pub fn open(backend: &'a dyn CredentialStore, service: &str, account: &str) -> Result<Self> {
        let mut index = Self::new(backend, service, account);

        match index.load() {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => {
                index.save()?;
                info!(service, account, "initialised new key index");
            }
            Err(e) => return Err(e),
        }

        Ok(index)
    }

    /// Replace the in-memory entries with the persisted ones
    ///
    /// Returns `NotFound` when nothing has been persisted yet.
    pub fn load(&mut self) -> Result<()> {
        let content = self.backend.get(&self.service, &self.account)?;
        self.entries = decode(&content)?;
        debug!(count = self.entries.len(), "loaded key index");
        Ok(())
    }

    /// Persist the in-memory entries
    pub fn save(&self) -> Result<()> {
        let content = encode(&self.entries)?;
        self.backend.set(&self.service, &self.account, &content)
    }

    /// Reload and return all known names, sorted
    pub fn list_names(&mut self) -> Result<Vec<String>> {
        self.load()?;
        Ok(self.entries.iter().cloned().collect())
    }

    /// Reload, insert `name` and persist
    pub fn add(&mut self, name: &str) -> Result<()> {
        self.load()?;
        self.entries.insert(name.to_string());
        self.save()
    }

    /// Reload, remove `name` if present and persist
    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.load()?;
        self.entries.remove(name);
        self.save()
    }

    /// Names as of the last load or mutation
    #[cfg(test)]
    fn entries(&self) -> &BTreeSet<String> {
        &self.entries
    }

    /// Keychain service the index itself is stored under
    pub fn service(&self) -> &str {
        &self.service
    }
}

fn decode(content: &str) -> Result<BTreeSet<String>> {
    let map: BTreeMap<String, bool> =
        serde_json::from_str(content).map_err(|source| StoreError::Deserialization {
            content: content.to_string(),
            source,
        })?;
    Ok(map.into_keys().collect())
}

fn encode(entries: &BTreeSet<String>) -> Result<String> {
    let map: BTreeMap<&str, bool> = entries.iter().map(|name| (name.as_str(), true)).collect();
    Ok(serde_json::to_string(&map)?)
}
