//! Credential store backends
//!
//! Every entry is addressed by a `(service, account)` pair:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KWallet)
//!
//! `MemoryStore` keeps entries in process memory and is what the tests run against.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{Result, StoreError};

/// The narrow capability the secret store needs from a keychain
pub trait CredentialStore {
    /// Read the value stored under `(service, account)`
    fn get(&self, service: &str, account: &str) -> Result<String>;

    /// Create or replace the value stored under `(service, account)`
    fn set(&self, service: &str, account: &str, value: &str) -> Result<()>;

    /// Remove the entry stored under `(service, account)`
    fn delete(&self, service: &str, account: &str) -> Result<()>;
}

/// The OS keychain, through the `keyring` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringStore;

impl KeyringStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(service: &str, account: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(service, account).map_err(|e| map_keyring_error(service, e))
    }
}

fn map_keyring_error(service: &str, err: keyring::Error) -> StoreError {
    match err {
        keyring::Error::NoEntry => StoreError::NotFound(service.to_string()),
        other => StoreError::keychain(service, other),
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, service: &str, account: &str) -> Result<String> {
        debug!(service, account, "reading keychain entry");
        Self::entry(service, account)?
            .get_password()
            .map_err(|e| map_keyring_error(service, e))
    }

    fn set(&self, service: &str, account: &str, value: &str) -> Result<()> {
        debug!(service, account, "writing keychain entry");
        Self::entry(service, account)?
            .set_password(value)
            .map_err(|e| map_keyring_error(service, e))
    }

    fn delete(&self, service: &str, account: &str) -> Result<()> {
        debug!(service, account, "deleting keychain entry");
        Self::entry(service, account)?
            .delete_credential()
            .map_err(|e| map_keyring_error(service, e))
    }
}

/// In-memory credential store with failure injection
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<(String, String), String>>,
    /// Fail every call with this message
    error: Option<String>,
    /// Services whose writes and deletes fail
    read_only: RefCell<HashSet<String>>,
    calls: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store on which every operation fails with a keychain error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Make writes and deletes for `service` fail from now on
    pub fn fail_writes_for(&self, service: &str) {
        self.read_only.borrow_mut().insert(service.to_string());
    }

    /// Number of operations attempted against this store
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Whether an entry exists, without counting as a call
    pub fn contains(&self, service: &str, account: &str) -> bool {
        self.entries
            .borrow()
            .contains_key(&(service.to_string(), account.to_string()))
    }

    fn check(&self, service: &str, write: bool) -> Result<()> {
        self.calls.set(self.calls.get() + 1);

        if let Some(message) = &self.error {
            return Err(StoreError::keychain(service, message));
        }
        if write && self.read_only.borrow().contains(service) {
            return Err(StoreError::keychain(service, "write rejected"));
        }
        Ok(())
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, service: &str, account: &str) -> Result<String> {
        self.check(service, false)?;
        self.entries
            .borrow()
            .get(&(service.to_string(), account.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(service.to_string()))
    }

    fn set(&self, service: &str, account: &str, value: &str) -> Result<()> {
        self.check(service, true)?;
        self.entries
            .borrow_mut()
            .insert((service.to_string(), account.to_string()), value.to_string());
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> Result<()> {
        self.check(service, true)?;
        self.entries
            .borrow_mut()
            .remove(&(service.to_string(), account.to_string()))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(service.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let store = MemoryStore::new();
        store.set("svc", "alice", "s3cret").unwrap();
        assert_eq!(store.get("svc", "alice").unwrap(), "s3cret");

        store.set("svc", "alice", "updated").unwrap();
        assert_eq!(store.get("svc", "alice").unwrap(), "updated");

        store.delete("svc", "alice").unwrap();
        assert!(store.get("svc", "alice").unwrap_err().is_not_found());
    }

    #[test]
    fn test_memory_scoped_by_account() {
        let store = MemoryStore::new();
        store.set("svc", "alice", "a").unwrap();
        assert!(store.get("svc", "bob").unwrap_err().is_not_found());
        assert!(store.contains("svc", "alice"));
        assert!(!store.contains("svc", "bob"));
    }

    #[test]
    fn test_memory_delete_missing() {
        let store = MemoryStore::new();
        assert!(store.delete("svc", "alice").unwrap_err().is_not_found());
    }

    #[test]
    fn test_memory_failing() {
        let store = MemoryStore::failing("keyring error");
        let err = store.get("svc", "alice").unwrap_err();
        assert!(matches!(err, StoreError::Keychain { .. }));
        assert!(err.to_string().contains("keyring error"));
        assert!(store.set("svc", "alice", "v").is_err());
        assert!(store.delete("svc", "alice").is_err());
        assert_eq!(store.calls(), 3);
    }

    #[test]
    fn test_memory_fail_writes_for_one_service() {
        let store = MemoryStore::new();
        store.set("index", "alice", "{}").unwrap();
        store.fail_writes_for("index");

        assert_eq!(store.get("index", "alice").unwrap(), "{}");
        assert!(store.set("index", "alice", "{}").is_err());
        assert!(store.delete("index", "alice").is_err());
        assert!(store.set("other", "alice", "v").is_ok());
    }

    #[test]
    fn test_keyring_maps_no_entry() {
        assert!(map_keyring_error("svc", keyring::Error::NoEntry).is_not_found());
    }

    #[test]
    #[ignore] // Requires actual keychain access
    fn test_keyring_roundtrip() {
        let store = KeyringStore::new();
        let service = "keychain-cli-test";
        let account = "test-user";

        store.set(service, account, "test-secret").unwrap();
        assert_eq!(store.get(service, account).unwrap(), "test-secret");

        store.delete(service, account).unwrap();
        assert!(store.get(service, account).unwrap_err().is_not_found());
    }
}
