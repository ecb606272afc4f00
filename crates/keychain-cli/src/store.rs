//! Secret store - keychain secrets kept in step with the key index
//!
//! Mutations hit the keychain first and the index second. The keychain is
//! the source of truth for whether a secret exists; the index only makes
//! listing possible. If the second step fails the index has drifted, and the
//! index error is returned as-is rather than repaired.

use tracing::warn;

use crate::backend::CredentialStore;
use crate::error::{Result, StoreError};
use crate::index::KeyIndex;

/// Named secrets for one account
pub struct SecretStore<'a> {
    backend: &'a dyn CredentialStore,
    account: String,
    index: KeyIndex<'a>,
}

impl<'a> SecretStore<'a> {
    /// Open the store, initialising the key index if it does not exist yet
    pub fn open(
        backend: &'a dyn CredentialStore,
        account: &str,
        index_service: &str,
    ) -> Result<Self> {
        let index = KeyIndex::open(backend, index_service, account)?;
        Ok(Self {
            backend,
            account: account.to_string(),
            index,
        })
    }

    /// Store `value` under `key` and record the name in the index
    pub fn set_secret(&mut self, key: &str, value: &str) -> Result<()> {
        self.validate_key(key)?;
        if value.is_empty() {
            return Err(StoreError::MissingSecret);
        }

        self.backend.set(key, &self.account, value)?;

        self.index.add(key).inspect_err(|e| {
            warn!(key, error = %e, "secret stored but key index not updated");
        })
    }

    /// Read the secret stored under `key`, without consulting the index
    pub fn get_secret(&self, key: &str) -> Result<String> {
        self.validate_key(key)?;
        self.backend.get(key, &self.account)
    }

    /// Delete the secret stored under `key` and drop the name from the index
    pub fn delete_secret(&mut self, key: &str) -> Result<()> {
        self.validate_key(key)?;

        self.backend.delete(key, &self.account)?;

        self.index.remove(key).inspect_err(|e| {
            warn!(key, error = %e, "secret deleted but key index not updated");
        })
    }

    /// All names in the index; their secrets are not checked for existence
    pub fn list_keys(&mut self) -> Result<Vec<String>> {
        self.index.list_names()
    }

    fn validate_key(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(StoreError::MissingKey);
        }
        if key == self.index.service() {
            return Err(StoreError::ReservedKey(key.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;

    const INDEX: &str = "keychain-cli-keys";
    const USER: &str = "tester";

    fn open(backend: &MemoryStore) -> SecretStore<'_> {
        SecretStore::open(backend, USER, INDEX).unwrap()
    }

    #[test]
    fn test_set_get_list() {
        let backend = MemoryStore::new();
        let mut store = open(&backend);

        store.set_secret("api-token", "abc123").unwrap();

        assert_eq!(store.get_secret("api-token").unwrap(), "abc123");
        assert_eq!(store.list_keys().unwrap(), vec!["api-token".to_string()]);
        assert_eq!(backend.get(INDEX, USER).unwrap(), r#"{"api-token":true}"#);
    }

    #[test]
    fn test_delete_then_get_not_found() {
        let backend = MemoryStore::new();
        let mut store = open(&backend);
        store.set_secret("api-token", "abc123").unwrap();

        store.delete_secret("api-token").unwrap();

        assert!(store.list_keys().unwrap().is_empty());
        assert!(store.get_secret("api-token").unwrap_err().is_not_found());
        assert_eq!(backend.get(INDEX, USER).unwrap(), "{}");
    }

    #[test]
    fn test_set_overwrites() {
        let backend = MemoryStore::new();
        let mut store = open(&backend);
        store.set_secret("k", "first").unwrap();
        store.set_secret("k", "second").unwrap();

        assert_eq!(store.get_secret("k").unwrap(), "second");
        assert_eq!(store.list_keys().unwrap(), vec!["k".to_string()]);
    }

    #[test]
    fn test_get_ignores_index() {
        let backend = MemoryStore::new();
        backend.set("unindexed", USER, "value").unwrap();
        let mut store = open(&backend);

        assert_eq!(store.get_secret("unindexed").unwrap(), "value");
        assert!(store.list_keys().unwrap().is_empty());
    }

    #[test]
    fn test_validation_before_keychain() {
        let backend = MemoryStore::new();
        let mut store = open(&backend);
        let before = backend.calls();

        assert!(matches!(store.set_secret("", "x"), Err(StoreError::MissingKey)));
        assert!(matches!(store.set_secret("k", ""), Err(StoreError::MissingSecret)));
        assert!(matches!(store.get_secret(""), Err(StoreError::MissingKey)));
        assert!(matches!(store.delete_secret(""), Err(StoreError::MissingKey)));
        assert!(matches!(
            store.set_secret(INDEX, "x"),
            Err(StoreError::ReservedKey(_))
        ));

        assert_eq!(backend.calls(), before);
    }

    #[test]
    fn test_set_keychain_failure_leaves_index() {
        let backend = MemoryStore::new();
        let mut store = open(&backend);
        backend.fail_writes_for("k");

        let err = store.set_secret("k", "v").unwrap_err();
        assert!(matches!(err, StoreError::Keychain { ref service, .. } if service == "k"));
        assert!(store.list_keys().unwrap().is_empty());
    }

    #[test]
    fn test_set_index_failure_is_surfaced() {
        let backend = MemoryStore::new();
        let mut store = open(&backend);
        backend.fail_writes_for(INDEX);

        let err = store.set_secret("k", "v").unwrap_err();
        assert!(matches!(err, StoreError::Keychain { ref service, .. } if service == INDEX));

        // Drift: stored but not listed
        assert_eq!(store.get_secret("k").unwrap(), "v");
        assert!(store.list_keys().unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_leaves_index() {
        let backend = MemoryStore::new();
        backend.set(INDEX, USER, r#"{"ghost":true}"#).unwrap();
        let mut store = open(&backend);

        assert!(store.delete_secret("ghost").unwrap_err().is_not_found());
        assert_eq!(store.list_keys().unwrap(), vec!["ghost".to_string()]);
    }

    #[test]
    fn test_delete_index_failure_is_surfaced() {
        let backend = MemoryStore::new();
        let mut store = open(&backend);
        store.set_secret("k", "v").unwrap();
        backend.fail_writes_for(INDEX);

        let err = store.delete_secret("k").unwrap_err();
        assert!(matches!(err, StoreError::Keychain { ref service, .. } if service == INDEX));

        // Drift: gone but still listed
        assert!(store.get_secret("k").unwrap_err().is_not_found());
        assert_eq!(store.list_keys().unwrap(), vec!["k".to_string()]);
    }

    #[test]
    fn test_open_keyring_fail() {
        let backend = MemoryStore::failing("keyring error");
        let err = SecretStore::open(&backend, USER, INDEX).err().unwrap();
        assert!(matches!(err, StoreError::Keychain { .. }));
    }

    #[test]
    fn test_accounts_are_isolated() {
        let backend = MemoryStore::new();
        let mut alice = SecretStore::open(&backend, "alice", INDEX).unwrap();
        alice.set_secret("k", "a").unwrap();

        let mut bob = SecretStore::open(&backend, "bob", INDEX).unwrap();
        assert!(bob.list_keys().unwrap().is_empty());
        assert!(bob.get_secret("k").unwrap_err().is_not_found());
    }
}
