//! keychain-cli - Named secrets in the OS keychain
//!
//! Secrets live in the platform credential store (macOS Keychain, Windows
//! Credential Manager, Secret Service on Linux), one entry per key, scoped to
//! the current user. Keychains cannot list their entries, so the set of key
//! names is kept in one extra entry, the key index.
//!
//! Commands:
//! - set <KEY> <SECRET>: Create or update a secret
//! - get <KEY>: Print a secret
//! - delete <KEY>: Delete a secret
//! - list: List all known keys

pub mod backend;
pub mod completion;
pub mod error;
pub mod index;
pub mod store;

pub use backend::{CredentialStore, KeyringStore, MemoryStore};
pub use error::{Result, StoreError};
pub use index::KeyIndex;
pub use store::SecretStore;
