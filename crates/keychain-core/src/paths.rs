//! Standard paths used by keychain-cli

use std::path::PathBuf;

/// Directory name shared by every keychain-cli path
const APP_DIR: &str = "keychain-cli";

/// Standard keychain-cli paths
pub struct Paths {
    /// Config directory (~/.config/keychain-cli)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join(APP_DIR);

        Self { config }
    }

    /// Get the path of the configuration file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }
}
