use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_VERSION: u64 = 1;

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("tandem")
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, CosmicConfigEntry)]
pub struct TandemConfig {
    /// Directory holding the local (unlinked) collections.
    pub data_dir: PathBuf,
    /// Base URL of the list service account, empty when never linked.
    pub server_url: String,
    pub server_username: String,
    /// Base URL used to build shareable deep links; the list id goes in the fragment.
    pub share_base_url: String,
    /// Seconds between background refreshes of the visible screen.
    pub poll_interval_secs: u64,
    pub debug_logging: bool,
}

impl Default for TandemConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            server_url: String::new(),
            server_username: String::new(),
            share_base_url: "https://lists.example.com".to_string(),
            poll_interval_secs: 30,
            debug_logging: false,
        }
    }
}

impl TandemConfig {
    pub fn lists_dir(&self) -> PathBuf {
        self.data_dir.join("lists")
    }

    /// Ensure the data directory tree exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.lists_dir())
    }

    /// Whether an account was configured at some point. Actual linking also
    /// requires credentials in the keyring.
    pub fn account_configured(&self) -> bool {
        !self.server_url.trim().is_empty()
    }

    /// Deep-link URL for a collection, e.g. `https://lists.example.com/#b71f...`.
    pub fn share_url(&self, id: &str) -> String {
        format!("{}/#{}", self.share_base_url.trim_end_matches('/'), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_url_puts_id_in_fragment() {
        let config = TandemConfig {
            share_base_url: "https://lists.example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.share_url("abc123"),
            "https://lists.example.com/#abc123"
        );
    }
}
