use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CodecError;

/// Default URI scheme for terminal descriptor URIs.
pub const DEFAULT_SCHEME: &str = "tuic-terminal";

/// Default URI host for terminal descriptor URIs.
pub const DEFAULT_HOST: &str = "launch";

const CONFIG_FILENAME: &str = "codec.json";

/// How the decoder treats structured sensitive fields in an untrusted URI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UntrustedJsonPolicy {
    /// Decide trust first; never parse sensitive JSON that will be discarded.
    #[default]
    Skip,
    /// Parse every structured field before the trust decision, so malformed
    /// JSON is an error even in a URI whose sensitive fields get dropped.
    Validate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Reserved scheme identifying the terminal URI family
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Reserved host under the scheme
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub untrusted_json: UntrustedJsonPolicy,
    /// Substitute a fresh key when a non-empty query carries none
    #[serde(default = "default_true")]
    pub generate_missing_key: bool,
}

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            untrusted_json: UntrustedJsonPolicy::default(),
            generate_missing_key: true,
        }
    }
}

impl CodecConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Platform config location: `<config dir>/terminal-uri/codec.json`.
///
/// Falls back to `./terminal-uri/codec.json` if no platform dir is known.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("terminal-uri")
        .join(CONFIG_FILENAME)
}

/// Load a codec config, returning Default if the file is missing or corrupt.
/// Corruption is logged so a bad file is visible instead of silently ignored.
pub fn load_json_config(path: &Path) -> CodecConfig {
    match try_load_json_config(path) {
        Ok(Some(config)) => config,
        Ok(None) => CodecConfig::default(),
        Err(e) => {
            tracing::warn!("{e}. Using defaults.");
            CodecConfig::default()
        }
    }
}

/// Strict variant: `Ok(None)` when missing, an error when unreadable or
/// unparseable.
pub fn try_load_json_config(path: &Path) -> Result<Option<CodecConfig>, CodecError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|e| CodecError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    CodecConfig::from_json_str(&content)
        .map(Some)
        .map_err(|e| CodecError::Config {
            path: path.to_path_buf(),
            message: format!("corrupt config: {e}"),
        })
}
