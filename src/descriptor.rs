//! Terminal launch descriptors.
//!
//! A descriptor's fields fall into two fixed groups. Cosmetic fields only
//! shape the UI and are honored from any source. Sensitive fields reach the
//! spawned process and are honored only when the URI is trusted. The split
//! is structural: `InstantiatedDescriptor` holds one `CosmeticFields` and one
//! `SensitiveFields`, so the decoder can only replace the sensitive group as
//! a whole.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Environment overrides for the spawned shell. Ordering carries no meaning;
/// the map is ordered only so encoding is deterministic.
pub type EnvironmentVariables = BTreeMap<String, String>;

/// Where a new terminal opens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalLocation {
    /// Bottom panel
    #[default]
    Panel,
    /// Editor area, alongside open files
    Editor,
}

impl TerminalLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Panel => "panel",
            Self::Editor => "editor",
        }
    }

    /// Parse a `defaultLocation` query value. Accepts the text form in any
    /// case and the legacy numeric form (`1` panel, `2` editor).
    pub fn from_query_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "panel" | "1" => Some(Self::Panel),
            "editor" | "2" => Some(Self::Editor),
            _ => None,
        }
    }
}

/// Partial descriptor as supplied by callers. Every field is optional; the
/// encoder fills in defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TerminalDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Opaque identifier; a fresh UUID is substituted when absent or empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remain_on_clean_exit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_location: Option<TerminalLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Launch command. Opaque to the codec: only JSON round-tripped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<EnvironmentVariables>,
    /// Shell commands to replay when the terminal exits cleanly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserved_commands: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_input: Option<String>,
}

/// Fields that only affect presentation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosmeticFields {
    pub title: String,
    pub key: String,
    pub remain_on_clean_exit: bool,
    pub default_location: TerminalLocation,
    pub icon: String,
}

impl Default for CosmeticFields {
    /// Empty presentation with a freshly generated key.
    fn default() -> Self {
        Self {
            title: String::new(),
            key: new_key(),
            remain_on_clean_exit: false,
            default_location: TerminalLocation::default(),
            icon: String::new(),
        }
    }
}

/// Fields that influence what process gets spawned and how.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitiveFields {
    pub cwd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<serde_json::Value>,
    pub environment_variables: EnvironmentVariables,
    pub preserved_commands: Vec<String>,
    pub initial_input: String,
}

impl SensitiveFields {
    /// Compiled-in safe values, substituted as a group for untrusted input.
    pub const DEFAULT: Self = Self {
        cwd: String::new(),
        command: None,
        environment_variables: BTreeMap::new(),
        preserved_commands: Vec::new(),
        initial_input: String::new(),
    };

    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }
}

impl Default for SensitiveFields {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Fully defaulted descriptor handed to the process-spawning layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstantiatedDescriptor {
    #[serde(flatten)]
    pub cosmetic: CosmeticFields,
    #[serde(flatten)]
    pub sensitive: SensitiveFields,
}

impl InstantiatedDescriptor {
    /// All defaults, with a freshly generated key.
    pub fn defaults() -> Self {
        Self::default()
    }
}

impl From<&InstantiatedDescriptor> for TerminalDescriptor {
    fn from(d: &InstantiatedDescriptor) -> Self {
        Self {
            title: Some(d.cosmetic.title.clone()),
            key: Some(d.cosmetic.key.clone()),
            remain_on_clean_exit: Some(d.cosmetic.remain_on_clean_exit),
            default_location: Some(d.cosmetic.default_location),
            icon: Some(d.cosmetic.icon.clone()),
            command: d.sensitive.command.clone(),
            cwd: Some(d.sensitive.cwd.clone()),
            environment_variables: (!d.sensitive.environment_variables.is_empty())
                .then(|| d.sensitive.environment_variables.clone()),
            preserved_commands: Some(d.sensitive.preserved_commands.clone()),
            initial_input: Some(d.sensitive.initial_input.clone()),
        }
    }
}

impl From<InstantiatedDescriptor> for TerminalDescriptor {
    fn from(d: InstantiatedDescriptor) -> Self {
        Self::from(&d)
    }
}

/// Fresh globally unique terminal key.
pub(crate) fn new_key() -> String {
    Uuid::new_v4().to_string()
}
