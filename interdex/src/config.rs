//! Pass configuration, as found under the pass's key of a build's JSON
//! config. Every key is optional.

use serde::{Deserialize, Serialize};
use crate::helpe::*;

pub const DEFAULT_LINEAR_ALLOC_LIMIT: Cost = 11600 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassConfig {
    /// Drop classes the retained class graph no longer references.
    pub static_prune:                       bool,
    /// Append a canary class to every closed dex.
    pub emit_canaries:                      bool,
    /// When false, the primary dex is emitted as-is: no capacity check,
    /// no mixed-mode classes.
    pub normal_primary_dex:                 bool,
    /// Per-dex linear-allocation budget.
    pub linear_alloc_limit:                 Cost,
    /// Explicit mixed-mode class list. Empty means "use per-class flags".
    pub scroll_classes_file:                String,
    pub can_touch_coldstart_cls:            bool,
    pub can_touch_coldstart_extended_cls:   bool,
    /// Pre-defined mixed-mode dexes; takes priority over the class list.
    pub mixed_mode_dexes:                   Vec<String>,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            static_prune:                       false,
            emit_canaries:                      true,
            normal_primary_dex:                 false,
            linear_alloc_limit:                 DEFAULT_LINEAR_ALLOC_LIMIT,
            scroll_classes_file:                String::new(),
            can_touch_coldstart_cls:            false,
            can_touch_coldstart_extended_cls:   false,
            mixed_mode_dexes:                   vec![],
        }
    }
}

impl PassConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            origin: String::from("<inline>"),
            source,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            origin: path.display().to_string(),
            source,
        })
    }

    /// Checks the options that cannot be checked one at a time, and
    /// parses the pre-defined mixed-mode dex statuses.
    pub fn validate(&self) -> Result<HashSet<DexStatus>, ConfigError> {
        if self.can_touch_coldstart_cls && !self.can_touch_coldstart_extended_cls {
            return Err(ConfigError::ColdstartPermission);
        }
        if self.linear_alloc_limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }

        self.mixed_mode_dexes
            .iter()
            .map(|s| s.parse::<DexStatus>())
            .collect()
    }

    /// The explicit mixed-mode class list, if one is configured.
    pub fn scroll_classes_path(&self) -> Option<&Path> {
        if self.scroll_classes_file.is_empty() {
            None
        } else {
            Some(Path::new(&self.scroll_classes_file))
        }
    }
}
