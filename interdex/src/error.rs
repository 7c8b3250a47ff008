//! Error taxonomy.
//!
//! Every fatal condition is raised before the first class is moved, so
//! an `Err` out of the pass always means "stores untouched". Everything
//! non-fatal (unresolvable names, over-budget dexes, cleanup failures)
//! is logged instead.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration problems, detected at configure time or while reading
/// the mixed-mode class list.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can_touch_coldstart_extended_cls needs to be true when coldstart classes can be touched")]
    ColdstartPermission,

    #[error("linear_alloc_limit must be positive")]
    ZeroLimit,

    #[error("class `{0}` appears more than once in the mixed mode class list")]
    DuplicateMixedModeClass(String),

    #[error("dex status `{0}` not found, accepted statuses are first_coldstart_dex, first_extended_dex and scroll_dex")]
    UnknownDexStatus(String),

    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed config '{origin}': {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Problems with the classes handed to the pass.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("class `{name}` is defined more than once (seen again in store `{store}`)")]
    DuplicateClass { name: String, store: String },

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
#[error("{message}")]
/// Returned by a [`PackingPlugin`](crate::plugin::PackingPlugin) that
/// could not set itself up or tear itself down.
pub struct PluginError {
    pub message: String,
}

impl PluginError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Everything that can abort a pass invocation.
#[derive(Debug, Error)]
pub enum InterDexError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("plugin `{plugin}` failed to configure: {source}")]
    PluginConfigure {
        plugin: String,
        #[source]
        source: PluginError,
    },
}
