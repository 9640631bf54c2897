//! Configuration for the collaborators around the core protocol.
//!
//! The protocol itself has nothing to configure. The thread context, the
//! blocking driver and the trace walker do:
//!
//! - [`ThreadConfig`]: worker thread naming and stack size
//! - [`WaitConfig`]: `sync_wait` timeout and stop token
//! - [`TraceConfig`]: continuation walk depth bound
//!
//! # Configuration Precedence
//!
//! Settings are resolved in this order (highest priority first):
//!
//! 1. **Programmatic**: values set via `with_*` methods
//! 2. **Environment variables**: values from `ASEND_*` env vars
//! 3. **Config file**: values loaded from a TOML file (requires `config-file` feature)
//! 4. **Defaults**: built-in defaults from [`CoreConfig::default()`]
//!
//! # Supported Environment Variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `ASEND_THREAD_NAME_PREFIX` | `String` | `thread.name_prefix` |
//! | `ASEND_THREAD_STACK_SIZE` | `usize` | `thread.stack_size` |
//! | `ASEND_WAIT_TIMEOUT_MS` | `u64` | `wait.timeout` |
//! | `ASEND_TRACE_MAX_DEPTH` | `usize` | `trace.max_depth` |

use std::time::Duration;

use crate::stop::StopToken;

/// Environment variable name for the worker thread name prefix.
pub const ENV_THREAD_NAME_PREFIX: &str = "ASEND_THREAD_NAME_PREFIX";
/// Environment variable name for the worker thread stack size.
pub const ENV_THREAD_STACK_SIZE: &str = "ASEND_THREAD_STACK_SIZE";
/// Environment variable name for the `sync_wait` timeout in milliseconds.
pub const ENV_WAIT_TIMEOUT_MS: &str = "ASEND_WAIT_TIMEOUT_MS";
/// Environment variable name for the continuation walk depth bound.
pub const ENV_TRACE_MAX_DEPTH: &str = "ASEND_TRACE_MAX_DEPTH";

/// Default worker thread name prefix.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "asend-worker";
/// Default continuation walk depth bound.
pub const DEFAULT_TRACE_MAX_DEPTH: usize = 64;

/// Error produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to a value that does not parse.
    #[error("invalid value for {var}: expected {expected}, got {value:?}")]
    InvalidValue {
        /// The variable or key.
        var: String,
        /// What was expected.
        expected: &'static str,
        /// The raw value.
        value: String,
    },
    /// The config file could not be read.
    #[cfg(feature = "config-file")]
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// The file path.
        path: String,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid TOML for this schema.
    #[cfg(feature = "config-file")]
    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Worker thread settings for [`on_new_thread`](crate::on_new_thread).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadConfig {
    /// Thread names are this prefix followed by `-` and a counter.
    pub name_prefix: String,
    /// Stack size in bytes; `None` uses the platform default.
    pub stack_size: Option<usize>,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            stack_size: None,
        }
    }
}

impl ThreadConfig {
    /// Sets the thread name prefix.
    #[must_use]
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Sets the stack size in bytes.
    #[must_use]
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }
}

/// Settings for [`sync_wait_with`](crate::sync_wait_with).
#[derive(Debug, Clone, Default)]
pub struct WaitConfig {
    /// Give up after this long; `None` waits forever.
    pub timeout: Option<Duration>,
    /// Token the waiting receiver reports to the operation.
    pub stop_token: StopToken,
}

impl WaitConfig {
    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the stop token.
    #[must_use]
    pub fn with_stop_token(mut self, token: StopToken) -> Self {
        self.stop_token = token;
        self
    }
}

/// Settings for [`async_trace_with`](crate::async_trace_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceConfig {
    /// Deepest listed depth; nodes below it are cut off.
    pub max_depth: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_TRACE_MAX_DEPTH,
        }
    }
}

impl TraceConfig {
    /// Sets the depth bound.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// All collaborator settings.
#[derive(Debug, Clone, Default)]
pub struct CoreConfig {
    /// Thread context settings.
    pub thread: ThreadConfig,
    /// Blocking driver settings.
    pub wait: WaitConfig,
    /// Trace walk settings.
    pub trace: TraceConfig,
}

impl CoreConfig {
    /// Defaults overridden by any `ASEND_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Defaults, then the TOML file at `path`, then the environment.
    #[cfg(feature = "config-file")]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        apply_toml_config(&mut config, &parse_toml_file(path)?);
        apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Replaces the thread settings.
    #[must_use]
    pub fn with_thread(mut self, thread: ThreadConfig) -> Self {
        self.thread = thread;
        self
    }

    /// Replaces the wait settings.
    #[must_use]
    pub fn with_wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// Replaces the trace settings.
    #[must_use]
    pub fn with_trace(mut self, trace: TraceConfig) -> Self {
        self.trace = trace;
        self
    }
}

/// Apply environment variable overrides to a [`CoreConfig`].
///
/// Only variables that are set in the environment are applied.
/// Returns an error if a variable is set but contains an unparseable value.
pub fn apply_env_overrides(config: &mut CoreConfig) -> Result<(), ConfigError> {
    if let Some(val) = read_env(ENV_THREAD_NAME_PREFIX) {
        config.thread.name_prefix = val;
    }
    if let Some(val) = read_env(ENV_THREAD_STACK_SIZE) {
        config.thread.stack_size = Some(parse_usize(ENV_THREAD_STACK_SIZE, &val)?);
    }
    if let Some(val) = read_env(ENV_WAIT_TIMEOUT_MS) {
        config.wait.timeout = Some(Duration::from_millis(parse_u64(ENV_WAIT_TIMEOUT_MS, &val)?));
    }
    if let Some(val) = read_env(ENV_TRACE_MAX_DEPTH) {
        config.trace.max_depth = parse_usize(ENV_TRACE_MAX_DEPTH, &val)?;
    }
    Ok(())
}

/// Read an environment variable, returning `None` if unset.
fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_usize(var_name: &str, val: &str) -> Result<usize, ConfigError> {
    val.trim()
        .parse::<usize>()
        .map_err(|_| invalid(var_name, "unsigned integer", val))
}

fn parse_u64(var_name: &str, val: &str) -> Result<u64, ConfigError> {
    val.trim()
        .parse::<u64>()
        .map_err(|_| invalid(var_name, "milliseconds as u64", val))
}

fn invalid(var_name: &str, expected: &'static str, val: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var: var_name.to_string(),
        expected,
        value: val.to_string(),
    }
}

// =========================================================================
// TOML config file support (feature-gated)
// =========================================================================

/// TOML-deserializable configuration.
///
/// ```toml
/// [thread]
/// name_prefix = "myapp-worker"
/// stack_size = 2097152
///
/// [wait]
/// timeout_ms = 5000
///
/// [trace]
/// max_depth = 32
/// ```
#[cfg(feature = "config-file")]
#[derive(serde::Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct CoreTomlConfig {
    /// Thread settings.
    #[serde(default)]
    pub thread: ThreadToml,
    /// Wait settings.
    #[serde(default)]
    pub wait: WaitToml,
    /// Trace settings.
    #[serde(default)]
    pub trace: TraceToml,
}

/// Thread section of the TOML config.
#[cfg(feature = "config-file")]
#[derive(serde::Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct ThreadToml {
    /// Name prefix for worker threads.
    pub name_prefix: Option<String>,
    /// Stack size per worker thread in bytes.
    pub stack_size: Option<usize>,
}

/// Wait section of the TOML config.
#[cfg(feature = "config-file")]
#[derive(serde::Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct WaitToml {
    /// `sync_wait` timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// Trace section of the TOML config.
#[cfg(feature = "config-file")]
#[derive(serde::Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct TraceToml {
    /// Continuation walk depth bound.
    pub max_depth: Option<usize>,
}

/// Apply a parsed TOML config to a [`CoreConfig`].
///
/// Only fields that are `Some` in the TOML struct override the config.
#[cfg(feature = "config-file")]
pub fn apply_toml_config(config: &mut CoreConfig, toml: &CoreTomlConfig) {
    if let Some(ref v) = toml.thread.name_prefix {
        config.thread.name_prefix.clone_from(v);
    }
    if let Some(v) = toml.thread.stack_size {
        config.thread.stack_size = Some(v);
    }
    if let Some(v) = toml.wait.timeout_ms {
        config.wait.timeout = Some(Duration::from_millis(v));
    }
    if let Some(v) = toml.trace.max_depth {
        config.trace.max_depth = v;
    }
}

/// Parse a TOML string into a [`CoreTomlConfig`].
#[cfg(feature = "config-file")]
pub fn parse_toml_str(toml_str: &str) -> Result<CoreTomlConfig, ConfigError> {
    Ok(toml::from_str(toml_str)?)
}

/// Read and parse a TOML file into a [`CoreTomlConfig`].
#[cfg(feature = "config-file")]
pub fn parse_toml_file(path: &std::path::Path) -> Result<CoreTomlConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_toml_str(&content)
}
