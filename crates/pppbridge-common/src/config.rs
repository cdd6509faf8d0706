//! Configuration model for the notification helper.
//!
//! The helper's command line is its payload, so configuration comes from
//! the environment: an optional JSON file named by `PPPBRIDGE_CONFIG`,
//! followed by per-field `PPPBRIDGE_*` overrides.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{BridgeError, Result};
use crate::types::EnvSnapshot;

/// Which environment variables are reported to the supervisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterPolicy {
    /// Only variables whose name starts with a known `pppd` prefix.
    #[default]
    AllowList,
    /// Every variable in the environment.
    PassThrough,
}

impl FromStr for FilterPolicy {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "allow-list" => Ok(Self::AllowList),
            "pass-through" => Ok(Self::PassThrough),
            other => Err(BridgeError::Config {
                message: format!("unknown filter policy {other:?}"),
            }),
        }
    }
}

impl fmt::Display for FilterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllowList => write!(f, "allow-list"),
            Self::PassThrough => write!(f, "pass-through"),
        }
    }
}

/// How irregular environment entries are treated while encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strictness {
    /// Malformed, over-length, and duplicate entries abort encoding.
    #[default]
    Strict,
    /// Malformed entries are skipped, long names truncated, duplicates dropped.
    Lenient,
}

impl FromStr for Strictness {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(BridgeError::Config {
                message: format!("unknown strictness {other:?}"),
            }),
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

/// Message construction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Environment filtering policy.
    pub filter: FilterPolicy,
    /// Handling of irregular entries.
    pub strictness: Strictness,
    /// Variables whose values are split on spaces into lists.
    pub list_vars: Vec<String>,
    /// Longest accepted variable name, in bytes.
    pub max_key_len: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            filter: FilterPolicy::default(),
            strictness: Strictness::default(),
            list_vars: Vec::new(),
            max_key_len: constants::DEFAULT_MAX_KEY_LEN,
        }
    }
}

impl EncoderConfig {
    /// Returns `true` if the value of `name` should be list-decoded.
    #[must_use]
    pub fn is_list_var(&self, name: &[u8]) -> bool {
        self.list_vars.iter().any(|v| v.as_bytes() == name)
    }
}

/// Root configuration for `ppp-notify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Supervisor datagram socket.
    pub socket_path: PathBuf,
    /// Message construction settings.
    pub encoder: EncoderConfig,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(constants::DEFAULT_SOCKET_PATH),
            encoder: EncoderConfig::default(),
        }
    }
}

impl NotifyConfig {
    /// Resolves the configuration from an environment snapshot.
    ///
    /// Starts from defaults, replaces them with the JSON file named by
    /// `PPPBRIDGE_CONFIG` when set, then applies `PPPBRIDGE_*` overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// any override or the final configuration is invalid.
    pub fn load(env: &EnvSnapshot) -> Result<Self> {
        let mut config = match lookup(env, constants::CONFIG_FILE_ENV)? {
            Some(path) if !path.is_empty() => Self::from_file(Path::new(path))?,
            _ => Self::default(),
        };
        config.apply_overrides(env)?;
        config.validate()?;
        tracing::debug!(
            socket = %config.socket_path.display(),
            filter = %config.encoder.filter,
            strictness = %config.encoder.strictness,
            "configuration resolved"
        );
        Ok(config)
    }

    /// Reads a configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| BridgeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Applies the per-field `PPPBRIDGE_*` overrides present in `env`.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is not UTF-8 or names an unknown policy.
    pub fn apply_overrides(&mut self, env: &EnvSnapshot) -> Result<()> {
        if let Some(path) = lookup(env, constants::SOCKET_ENV)? {
            self.socket_path = PathBuf::from(path);
        }
        if let Some(filter) = lookup(env, constants::FILTER_ENV)? {
            self.encoder.filter = filter.parse()?;
        }
        if let Some(strictness) = lookup(env, constants::STRICTNESS_ENV)? {
            self.encoder.strictness = strictness.parse()?;
        }
        if let Some(vars) = lookup(env, constants::LIST_VARS_ENV)? {
            self.encoder.list_vars = vars.split_whitespace().map(str::to_owned).collect();
        }
        Ok(())
    }

    /// Checks invariants that deserialization cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket path is empty or the key length limit
    /// is outside `1..=255`.
    pub fn validate(&self) -> Result<()> {
        if self.socket_path.as_os_str().is_empty() {
            return Err(BridgeError::Config {
                message: "socket path is empty".into(),
            });
        }
        if !(1..=constants::MAX_ATOM_CHARS).contains(&self.encoder.max_key_len) {
            return Err(BridgeError::Config {
                message: format!(
                    "max_key_len must be between 1 and {}, got {}",
                    constants::MAX_ATOM_CHARS,
                    self.encoder.max_key_len
                ),
            });
        }
        Ok(())
    }
}

fn lookup<'a>(env: &'a EnvSnapshot, name: &str) -> Result<Option<&'a str>> {
    env.get(name)
        .map(|raw| {
            std::str::from_utf8(raw).map_err(|_| BridgeError::Config {
                message: format!("{name} is not valid UTF-8"),
            })
        })
        .transpose()
}
