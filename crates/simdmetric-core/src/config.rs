//! Dispatch configuration.
//!
//! Layered with `figment`: built-in defaults, then an optional TOML file,
//! then `SIMDMETRIC_*` environment variables.
//!
//! ```toml
//! # simdmetric.toml
//! allowed = ["haswell", "neon", "serial"]
//! disabled = ["skylake"]
//! ```
//!
//! Tier lists may also be given as comma-separated strings, which is how they
//! arrive from the environment: `SIMDMETRIC_DISABLED=skylake,ice`.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};

use crate::capability::{Capability, Tier};
use crate::error::{Error, Result};

/// Default configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "simdmetric.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "SIMDMETRIC_";

/// Which tiers the process-wide dispatch table may use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Tiers the resolver may pick from.
    #[serde(deserialize_with = "tier_list")]
    pub allowed: Vec<Tier>,
    /// Tiers removed from `allowed`.
    #[serde(deserialize_with = "tier_list")]
    pub disabled: Vec<Tier>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            allowed: Tier::ALL.to_vec(),
            disabled: Vec::new(),
        }
    }
}

impl DispatchConfig {
    /// Loads defaults, `simdmetric.toml` if present, then the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a source cannot be parsed or the result
    /// fails [`DispatchConfig::validate`].
    pub fn load() -> Result<Self> {
        Self::extract(Self::figment().merge(Toml::file(CONFIG_FILE)))
    }

    /// Loads defaults, the given TOML file, then the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file is missing or invalid, or the
    /// result fails [`DispatchConfig::validate`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Self::extract(Self::figment().merge(Toml::file(path)))
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Resolver mask: `allowed` minus `disabled`.
    #[must_use]
    pub fn allowed_mask(&self) -> Capability {
        let allowed: Capability = self.allowed.iter().copied().collect();
        let disabled: Capability = self.disabled.iter().copied().collect();
        allowed.difference(disabled)
    }

    /// Checks that the mask keeps the serial tier.
    ///
    /// Without it some supported combinations could resolve to nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `serial` is not allowed.
    pub fn validate(&self) -> Result<()> {
        if self.allowed_mask().contains(Tier::Serial) {
            Ok(())
        } else {
            Err(Error::Config(
                "the serial tier must remain allowed".to_string(),
            ))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TierList {
    List(Vec<String>),
    Csv(String),
}

fn tier_list<'de, D>(deserializer: D) -> std::result::Result<Vec<Tier>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = match TierList::deserialize(deserializer)? {
        TierList::List(names) => names,
        TierList::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    };
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| name.parse::<Tier>().map_err(serde::de::Error::custom))
        .collect()
}
