use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::presets;
use crate::trust::TrustSet;

/// The raw on-disk settings: exactly the options the directive surface
/// recognizes. Anything else is a configuration error.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// CIDR literals and/or preset names appended to the trust list.
    #[serde(default)]
    pub from: Vec<String>,
    /// Name of the header carrying the forwarded-address chain.
    #[serde(default = "default_header")]
    pub header: String,
    /// Upper bound on chain length. -1 disables the limit; 0 rejects any
    /// request carrying the header at all.
    #[serde(default = "default_maxhops")]
    pub maxhops: i32,
    /// Abort on trust failures instead of passing the request through
    /// unmodified.
    #[serde(default)]
    pub strict: bool,
}

fn default_header() -> String {
    "X-Forwarded-For".to_string()
}

fn default_maxhops() -> i32 {
    5
}

/// The validated runtime configuration. Built once, never mutated; a reload
/// publishes a whole new value so in-flight requests keep a consistent view.
#[derive(Debug, Clone)]
pub struct Config {
    pub header: String,
    pub max_hops: i32,
    pub strict: bool,
    pub trust: TrustSet,
}

impl Settings {
    /// Expands presets and validates every trust entry, failing fast on the
    /// first malformed one.
    pub fn build(self) -> Result<Config> {
        let entries =
            presets::expand(&self.from).context("Failed to expand trust list presets")?;
        let trust =
            TrustSet::from_entries(&entries).context("Failed to build trust list from 'from'")?;
        Ok(Config {
            header: self.header,
            max_hops: self.maxhops,
            strict: self.strict,
            trust,
        })
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let settings: Settings =
        toml::from_str(&content).context("Failed to parse config as valid TOML")?;
    settings.build()
}
