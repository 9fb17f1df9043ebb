use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{MapperError, Result};

/// Which of the two mapping variants to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// All canonical fields, subgenre defaults to "Progressive"
    #[default]
    Full,
    /// No description/artists/time/image, subgenre defaults to "Prog"
    Compact,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Full => constants::FULL_PROFILE,
            Profile::Compact => constants::COMPACT_PROFILE,
        }
    }

    pub fn default_subgenre(&self) -> &'static str {
        match self {
            Profile::Full => constants::DEFAULT_SUBGENRE_FULL,
            Profile::Compact => constants::DEFAULT_SUBGENRE_COMPACT,
        }
    }

    /// Whether description, artists, display time and image are mapped.
    pub fn maps_extended_fields(&self) -> bool {
        matches!(self, Profile::Full)
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overrides for the values injected when a record carries none.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub subgenre: Option<String>,
    pub source: Option<String>,
    pub ingestion_kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub profile: Profile,
    /// Read ambiguous numeric dates like 05/09/2024 as day/month.
    pub day_first: bool,
    /// Year assumed for dates written without one. Current year when unset.
    pub reference_year: Option<i32>,
    pub log_dir: Option<PathBuf>,
    pub defaults: DefaultsConfig,
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            MapperError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let overrides = [
            ("defaults.subgenre", &self.defaults.subgenre),
            ("defaults.source", &self.defaults.source),
            ("defaults.ingestion_kind", &self.defaults.ingestion_kind),
        ];
        for (key, value) in overrides {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(MapperError::Config(format!("{} must not be blank", key)));
            }
        }

        if let Some(year) = self.reference_year {
            if !(1..=9999).contains(&year) {
                return Err(MapperError::Config(format!(
                    "reference_year {} is out of range",
                    year
                )));
            }
        }

        Ok(())
    }

    pub fn subgenre_default(&self) -> String {
        self.defaults
            .subgenre
            .clone()
            .unwrap_or_else(|| self.profile.default_subgenre().to_string())
    }

    pub fn source_default(&self) -> String {
        self.defaults
            .source
            .clone()
            .unwrap_or_else(|| constants::DEFAULT_SOURCE.to_string())
    }

    pub fn ingestion_kind_default(&self) -> String {
        self.defaults
            .ingestion_kind
            .clone()
            .unwrap_or_else(|| constants::DEFAULT_INGESTION_KIND.to_string())
    }
}
