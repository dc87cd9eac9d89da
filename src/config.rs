use std::{path::Path, time::Duration};

use log::debug;
use phonenumber::country::Id;
use serde::Deserialize;

use crate::{batch::BatchConfig, errors::ConfigError, i18n::RegionCode};

pub const ENV_DEFAULT_REGION: &str = "PHONESCAN_DEFAULT_REGION";
pub const ENV_CHUNK_SIZE: &str = "PHONESCAN_CHUNK_SIZE";
pub const ENV_CHUNK_PAUSE_MS: &str = "PHONESCAN_CHUNK_PAUSE_MS";

/// Everything a [`crate::PhoneValidator`] is built from.
///
/// ```toml
/// default_region = "US"
/// chunk_size = 100
/// chunk_pause_ms = 10
/// event_capacity = 1
/// cache_capacity = 10000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Region assumed for numbers written without `+<country code>`.
    pub default_region: Option<String>,
    pub chunk_size: usize,
    pub chunk_pause_ms: u64,
    pub event_capacity: usize,
    /// Distinct inputs remembered by the classifier. Zero disables the cache.
    pub cache_capacity: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        let batch = BatchConfig::default();
        Self {
            default_region: None,
            chunk_size: batch.chunk_size,
            chunk_pause_ms: batch.chunk_pause.as_millis() as u64,
            event_capacity: batch.event_capacity,
            cache_capacity: 10_000,
        }
    }
}

impl ValidatorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Applies the `PHONESCAN_*` environment variables on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::with_env_overrides`] with an arbitrary lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(region) = lookup(ENV_DEFAULT_REGION) {
            self.default_region = Some(region);
        }
        if let Some(value) = lookup(ENV_CHUNK_SIZE) {
            self.chunk_size = parse_number("chunk_size", &value)?;
        }
        if let Some(value) = lookup(ENV_CHUNK_PAUSE_MS) {
            self.chunk_pause_ms = parse_number("chunk_pause_ms", &value)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "chunk_size",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "event_capacity",
                reason: "must be at least 1".to_owned(),
            });
        }
        self.region()?;
        Ok(())
    }

    /// The configured default region, `None` when unset, blank or `ZZ`.
    pub fn region(&self) -> Result<Option<Id>, ConfigError> {
        match self.default_region.as_deref() {
            Some(region) => RegionCode::resolve(region),
            None => Ok(None),
        }
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            chunk_size: self.chunk_size,
            chunk_pause: Duration::from_millis(self.chunk_pause_ms),
            event_capacity: self.event_capacity,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::InvalidValue {
        key,
        reason: format!("'{value}': {err}"),
    })
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use phonenumber::country::Id;

    use super::{ENV_CHUNK_SIZE, ENV_DEFAULT_REGION, ValidatorConfig};
    use crate::errors::ConfigError;

    #[test]
    fn defaults() {
        let config = ValidatorConfig::default();
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.chunk_pause_ms, 10);
        assert_eq!(config.event_capacity, 1);
        assert_eq!(config.region().unwrap(), None);
        assert_eq!(config.batch_config().chunk_pause, Duration::from_millis(10));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config =
            ValidatorConfig::from_toml("default_region = \"uk\"\nchunk_size = 25\n").unwrap();
        assert_eq!(config.chunk_size, 25);
        assert_eq!(config.cache_capacity, 10_000);
        assert_eq!(config.region().unwrap(), Some(Id::GB));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            ValidatorConfig::from_toml("chunk = 5"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_overrides_win() {
        let env = HashMap::from([
            (ENV_DEFAULT_REGION, "US".to_owned()),
            (ENV_CHUNK_SIZE, " 7 ".to_owned()),
        ]);
        let config = ValidatorConfig::default()
            .with_overrides_from(|key| env.get(key).cloned())
            .unwrap();
        assert_eq!(config.chunk_size, 7);
        assert_eq!(config.region().unwrap(), Some(Id::US));

        let bad = ValidatorConfig::default()
            .with_overrides_from(|key| (key == ENV_CHUNK_SIZE).then(|| "many".to_owned()));
        assert!(matches!(bad, Err(ConfigError::InvalidValue { key: "chunk_size", .. })));
    }

    #[test]
    fn validation() {
        let zero_chunk = ValidatorConfig { chunk_size: 0, ..Default::default() };
        assert!(zero_chunk.validate().is_err());

        let zero_capacity = ValidatorConfig { event_capacity: 0, ..Default::default() };
        assert!(zero_capacity.validate().is_err());

        let bad_region = ValidatorConfig {
            default_region: Some("Atlantis".to_owned()),
            ..Default::default()
        };
        assert!(matches!(bad_region.validate(), Err(ConfigError::UnknownRegion(_))));

        assert!(ValidatorConfig::default().validate().is_ok());
    }
}
