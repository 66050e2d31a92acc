//! Rule Configuration
//!
//! Giveaway thresholds are stored by the host as raw store-scoped values. [`RuleConfig`]
//! parses them once per evaluation into typed limits.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

/// Store page listing the giveaway products.
pub const GIVEAWAYS_PAGE: &str = "giveaway";

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The giveaway rules are switched off for this store.
    #[error("giveaway rules are not enabled")]
    Disabled,

    /// A value required by the enabled rules is missing.
    #[error("missing configuration value: {0}")]
    MissingValue(ConfigKey),

    /// A value could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Key that holds the value
        key: ConfigKey,
        /// Raw stored value
        value: String,
    },
}

/// Keys read from the store configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// Whether the rules are active
    Enabled,
    /// Attribute code marking a product as a giveaway
    GiveawayAttribute,
    /// Maximum giveaway quantity per cart
    MaxGiveawayQty,
    /// Minimum non-giveaway quantity before giveaways may be added
    MinNonGiveawayQty,
    /// Minimum cart total before giveaways may be added
    MinCartTotal,
    /// Redirect to the giveaway list after adding a product
    ForwardToGiveawaysPage,
}

impl ConfigKey {
    /// All keys, in declaration order.
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::Enabled,
        ConfigKey::GiveawayAttribute,
        ConfigKey::MaxGiveawayQty,
        ConfigKey::MinNonGiveawayQty,
        ConfigKey::MinCartTotal,
        ConfigKey::ForwardToGiveawaysPage,
    ];

    /// Store configuration path of this key.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            ConfigKey::Enabled => "giveaway/general/enabled",
            ConfigKey::GiveawayAttribute => "giveaway/general/identifier_attribute",
            ConfigKey::MaxGiveawayQty => "giveaway/general/giveaways_per_cart",
            ConfigKey::MinNonGiveawayQty => "giveaway/general/min_products",
            ConfigKey::MinCartTotal => "giveaway/general/min_total",
            ConfigKey::ForwardToGiveawaysPage => "giveaway/general/forward_to_list",
        }
    }

    /// Look up a key by its configuration path.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.path() == path)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Read access to raw store configuration values.
pub trait ConfigSource {
    /// Raw value stored under `key`, if any.
    fn get(&self, key: ConfigKey) -> Option<String>;
}

/// In-memory store configuration, keyed by configuration path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct StoreConfig {
    values: FxHashMap<String, String>,
}

impl StoreConfig {
    /// Create an empty store configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw value for `key`.
    #[must_use]
    pub fn with(mut self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set the raw value for `key`.
    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        self.values.insert(key.path().to_string(), value.into());
    }

    /// Parse a YAML mapping of configuration paths to values.
    ///
    /// # Errors
    ///
    /// Returns a YAML error if the document is not a flat mapping of strings.
    pub fn from_yaml(contents: &str) -> Result<Self, serde_norway::Error> {
        serde_norway::from_str(contents)
    }
}

impl ConfigSource for StoreConfig {
    fn get(&self, key: ConfigKey) -> Option<String> {
        self.values.get(key.path()).cloned()
    }
}

/// Typed giveaway rules for one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleConfig {
    /// Whether the rules are active
    pub enabled: bool,

    /// Attribute code marking giveaway products
    pub giveaway_attribute: String,

    /// Maximum giveaway quantity per cart
    pub max_giveaway_qty: u32,

    /// Minimum non-giveaway quantity
    pub min_non_giveaway_qty: u32,

    /// Minimum cart total, in the store base currency
    pub min_cart_total: Decimal,

    /// Redirect to the giveaway list after adding a product
    pub forward_to_giveaways_page: bool,
}

impl RuleConfig {
    /// Rules that are switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            giveaway_attribute: String::new(),
            max_giveaway_qty: 0,
            min_non_giveaway_qty: 0,
            min_cart_total: Decimal::ZERO,
            forward_to_giveaways_page: false,
        }
    }

    /// Enabled rules using `attribute` with all thresholds at zero.
    #[must_use]
    pub fn enabled(attribute: impl Into<String>) -> Self {
        Self {
            enabled: true,
            giveaway_attribute: attribute.into(),
            ..Self::disabled()
        }
    }

    /// Set the maximum giveaway quantity.
    #[must_use]
    pub fn with_max_giveaway_qty(mut self, qty: u32) -> Self {
        self.max_giveaway_qty = qty;
        self
    }

    /// Set the minimum non-giveaway quantity.
    #[must_use]
    pub fn with_min_non_giveaway_qty(mut self, qty: u32) -> Self {
        self.min_non_giveaway_qty = qty;
        self
    }

    /// Set the minimum cart total.
    #[must_use]
    pub fn with_min_cart_total(mut self, total: Decimal) -> Self {
        self.min_cart_total = total;
        self
    }

    /// Load the rules from raw store values.
    ///
    /// Missing thresholds default to zero. When the rules are disabled the remaining keys
    /// are not read.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::MissingValue`]: the rules are enabled without an attribute code.
    /// - [`ConfigurationError::InvalidValue`]: a stored value could not be parsed.
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigurationError> {
        if !read_flag(source, ConfigKey::Enabled)? {
            return Ok(Self::disabled());
        }

        let giveaway_attribute = source
            .get(ConfigKey::GiveawayAttribute)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigurationError::MissingValue(ConfigKey::GiveawayAttribute))?;

        Ok(Self {
            enabled: true,
            giveaway_attribute,
            max_giveaway_qty: read_parsed(source, ConfigKey::MaxGiveawayQty)?.unwrap_or(0),
            min_non_giveaway_qty: read_parsed(source, ConfigKey::MinNonGiveawayQty)?.unwrap_or(0),
            min_cart_total: read_parsed(source, ConfigKey::MinCartTotal)?.unwrap_or(Decimal::ZERO),
            forward_to_giveaways_page: read_flag(source, ConfigKey::ForwardToGiveawaysPage)?,
        })
    }

    /// The giveaway list page, when the store forwards customers to it.
    #[must_use]
    pub fn giveaways_page(&self) -> Option<&'static str> {
        (self.enabled && self.forward_to_giveaways_page).then_some(GIVEAWAYS_PAGE)
    }
}

fn read_flag(source: &impl ConfigSource, key: ConfigKey) -> Result<bool, ConfigurationError> {
    let Some(value) = source.get(key) else {
        return Ok(false);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        _ => Err(ConfigurationError::InvalidValue { key, value }),
    }
}

fn read_parsed<T: FromStr>(
    source: &impl ConfigSource,
    key: ConfigKey,
) -> Result<Option<T>, ConfigurationError> {
    let Some(value) = source.get(key) else {
        return Ok(None);
    };

    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_err| ConfigurationError::InvalidValue { key, value })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn enabled_store() -> StoreConfig {
        StoreConfig::new()
            .with(ConfigKey::Enabled, "1")
            .with(ConfigKey::GiveawayAttribute, "is_giveaway")
            .with(ConfigKey::MaxGiveawayQty, "2")
            .with(ConfigKey::MinNonGiveawayQty, "1")
            .with(ConfigKey::MinCartTotal, "49.99")
    }

    #[test]
    fn from_source_parses_thresholds() -> TestResult {
        let rules = RuleConfig::from_source(&enabled_store())?;

        assert!(rules.enabled);
        assert_eq!(rules.giveaway_attribute, "is_giveaway");
        assert_eq!(rules.max_giveaway_qty, 2);
        assert_eq!(rules.min_non_giveaway_qty, 1);
        assert_eq!(rules.min_cart_total, Decimal::new(4_999, 2));
        assert!(!rules.forward_to_giveaways_page);

        Ok(())
    }

    #[test]
    fn disabled_store_skips_remaining_keys() -> TestResult {
        let store = StoreConfig::new()
            .with(ConfigKey::Enabled, "0")
            .with(ConfigKey::MaxGiveawayQty, "not a number");

        assert_eq!(RuleConfig::from_source(&store)?, RuleConfig::disabled());
        assert_eq!(RuleConfig::from_source(&StoreConfig::new())?, RuleConfig::disabled());

        Ok(())
    }

    #[test]
    fn missing_attribute_is_an_error() {
        let store = StoreConfig::new()
            .with(ConfigKey::Enabled, "1")
            .with(ConfigKey::GiveawayAttribute, "  ");

        assert_eq!(
            RuleConfig::from_source(&store),
            Err(ConfigurationError::MissingValue(ConfigKey::GiveawayAttribute))
        );
    }

    #[test]
    fn missing_thresholds_default_to_zero() -> TestResult {
        let store = StoreConfig::new()
            .with(ConfigKey::Enabled, "true")
            .with(ConfigKey::GiveawayAttribute, "is_giveaway");

        let rules = RuleConfig::from_source(&store)?;

        assert_eq!(rules, RuleConfig::enabled("is_giveaway"));

        Ok(())
    }

    #[test]
    fn invalid_threshold_reports_key_and_value() {
        let store = enabled_store().with(ConfigKey::MaxGiveawayQty, "-1");

        assert_eq!(
            RuleConfig::from_source(&store),
            Err(ConfigurationError::InvalidValue {
                key: ConfigKey::MaxGiveawayQty,
                value: "-1".to_string(),
            })
        );
    }

    #[test]
    fn giveaways_page_requires_forwarding() -> TestResult {
        let rules = RuleConfig::from_source(&enabled_store())?;
        assert_eq!(rules.giveaways_page(), None);

        let rules =
            RuleConfig::from_source(&enabled_store().with(ConfigKey::ForwardToGiveawaysPage, "1"))?;
        assert_eq!(rules.giveaways_page(), Some(GIVEAWAYS_PAGE));

        Ok(())
    }

    #[test]
    fn store_config_loads_from_yaml() -> TestResult {
        let store = StoreConfig::from_yaml(
            "giveaway/general/enabled: \"1\"\ngiveaway/general/identifier_attribute: is_giveaway\n",
        )?;

        assert_eq!(store.get(ConfigKey::Enabled).as_deref(), Some("1"));
        assert_eq!(
            ConfigKey::from_path("giveaway/general/min_total"),
            Some(ConfigKey::MinCartTotal)
        );

        Ok(())
    }
}
