use std::collections::{BTreeMap, HashSet};
use std::ops::Index;

use log::{debug, info, warn};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ConfigError, ConfigValidationError, Result};
use crate::setting::EndpointSetting;
use crate::source::OverrideSource;
use crate::validation;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The override source returned a non-empty value.
    Override,
    /// No override was set, or it was empty.
    Default,
    /// The override source failed; the default was used instead.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    value: String,
    origin: Origin,
}

impl ResolvedValue {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn into_value(self) -> String {
        self.value
    }
}

/// Resolves a single setting against `source`, reading it exactly once.
pub fn resolve_setting<S>(setting: &EndpointSetting, source: &S) -> ResolvedValue
where
    S: OverrideSource + ?Sized,
{
    let (value, origin) = match source.lookup(setting.override_key()) {
        Ok(Some(value)) if !value.is_empty() => (value, Origin::Override),
        Ok(_) => (setting.default_value().to_string(), Origin::Default),
        Err(err) => {
            warn!(
                "Could not read {} for {}: {}; using default {}",
                setting.override_key(),
                setting.name(),
                err,
                setting.default_value()
            );
            (setting.default_value().to_string(), Origin::Fallback)
        }
    };

    debug!("{} = {} ({:?})", setting.name(), value, origin);
    ResolvedValue { value, origin }
}

/// A checked, ordered table of settings ready to be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigResolver {
    settings: Vec<EndpointSetting>,
}

impl ConfigResolver {
    /// Accepts a settings table, rejecting duplicate names or override keys.
    pub fn new<I>(settings: I) -> Result<Self>
    where
        I: IntoIterator<Item = EndpointSetting>,
    {
        let settings: Vec<EndpointSetting> = settings.into_iter().collect();
        check_unique(&settings)?;
        Ok(Self { settings })
    }

    /// Wraps one of the crate's built-in tables, which are known to be
    /// duplicate-free.
    pub(crate) fn from_builtin(settings: &[EndpointSetting]) -> Self {
        Self {
            settings: settings.to_vec(),
        }
    }

    pub fn settings(&self) -> &[EndpointSetting] {
        &self.settings
    }

    /// Resolves every setting. Never fails: absent, empty and unreadable
    /// overrides all fall back to the default.
    pub fn resolve<S>(&self, source: &S) -> ResolvedConfig
    where
        S: OverrideSource + ?Sized,
    {
        let values = self
            .settings
            .iter()
            .map(|setting| {
                (
                    setting.name().to_string(),
                    resolve_setting(setting, source),
                )
            })
            .collect();

        ResolvedConfig { values }
    }
}

fn check_unique(settings: &[EndpointSetting]) -> Result<()> {
    let mut names = HashSet::new();
    let mut keys = HashSet::new();
    for setting in settings {
        if !names.insert(setting.name()) {
            return Err(ConfigError::DuplicateName(setting.name().to_string()));
        }
        if !keys.insert(setting.override_key()) {
            return Err(ConfigError::DuplicateOverrideKey(
                setting.override_key().to_string(),
            ));
        }
    }
    Ok(())
}

/// Checks `settings` and resolves them against `source` in one step.
pub fn resolve<S>(settings: &[EndpointSetting], source: &S) -> Result<ResolvedConfig>
where
    S: OverrideSource + ?Sized,
{
    Ok(ConfigResolver::new(settings.iter().cloned())?.resolve(source))
}

/// Immutable mapping from setting name to its resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    values: BTreeMap<String, ResolvedValue>,
}

impl ResolvedConfig {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(ResolvedValue::value)
    }

    pub fn resolved(&self, name: &str) -> Option<&ResolvedValue> {
        self.values.get(name)
    }

    pub fn origin(&self, name: &str) -> Option<Origin> {
        self.values.get(name).map(ResolvedValue::origin)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, resolved)| (name.as_str(), resolved.value()))
    }

    /// Names of settings whose value came from the override source.
    pub fn overridden(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .filter(|(_, resolved)| resolved.origin() == Origin::Override)
            .map(|(name, _)| name.as_str())
    }

    /// Optional startup check that every value looks like a base URL.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        validation::check_all(self.iter())
    }

    pub fn log_summary(&self) {
        info!("Endpoint configuration resolved ({} settings)", self.len());
        for (name, resolved) in &self.values {
            info!("{}: {} ({:?})", name, resolved.value(), resolved.origin());
        }
    }
}

/// Looks a value up by setting name.
///
/// # Panics
///
/// Panics if `name` is not one of the resolved settings. Use
/// [`ResolvedConfig::get`] when the name may be absent.
impl Index<&str> for ResolvedConfig {
    type Output = str;

    fn index(&self, name: &str) -> &str {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no endpoint setting named {name}"),
        }
    }
}

impl Serialize for ResolvedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
