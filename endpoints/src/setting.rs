use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Represents one named, overridable configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointSetting {
    /// Name exposed to consumers, e.g. `AUTH_SERVICE_URL`
    pub name: Cow<'static, str>,

    /// Key consulted in the override source, e.g. `NEXT_PUBLIC_AUTH_SERVICE_URL`
    #[serde(rename = "overrideKey")]
    pub override_key: Cow<'static, str>,

    /// Value used when the override is absent or empty
    #[serde(rename = "defaultValue")]
    pub default_value: Cow<'static, str>,
}

impl EndpointSetting {
    /// Builds a descriptor from static strings, usable in `const` tables.
    pub const fn new(
        name: &'static str,
        override_key: &'static str,
        default_value: &'static str,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            override_key: Cow::Borrowed(override_key),
            default_value: Cow::Borrowed(default_value),
        }
    }

    /// Builds a descriptor from runtime strings.
    pub fn owned(
        name: impl Into<String>,
        override_key: impl Into<String>,
        default_value: impl Into<String>,
    ) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            override_key: Cow::Owned(override_key.into()),
            default_value: Cow::Owned(default_value.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn override_key(&self) -> &str {
        &self.override_key
    }

    pub fn default_value(&self) -> &str {
        &self.default_value
    }
}
