use std::collections::{BTreeMap, HashMap};
use std::env::{self, VarError};
use std::fmt;
use std::hash::BuildHasher;

use log::warn;

use crate::error::SourceError;

/// A key/value store consulted for overrides before defaults apply.
#[cfg_attr(test, mockall::automock)]
pub trait OverrideSource {
    /// Returns the raw override for `key`, or `None` when it is not set.
    fn lookup(&self, key: &str) -> Result<Option<String>, SourceError>;
}

impl<T: OverrideSource + ?Sized> OverrideSource for &T {
    fn lookup(&self, key: &str) -> Result<Option<String>, SourceError> {
        (**self).lookup(key)
    }
}

impl<T: OverrideSource + ?Sized> OverrideSource for Box<T> {
    fn lookup(&self, key: &str) -> Result<Option<String>, SourceError> {
        (**self).lookup(key)
    }
}

/// Reads overrides from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl OverrideSource for ProcessEnv {
    fn lookup(&self, key: &str) -> Result<Option<String>, SourceError> {
        // std::env may panic on these, so reject them up front
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(SourceError::InvalidKey {
                key: key.to_string(),
            });
        }

        match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(SourceError::NotUnicode {
                key: key.to_string(),
            }),
        }
    }
}

impl<S: BuildHasher> OverrideSource for HashMap<String, String, S> {
    fn lookup(&self, key: &str) -> Result<Option<String>, SourceError> {
        Ok(self.get(key).cloned())
    }
}

impl OverrideSource for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Result<Option<String>, SourceError> {
        Ok(self.get(key).cloned())
    }
}

/// An ordered stack of override sources. The first layer that yields a
/// non-empty value wins.
///
/// A faulting layer is logged and skipped. When no layer produces a value
/// and at least one faulted, the first fault is returned so the resolver
/// can record the fallback.
#[derive(Default)]
pub struct LayeredSource {
    layers: Vec<Box<dyn OverrideSource + Send + Sync>>,
}

impl LayeredSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer with lower precedence than every existing layer.
    pub fn with_layer(mut self, layer: impl OverrideSource + Send + Sync + 'static) -> Self {
        self.push(layer);
        self
    }

    pub fn push(&mut self, layer: impl OverrideSource + Send + Sync + 'static) {
        self.layers.push(Box::new(layer));
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl fmt::Debug for LayeredSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredSource")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl OverrideSource for LayeredSource {
    fn lookup(&self, key: &str) -> Result<Option<String>, SourceError> {
        let mut first_fault = None;

        for (index, layer) in self.layers.iter().enumerate() {
            match layer.lookup(key) {
                Ok(Some(value)) if !value.is_empty() => return Ok(Some(value)),
                Ok(_) => {}
                Err(err) => {
                    warn!("Override layer {} failed for {}: {}", index, key, err);
                    first_fault.get_or_insert(err);
                }
            }
        }

        match first_fault {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

/// Serializes unit tests that read or write the process environment.
#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
