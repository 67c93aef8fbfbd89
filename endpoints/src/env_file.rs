//! Optional `.env` loading, run before endpoints are resolved from the
//! process environment.
//!
//! If `ENV_FILE_PATH` is set and non-empty, that file alone is loaded.
//! Otherwise `.env.<environment>` (for a non-development `RUST_ENV`) and
//! then `.env` are loaded from the working directory. Variables that are
//! already set are never overwritten, so the process environment wins over
//! `.env.<environment>`, which wins over `.env`.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info, warn};

use crate::error::ConfigError;
use crate::source::{OverrideSource, ProcessEnv};

pub const ENV_FILE_PATH: &str = "ENV_FILE_PATH";
pub const RUST_ENV: &str = "RUST_ENV";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

impl Environment {
    /// The environment-specific file to load, if any. Development only
    /// reads `.env`.
    pub fn env_file_name(self) -> Option<&'static str> {
        match self {
            Environment::Development => None,
            Environment::Test => Some(".env.test"),
            Environment::Production => Some(".env.production"),
        }
    }
}

/// Reads `RUST_ENV` from `source`, defaulting to development.
pub fn environment_from<S>(source: &S) -> Environment
where
    S: OverrideSource + ?Sized,
{
    match non_empty(source, RUST_ENV) {
        Some(raw) => raw.parse().unwrap_or_else(|err| {
            warn!("{}; falling back to development", err);
            Environment::Development
        }),
        None => Environment::Development,
    }
}

/// Loads env files from the working directory. Returns the files loaded.
pub fn load_env_files() -> Vec<PathBuf> {
    match env::current_dir() {
        Ok(dir) => load_env_files_in(&dir, &ProcessEnv),
        Err(err) => {
            warn!("Cannot determine working directory, skipping env files: {}", err);
            Vec::new()
        }
    }
}

/// Loads env files relative to `dir`, reading `ENV_FILE_PATH` and
/// `RUST_ENV` from `source`.
pub fn load_env_files_in<S>(dir: &Path, source: &S) -> Vec<PathBuf>
where
    S: OverrideSource + ?Sized,
{
    if let Some(explicit) = non_empty(source, ENV_FILE_PATH) {
        let path = dir.join(explicit);
        info!("Loading environment from {}: {}", ENV_FILE_PATH, path.display());
        if !path.is_file() {
            warn!("{} points at a missing file: {}", ENV_FILE_PATH, path.display());
            return Vec::new();
        }
        return load_file(&path).into_iter().collect();
    }

    let environment = environment_from(source);
    info!("Loading env files for environment: {:?}", environment);

    let mut candidates = Vec::with_capacity(2);
    if let Some(name) = environment.env_file_name() {
        candidates.push(dir.join(name));
    }
    candidates.push(dir.join(".env"));

    candidates
        .into_iter()
        .filter(|path| {
            let exists = path.is_file();
            if !exists {
                debug!("No env file at {}", path.display());
            }
            exists
        })
        .filter_map(|path| load_file(&path))
        .collect()
}

fn load_file(path: &Path) -> Option<PathBuf> {
    match dotenv::from_path(path) {
        Ok(()) => {
            info!("Loaded env file {}", path.display());
            Some(path.to_path_buf())
        }
        Err(err) => {
            warn!("Failed to load env file {}: {}", path.display(), err);
            None
        }
    }
}

fn non_empty<S>(source: &S, key: &str) -> Option<String>
where
    S: OverrideSource + ?Sized,
{
    match source.lookup(key) {
        Ok(Some(value)) if !value.is_empty() => Some(value),
        Ok(_) => None,
        Err(err) => {
            warn!("Ignoring {}: {}", key, err);
            None
        }
    }
}
