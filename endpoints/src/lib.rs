//! Backend service base URLs, resolved once from environment overrides with
//! built-in defaults.
//!
//! ```no_run
//! use endpoints::{Service, ServiceEndpoints};
//!
//! endpoints::env_file::load_env_files();
//! let endpoints = ServiceEndpoints::from_env();
//! let login = endpoints.url(Service::Auth, "/login");
//! ```

pub mod env_file;
pub mod error;
pub mod resolver;
pub mod services;
pub mod setting;
pub mod source;
pub mod validation;

// Re-export commonly used items
pub use error::{
    ConfigError, ConfigValidationError, Result, ShapeFailure, ShapeProblem, SourceError,
};
pub use resolver::{resolve, ConfigResolver, Origin, ResolvedConfig, ResolvedValue};
pub use services::{
    join_url, Service, ServiceEndpoints, ADMIN_SERVICE_URL, AUTH_SERVICE_URL,
    IMAGES_SERVICE_URL, INTERNAL_ENDPOINTS, PUBLIC_ENDPOINTS, QUIZ_SERVICE_URL,
    STATS_SERVICE_URL,
};
pub use setting::EndpointSetting;
pub use source::{LayeredSource, OverrideSource, ProcessEnv};


#[cfg(test)]
mod services_tests;
