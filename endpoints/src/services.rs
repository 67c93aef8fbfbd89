//! Base URLs of the backend services, as seen by the web client and by the
//! services themselves.

use std::fmt;
use std::str::FromStr;

use log::info;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigValidationError};
use crate::resolver::{ConfigResolver, ResolvedConfig};
use crate::setting::EndpointSetting;
use crate::source::{OverrideSource, ProcessEnv};
use crate::validation;

/// Browser-facing base URLs. Defaults are same-origin paths behind the proxy.
pub static PUBLIC_ENDPOINTS: [EndpointSetting; 5] = [
    EndpointSetting::new("AUTH_SERVICE_URL", "NEXT_PUBLIC_AUTH_SERVICE_URL", "/api/auth"),
    EndpointSetting::new("QUIZ_SERVICE_URL", "NEXT_PUBLIC_QUIZ_SERVICE_URL", "/api/quiz"),
    EndpointSetting::new("IMAGES_SERVICE_URL", "NEXT_PUBLIC_IMAGES_SERVICE_URL", "/api/images"),
    EndpointSetting::new("STATS_SERVICE_URL", "NEXT_PUBLIC_STATS_SERVICE_URL", "/api/stats"),
    EndpointSetting::new("ADMIN_SERVICE_URL", "NEXT_PUBLIC_ADMIN_SERVICE_URL", "/api/admin"),
];

/// Service-to-service roots inside the compose network. Values are the
/// service root without its route prefix; callers join the full route,
/// e.g. `/auth/notify-approved`.
pub static INTERNAL_ENDPOINTS: [EndpointSetting; 3] = [
    EndpointSetting::new("AUTH_INTERNAL_URL", "AUTH_BASE_URL", "http://auth:8080"),
    EndpointSetting::new("QUIZ_INTERNAL_URL", "QUIZ_BASE_URL", "http://quiz:8080"),
    EndpointSetting::new("STATS_INTERNAL_URL", "STATS_BASE_URL", "http://stats:8080"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Auth,
    Quiz,
    Images,
    Stats,
    Admin,
}

impl Service {
    pub const ALL: [Service; 5] = [
        Service::Auth,
        Service::Quiz,
        Service::Images,
        Service::Stats,
        Service::Admin,
    ];

    const fn index(self) -> usize {
        match self {
            Service::Auth => 0,
            Service::Quiz => 1,
            Service::Images => 2,
            Service::Stats => 3,
            Service::Admin => 4,
        }
    }

    /// The public endpoint descriptor for this service.
    pub fn setting(self) -> &'static EndpointSetting {
        &PUBLIC_ENDPOINTS[self.index()]
    }

    /// Name of the exposed value, e.g. `QUIZ_SERVICE_URL`.
    pub fn name(self) -> &'static str {
        self.setting().name()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Service::Auth => "auth",
            Service::Quiz => "quiz",
            Service::Images => "images",
            Service::Stats => "stats",
            Service::Admin => "admin",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|service| {
                service.as_str().eq_ignore_ascii_case(s) || service.name().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| ConfigError::UnknownService(s.to_string()))
    }
}

/// Resolver over [`PUBLIC_ENDPOINTS`].
pub fn public_resolver() -> ConfigResolver {
    ConfigResolver::from_builtin(&PUBLIC_ENDPOINTS)
}

/// Resolver over [`INTERNAL_ENDPOINTS`].
pub fn internal_resolver() -> ConfigResolver {
    ConfigResolver::from_builtin(&INTERNAL_ENDPOINTS)
}

/// Resolved public base URLs, one per service.
///
/// Build one at startup and hand it to whatever issues requests; the
/// process-wide statics below exist for code that cannot take a handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoints {
    #[serde(rename = "AUTH_SERVICE_URL")]
    auth: String,
    #[serde(rename = "QUIZ_SERVICE_URL")]
    quiz: String,
    #[serde(rename = "IMAGES_SERVICE_URL")]
    images: String,
    #[serde(rename = "STATS_SERVICE_URL")]
    stats: String,
    #[serde(rename = "ADMIN_SERVICE_URL")]
    admin: String,
}

impl ServiceEndpoints {
    pub fn resolve<S>(source: &S) -> Self
    where
        S: OverrideSource + ?Sized,
    {
        Self::from_resolved(&public_resolver().resolve(source))
    }

    pub fn from_env() -> Self {
        Self::resolve(&ProcessEnv)
    }

    /// Process-wide endpoints, resolved from the environment on first use.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Picks the public values out of `config`; services missing from it
    /// keep their defaults.
    pub fn from_resolved(config: &ResolvedConfig) -> Self {
        let pick = |service: Service| {
            config
                .get(service.name())
                .unwrap_or_else(|| service.setting().default_value())
                .to_string()
        };

        Self {
            auth: pick(Service::Auth),
            quiz: pick(Service::Quiz),
            images: pick(Service::Images),
            stats: pick(Service::Stats),
            admin: pick(Service::Admin),
        }
    }

    pub fn base_url(&self, service: Service) -> &str {
        match service {
            Service::Auth => &self.auth,
            Service::Quiz => &self.quiz,
            Service::Images => &self.images,
            Service::Stats => &self.stats,
            Service::Admin => &self.admin,
        }
    }

    /// Request URL for `path` on `service`.
    pub fn url(&self, service: Service, path: &str) -> String {
        join_url(self.base_url(service), path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Service, &str)> {
        Service::ALL
            .into_iter()
            .map(move |service| (service, self.base_url(service)))
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        validation::check_all(
            self.iter()
                .map(|(service, value)| (service.name(), value)),
        )
    }
}

/// Joins `path` onto `base` with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return base.to_string();
    }

    format!("{}/{}", base.trim_end_matches('/'), path)
}

static GLOBAL: Lazy<ServiceEndpoints> = Lazy::new(|| {
    let endpoints = ServiceEndpoints::from_env();
    for (service, url) in endpoints.iter() {
        info!("{}: {}", service.name(), url);
    }
    endpoints
});

pub static AUTH_SERVICE_URL: Lazy<String> =
    Lazy::new(|| ServiceEndpoints::global().base_url(Service::Auth).to_string());

pub static QUIZ_SERVICE_URL: Lazy<String> =
    Lazy::new(|| ServiceEndpoints::global().base_url(Service::Quiz).to_string());

pub static IMAGES_SERVICE_URL: Lazy<String> =
    Lazy::new(|| ServiceEndpoints::global().base_url(Service::Images).to_string());

pub static STATS_SERVICE_URL: Lazy<String> =
    Lazy::new(|| ServiceEndpoints::global().base_url(Service::Stats).to_string());

pub static ADMIN_SERVICE_URL: Lazy<String> =
    Lazy::new(|| ServiceEndpoints::global().base_url(Service::Admin).to_string());
