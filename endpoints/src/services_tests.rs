#[cfg(test)]
mod services_tests {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use std::thread;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::error::ConfigError;
    use crate::resolver::{ConfigResolver, Origin};
    use crate::services::{
        internal_resolver, join_url, public_resolver, Service, ServiceEndpoints,
        INTERNAL_ENDPOINTS, PUBLIC_ENDPOINTS,
    };
    use crate::source::LayeredSource;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test_log::test]
    fn test_builtin_tables_have_unique_names_and_keys() {
        assert!(ConfigResolver::new(PUBLIC_ENDPOINTS.iter().cloned()).is_ok());
        assert!(ConfigResolver::new(INTERNAL_ENDPOINTS.iter().cloned()).is_ok());
        assert!(ConfigResolver::new(
            PUBLIC_ENDPOINTS
                .iter()
                .chain(INTERNAL_ENDPOINTS.iter())
                .cloned()
        )
        .is_ok());
        assert_eq!(public_resolver().settings(), &PUBLIC_ENDPOINTS[..]);
    }

    #[rstest]
    #[case(Service::Auth, "AUTH_SERVICE_URL", "NEXT_PUBLIC_AUTH_SERVICE_URL", "/api/auth")]
    #[case(Service::Quiz, "QUIZ_SERVICE_URL", "NEXT_PUBLIC_QUIZ_SERVICE_URL", "/api/quiz")]
    #[case(Service::Images, "IMAGES_SERVICE_URL", "NEXT_PUBLIC_IMAGES_SERVICE_URL", "/api/images")]
    #[case(Service::Stats, "STATS_SERVICE_URL", "NEXT_PUBLIC_STATS_SERVICE_URL", "/api/stats")]
    #[case(Service::Admin, "ADMIN_SERVICE_URL", "NEXT_PUBLIC_ADMIN_SERVICE_URL", "/api/admin")]
    fn test_service_table(
        #[case] service: Service,
        #[case] name: &str,
        #[case] key: &str,
        #[case] default: &str,
    ) {
        assert_eq!(service.name(), name);
        assert_eq!(service.setting().override_key(), key);
        assert_eq!(service.setting().default_value(), default);
        assert_eq!(ServiceEndpoints::resolve(&source(&[])).base_url(service), default);
    }

    #[rstest]
    #[case("quiz", Service::Quiz)]
    #[case("Images", Service::Images)]
    #[case("ADMIN_SERVICE_URL", Service::Admin)]
    fn test_service_from_str(#[case] raw: &str, #[case] expected: Service) {
        assert_eq!(raw.parse::<Service>().unwrap(), expected);
    }

    #[test_log::test]
    fn test_unknown_service_name() {
        assert_eq!(
            "billing".parse::<Service>(),
            Err(ConfigError::UnknownService("billing".to_string()))
        );
        assert_eq!(Service::Stats.to_string(), "stats");
    }

    #[test_log::test]
    fn test_endpoints_apply_overrides() {
        let endpoints = ServiceEndpoints::resolve(&source(&[
            ("NEXT_PUBLIC_QUIZ_SERVICE_URL", "https://quiz.example.com"),
            ("NEXT_PUBLIC_ADMIN_SERVICE_URL", ""),
        ]));

        assert_eq!(endpoints.base_url(Service::Quiz), "https://quiz.example.com");
        assert_eq!(endpoints.base_url(Service::Admin), "/api/admin");
        assert_eq!(endpoints.base_url(Service::Auth), "/api/auth");
    }

    #[test_log::test]
    fn test_endpoints_from_partial_config_keep_defaults() {
        let partial = ConfigResolver::new(PUBLIC_ENDPOINTS[..1].iter().cloned())
            .unwrap()
            .resolve(&source(&[("NEXT_PUBLIC_AUTH_SERVICE_URL", "https://auth.example.com")]));

        let endpoints = ServiceEndpoints::from_resolved(&partial);
        assert_eq!(endpoints.base_url(Service::Auth), "https://auth.example.com");
        assert_eq!(endpoints.base_url(Service::Stats), "/api/stats");
    }

    #[rstest]
    #[case("/api/quiz", "/questions", "/api/quiz/questions")]
    #[case("/api/quiz", "questions", "/api/quiz/questions")]
    #[case("/api/quiz/", "/questions", "/api/quiz/questions")]
    #[case("https://quiz.example.com", "/q/1?full=true", "https://quiz.example.com/q/1?full=true")]
    #[case("https://quiz.example.com/", "", "https://quiz.example.com/")]
    #[case("/", "health", "/health")]
    #[case("", "/health", "/health")]
    fn test_join_url(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(join_url(base, path), expected);
    }

    #[test_log::test]
    fn test_request_urls() {
        let endpoints = ServiceEndpoints::resolve(&source(&[(
            "NEXT_PUBLIC_IMAGES_SERVICE_URL",
            "https://cdn.example.com/images/",
        )]));

        assert_eq!(endpoints.url(Service::Auth, "/login"), "/api/auth/login");
        assert_eq!(
            endpoints.url(Service::Images, "/42.png"),
            "https://cdn.example.com/images/42.png"
        );
    }

    #[test_log::test]
    fn test_endpoints_serialize_under_exposed_names() {
        let endpoints = ServiceEndpoints::resolve(&source(&[]));
        let json = serde_json::to_value(&endpoints).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "AUTH_SERVICE_URL": "/api/auth",
                "QUIZ_SERVICE_URL": "/api/quiz",
                "IMAGES_SERVICE_URL": "/api/images",
                "STATS_SERVICE_URL": "/api/stats",
                "ADMIN_SERVICE_URL": "/api/admin",
            })
        );

        let back: ServiceEndpoints = serde_json::from_value(json).unwrap();
        assert_eq!(back, endpoints);
    }

    #[test_log::test]
    fn test_endpoints_validate() {
        assert!(ServiceEndpoints::resolve(&source(&[])).validate().is_ok());

        let bad = ServiceEndpoints::resolve(&source(&[(
            "NEXT_PUBLIC_STATS_SERVICE_URL",
            "ws://stats.example.com",
        )]));
        let err = bad.validate().unwrap_err();
        assert_eq!(err.names().collect::<Vec<_>>(), vec!["STATS_SERVICE_URL"]);
    }

    #[test_log::test]
    fn test_iter_follows_service_order() {
        let endpoints = ServiceEndpoints::resolve(&source(&[]));
        let services: Vec<Service> = endpoints.iter().map(|(service, _)| service).collect();
        assert_eq!(services, Service::ALL.to_vec());
    }

    #[test_log::test]
    fn test_internal_endpoints_defaults_and_overrides() {
        let defaults = internal_resolver().resolve(&source(&[]));
        assert_eq!(defaults.get("AUTH_INTERNAL_URL"), Some("http://auth:8080"));
        assert_eq!(defaults.get("QUIZ_INTERNAL_URL"), Some("http://quiz:8080"));
        assert_eq!(defaults.get("STATS_INTERNAL_URL"), Some("http://stats:8080"));
        assert!(defaults.validate().is_ok());

        let overridden =
            internal_resolver().resolve(&source(&[("AUTH_BASE_URL", "http://auth-v2:9090")]));
        assert_eq!(overridden.get("AUTH_INTERNAL_URL"), Some("http://auth-v2:9090"));
        assert_eq!(overridden.origin("AUTH_INTERNAL_URL"), Some(Origin::Override));
    }

    #[rstest]
    #[case("AUTH_BASE_URL", "http://auth:8080", "AUTH_INTERNAL_URL", "/auth/notify-approved")]
    #[case("QUIZ_BASE_URL", "http://quiz:8080", "QUIZ_INTERNAL_URL", "/quiz/questions")]
    #[case("STATS_BASE_URL", "http://stats:8080", "STATS_INTERNAL_URL", "/stats/users")]
    fn test_internal_root_override_matches_default(
        #[case] key: &str,
        #[case] root: &str,
        #[case] name: &str,
        #[case] route: &str,
    ) {
        let defaults = internal_resolver().resolve(&source(&[]));
        let overridden = internal_resolver().resolve(&source(&[(key, root)]));

        assert_eq!(overridden.origin(name), Some(Origin::Override));
        assert_eq!(join_url(&overridden[name], route), join_url(&defaults[name], route));
        assert_eq!(join_url(&overridden[name], route), format!("{root}{route}"));
    }

    #[test_log::test]
    fn test_layered_source_over_builtin_table() {
        let mut defaults_file = BTreeMap::new();
        defaults_file.insert(
            "NEXT_PUBLIC_AUTH_SERVICE_URL".to_string(),
            "https://auth.staging.example.com".to_string(),
        );
        defaults_file.insert(
            "NEXT_PUBLIC_QUIZ_SERVICE_URL".to_string(),
            "https://quiz.staging.example.com".to_string(),
        );

        let layered = LayeredSource::new()
            .with_layer(source(&[("NEXT_PUBLIC_QUIZ_SERVICE_URL", "https://quiz.example.com")]))
            .with_layer(defaults_file);

        let endpoints = ServiceEndpoints::resolve(&layered);
        assert_eq!(endpoints.base_url(Service::Quiz), "https://quiz.example.com");
        assert_eq!(endpoints.base_url(Service::Auth), "https://auth.staging.example.com");
        assert_eq!(endpoints.base_url(Service::Admin), "/api/admin");
    }

    #[test_log::test]
    fn test_endpoints_are_shared_across_threads() {
        let endpoints = Arc::new(ServiceEndpoints::resolve(&source(&[(
            "NEXT_PUBLIC_STATS_SERVICE_URL",
            "https://stats.example.com",
        )])));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let endpoints = Arc::clone(&endpoints);
                thread::spawn(move || endpoints.url(Service::Stats, "/summary"))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "https://stats.example.com/summary");
        }
    }
}
