use super::*;
use std::collections::HashMap;

fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn empty_environment_uses_defaults() {
    let cfg = config(&[]).unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.backend.kind(), BackendKind::Memory);
    assert!(cfg.latency.is_none());
}

#[test]
fn postgres_requires_database_url() {
    let err = config(&[("PPC_BACKEND", "postgres")]).unwrap_err();
    assert_eq!(err, ConfigError::Missing { var: "DATABASE_URL", backend: "postgres" });

    let cfg = config(&[("PPC_BACKEND", "postgres"), ("DATABASE_URL", "postgres://localhost/ppc")]).unwrap();
    assert_eq!(
        cfg.backend,
        Backend::Postgres { database_url: "postgres://localhost/ppc".into(), max_connections: DEFAULT_DB_MAX_CONNECTIONS }
    );

    let sized = config(&[
        ("PPC_BACKEND", "postgres"),
        ("DATABASE_URL", "postgres://localhost/ppc"),
        ("DB_MAX_CONNECTIONS", "12"),
    ])
    .unwrap();
    assert!(matches!(sized.backend, Backend::Postgres { max_connections: 12, .. }));
}

#[test]
fn remote_backend_reads_all_settings() {
    let cfg = config(&[
        ("PPC_BACKEND", "remote"),
        ("PPC_REMOTE_BASE_URL", "https://api.example.test/v1/"),
        ("PPC_REMOTE_PROJECT_ID", "proj-1"),
        ("PPC_REMOTE_API_KEY", "secret"),
        ("PPC_REMOTE_TIMEOUT_SECS", "12"),
    ])
    .unwrap();
    assert_eq!(
        cfg.backend,
        Backend::Remote(RemoteConfig {
            base_url: "https://api.example.test/v1".into(),
            project_id: "proj-1".into(),
            api_key: "secret".into(),
            timeout_secs: 12,
        })
    );
}

#[test]
fn remote_backend_reports_first_missing_var() {
    let err = config(&[("PPC_BACKEND", "remote"), ("PPC_REMOTE_BASE_URL", "https://x.test")]).unwrap_err();
    assert_eq!(err, ConfigError::Missing { var: "PPC_REMOTE_PROJECT_ID", backend: "remote" });
}

#[test]
fn unknown_backend_is_rejected() {
    let err = config(&[("PPC_BACKEND", "sqlite")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "PPC_BACKEND", .. }));
}

#[test]
fn bad_port_is_rejected_not_defaulted() {
    let err = config(&[("PORT", "eighty")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
}

#[test]
fn blank_values_count_as_unset() {
    let cfg = config(&[("PORT", "  "), ("PPC_FIXTURE_DIR", "")]).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert!(cfg.fixture_dir.is_none());
}

#[test]
fn latency_parses_range_single_and_off() {
    assert_eq!(parse_latency(Some("200-500")).unwrap(), Some(LatencyRange { min_ms: 200, max_ms: 500 }));
    assert_eq!(parse_latency(Some("300")).unwrap(), Some(LatencyRange { min_ms: 300, max_ms: 300 }));
    assert_eq!(parse_latency(Some("off")).unwrap(), None);
    assert_eq!(parse_latency(None).unwrap(), None);
}

#[test]
fn latency_rejects_inverted_or_garbage_ranges() {
    assert!(parse_latency(Some("500-200")).is_err());
    assert!(parse_latency(Some("fast")).is_err());
}

#[test]
fn overrides_current_user_and_recipient() {
    let cfg = config(&[
        ("PPC_CURRENT_USER_ID", "4"),
        ("PPC_ACCESS_REQUEST_RECIPIENT", "ops@example.test"),
        ("PPC_FIXTURE_DIR", "/srv/fixtures"),
    ])
    .unwrap();
    assert_eq!(cfg.current_user_id, 4);
    assert_eq!(cfg.access_request_recipient, "ops@example.test");
    assert_eq!(cfg.fixture_dir, Some(PathBuf::from("/srv/fixtures")));
}
