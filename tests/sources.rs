//! Integration tests for the concrete secret sources.

use handover::bootstrap::model::{ProviderSpec, SecretSpec};
use handover::error::HandoverError;
use handover::provider::sources::{self, file_source::FileSource};
use handover::provider::SecretSource;

const PAYLOAD: &str = r#"{
    "signing_secret": "super-secret",
    "database": {"host": "db.internal", "user": "app", "password": "pw", "database": "boards"},
    "cache": {"host": "cache.internal", "port": 6380, "tls_required": true}
}"#;

fn temp_payload_file(name: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("handover-test-{name}-{}.json", std::process::id()));
    std::fs::write(&path, PAYLOAD).unwrap();
    path
}

#[tokio::test]
async fn file_source_fetches_a_full_config() {
    let path = temp_payload_file("fetch");
    let source = FileSource::new("primary".into(), path.clone());

    let config = source.fetch().await.unwrap();

    assert_eq!(config.provider_id, "primary");
    assert_eq!(config.database.host, "db.internal");
    assert_eq!(config.cache.port, 6380);
    assert!(config.cache.tls_required);

    std::fs::remove_file(path).unwrap();
}

#[tokio::test]
async fn missing_payload_file_is_source_unavailable() {
    let source = FileSource::new(
        "primary".into(),
        std::env::temp_dir().join("handover-test-does-not-exist.json"),
    );

    let err = source.fetch().await.unwrap_err();
    assert!(matches!(
        err,
        HandoverError::SourceUnavailable { ref provider, .. } if provider == "primary"
    ));
}

#[tokio::test]
async fn http_source_rejects_an_invalid_url() {
    let spec = ProviderSpec {
        id: "primary".into(),
        enabled: true,
        secrets: SecretSpec::Http {
            url: "://not-a-url".into(),
            bearer_token_env: None,
        },
        metadata_addr: None,
        runtime_env: None,
    };

    // The Ok type (`Box<dyn SecretSource>`) does not implement `Debug`, so
    // `unwrap_err()` is unavailable; `.err().expect(..)` extracts the error
    // without requiring `Debug` on the Ok value.
    let err = sources::build_source(&spec)
        .await
        .err()
        .expect("expected an invalid-url error");
    assert!(matches!(err, HandoverError::UriParse { .. }));
}

#[tokio::test]
async fn build_source_wires_the_declared_kind() {
    let path = temp_payload_file("kind");
    let spec = ProviderSpec {
        id: "primary".into(),
        enabled: true,
        secrets: SecretSpec::File { path: path.clone() },
        metadata_addr: None,
        runtime_env: None,
    };

    let source = sources::build_source(&spec).await.unwrap();
    assert_eq!(source.name(), "file");

    std::fs::remove_file(path).unwrap();
}
