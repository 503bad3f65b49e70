//! The schemas and example settings shipped with the crate.

use std::path::PathBuf;

use kiosk_content::config::{parse_config, ServiceConfig};
use kiosk_content::ContentService;
use serde_json::json;

fn manifest_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

async fn service() -> ContentService {
    let mut config = ServiceConfig::default();
    config.schema_dir = manifest_path("schemas");
    let service = ContentService::new(config);
    service.initialize().await.unwrap();
    service
}

#[tokio::test]
async fn test_shipped_schemas_register() {
    let service = service().await;
    assert_eq!(
        service.available_schemas(),
        vec!["branding".to_string(), "sponsors".to_string(), "system".to_string()]
    );
}

#[tokio::test]
async fn test_branding_contract() {
    let service = service().await;

    let valid = json!({
        "logo": {"path": "assets/logo.png", "position": "top-right"},
        "theme": {"primaryColor": "#112233", "secondaryColor": "#aabbcc"}
    });
    assert!(service.validate_content(&valid, "branding").valid);

    let invalid = json!({
        "logo": {"position": "middle"},
        "theme": {"primaryColor": "red", "secondaryColor": "#aabbcc"}
    });
    let result = service.validate_content(&invalid, "branding");
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.starts_with("root/logo: ") && e.contains("path")));
    assert!(result.errors.iter().any(|e| e.starts_with("root/logo/position: ")));
    assert!(result.errors.iter().any(|e| e.starts_with("root/theme/primaryColor: ")));
}

#[tokio::test]
async fn test_sponsors_contract() {
    let service = service().await;

    let valid = json!({
        "sponsors": [
            {"id": "acme", "name": "Acme", "logoPath": "sponsors/acme.png", "active": true}
        ],
        "settings": {"rotationInterval": 10000}
    });
    assert!(service.validate_content(&valid, "sponsors").valid);

    let invalid = json!({
        "sponsors": [{"id": "acme", "name": "Acme", "active": "yes"}]
    });
    let result = service.validate_content(&invalid, "sponsors");
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.starts_with("root: ") && e.contains("settings")));
    assert!(result.errors.iter().any(|e| e.starts_with("root/sponsors/0: ") && e.contains("logoPath")));
    assert!(result.errors.iter().any(|e| e.starts_with("root/sponsors/0/active: ")));
}

#[tokio::test]
async fn test_system_contract() {
    let service = service().await;

    let valid = json!({
        "display": {"resolution": "1920x1080", "orientation": "landscape"},
        "logging": {"level": "info"}
    });
    assert!(service.validate_content(&valid, "system").valid);

    let result = service.validate_content(&json!({"display": {}}), "system");
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 3, "{:?}", result.errors);
}

#[test]
fn test_example_settings_parse() {
    let raw = std::fs::read_to_string(manifest_path("kiosk.example.toml")).unwrap();
    let config = parse_config(&raw).unwrap();
    assert_eq!(config.files.len(), 3);
    assert_eq!(config.files[2].schema.as_deref(), Some("system"));
}
