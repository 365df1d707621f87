//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be written to disk and loaded
//! back with identical field values, including secrets and the webhook policy.

use std::collections::HashMap;
use tempfile::TempDir;
use wadesk_core::config::{BindMode, Config, DuplicatePolicy};

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wadesk.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.server.port, config.server.port);
    assert_eq!(loaded.server.bind, config.server.bind);
    assert_eq!(loaded.store.database_url, config.store.database_url);
    assert_eq!(loaded.webhook.duplicate_policy, DuplicatePolicy::Allow);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wadesk.json5");

    let mut config = Config::default();
    config.server.port = 9090;
    config.server.bind = BindMode::Lan;
    config.whatsapp.access_token = Some("EAAG-token".into());
    config.whatsapp.phone_number_id = Some("1098".into());
    config.whatsapp.verify_token = Some("hub-secret".into());
    config.webhook.duplicate_policy = DuplicatePolicy::Skip;
    config.webhook.use_profile_names = true;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.server.port, 9090);
    assert_eq!(loaded.server.bind, BindMode::Lan);
    assert!(loaded.whatsapp.can_send());
    assert!(loaded.whatsapp.verify_token.as_ref().unwrap().matches("hub-secret"));
    assert_eq!(loaded.webhook.duplicate_policy, DuplicatePolicy::Skip);
    assert!(loaded.webhook.use_profile_names);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_config_hand_written_json5() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wadesk.json5");
    std::fs::write(
        &path,
        r#"{
            // only the sections that differ from defaults
            server: { port: 3000 },
            store: { database_url: "sqlite::memory:" },
        }"#,
    )
    .unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.server.port, 3000);
    assert_eq!(loaded.store.database_url, "sqlite::memory:");
    assert_eq!(loaded.whatsapp.template_language, Config::default().whatsapp.template_language);
}

#[test]
fn test_env_overlay_wins_over_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wadesk.json5");
    std::fs::write(&path, r#"{ server: { port: 3000 } }"#).unwrap();

    let env: HashMap<&str, &str> = [
        ("WADESK_PORT", "4000"),
        ("WHATSAPP_VERIFY_TOKEN", "from-env"),
    ]
    .into_iter()
    .collect();

    let mut config = Config::load(&path).unwrap();
    config.apply_env_with(|name| env.get(name).map(|v| v.to_string()));

    assert_eq!(config.server.port, 4000);
    assert!(config.whatsapp.verify_token.unwrap().matches("from-env"));
}

#[test]
fn test_config_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wadesk.json5");
    std::fs::write(&path, "{ server: { port: ").unwrap();
    assert!(Config::load(&path).is_err());
}
