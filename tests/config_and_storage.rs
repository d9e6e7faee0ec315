use std::io::Write;

use careeros::core::repos::UserRepository;
use careeros::core::{AppConfig, Database};
use tempfile::{tempdir, NamedTempFile};

#[test]
fn yaml_file_overrides_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "server:\n  address: 0.0.0.0\n  port: 9090\nauth:\n  secret_key: from-file\n  token_ttl_minutes: 60\nai:\n  api_key: \"\"\n  timeout_seconds: 10\nlogging:\n  json: true"
    )
    .unwrap();

    let config = AppConfig::from_file(file.path()).unwrap();
    assert_eq!(config.server.address, "0.0.0.0");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.auth.secret_key, "from-file");
    assert_eq!(config.auth.token_ttl_minutes, 60);
    assert!(config.ai.api_key.is_none());
    assert_eq!(config.ai.timeout_seconds, 10);
    assert_eq!(config.ai.model, "gemini-2.0-flash");
    assert!(config.logging.json);
    assert_eq!(config.database.url, "sqlite:careeros.db?mode=rwc");
}

#[test]
fn env_wins_over_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "database:\n  url: sqlite:from-file.db").unwrap();

    let mut config = AppConfig::from_file(file.path()).unwrap();
    config.apply_env(|key| match key {
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        _ => None,
    });
    assert_eq!(config.database.url, "sqlite::memory:");
}

#[test]
fn missing_or_broken_files_are_errors() {
    let dir = tempdir().unwrap();
    assert!(AppConfig::load(Some(dir.path().join("absent.yaml").as_path())).is_err());

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "server: [not, a, map]").unwrap();
    assert!(AppConfig::from_file(file.path()).is_err());
}

#[tokio::test]
async fn database_file_persists_across_connections() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("careeros.db");

    {
        let db = Database::open(&path).await.unwrap();
        UserRepository::new(&db)
            .create("keep@example.com", "salt:hash")
            .await
            .unwrap();
    }

    let db = Database::open(&path).await.unwrap();
    let user = UserRepository::new(&db)
        .find_by_email("keep@example.com")
        .await
        .unwrap();
    assert!(user.is_some());
}
