use rigwatch::config::{Config, ConfigOverrides};
use rigwatch::errors::ConfigError;
use tempfile::tempdir;

#[tokio::test]
async fn loads_full_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rigwatch.toml");
    std::fs::write(
        &path,
        r#"
callsign = "KD2XYZ"
radio = "IC-705"

[hamlib]
server = "shack-pi:4532"
poll_interval_ms = 750
poll_jitter_ms = 250
query_timeout_ms = 1200

[firebase]
project = "field-day"
url = ""
token = "/etc/rigwatch/token"

[logging]
level = "debug"
file = "rigwatch.log"
"#,
    )
    .unwrap();

    let config = Config::load(path.to_str().unwrap()).await.unwrap();
    config.validate().unwrap();
    assert_eq!(config.callsign, "KD2XYZ");
    assert_eq!(config.radio, "IC-705");
    assert_eq!(config.hamlib.server, "shack-pi:4532");
    assert_eq!(config.poll_interval().as_millis(), 750);
    assert_eq!(config.poll_jitter().as_millis(), 250);
    assert_eq!(config.query_timeout().as_millis(), 1200);
    assert_eq!(
        config.database_url(),
        "https://field-day-default-rtdb.firebaseio.com"
    );
    assert_eq!(config.firebase.token.as_deref(), Some("/etc/rigwatch/token"));
    assert_eq!(config.log_level(), Some(log::LevelFilter::Debug));
    assert_eq!(config.logging.file.as_deref(), Some("rigwatch.log"));
}

#[tokio::test]
async fn missing_default_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rigwatch.toml");
    let mut config = Config::load_or_default(path.to_str().unwrap(), false)
        .await
        .unwrap();
    assert_eq!(config.hamlib.server, "localhost:4532");
    assert!(config.validate().is_err(), "callsign is still required");

    config.apply_overrides(ConfigOverrides {
        callsign: Some("W1AW".to_string()),
        ..ConfigOverrides::default()
    });
    assert!(config.validate().is_ok());
}

#[tokio::test]
async fn missing_explicit_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.toml");
    let err = Config::load_or_default(path.to_str().unwrap(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[tokio::test]
async fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rigwatch.toml");
    std::fs::write(&path, "callsign = [not toml").unwrap();
    let err = Config::load_or_default(path.to_str().unwrap(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("rigwatch.toml"));
}
