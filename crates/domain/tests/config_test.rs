use dnswire_domain::config::{ConfigError, LogFormat};
use dnswire_domain::{CliOverrides, Config};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.server.dns_port, 53);
    assert_eq!(config.client.upstream, "4.2.2.1:53");
    assert_eq!(config.client.query_timeout(), Duration::from_secs(5));
    assert_eq!(config.transport.max_send, 512);
    assert_eq!(config.transport.pool_size, 16);
    assert_eq!(config.transport.compression_entries, 20);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Text);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_from_file_with_partial_sections() {
    let file = write_config(
        r#"
        [server]
        dns_port = 5353

        [transport]
        max_send = 1232

        [logging]
        format = "json"
        "#,
    );

    let config = Config::load(file.path().to_str(), CliOverrides::default()).unwrap();
    assert_eq!(config.server.dns_port, 5353);
    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.transport.max_send, 1232);
    assert_eq!(config.transport.pool_size, 16);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_cli_overrides_win_over_file() {
    let file = write_config(
        r#"
        [server]
        dns_port = 5353
        bind_address = "127.0.0.1"

        [client]
        upstream = "9.9.9.9:53"
        "#,
    );

    let overrides = CliOverrides {
        dns_port: Some(8053),
        upstream: Some("1.1.1.1:53".to_string()),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };
    let config = Config::load(file.path().to_str(), overrides).unwrap();
    assert_eq!(config.server.dns_port, 8053);
    assert_eq!(config.server.bind_address, "127.0.0.1");
    assert_eq!(config.client.upstream, "1.1.1.1:53");
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_listen_addr_brackets_ipv6() {
    let mut config = Config::default();
    config.server.bind_address = "::1".to_string();
    config.server.dns_port = 5300;
    assert_eq!(config.server.listen_addr(), "[::1]:5300");

    config.server.bind_address = "127.0.0.1".to_string();
    assert_eq!(config.server.listen_addr(), "127.0.0.1:5300");
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut config = Config::default();
    config.transport.max_send = 11;
    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

    let mut config = Config::default();
    config.transport.max_send = 70_000;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.transport.pool_size = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.client.query_timeout_ms = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.client.upstream = "not-an-address".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_malformed_file_is_a_parse_error() {
    let file = write_config("[server\ndns_port = ");
    assert!(matches!(
        Config::load(file.path().to_str(), CliOverrides::default()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_missing_file_is_a_read_error() {
    assert!(matches!(
        Config::load(Some("/nonexistent/dnswire.toml"), CliOverrides::default()),
        Err(ConfigError::FileRead(_, _))
    ));
}
