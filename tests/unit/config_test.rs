use site_backend::config::Config;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_toml(value: toml::Table) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(toml::to_string(&value).unwrap().as_bytes())
        .unwrap();
    file
}

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.server_host, "127.0.0.1");
    assert_eq!(config.server_port, 8080);
    assert_eq!(config.database_url(), None);
    assert_eq!(config.database_name, "website");
    assert_eq!(config.max_connections, 10);
    assert_eq!(config.log_level, "info");
    assert!(config.static_dir.is_none());
}

#[test]
fn test_config_loads_file_over_defaults() {
    let mut table = toml::Table::new();
    table.insert("server_port".into(), toml::Value::Integer(9090));
    table.insert(
        "database_url".into(),
        toml::Value::String("sqlite://data/site.db".into()),
    );
    table.insert("database_name".into(), toml::Value::String("leads".into()));
    table.insert("static_dir".into(), toml::Value::String("public".into()));
    let file = write_toml(table);

    let config = Config::load_from(file.path()).unwrap();

    assert_eq!(config.server_port, 9090);
    assert_eq!(config.database_url(), Some("sqlite://data/site.db"));
    assert_eq!(config.database_name, "leads");
    assert_eq!(config.static_dir.as_deref(), Some("public"));
    // Untouched keys keep their defaults
    assert_eq!(config.max_connections, 10);
    assert_eq!(config.local_store_path, "data/conversations.json");
}

#[test]
fn test_config_rejects_out_of_range_values() {
    let mut table = toml::Table::new();
    table.insert("max_connections".into(), toml::Value::Integer(0));
    let file = write_toml(table);

    assert!(Config::load_from(file.path()).is_err());
}

#[test]
fn test_config_requires_explicit_file_to_exist() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(Config::load_from(&missing).is_err());
}
