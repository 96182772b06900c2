use std::{env, fs};

use jobly_server::StorageBackend;
use jobly_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("jobly.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081
body_limit_bytes = 1024

[storage]
backend = "memory"

[storage.postgres]
min_connections = 2
max_lifetime_secs = 600

[[storage.memory.companies]]
handle = "c1"
name = "C1"
description = "Desc1"

[[storage.memory.companies]]
handle = "c2"
name = "C2"
description = "Desc2"

[auth]
secret_key = "file-secret"

[logging]
level = "debug"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.server.body_limit_bytes, 1024);
    assert_eq!(cfg.storage.backend, StorageBackend::Memory);
    assert_eq!(cfg.storage.memory.companies.len(), 2);
    assert_eq!(cfg.storage.memory.companies[1].handle, "c2");
    assert_eq!(cfg.storage.postgres.min_connections, Some(2));
    assert_eq!(cfg.storage.postgres.max_lifetime_secs, Some(600));
    assert_eq!(cfg.auth.secret_key, "file-secret");
    assert_eq!(cfg.auth.token_ttl_secs, None);
    assert_eq!(cfg.logging.level.to_ascii_lowercase(), "debug");

    // 2) Env override should win over file
    unsafe {
        env::set_var("JOBLY__SERVER__PORT", "9090");
        env::set_var("JOBLY__AUTH__SECRET_KEY", "env-secret");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9090);
    assert_eq!(cfg_env.auth.secret_key, "env-secret");
    unsafe {
        env::remove_var("JOBLY__SERVER__PORT");
        env::remove_var("JOBLY__AUTH__SECRET_KEY");
    }

    // 3) Missing file falls back to defaults
    let missing = dir.path().join("missing.toml");
    let cfg_default = load_config(missing.to_str()).expect("defaults should load");
    assert_eq!(cfg_default.server.port, 3001);
    assert_eq!(cfg_default.storage.backend, StorageBackend::Postgres);

    // 4) Invalid config should error
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[storage]
backend = "postgres"

[storage.postgres]
pool_size = 0
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("pool_size must be > 0"));

    let unknown_backend = dir.path().join("unknown.toml");
    fs::write(&unknown_backend, "[storage]\nbackend = \"sqlite\"\n").expect("write toml");
    let err = load_config(unknown_backend.to_str()).expect_err("expected deserialize error");
    assert!(err.contains("config deserialize error"));
}
