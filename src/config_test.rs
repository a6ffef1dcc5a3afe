use super::*;

// All env mutation happens inside one test so parallel test threads never
// observe a half-written environment.

/// # Safety
/// Only called from `from_env_cases`, which owns these variables.
unsafe fn clear_server_env() {
    unsafe {
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("PORT");
        std::env::remove_var("DB_MAX_CONNECTIONS");
        std::env::remove_var("SAVE_MAX_RECORDS");
    }
}

#[test]
fn from_env_cases() {
    unsafe { clear_server_env() };
    assert_eq!(ServerConfig::from_env(), Err(ConfigError::Missing("DATABASE_URL")));

    unsafe { std::env::set_var("DATABASE_URL", "   ") };
    assert_eq!(ServerConfig::from_env(), Err(ConfigError::Missing("DATABASE_URL")));

    unsafe { std::env::set_var("DATABASE_URL", "postgres://localhost/starchart") };
    let cfg = ServerConfig::from_env().unwrap();
    assert_eq!(
        cfg,
        ServerConfig {
            database_url: "postgres://localhost/starchart".into(),
            port: DEFAULT_PORT,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            save_max_records: DEFAULT_SAVE_MAX_RECORDS,
        }
    );

    unsafe {
        std::env::set_var("PORT", "8080");
        std::env::set_var("DB_MAX_CONNECTIONS", " 12 ");
        std::env::set_var("SAVE_MAX_RECORDS", "250");
    }
    let cfg = ServerConfig::from_env().unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.db_max_connections, 12);
    assert_eq!(cfg.save_max_records, 250);

    unsafe { std::env::set_var("PORT", "eighty") };
    assert_eq!(
        ServerConfig::from_env(),
        Err(ConfigError::Invalid { var: "PORT", value: "eighty".into() })
    );

    unsafe { clear_server_env() };
}

#[test]
fn env_parse_defaults_when_unset() {
    let v: u32 = env_parse("STARCHART_TEST_UNSET_VAR", 42).unwrap();
    assert_eq!(v, 42);
}

#[test]
fn config_error_messages_name_the_variable() {
    assert_eq!(ConfigError::Missing("DATABASE_URL").to_string(), "DATABASE_URL required");
    let err = ConfigError::Invalid { var: "PORT", value: "x".into() };
    assert_eq!(err.to_string(), "invalid PORT: \"x\"");
}
