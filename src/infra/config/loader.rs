use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::infra::{
    config::{file_config::FileConfig, AppConfig},
    error::AppError,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub fn load(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = AppConfig::default();

    if !config_path.exists() {
        return Ok(config);
    }

    let raw = fs::read_to_string(&config_path).map_err(|source| AppError::ConfigRead {
        path: config_path.clone(),
        source,
    })?;

    let file_config: FileConfig = toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
        path: config_path,
        source,
    })?;

    file_config.merge_into(&mut config);
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), AppError> {
    if config.broadcast.max_recipients == 0 {
        return Err(AppError::ConfigInvalid {
            key: "broadcast.max_recipients",
            details: "must be greater than zero".to_owned(),
        });
    }

    if config.reader.buffer_bytes == 0 {
        return Err(AppError::ConfigInvalid {
            key: "reader.buffer_bytes",
            details: "must be greater than zero".to_owned(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_defaults_when_file_is_missing() {
        let config = load(Some(Path::new("./missing-config.toml"))).expect("config must load");

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.room.base_dir, PathBuf::from("/tmp"));
        assert_eq!(config.broadcast.max_recipients, 256);
    }

    #[test]
    fn merges_file_values_over_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            r#"[logging]
level = "debug"

[room]
base_dir = "/var/tmp"

[broadcast]
max_recipients = 8
"#,
        )
        .expect("must write test config");

        let config = load(Some(&config_path)).expect("config must load");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.room.base_dir, PathBuf::from("/var/tmp"));
        assert_eq!(config.room.prefix, "chatroom-");
        assert_eq!(config.broadcast.max_recipients, 8);
        assert_eq!(config.broadcast.delivery_timeout_ms, 1_000);
    }

    #[test]
    fn rejects_zero_recipient_bound() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[broadcast]\nmax_recipients = 0\n").expect("write config");

        let result = load(Some(&config_path));

        assert!(matches!(
            result,
            Err(AppError::ConfigInvalid {
                key: "broadcast.max_recipients",
                ..
            })
        ));
    }

    #[test]
    fn reports_malformed_toml() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[reader\nbuffer_bytes = ").expect("write config");

        assert!(matches!(
            load(Some(&config_path)),
            Err(AppError::ConfigParse { .. })
        ));
    }
}
