//! Application configuration loader for Codipop.
//!
//! Reads `config.toml` from the data directory (`~/.codipop/` in production)
//! and deserializes it into [`AppConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use codipop_types::config::AppConfig;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`AppConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
/// - `max_selection` of zero is raised to one so a session can select anything.
pub async fn load_app_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    let mut config = match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            return AppConfig::default();
        }
    };

    if config.max_selection == 0 {
        tracing::warn!("max_selection = 0 in {}, using 1", config_path.display());
        config.max_selection = 1;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_app_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_app_config(tmp.path()).await;
        assert_eq!(config.daily_limit, 10);
        assert_eq!(config.max_selection, 3);
        assert!(config.compositor_token.is_none());
    }

    #[tokio::test]
    async fn load_app_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
compositor_url = "http://localhost:8080/try-on"
daily_limit = 3
request_timeout_secs = 30
"#,
        )
        .await
        .unwrap();

        let config = load_app_config(tmp.path()).await;
        assert_eq!(config.compositor_url, "http://localhost:8080/try-on");
        assert_eq!(config.daily_limit, 3);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_selection, 3);
    }

    #[tokio::test]
    async fn load_app_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_app_config(tmp.path()).await;
        assert_eq!(config.daily_limit, 10);
    }

    #[tokio::test]
    async fn load_app_config_zero_selection_is_raised() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "max_selection = 0")
            .await
            .unwrap();

        let config = load_app_config(tmp.path()).await;
        assert_eq!(config.max_selection, 1);
    }
}
