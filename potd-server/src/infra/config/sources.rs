use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub provider: FileProviderConfig,
    #[serde(default)]
    pub store: FileStoreConfig,
    #[serde(default)]
    pub cache: FileCacheConfig,
    #[serde(default)]
    pub walk: FileWalkConfig,
    #[serde(default)]
    pub http: FileHttpConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileStoreConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCacheConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileWalkConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizon_days: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileHttpConfig {
    /// Humantime string, e.g. `"8s"` or `"1500ms"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub provider_url: Option<String>,
    pub provider_api_key: Option<String>,
    pub store_url: Option<String>,
    pub store_api_key: Option<String>,
    pub store_table: Option<String>,
    pub store_bucket: Option<String>,
    pub cache_root: Option<PathBuf>,
    pub walk_max_attempts: Option<u32>,
    pub walk_horizon_days: Option<u32>,
    pub request_timeout: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key).filter(|value| !value.trim().is_empty())
        };

        Self {
            config_path: var("POTD_CONFIG_PATH").map(PathBuf::from),
            server_host: var("SERVER_HOST"),
            server_port: var("SERVER_PORT").and_then(|s| s.parse().ok()),
            provider_url: var("POTD_PROVIDER_URL"),
            provider_api_key: var("NASA_API_KEY"),
            store_url: var("POTD_STORE_URL"),
            store_api_key: var("POTD_STORE_KEY"),
            store_table: var("POTD_STORE_TABLE"),
            store_bucket: var("POTD_STORE_BUCKET"),
            cache_root: var("POTD_CACHE_DIR").map(PathBuf::from),
            walk_max_attempts: var("POTD_WALK_MAX_ATTEMPTS")
                .and_then(|s| s.parse().ok()),
            walk_horizon_days: var("POTD_WALK_HORIZON_DAYS")
                .and_then(|s| s.parse().ok()),
            request_timeout: var("POTD_REQUEST_TIMEOUT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn blank_and_unparsable_values_are_ignored() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SERVER_PORT", "not-a-port"),
            ("NASA_API_KEY", "   "),
            ("POTD_WALK_MAX_ATTEMPTS", "7"),
        ]);
        let env = EnvConfig::from_lookup(|key| {
            vars.get(key).map(|v| v.to_string())
        });

        assert_eq!(env.server_port, None);
        assert_eq!(env.provider_api_key, None);
        assert_eq!(env.walk_max_attempts, Some(7));
    }

    #[test]
    fn file_config_accepts_partial_tables() {
        let file: FileConfig = toml::from_str(
            r#"
            [walk]
            horizon_days = 30

            [http]
            request_timeout = "2s"
            "#,
        )
        .unwrap();

        assert_eq!(file.walk.horizon_days, Some(30));
        assert_eq!(file.walk.max_attempts, None);
        assert_eq!(file.http.request_timeout.as_deref(), Some("2s"));
        assert!(file.store.url.is_none());
    }
}
