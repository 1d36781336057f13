use once_cell::sync::Lazy;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use url::Url;

use potd_core::{
    application::{DEFAULT_MAX_WALK_ATTEMPTS, DEFAULT_WALK_HORIZON_DAYS},
    infra::providers::APOD_DEFAULT_BASE,
};

use super::{
    models::{
        CacheConfig, Config, ConfigMetadata, HttpConfig, ProviderConfig,
        ServerConfig, StoreConfig, WalkConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

pub const DEMO_API_KEY: &str = "DEMO_KEY";
pub const DEFAULT_STORE_TABLE: &str = "apod_entries";
pub const DEFAULT_STORE_BUCKET: &str = "apod-images";
pub const DEFAULT_CACHE_ROOT: &str = "./cache/pictures";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![PathBuf::from("potd.toml"), PathBuf::from("config/potd.toml")]
});

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

/// Layers environment over an optional TOML file over built-in defaults.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, read the process environment, then compose.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Compose from an already-gathered environment.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) =
            self.compose_config(file_config, env, config_path)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, explicit) = match (&self.options.config_path, &env.config_path)
        {
            (Some(path), _) => (path.clone(), true),
            (None, Some(path)) => (path.clone(), true),
            (None, None) => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(path) => (path.clone(), false),
                None => return Ok((None, None)),
            },
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
    ) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if file_config.is_none() {
            warnings.push_with_hint(
                "No potd.toml detected; using environment variables and defaults",
                "Pass --config or set POTD_CONFIG_PATH to use a configuration file",
            );
        }

        let FileConfig {
            server: file_server,
            provider: file_provider,
            store: file_store,
            cache: file_cache,
            walk: file_walk,
            http: file_http,
        } = file_config.unwrap_or_default();

        let server = ServerConfig {
            host: env
                .server_host
                .or(file_server.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env.server_port.or(file_server.port).unwrap_or(3000),
        };

        let provider_url = env
            .provider_url
            .or(file_provider.base_url)
            .unwrap_or_else(|| APOD_DEFAULT_BASE.to_string());
        validate_url("provider.base_url", &provider_url)?;
        let api_key = match env.provider_api_key.or(file_provider.api_key) {
            Some(key) => key,
            None => {
                warnings.push_with_hint(
                    "No provider API key configured; using the rate-limited DEMO_KEY",
                    "Set NASA_API_KEY or provider.api_key",
                );
                DEMO_API_KEY.to_string()
            }
        };
        let provider = ProviderConfig {
            base_url: provider_url,
            api_key,
        };

        let store = match env.store_url.or(file_store.url) {
            Some(url) => {
                validate_url("store.url", &url)?;
                Some(StoreConfig {
                    url,
                    api_key: env
                        .store_api_key
                        .or(file_store.api_key)
                        .unwrap_or_default(),
                    table: env
                        .store_table
                        .or(file_store.table)
                        .unwrap_or_else(|| DEFAULT_STORE_TABLE.to_string()),
                    bucket: env
                        .store_bucket
                        .or(file_store.bucket)
                        .unwrap_or_else(|| DEFAULT_STORE_BUCKET.to_string()),
                })
            }
            None => {
                warnings.push_with_hint(
                    "No store configured; records and blobs are kept in memory",
                    "Set POTD_STORE_URL or store.url to persist records",
                );
                None
            }
        };

        let cache = CacheConfig {
            root: env
                .cache_root
                .or(file_cache.root)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_ROOT)),
        };

        let walk = WalkConfig {
            max_attempts: env
                .walk_max_attempts
                .or(file_walk.max_attempts)
                .unwrap_or(DEFAULT_MAX_WALK_ATTEMPTS),
            horizon_days: env
                .walk_horizon_days
                .or(file_walk.horizon_days)
                .unwrap_or(DEFAULT_WALK_HORIZON_DAYS),
        };

        let request_timeout = match env.request_timeout.or(file_http.request_timeout)
        {
            Some(raw) => humantime::parse_duration(raw.trim()).map_err(
                |source| ConfigLoadError::InvalidDuration {
                    key: "http.request_timeout",
                    value: raw.clone(),
                    source,
                },
            )?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };
        let http = HttpConfig { request_timeout };

        let config = Config {
            server,
            provider,
            store,
            cache,
            walk,
            http,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded: false,
            },
        };

        let guard_warnings = validation::apply_guard_rails(&config)?;
        warnings.extend(guard_warnings);

        Ok((config, warnings))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_url(key: &'static str, raw: &str) -> Result<(), ConfigLoadError> {
    Url::parse(raw)
        .map(|_| ())
        .map_err(|source| ConfigLoadError::InvalidUrl {
            key,
            value: raw.to_string(),
            source,
        })
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid URL for {key}: {value}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid duration for {key}: {value}")]
    InvalidDuration {
        key: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
