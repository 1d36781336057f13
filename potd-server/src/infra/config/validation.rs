use thiserror::Error;

use super::models::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

/// Non-fatal findings surfaced at startup.
#[derive(Debug, Clone, Default)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push(&mut self, message: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint(
        &mut self,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn mentions(&self, needle: &str) -> bool {
        self.items.iter().any(|w| w.message.contains(needle))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigGuardRailError {
    #[error("walk.max_attempts must be at least 1")]
    ZeroMaxAttempts,
    #[error("walk.horizon_days must be at least 1")]
    ZeroHorizon,
    #[error("http.request_timeout must be greater than zero")]
    ZeroTimeout,
    #[error("server.port must be non-zero")]
    ZeroPort,
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    if config.walk.max_attempts == 0 {
        return Err(ConfigGuardRailError::ZeroMaxAttempts);
    }
    if config.walk.horizon_days == 0 {
        return Err(ConfigGuardRailError::ZeroHorizon);
    }
    if config.http.request_timeout.is_zero() {
        return Err(ConfigGuardRailError::ZeroTimeout);
    }
    if config.server.port == 0 {
        return Err(ConfigGuardRailError::ZeroPort);
    }

    let mut warnings = ConfigWarnings::default();
    if config.walk.horizon_days < config.walk.max_attempts {
        warnings.push(format!(
            "walk.horizon_days ({}) is below walk.max_attempts ({}); walks stop at the horizon first",
            config.walk.horizon_days, config.walk.max_attempts
        ));
    }
    if let Some(store) = &config.store
        && store.api_key.is_empty()
    {
        warnings.push_with_hint(
            "store.url is set without an API key",
            "Set POTD_STORE_KEY or store.api_key",
        );
    }
    Ok(warnings)
}
