//! Process-wide core configuration.
//!
//! # Responsibility
//! - Hold settings the embedding process provides once at startup, chiefly
//!   the secret handed to the authentication collaborator.
//!
//! # Invariants
//! - Configuration is initialized at most once and is immutable for the
//!   process lifetime.
//! - Re-initialization with a different configuration is rejected.

use once_cell::sync::OnceCell;

const DEFAULT_SESSION_TTL_DAYS: u32 = 30;

static CONFIG: OnceCell<CoreConfig> = OnceCell::new();

/// Immutable process-wide configuration.
///
/// The core never parses credentials itself; `auth_secret` is only carried
/// for the authentication collaborator that resolves actor identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Signing secret for the authentication collaborator.
    pub auth_secret: String,
    /// Credential lifetime handed to the authentication collaborator.
    pub session_ttl_days: u32,
}

impl CoreConfig {
    /// Creates a configuration with the default session lifetime.
    pub fn new(auth_secret: impl Into<String>) -> Self {
        Self {
            auth_secret: auth_secret.into(),
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
        }
    }
}

/// Installs the process-wide configuration.
///
/// # Invariants
/// - Repeated calls with an equal configuration are idempotent.
/// - Calls conflicting with the active configuration are rejected.
///
/// # Errors
/// - Returns an error when `auth_secret` is blank or `session_ttl_days`
///   is zero.
pub fn init_config(config: CoreConfig) -> Result<(), String> {
    if config.auth_secret.trim().is_empty() {
        return Err("auth_secret cannot be blank".to_string());
    }
    if config.session_ttl_days == 0 {
        return Err("session_ttl_days must be at least 1".to_string());
    }

    if let Some(active) = CONFIG.get() {
        if *active == config {
            return Ok(());
        }
        return Err("configuration already initialized; refusing to replace it".to_string());
    }

    CONFIG
        .set(config)
        .map_err(|_| "configuration already initialized; refusing to replace it".to_string())
}

/// Returns the active configuration, if initialized.
pub fn config() -> Option<&'static CoreConfig> {
    CONFIG.get()
}

#[cfg(test)]
mod tests {
    use super::{init_config, CoreConfig};

    #[test]
    fn blank_secret_is_rejected() {
        let err = init_config(CoreConfig::new("   ")).unwrap_err();
        assert!(err.contains("auth_secret"));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let mut config = CoreConfig::new("secret");
        config.session_ttl_days = 0;
        let err = init_config(config).unwrap_err();
        assert!(err.contains("session_ttl_days"));
    }

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        let config = CoreConfig::new("process secret");
        init_config(config.clone()).expect("first init should succeed");
        init_config(config).expect("same config should be idempotent");

        let err = init_config(CoreConfig::new("other secret")).unwrap_err();
        assert!(err.contains("refusing to replace"));

        let active = super::config().expect("config should be active");
        assert_eq!(active.auth_secret, "process secret");
        assert_eq!(active.session_ttl_days, 30);
    }
}
