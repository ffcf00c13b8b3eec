//! Directory token resolution.
//!
//! Resolution order:
//! 1. Environment variable named by `[server].token_env`
//! 2. Config file (with a warning at load time)

use crate::ServerConfig;

/// Result of token resolution with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
    /// Config file (plaintext, not recommended).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file (plaintext)"),
        }
    }
}

/// Resolve the bearer token for the credential directory.
pub fn resolve_server_token(server: &ServerConfig) -> Option<ResolvedSecret> {
    if !server.token_env.is_empty()
        && let Ok(value) = std::env::var(&server.token_env)
        && !value.is_empty()
    {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(server.token_env.clone()),
        });
    }

    server.token.as_ref().map(|v| ResolvedSecret {
        value: v.clone(),
        source: SecretSource::ConfigFile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_wins_over_config() {
        let server = ServerConfig {
            token_env: "KEYWAY_TEST_TOKEN_ENV_WINS".to_string(),
            token: Some("from-file".to_string()),
            ..Default::default()
        };
        unsafe { std::env::set_var("KEYWAY_TEST_TOKEN_ENV_WINS", "from-env") };

        let secret = resolve_server_token(&server).unwrap();
        assert_eq!(secret.value, "from-env");
        assert_eq!(
            secret.source,
            SecretSource::EnvVar("KEYWAY_TEST_TOKEN_ENV_WINS".to_string())
        );
    }

    #[test]
    fn test_config_fallback() {
        let server = ServerConfig {
            token_env: "KEYWAY_TEST_TOKEN_UNSET".to_string(),
            token: Some("from-file".to_string()),
            ..Default::default()
        };

        let secret = resolve_server_token(&server).unwrap();
        assert_eq!(secret.value, "from-file");
        assert_eq!(secret.source, SecretSource::ConfigFile);
        assert_eq!(secret.source.to_string(), "config file (plaintext)");
    }

    #[test]
    fn test_nothing_configured() {
        let server = ServerConfig {
            token_env: "KEYWAY_TEST_TOKEN_ALSO_UNSET".to_string(),
            ..Default::default()
        };
        assert!(resolve_server_token(&server).is_none());
    }
}
