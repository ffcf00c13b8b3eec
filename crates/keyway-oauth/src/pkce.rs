//! PKCE helpers and authorization URL construction.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{OAuthError, Result};

/// Authorization endpoints for one OAuth provider id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthEndpoints {
    pub client_id: String,
    pub authorize_url: String,
    /// Fixed redirect URI registered with the provider. When absent, the
    /// caller's callback URL is used.
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

/// PKCE code verifier and challenge pair.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

impl PkceChallenge {
    /// Generate a new PKCE challenge pair.
    pub fn generate() -> Self {
        let mut verifier_bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut verifier_bytes);
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);

        Self {
            challenge: challenge_for(&verifier),
            verifier,
        }
    }
}

/// S256 challenge for a verifier.
pub fn challenge_for(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Generate a random state string for CSRF protection.
pub fn generate_state() -> String {
    let mut state_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut state_bytes);
    URL_SAFE_NO_PAD.encode(state_bytes)
}

/// Build the authorization URL for the OAuth flow.
pub fn build_authorization_url(
    endpoints: &OAuthEndpoints,
    redirect_uri: &str,
    scopes: &[String],
    challenge: &str,
    state: &str,
) -> String {
    let scope = scopes.join(" ");
    let mut params = vec![
        ("client_id", endpoints.client_id.as_str()),
        ("redirect_uri", redirect_uri),
        ("response_type", "code"),
        ("code_challenge", challenge),
        ("code_challenge_method", "S256"),
        ("state", state),
    ];
    if !scope.is_empty() {
        params.insert(3, ("scope", scope.as_str()));
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if endpoints.authorize_url.contains('?') {
        '&'
    } else {
        '?'
    };
    format!("{}{}{}", endpoints.authorize_url, separator, query)
}

/// Authorization response carried back to the callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

/// Parse the authorization response.
///
/// Accepts either the full callback URL (`...?code=..&state=..`) or a pasted
/// `code#state` pair.
pub fn parse_callback(input: &str) -> Result<CallbackParams> {
    let trimmed = input.trim();

    if let Ok(url) = url::Url::parse(trimmed) {
        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => return Err(OAuthError::Denied(value.into_owned())),
                _ => {}
            }
        }
        return match (code, state) {
            (Some(code), Some(state)) if !code.is_empty() && !state.is_empty() => {
                Ok(CallbackParams { code, state })
            }
            _ => Err(OAuthError::InvalidRequest(
                "Callback URL is missing code or state".to_string(),
            )),
        };
    }

    let (code, state) = trimmed.split_once('#').ok_or_else(|| {
        OAuthError::InvalidRequest("Invalid format. Expected a callback URL or code#state".to_string())
    })?;
    if code.is_empty() || state.is_empty() {
        return Err(OAuthError::InvalidRequest(
            "Missing code or state".to_string(),
        ));
    }

    Ok(CallbackParams {
        code: code.to_string(),
        state: state.to_string(),
    })
}
