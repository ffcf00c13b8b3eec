//! OAuth sign-in initiation and resumption.
//!
//! `connect` stashes a [`PendingOAuthRequest`] and asks an [`AuthClient`] where
//! to send the browser. `resume` takes the pending request back out once the
//! authorization server redirects to the callback.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::error::{OAuthError, Result};
use crate::pending::{PendingOAuthRequest, SharedPendingStore};
use crate::pkce::{self, OAuthEndpoints, PkceChallenge};
use crate::registry::split_provider_id;

/// How long a pending sign-in stays resumable.
pub const PENDING_TTL_MINUTES: i64 = 10;

/// Arguments handed to an [`AuthClient`].
#[derive(Debug, Clone)]
pub struct SignInRequest {
    pub provider_id: String,
    /// Where the authorization server should send the browser back to.
    pub callback_url: String,
    pub scopes: Vec<String>,
    pub state: String,
    pub code_challenge: String,
}

/// Where to send the browser to continue the sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignInRedirect {
    pub url: String,
    pub state: String,
}

/// External authentication client.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Start a sign-in for `request.provider_id`.
    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInRedirect>;
}

/// Shared auth client for use across async contexts.
pub type SharedAuthClient = Arc<dyn AuthClient>;

/// Auth client that builds PKCE authorization URLs from configured endpoints.
///
/// Endpoints are looked up by full provider id first, then by base provider,
/// so `google` endpoints serve every `google-*` service.
#[derive(Debug, Clone, Default)]
pub struct AuthorizeUrlClient {
    endpoints: HashMap<String, OAuthEndpoints>,
}

impl AuthorizeUrlClient {
    pub fn new(endpoints: HashMap<String, OAuthEndpoints>) -> Self {
        Self { endpoints }
    }

    /// Register endpoints for a provider id or base provider.
    pub fn with_endpoints(mut self, provider: impl Into<String>, endpoints: OAuthEndpoints) -> Self {
        self.endpoints.insert(provider.into(), endpoints);
        self
    }

    fn endpoints_for(&self, provider_id: &str) -> Option<&OAuthEndpoints> {
        self.endpoints
            .get(provider_id)
            .or_else(|| self.endpoints.get(split_provider_id(provider_id).0))
    }
}

#[async_trait]
impl AuthClient for AuthorizeUrlClient {
    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInRedirect> {
        let endpoints = self.endpoints_for(&request.provider_id).ok_or_else(|| {
            OAuthError::Config(format!(
                "No OAuth endpoints configured for provider '{}'",
                request.provider_id
            ))
        })?;

        let redirect_uri = endpoints
            .redirect_uri
            .as_deref()
            .unwrap_or(&request.callback_url);
        let url = pkce::build_authorization_url(
            endpoints,
            redirect_uri,
            &request.scopes,
            &request.code_challenge,
            &request.state,
        );

        Ok(SignInRedirect {
            url,
            state: request.state.clone(),
        })
    }
}

/// What the caller wants to connect.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub service_id: String,
    pub provider_id: String,
    pub requested_scopes: Vec<String>,
    /// The page to come back to (the current page URL).
    pub return_url: String,
}

/// A pending sign-in matched with its authorization code.
#[derive(Debug, Clone)]
pub struct ResumedSignIn {
    pub request: PendingOAuthRequest,
    pub code: String,
}

/// Connect/resume flow over a pending store and an auth client.
#[derive(Clone)]
pub struct SignInFlow {
    store: SharedPendingStore,
    auth: SharedAuthClient,
    ttl: Duration,
}

impl SignInFlow {
    pub fn new(store: SharedPendingStore, auth: SharedAuthClient) -> Self {
        Self {
            store,
            auth,
            ttl: Duration::minutes(PENDING_TTL_MINUTES),
        }
    }

    /// Override how long pending requests stay resumable.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Stash the request and initiate sign-in.
    ///
    /// On failure the stashed request is dropped and the error is logged and
    /// returned. Nothing is retried.
    pub async fn connect(&self, request: ConnectRequest) -> Result<SignInRedirect> {
        let pkce = PkceChallenge::generate();
        let state = pkce::generate_state();

        let pending = PendingOAuthRequest {
            state: state.clone(),
            service_id: request.service_id,
            provider_id: request.provider_id.clone(),
            requested_scopes: request.requested_scopes.clone(),
            return_url: request.return_url.clone(),
            code_verifier: pkce.verifier,
            created_at: Utc::now(),
        };
        self.store.save(&pending).await?;

        let sign_in = SignInRequest {
            provider_id: request.provider_id,
            callback_url: request.return_url,
            scopes: request.requested_scopes,
            state: state.clone(),
            code_challenge: pkce.challenge,
        };

        match self.auth.sign_in(&sign_in).await {
            Ok(redirect) => {
                tracing::debug!(provider_id = %sign_in.provider_id, "OAuth sign-in initiated");
                Ok(redirect)
            }
            Err(e) => {
                tracing::error!(provider_id = %sign_in.provider_id, error = %e, "OAuth sign-in failed");
                if let Err(cleanup) = self.store.remove(&state).await {
                    tracing::warn!(error = %cleanup, "Failed to drop pending OAuth request");
                }
                Err(e)
            }
        }
    }

    /// Match a callback to its pending request.
    ///
    /// The pending request is consumed even when it turns out to be expired.
    pub async fn resume(&self, callback: &str) -> Result<ResumedSignIn> {
        let params = pkce::parse_callback(callback)?;

        let request = self.store.take(&params.state).await?.ok_or_else(|| {
            OAuthError::InvalidRequest(
                "No pending sign-in matches this state. Possible CSRF or a reused callback."
                    .to_string(),
            )
        })?;

        if request.is_expired_at(Utc::now(), self.ttl) {
            return Err(OAuthError::Expired(request.provider_id));
        }

        Ok(ResumedSignIn {
            request,
            code: params.code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::{InMemoryPendingStore, PendingRequestStore};

    #[derive(Debug)]
    struct FailingAuth;

    #[async_trait]
    impl AuthClient for FailingAuth {
        async fn sign_in(&self, _request: &SignInRequest) -> Result<SignInRedirect> {
            Err(OAuthError::Network("connection refused".to_string()))
        }
    }

    fn google_client() -> AuthorizeUrlClient {
        AuthorizeUrlClient::default().with_endpoints(
            "google",
            OAuthEndpoints {
                client_id: "gclient".to_string(),
                authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
                redirect_uri: None,
            },
        )
    }

    fn connect_request() -> ConnectRequest {
        ConnectRequest {
            service_id: "sheets".to_string(),
            provider_id: "google-sheets".to_string(),
            requested_scopes: vec!["https://www.googleapis.com/auth/spreadsheets".to_string()],
            return_url: "https://app.example.com/w/7".to_string(),
        }
    }

    #[tokio::test]
    async fn test_connect_stashes_pending_request() {
        let store = Arc::new(InMemoryPendingStore::new());
        let flow = SignInFlow::new(store.clone(), Arc::new(google_client()));

        let redirect = flow.connect(connect_request()).await.unwrap();
        assert!(redirect.url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(redirect.url.contains("client_id=gclient"));
        assert!(redirect.url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fw%2F7"));

        let pending = store.list().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].state, redirect.state);
        assert_eq!(pending[0].service_id, "sheets");
        assert_eq!(pending[0].return_url, "https://app.example.com/w/7");
        assert!(redirect.url.contains(&format!(
            "code_challenge={}",
            pkce::challenge_for(&pending[0].code_verifier)
        )));
    }

    #[tokio::test]
    async fn test_connect_failure_drops_pending() {
        let store = Arc::new(InMemoryPendingStore::new());
        let flow = SignInFlow::new(store.clone(), Arc::new(FailingAuth));

        let err = flow.connect(connect_request()).await.unwrap_err();
        assert!(matches!(err, OAuthError::Network(_)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connect_unconfigured_provider() {
        let store = Arc::new(InMemoryPendingStore::new());
        let flow = SignInFlow::new(store, Arc::new(google_client()));

        let mut request = connect_request();
        request.provider_id = "slack".to_string();
        let err = flow.connect(request).await.unwrap_err();
        assert!(matches!(err, OAuthError::Config(_)));
    }

    #[tokio::test]
    async fn test_fixed_redirect_uri_wins() {
        let client = AuthorizeUrlClient::default().with_endpoints(
            "github-repo",
            OAuthEndpoints {
                client_id: "gh".to_string(),
                authorize_url: "https://github.com/login/oauth/authorize".to_string(),
                redirect_uri: Some("https://app.example.com/oauth/callback".to_string()),
            },
        );
        let redirect = client
            .sign_in(&SignInRequest {
                provider_id: "github-repo".to_string(),
                callback_url: "https://app.example.com/w/1".to_string(),
                scopes: vec![],
                state: "st".to_string(),
                code_challenge: "ch".to_string(),
            })
            .await
            .unwrap();
        assert!(
            redirect
                .url
                .contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Foauth%2Fcallback")
        );
    }

    #[tokio::test]
    async fn test_resume_round_trip() {
        let store = Arc::new(InMemoryPendingStore::new());
        let flow = SignInFlow::new(store.clone(), Arc::new(google_client()));

        let redirect = flow.connect(connect_request()).await.unwrap();
        let callback = format!(
            "https://app.example.com/w/7?code=authcode&state={}",
            urlencoding::encode(&redirect.state)
        );

        let resumed = flow.resume(&callback).await.unwrap();
        assert_eq!(resumed.code, "authcode");
        assert_eq!(resumed.request.provider_id, "google-sheets");

        // Single use.
        assert!(flow.resume(&callback).await.is_err());
    }

    #[tokio::test]
    async fn test_resume_respects_custom_ttl() {
        let store = Arc::new(InMemoryPendingStore::new());
        let flow = SignInFlow::new(store.clone(), Arc::new(google_client()))
            .with_ttl(Duration::minutes(-1));

        let redirect = flow.connect(connect_request()).await.unwrap();
        let err = flow
            .resume(&format!("authcode#{}", redirect.state))
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::Expired(ref p) if p == "google-sheets"));

        let lenient = SignInFlow::new(store, Arc::new(google_client()))
            .with_ttl(Duration::hours(1));
        let redirect = lenient.connect(connect_request()).await.unwrap();
        let resumed = lenient
            .resume(&format!("authcode#{}", redirect.state))
            .await
            .unwrap();
        assert_eq!(resumed.request.service_id, "sheets");
    }

    #[tokio::test]
    async fn test_resume_unknown_state() {
        let flow = SignInFlow::new(
            Arc::new(InMemoryPendingStore::new()),
            Arc::new(google_client()),
        );
        let err = flow.resume("code#nobody").await.unwrap_err();
        assert!(matches!(err, OAuthError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_resume_expired() {
        let store = Arc::new(InMemoryPendingStore::new());
        store
            .save(&PendingOAuthRequest {
                state: "old".to_string(),
                service_id: "drive".to_string(),
                provider_id: "google-drive".to_string(),
                requested_scopes: vec![],
                return_url: "https://app.example.com".to_string(),
                code_verifier: "v".to_string(),
                created_at: Utc::now() - Duration::minutes(30),
            })
            .await
            .unwrap();

        let flow = SignInFlow::new(store.clone(), Arc::new(google_client()));
        let err = flow.resume("code#old").await.unwrap_err();
        assert!(matches!(err, OAuthError::Expired(ref p) if p == "google-drive"));
        assert!(store.list().await.unwrap().is_empty());
    }
}
