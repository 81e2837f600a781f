//! OAuth 2.0 authorization-code client for the external identity provider

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::OAuthConfig;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("OAuth provider not configured: {0}")]
    NotConfigured(&'static str),
    #[error("Invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Provider rejected the request: {0}")]
    Rejected(String),
}

/// Identity returned by the provider's userinfo endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderIdentity {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is redirected to for consent
    fn authorize_url(&self, state: &str, code_challenge: &str) -> Result<Url, OAuthError>;

    /// Exchange an authorization code for the caller's identity
    async fn identify(&self, code: &str, code_verifier: &str) -> Result<ProviderIdentity, OAuthError>;
}

pub struct HttpIdentityProvider {
    config: OAuthConfig,
    client: reqwest::Client,
}

impl HttpIdentityProvider {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn ensure_configured(&self) -> Result<(), OAuthError> {
        if self.config.client_id.is_empty() {
            return Err(OAuthError::NotConfigured("OAUTH_CLIENT_ID"));
        }
        if self.config.redirect_url.is_empty() {
            return Err(OAuthError::NotConfigured("OAUTH_REDIRECT_URL"));
        }
        Ok(())
    }

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<String, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code_verifier", code_verifier),
        ];

        let response = self.client.post(&self.config.token_url).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Rejected(format!("token endpoint returned {}: {}", status, body)));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    fn authorize_url(&self, state: &str, code_challenge: &str) -> Result<Url, OAuthError> {
        self.ensure_configured()?;
        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("scope", self.config.scope.as_str()),
                ("state", state),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "S256"),
            ],
        )?;
        Ok(url)
    }

    async fn identify(&self, code: &str, code_verifier: &str) -> Result<ProviderIdentity, OAuthError> {
        self.ensure_configured()?;
        let access_token = self.exchange_code(code, code_verifier).await?;

        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(OAuthError::Rejected(format!("userinfo endpoint returned {}", response.status())));
        }

        let identity: ProviderIdentity = response.json().await?;
        if identity.email_verified == Some(false) {
            return Err(OAuthError::Rejected(format!("email {} is not verified", identity.email)));
        }
        Ok(identity)
    }
}
