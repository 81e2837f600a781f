//! PKCE (RFC 7636) verifier/challenge pair and the login state cookie payload

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sha2::{Digest, Sha256};

fn random_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// S256 code challenge for a verifier
pub fn challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// State and verifier kept in a short-lived cookie between sign-in and callback
#[derive(Debug, Clone, PartialEq)]
pub struct LoginState {
    pub state: String,
    pub verifier: String,
}

impl LoginState {
    pub fn generate() -> Self {
        Self {
            state: random_token(),
            verifier: random_token(),
        }
    }

    pub fn challenge(&self) -> String {
        challenge(&self.verifier)
    }

    pub fn to_cookie_value(&self) -> String {
        format!("{}.{}", self.state, self.verifier)
    }

    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let (state, verifier) = value.split_once('.')?;
        if state.is_empty() || verifier.is_empty() {
            return None;
        }
        Some(Self {
            state: state.to_string(),
            verifier: verifier.to_string(),
        })
    }
}
