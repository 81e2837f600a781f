#![allow(dead_code)]

pub mod db;

use std::sync::Arc;

use accesspoint_control::app_with_provider;
use accesspoint_control::auth::oauth::{IdentityProvider, OAuthError, ProviderIdentity};
use accesspoint_control::auth::{generate_jwt, Claims};
use accesspoint_control::types::Rol;
use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use url::Url;
use uuid::Uuid;

pub const AUTHORIZE_URL: &str = "https://idp.test/authorize";

/// Provider that builds authorize URLs but never completes a login
pub struct FakeProvider;

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn authorize_url(&self, state: &str, code_challenge: &str) -> Result<Url, OAuthError> {
        Ok(Url::parse_with_params(
            AUTHORIZE_URL,
            &[("state", state), ("code_challenge", code_challenge)],
        )?)
    }

    async fn identify(&self, _code: &str, _code_verifier: &str) -> Result<ProviderIdentity, OAuthError> {
        Err(OAuthError::Rejected("fake provider".to_string()))
    }
}

/// Full router, in process. The pool is created lazily, so requests rejected
/// before any query never need a database.
pub fn router() -> Router {
    app_with_provider(Arc::new(FakeProvider))
}

pub fn token(role: Rol) -> String {
    let claims = Claims::new(
        Uuid::new_v4(),
        format!("{}@accesspoint.cl", role.as_str().to_lowercase()),
        "Usuario de prueba".to_string(),
        role,
    );
    generate_jwt(&claims).expect("sign test token")
}

pub fn admin() -> String {
    token(Rol::Admin)
}

pub fn tecnico() -> String {
    token(Rol::Tecnico)
}

pub fn request(method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("build request")
}

pub fn get(path: &str, token: Option<&str>) -> Request<Body> {
    request(Method::GET, path, token, None)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }
}

pub async fn send(request: Request<Body>) -> Result<TestResponse> {
    let response = router().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok(TestResponse { status, headers, body })
}

pub fn assert_error(response: &TestResponse, status: StatusCode, code: &str) {
    assert_eq!(response.status, status, "body: {}", response.body);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["code"], code, "body: {}", response.body);
}
