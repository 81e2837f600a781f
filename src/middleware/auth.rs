use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::config;
use crate::error::ApiError;
use crate::types::Rol;

/// Authenticated user context extracted from the session token
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Rol,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == Rol::Admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            tracing::warn!("User {} ({}) denied: ADMIN role required", self.email, self.role);
            Err(ApiError::forbidden("Se requiere rol ADMIN"))
        }
    }
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        }
    }
}

/// Session middleware: validates the session cookie or bearer token and injects [`SessionUser`]
pub async fn session_auth_middleware(
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_token(request.headers(), &cookies) {
        Ok(token) => token,
        Err(msg) => return ApiError::unauthorized(msg).into_response(),
    };

    let claims = match validate_jwt(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Rejected session token: {}", e);
            return ApiError::unauthorized("Sesión inválida o expirada").into_response();
        }
    };

    request.extensions_mut().insert(SessionUser::from(claims));
    next.run(request).await
}

/// Bearer header first, then the session cookie
fn extract_token(headers: &HeaderMap, cookies: &Cookies) -> Result<String, &'static str> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let auth_str = value.to_str().map_err(|_| "Cabecera Authorization inválida")?;
        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or("La cabecera Authorization debe usar el esquema Bearer")?;
        if token.trim().is_empty() {
            return Err("Token vacío");
        }
        return Ok(token.trim().to_string());
    }

    cookies
        .get(&config::config().security.session_cookie)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or("No autenticado")
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("No autenticado"))
    }
}

/// Extractor for handlers restricted to the ADMIN role
#[derive(Clone, Debug)]
pub struct AdminUser(pub SessionUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = SessionUser::from_request_parts(parts, state).await?;
        user.require_admin()?;
        Ok(AdminUser(user))
    }
}
