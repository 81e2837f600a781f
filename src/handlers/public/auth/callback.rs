use std::sync::Arc;

use axum::{response::Redirect, Extension};
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::{info, warn};

use super::utils::{clear_cookie, set_session_cookie, LOGIN_STATE_COOKIE};
use crate::auth::oauth::IdentityProvider;
use crate::auth::pkce::LoginState;
use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::usuarios::find_active_by_email;
use crate::error::ApiError;
use crate::handlers::extract::ApiQuery;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user denies consent
    pub error: Option<String>,
}

/// GET /api/auth/callback - Finish the login and issue the session cookie
pub async fn get(
    Extension(provider): Extension<Arc<dyn IdentityProvider>>,
    cookies: Cookies,
    ApiQuery(query): ApiQuery<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    let stored = cookies
        .get(LOGIN_STATE_COOKIE)
        .and_then(|c| LoginState::from_cookie_value(c.value()))
        .ok_or_else(|| ApiError::bad_request("No hay un inicio de sesión en curso"))?;
    clear_cookie(&cookies, LOGIN_STATE_COOKIE);

    if let Some(error) = query.error {
        warn!("Provider returned error on callback: {}", error);
        return Err(ApiError::unauthorized("Inicio de sesión cancelado"));
    }
    if query.state.as_deref() != Some(stored.state.as_str()) {
        warn!("OAuth state mismatch on callback");
        return Err(ApiError::bad_request("Estado de inicio de sesión inválido"));
    }
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("Falta el código de autorización"))?;

    let identity = provider.identify(&code, &stored.verifier).await?;

    let pool = DatabaseManager::pool()?;
    let usuario = match find_active_by_email(&pool, &identity.email).await? {
        Some(usuario) => usuario,
        None => {
            warn!(email = %identity.email, "Login denied: not a provisioned active user");
            return Err(ApiError::forbidden("Usuario no autorizado para ingresar"));
        }
    };

    let claims = Claims::new(usuario.id, usuario.email.clone(), usuario.nombre.clone(), usuario.rol);
    let token = generate_jwt(&claims)?;
    set_session_cookie(&cookies, token);

    info!(user_id = %usuario.id, email = %usuario.email, role = %usuario.rol, "Login accepted");
    Ok(Redirect::to(&config::config().server.post_login_redirect))
}
