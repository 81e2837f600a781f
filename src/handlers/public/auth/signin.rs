use std::sync::Arc;

use axum::{response::Redirect, Extension};
use tower_cookies::Cookies;

use super::utils::set_login_state_cookie;
use crate::auth::oauth::IdentityProvider;
use crate::auth::pkce::LoginState;
use crate::error::ApiError;

/// GET /api/auth/signin - Start the authorization-code flow
pub async fn get(
    Extension(provider): Extension<Arc<dyn IdentityProvider>>,
    cookies: Cookies,
) -> Result<Redirect, ApiError> {
    let login = LoginState::generate();
    let url = provider.authorize_url(&login.state, &login.challenge())?;

    set_login_state_cookie(&cookies, login.to_cookie_value());
    Ok(Redirect::to(url.as_str()))
}
