use serde_json::{json, Value};
use tower_cookies::Cookies;

use super::utils::clear_cookie;
use crate::config;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/auth/signout - Clear the session cookie
pub async fn post(cookies: Cookies) -> ApiResult<Value> {
    clear_cookie(&cookies, &config::config().security.session_cookie);
    Ok(ApiResponse::success(json!({ "signedOut": true })))
}
