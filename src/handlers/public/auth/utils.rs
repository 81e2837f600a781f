use tower_cookies::cookie::{time::Duration, SameSite};
use tower_cookies::{Cookie, Cookies};

use crate::config;

/// Holds `state.verifier` between sign-in and callback
pub const LOGIN_STATE_COOKIE: &str = "ap_login_state";

/// Time allowed to complete the provider's consent screen
pub const LOGIN_STATE_MAX_AGE_MINUTES: i64 = 10;

fn build(name: String, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(config::config().security.secure_cookies)
        // Lax so the cookie survives the top-level redirect back from the provider
        .same_site(SameSite::Lax)
        .build()
}

/// Session cookie lives as long as the token it carries
pub fn set_session_cookie(cookies: &Cookies, token: String) {
    let security = &config::config().security;
    let mut cookie = build(security.session_cookie.clone(), token);
    cookie.set_max_age(Duration::hours(security.jwt_expiry_hours as i64));
    cookies.add(cookie);
}

pub fn set_login_state_cookie(cookies: &Cookies, value: String) {
    let mut cookie = build(LOGIN_STATE_COOKIE.to_string(), value);
    cookie.set_max_age(Duration::minutes(LOGIN_STATE_MAX_AGE_MINUTES));
    cookies.add(cookie);
}

/// Expired cookie with the same name and path, sent whether or not the request carried it
pub fn clear_cookie(cookies: &Cookies, name: &str) {
    let mut cookie = build(name.to_string(), String::new());
    cookie.make_removal();
    cookies.add(cookie);
}
