//! Cookie builders for access and refresh tokens.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the access token.
pub const PORTAL_ACCESS_TOKEN: &str = "portal_access_token";

/// Cookie name for the refresh token.
pub const PORTAL_REFRESH_TOKEN: &str = "portal_refresh_token";

/// Access-token JWT lifetime in seconds (1 hour).
pub const ACCESS_TOKEN_EXP: u64 = 3600;

/// Refresh-token JWT lifetime in seconds (7 days).
pub const REFRESH_TOKEN_EXP: u64 = 604800;

/// Path the refresh cookie is scoped to (the session rotation endpoint).
pub const REFRESH_COOKIE_PATH: &str = "/api/auth/session";

/// Attributes applied to every session cookie.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// `Domain` attribute; host-only cookie when `None`.
    pub domain: Option<String>,
    /// `Secure` attribute. Disable only for plain-HTTP local development.
    pub secure: bool,
}

fn session_cookie(
    name: &'static str,
    value: String,
    path: &'static str,
    max_age: Duration,
    settings: &CookieSettings,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value))
        .path(path)
        .max_age(max_age)
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax);
    if let Some(domain) = &settings.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

/// Set the access-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use portal_auth_types::cookie::{CookieSettings, set_access_token_cookie, PORTAL_ACCESS_TOKEN};
///
/// let settings = CookieSettings { domain: Some("example.com".to_string()), secure: true };
/// let jar = set_access_token_cookie(CookieJar::new(), "token_value".to_string(), &settings);
/// let cookie = jar.get(PORTAL_ACCESS_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_access_token_cookie(jar: CookieJar, value: String, settings: &CookieSettings) -> CookieJar {
    jar.add(session_cookie(
        PORTAL_ACCESS_TOKEN,
        value,
        "/",
        Duration::seconds(ACCESS_TOKEN_EXP as i64),
        settings,
    ))
}

/// Set the refresh-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use portal_auth_types::cookie::{CookieSettings, set_refresh_token_cookie, PORTAL_REFRESH_TOKEN};
///
/// let settings = CookieSettings { domain: None, secure: false };
/// let jar = set_refresh_token_cookie(CookieJar::new(), "refresh_value".to_string(), &settings);
/// let cookie = jar.get(PORTAL_REFRESH_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/api/auth/session"));
/// assert_eq!(cookie.domain(), None);
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(!cookie.secure().unwrap_or(false));
/// ```
pub fn set_refresh_token_cookie(jar: CookieJar, value: String, settings: &CookieSettings) -> CookieJar {
    jar.add(session_cookie(
        PORTAL_REFRESH_TOKEN,
        value,
        REFRESH_COOKIE_PATH,
        Duration::seconds(REFRESH_TOKEN_EXP as i64),
        settings,
    ))
}

/// Clear both token cookies by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use portal_auth_types::cookie::{
///     clear_cookies, set_access_token_cookie, CookieSettings, PORTAL_ACCESS_TOKEN,
///     PORTAL_REFRESH_TOKEN,
/// };
///
/// let settings = CookieSettings { domain: Some("example.com".to_string()), secure: true };
/// let jar = set_access_token_cookie(CookieJar::new(), "a".to_string(), &settings);
/// let jar = clear_cookies(jar, &settings);
/// assert_eq!(jar.get(PORTAL_ACCESS_TOKEN).unwrap().max_age(), Some(time::Duration::ZERO));
/// assert_eq!(jar.get(PORTAL_REFRESH_TOKEN).unwrap().max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_cookies(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    let access = session_cookie(
        PORTAL_ACCESS_TOKEN,
        String::new(),
        "/",
        Duration::ZERO,
        settings,
    );
    let refresh = session_cookie(
        PORTAL_REFRESH_TOKEN,
        String::new(),
        REFRESH_COOKIE_PATH,
        Duration::ZERO,
        settings,
    );
    jar.add(access).add(refresh)
}
