// auth/cookie.rs - Reading and writing the session cookie

use axum::http::{header, HeaderMap, HeaderValue};

use super::SESSION_COOKIE;
use crate::config::{SecurityConfig, MAX_SESSION_TTL_HOURS};

/// Value of a named cookie from the request's Cookie headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_token(headers: &HeaderMap) -> Option<String> {
    read_cookie(headers, SESSION_COOKIE)
}

/// Set-Cookie value carrying a session token with a fixed max-age
pub fn session_cookie(token: &str, security: &SecurityConfig) -> HeaderValue {
    let max_age = security.session_ttl_hours.min(MAX_SESSION_TTL_HOURS) * 3600;
    build(token, max_age, security.cookie_secure)
}

/// Set-Cookie value that removes the session cookie
pub fn cleared_cookie(security: &SecurityConfig) -> HeaderValue {
    build("", 0, security.cookie_secure)
}

fn build(value: &str, max_age: u64, secure: bool) -> HeaderValue {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    // token is base64url and dot separated, always a valid header value
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("mcs51docs_admin_auth=; Path=/; Max-Age=0"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security(secure: bool) -> SecurityConfig {
        SecurityConfig {
            session_secret: "s".into(),
            session_ttl_hours: 2,
            cookie_secure: secure,
        }
    }

    #[test]
    fn finds_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; mcs51docs_admin_auth=abc.def.ghi"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&headers, "theme").as_deref(), Some("dark"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("mcs51docs_admin_auth="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn session_cookie_has_fixed_max_age() {
        let value = session_cookie("tok", &security(true));
        let s = value.to_str().unwrap();
        assert!(s.starts_with("mcs51docs_admin_auth=tok;"));
        assert!(s.contains("Max-Age=7200"));
        assert!(s.ends_with("; Secure"));

        let cleared = cleared_cookie(&security(false));
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn oversized_ttl_caps_max_age() {
        let security = SecurityConfig { session_ttl_hours: u64::MAX, ..security(false) };
        let value = session_cookie("tok", &security);
        let expected = format!("Max-Age={}", MAX_SESSION_TTL_HOURS * 3600);
        assert!(value.to_str().unwrap().contains(&expected));
    }
}
