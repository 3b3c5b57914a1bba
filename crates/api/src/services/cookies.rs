//! Cookie helper for the session and flash cookies.

use axum::http::{header::COOKIE, header::SET_COOKIE, HeaderMap, HeaderValue};

use crate::config::SessionConfig;

/// Builds and reads the cookies the site sets.
///
/// The session cookie carries the raw session token; only its SHA-256 hash
/// is stored server-side. The flash cookie carries one-shot messages shown
/// on the next rendered page.
#[derive(Debug, Clone)]
pub struct CookieHelper {
    config: SessionConfig,
}

impl CookieHelper {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Set-Cookie value for a fresh session token.
    pub fn build_session_cookie(&self, token: &str) -> String {
        self.build_cookie(
            &self.config.cookie_name,
            token,
            self.config.ttl_hours * 3600,
        )
    }

    pub fn build_clear_session_cookie(&self) -> String {
        self.build_clear_cookie(&self.config.cookie_name)
    }

    /// Set-Cookie value for an encoded flash payload. Lives for a few
    /// minutes so an abandoned redirect does not resurface it later.
    pub fn build_flash_cookie(&self, payload: &str) -> String {
        self.build_cookie(&self.config.flash_cookie_name, payload, 300)
    }

    pub fn build_clear_flash_cookie(&self) -> String {
        self.build_clear_cookie(&self.config.flash_cookie_name)
    }

    /// Append a Set-Cookie header, skipping values that are not valid
    /// header text.
    pub fn append(headers: &mut HeaderMap, cookie: &str) {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            headers.append(SET_COOKIE, value);
        }
    }

    /// Extract a cookie value from request headers by name.
    pub fn extract_cookie<'a>(&self, headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|cookie_header| cookie_header.split(';'))
            .map(str::trim)
            .find_map(|cookie| {
                let (cookie_name, cookie_value) = cookie.split_once('=')?;
                (cookie_name == name && !cookie_value.is_empty()).then_some(cookie_value)
            })
    }

    pub fn extract_session_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        self.extract_cookie(headers, &self.config.cookie_name)
    }

    pub fn extract_flash<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        self.extract_cookie(headers, &self.config.flash_cookie_name)
    }

    fn attributes(&self) -> String {
        let mut attrs = String::from("; HttpOnly");
        if self.config.secure {
            attrs.push_str("; Secure");
        }
        attrs.push_str(&format!("; SameSite={}", self.config.same_site));
        attrs
    }

    fn build_cookie(&self, name: &str, value: &str, max_age: i64) -> String {
        format!(
            "{}={}; Path=/; Max-Age={}{}",
            name,
            value,
            max_age,
            self.attributes()
        )
    }

    fn build_clear_cookie(&self, name: &str) -> String {
        format!(
            "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT{}",
            name,
            self.attributes()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secure: bool) -> SessionConfig {
        SessionConfig {
            cookie_name: "club_session".to_string(),
            flash_cookie_name: "club_flash".to_string(),
            ttl_hours: 2,
            secure,
            same_site: "Lax".to_string(),
        }
    }

    #[test]
    fn test_build_session_cookie() {
        let helper = CookieHelper::new(test_config(false));
        let cookie = helper.build_session_cookie("tok");

        assert!(cookie.starts_with("club_session=tok; Path=/"));
        assert!(cookie.contains("Max-Age=7200"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_secure_flag() {
        let helper = CookieHelper::new(test_config(true));
        assert!(helper.build_session_cookie("tok").contains("; Secure"));
        assert!(helper.build_clear_flash_cookie().contains("; Secure"));
    }

    #[test]
    fn test_clear_cookies() {
        let helper = CookieHelper::new(test_config(false));
        let cookie = helper.build_clear_session_cookie();
        assert!(cookie.starts_with("club_session=;"));
        assert!(cookie.contains("Max-Age=0"));

        let flash = helper.build_clear_flash_cookie();
        assert!(flash.starts_with("club_flash=;"));
    }

    #[test]
    fn test_extract_cookies() {
        let helper = CookieHelper::new(test_config(false));
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; club_session=abc123; club_flash=eyJ9"),
        );

        assert_eq!(helper.extract_session_token(&headers), Some("abc123"));
        assert_eq!(helper.extract_flash(&headers), Some("eyJ9"));
        assert_eq!(helper.extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_ignores_empty_value() {
        let helper = CookieHelper::new(test_config(false));
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("club_session="));
        assert_eq!(helper.extract_session_token(&headers), None);
    }

    #[test]
    fn test_append_sets_header() {
        let mut headers = HeaderMap::new();
        CookieHelper::append(&mut headers, "a=b; Path=/");
        CookieHelper::append(&mut headers, "c=d; Path=/");
        assert_eq!(headers.get_all(SET_COOKIE).iter().count(), 2);
    }
}
