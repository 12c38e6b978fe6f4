//! services/api/src/web/cookie.rs
//!
//! Reading and writing the session cookie. The cookie carries only the opaque
//! session id; everything else stays on the server.

use axum::http::{header, HeaderMap};

pub const SESSION_COOKIE: &str = "sid";

/// Attributes applied to every session cookie the service sets.
#[derive(Clone, Debug)]
pub struct CookiePolicy {
    pub secure: bool,
    pub max_age_secs: i64,
}

impl CookiePolicy {
    /// `Set-Cookie` value that hands `session_id` to the browser.
    pub fn session_cookie(&self, session_id: &str) -> String {
        self.render(session_id, self.max_age_secs)
    }

    /// `Set-Cookie` value that makes the browser drop the session cookie.
    pub fn clear_cookie(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            SESSION_COOKIE, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Finds the session id among all `Cookie` headers of a request.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (name, value) = c.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn secure_cookie_carries_all_attributes() {
        let policy = CookiePolicy { secure: true, max_age_secs: 86_400 };
        assert_eq!(
            policy.session_cookie("abc"),
            "sid=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=86400; Secure"
        );
    }

    #[test]
    fn clearing_expires_immediately() {
        let policy = CookiePolicy { secure: false, max_age_secs: 86_400 };
        assert_eq!(policy.clear_cookie(), "sid=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
    }

    #[test]
    fn session_id_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("lang=en; sid=xyz-123; a=b"));
        assert_eq!(session_id_from_headers(&headers), Some("xyz-123"));
    }

    #[test]
    fn similar_names_and_empty_values_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("xsid=nope; sid="));
        assert_eq!(session_id_from_headers(&headers), None);
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }
}
