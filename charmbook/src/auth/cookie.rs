//! Session cookie formatting and parsing.

use super::token::SESSION_TTL_SECS;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "auth";

/// Builds `Set-Cookie` values for the session cookie
///
/// The cookie is always `HttpOnly` and scoped to `/`. Whether it also carries
/// `Secure` is a deployment decision passed in by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookie {
    secure: bool,
}

impl SessionCookie {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Cookie carrying a freshly issued token
    pub fn issue(&self, token: &str) -> String {
        self.render(token, SESSION_TTL_SECS)
    }

    /// Already-expired, empty cookie that makes the browser drop the session
    pub fn clear(&self) -> String {
        self.render("", -1)
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!("{SESSION_COOKIE}={value}; Path=/; Max-Age={max_age}; HttpOnly");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Extract a cookie value from a `Cookie` request header
///
/// Returns `None` when the cookie is absent or empty.
pub fn read_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}
