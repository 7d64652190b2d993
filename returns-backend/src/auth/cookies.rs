use axum::http::HeaderMap;
use axum::http::header::COOKIE;

use returns_common::UserData;

pub const AUTH_TOKEN_COOKIE: &str = "firebase-auth-token";
pub const USER_DATA_COOKIE: &str = "user-data";
pub const REFRESH_TOKEN_COOKIE: &str = "firebase-refresh-token";
pub const SESSION_COOKIE: &str = "session-token";

pub const ALL_AUTH_COOKIES: &[&str] = &[
    AUTH_TOKEN_COOKIE,
    USER_DATA_COOKIE,
    REFRESH_TOKEN_COOKIE,
    SESSION_COOKIE,
];

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

pub fn has_cookie(headers: &HeaderMap, name: &str) -> bool {
    read_cookie(headers, name).is_some()
}

/// `user-data` cookie contents, if present and readable.
pub fn read_user_data(headers: &HeaderMap) -> Option<UserData> {
    let raw = read_cookie(headers, USER_DATA_COOKIE)?;
    let decoded = urlencoding::decode(&raw).ok()?;
    serde_json::from_str(&decoded).ok()
}

/// Builds `Set-Cookie` values with shared attributes.
#[derive(Debug, Clone, Copy)]
pub struct CookieJar {
    pub secure: bool,
    pub max_age_secs: i64,
}

impl CookieJar {
    pub fn new(secure: bool, lifetime_days: i64) -> Self {
        Self {
            secure,
            max_age_secs: lifetime_days * 24 * 60 * 60,
        }
    }

    fn build(&self, name: &str, value: &str, max_age: i64, http_only: bool) -> String {
        let mut cookie = format!("{}={}; Path=/; Max-Age={}; SameSite=Lax", name, value, max_age);
        if http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn auth_token(&self, id_token: &str) -> String {
        self.build(AUTH_TOKEN_COOKIE, id_token, self.max_age_secs, false)
    }

    pub fn user_data(&self, user: &UserData) -> String {
        let json = serde_json::to_string(user).unwrap_or_default();
        self.build(USER_DATA_COOKIE, &urlencoding::encode(&json), self.max_age_secs, false)
    }

    pub fn refresh_token(&self, refresh_token: &str) -> String {
        self.build(REFRESH_TOKEN_COOKIE, refresh_token, self.max_age_secs, true)
    }

    pub fn session(&self, token: &str) -> String {
        self.build(SESSION_COOKIE, token, self.max_age_secs, true)
    }

    /// Expired copies of every auth cookie.
    pub fn cleared(&self) -> Vec<String> {
        ALL_AUTH_COOKIES
            .iter()
            .map(|name| {
                let http_only = *name == REFRESH_TOKEN_COOKIE || *name == SESSION_COOKIE;
                self.build(name, "", 0, http_only)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_read_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; firebase-auth-token=abc"));
        headers.append(COOKIE, HeaderValue::from_static("session-token=s.1"));

        assert_eq!(read_cookie(&headers, AUTH_TOKEN_COOKIE).as_deref(), Some("abc"));
        assert_eq!(read_cookie(&headers, SESSION_COOKIE).as_deref(), Some("s.1"));
        assert!(!has_cookie(&headers, USER_DATA_COOKIE));
    }

    #[test]
    fn test_user_data_cookie_roundtrip() {
        let jar = CookieJar::new(false, 7);
        let user = UserData {
            uid: "u1".into(),
            display_name: Some("Asha Rao".into()),
            email: Some("asha@example.com".into()),
            email_verified: true,
        };
        let set_cookie = jar.user_data(&user);
        assert!(set_cookie.starts_with("user-data=%7B%22uid%22"));

        let value = set_cookie
            .split(';')
            .next()
            .unwrap()
            .trim_start_matches("user-data=")
            .to_string();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&format!("user-data={}", value)).unwrap());
        assert_eq!(read_user_data(&headers), Some(user));
    }

    #[test]
    fn test_cookie_attributes() {
        let jar = CookieJar::new(true, 7);
        assert_eq!(
            jar.auth_token("id"),
            "firebase-auth-token=id; Path=/; Max-Age=604800; SameSite=Lax; Secure"
        );
        assert_eq!(
            jar.session("s"),
            "session-token=s; Path=/; Max-Age=604800; SameSite=Lax; HttpOnly; Secure"
        );

        let plain = CookieJar::new(false, 7);
        assert_eq!(
            plain.refresh_token("r"),
            "firebase-refresh-token=r; Path=/; Max-Age=604800; SameSite=Lax; HttpOnly"
        );
    }

    #[test]
    fn test_cleared_expires_all_four() {
        let cleared = CookieJar::new(false, 7).cleared();
        assert_eq!(cleared.len(), 4);
        assert!(cleared.iter().all(|c| c.contains("Max-Age=0")));
        assert!(cleared[0].starts_with("firebase-auth-token=;"));
    }
}
