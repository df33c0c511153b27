// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Login request/response handling for the router's `/login/Auth` endpoint.
//!
//! The router expects the MD5 hex digest of the admin password. This is the
//! firmware's scheme, not a security control.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use smsbridge_core::{SessionCookie, SmsBridgeError};

/// JSON body of the login request.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: String,
}

/// The part of the login response body the client looks at.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "errCode", default)]
    pub err_code: Option<serde_json::Value>,
}

impl LoginResponse {
    /// Success is exactly the number 0.
    pub fn is_success(&self) -> bool {
        self.err_code.as_ref().and_then(serde_json::Value::as_i64) == Some(0)
    }
}

/// Lowercase hex MD5 of the plaintext password.
pub fn hash_password(plain: &str) -> String {
    hex::encode(Md5::digest(plain.as_bytes()))
}

/// Build a `Cookie` header from `Set-Cookie` values: keep each `name=value`
/// segment, drop attributes, join with `"; "`. `None` when nothing usable is left.
pub fn cookie_header<'a, I>(set_cookies: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let pairs: Vec<&str> = set_cookies
        .into_iter()
        .filter_map(|cookie| cookie.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect();
    (!pairs.is_empty()).then(|| pairs.join("; "))
}

/// Decide whether a login response succeeded.
///
/// The HTTP status is not consulted: only the body's `errCode` and the
/// cookies decide.
pub fn evaluate_login<'a, I>(body: &str, set_cookies: I) -> Result<SessionCookie, SmsBridgeError>
where
    I: IntoIterator<Item = &'a str>,
{
    let response: LoginResponse =
        serde_json::from_str(body).map_err(|e| SmsBridgeError::Auth {
            message: format!(
                "login response is not JSON ({e}): {}",
                crate::listing::preview(body, crate::listing::ERROR_PREVIEW_CHARS)
            ),
        })?;

    if !response.is_success() {
        let code = response
            .err_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "missing".to_string());
        return Err(SmsBridgeError::Auth {
            message: format!("router rejected login (errCode {code})"),
        });
    }

    cookie_header(set_cookies)
        .map(SessionCookie::new)
        .ok_or_else(|| SmsBridgeError::Auth {
            message: "login succeeded but the router sent no session cookie".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_password_as_lowercase_md5_hex() {
        assert_eq!(hash_password("admin"), "21232f297a57a5a743894a0e4a801fc3");
        assert_eq!(hash_password(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn cookie_header_strips_attributes() {
        assert_eq!(cookie_header(["a=1; Path=/"]).as_deref(), Some("a=1"));
        assert_eq!(
            cookie_header(["password=abc; Path=/; HttpOnly", "lang=en"]).as_deref(),
            Some("password=abc; lang=en")
        );
    }

    #[test]
    fn cookie_header_is_none_without_cookies() {
        assert_eq!(cookie_header(Vec::<&str>::new()), None);
        assert_eq!(cookie_header(["; Path=/"]), None);
    }

    #[test]
    fn evaluate_login_success() {
        let session = evaluate_login(r#"{"errCode":0}"#, ["a=1; Path=/"]).unwrap();
        assert_eq!(session.as_str(), "a=1");
    }

    #[test]
    fn evaluate_login_rejects_non_zero_code() {
        let err = evaluate_login(r#"{"errCode":1}"#, ["a=1"]).unwrap_err();
        assert!(matches!(err, SmsBridgeError::Auth { .. }));
        assert!(err.to_string().contains("errCode 1"), "got: {err}");
    }

    #[test]
    fn evaluate_login_rejects_string_zero() {
        let err = evaluate_login(r#"{"errCode":"0"}"#, ["a=1"]).unwrap_err();
        assert!(matches!(err, SmsBridgeError::Auth { .. }));
    }

    #[test]
    fn evaluate_login_requires_cookies() {
        let err = evaluate_login(r#"{"errCode":0}"#, Vec::<&str>::new()).unwrap_err();
        assert!(err.to_string().contains("no session cookie"), "got: {err}");
    }

    #[test]
    fn evaluate_login_rejects_html_body() {
        let err = evaluate_login("<html>login</html>", ["a=1"]).unwrap_err();
        assert!(err.to_string().contains("not JSON"), "got: {err}");
    }
}
