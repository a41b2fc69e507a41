//! Stateless session tokens.
//!
//! A session is a signed claims blob carried in a cookie; the server keeps
//! no session store and has no revocation list. Verification failures
//! degrade to "anonymous" so the caller never learns why a token was
//! rejected.

use api_types::auth::SessionUser;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Sessions expire this long after login.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Claims embedded in the session token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id, stringified.
    pub sub: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Mint a signed token for the user, valid for 24 hours from `now`.
pub fn mint(
    secret: &str,
    user_id: i32,
    name: &str,
    now: DateTime<Utc>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        name: name.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(SESSION_TTL_HOURS)).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token against the server secret and its expiry.
///
/// Any failure (bad signature, expired, malformed) yields `None`.
pub fn verify(secret: &str, token: &str) -> Option<SessionUser> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    let id = data.claims.sub.parse().ok()?;
    Some(SessionUser {
        id,
        name: data.claims.name,
    })
}

/// Build the session cookie: HTTP-only, `SameSite=Lax`, 24h, whole site.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(SESSION_TTL_HOURS))
        .path("/")
        .secure(secure)
        .build()
}

/// Build the removal counterpart of [`session_cookie`]; attributes must
/// match for the browser to drop the original.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .build();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn mint_then_verify_round_trips() {
        let token = mint(SECRET, 7, "Alice", Utc::now()).unwrap();
        let user = verify(SECRET, &token).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.name, "Alice");
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = mint(SECRET, 7, "Alice", Utc::now() - Duration::hours(25)).unwrap();
        assert!(verify(SECRET, &token).is_none());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint(SECRET, 7, "Alice", Utc::now()).unwrap();
        assert!(verify("another-secret", &token).is_none());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify(SECRET, "not-a-token").is_none());
    }

    #[test]
    fn session_cookie_carries_the_contract() {
        let cookie = session_cookie("abc".to_string(), false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
