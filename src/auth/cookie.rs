//! Defines functions for storing the session token in a cookie.

use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::session::SESSION_DURATION;

/// The name of the cookie holding the session token.
pub(crate) const COOKIE_SESSION: &str = "session";

/// Add the session cookie holding `token` to the cookie jar.
///
/// `secure` should be true whenever the app is served over HTTPS.
pub(crate) fn set_session_cookie(jar: CookieJar, token: String, secure: bool) -> CookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, token))
            .path("/")
            .max_age(SESSION_DURATION)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure),
    )
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub(crate) fn invalidate_session_cookie(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure),
    )
}

/// Get the session token from the cookie jar, if there is one.
pub(crate) fn get_session_token(jar: &CookieJar) -> Option<String> {
    jar.get(COOKIE_SESSION)
        .map(|cookie| cookie.value().to_owned())
        .filter(|token| !token.is_empty())
}
