//! Conversion between raw `Cookie`/`Set-Cookie` headers and the `cookie` crate.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, SET_COOKIE},
};
use cookie::{Cookie, CookieJar};

/// Parse every `Cookie` header on the request into a jar.
///
/// Unparseable pairs are skipped rather than failing the request.
#[must_use]
pub fn request_cookies(headers: &HeaderMap) -> CookieJar {
    let mut jar = CookieJar::new();

    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else {
            continue;
        };
        for cookie in Cookie::split_parse_encoded(raw.to_owned()).flatten() {
            jar.add_original(cookie.into_owned());
        }
    }

    jar
}

/// Append one `Set-Cookie` header per cookie.
pub fn append_set_cookies(headers: &mut HeaderMap, cookies: &[Cookie<'static>]) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.encoded().to_string()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => {
                tracing::error!(cookie = cookie.name(), error = %e, "Dropping unencodable cookie");
            }
        }
    }
}
