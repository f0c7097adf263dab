//! Referral capture on the deals page.
//!
//! `/deals?ref=<code>` records the referring code in a cookie and bounces to
//! the bare `/deals` URL. The first code a browser sees wins; later codes are
//! dropped without touching the cookie.

use axum::response::{IntoResponse, Redirect, Response};
use cookie::{Cookie, CookieJar, SameSite};

use rakeback_core::routes::DEALS_PATH;

use super::cookies::append_set_cookies;

/// Cookie holding the referring code.
pub const REFERRER_COOKIE: &str = "referrer_code";

/// Referral cookie lifetime (7 days).
pub const REFERRER_MAX_AGE_SECONDS: i64 = 604_800;

/// Query parameter carrying the referring code.
const REF_PARAM: &str = "ref";

/// Value of the `ref` query parameter, if present (possibly empty).
#[must_use]
pub fn referral_code(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == REF_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Redirect to `/deals`, setting the referral cookie if the browser has none.
///
/// An empty code redirects without setting anything.
pub fn capture(cookies: &CookieJar, code: &str, secure: bool) -> Response {
    let mut response = Redirect::to(DEALS_PATH).into_response();

    if cookies.get(REFERRER_COOKIE).is_some() {
        tracing::debug!("Referral already recorded, ignoring new code");
        return response;
    }
    if code.is_empty() {
        return response;
    }

    tracing::info!(referrer_code = code, "Recording referral");
    append_set_cookies(response.headers_mut(), &[referral_cookie(code, secure)]);
    response
}

fn referral_cookie(code: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((REFERRER_COOKIE, code.to_owned()))
        .path("/")
        .http_only(false)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::seconds(REFERRER_MAX_AGE_SECONDS))
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::{StatusCode, header::LOCATION, header::SET_COOKIE};

    use super::*;

    fn set_cookie_headers(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(String::from))
            .collect()
    }

    #[test]
    fn test_referral_code_parsing() {
        assert_eq!(referral_code(Some("ref=AFF42")), Some("AFF42".to_string()));
        assert_eq!(referral_code(Some("x=1&ref=a%20b")), Some("a b".to_string()));
        assert_eq!(referral_code(Some("ref=")), Some(String::new()));
        assert_eq!(referral_code(Some("x=1")), None);
        assert_eq!(referral_code(None), None);
    }

    #[test]
    fn test_first_visit_sets_cookie() {
        let response = capture(&CookieJar::new(), "AFF42", false);

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/deals");

        let cookies = set_cookie_headers(&response);
        assert_eq!(cookies.len(), 1);
        let cookie = Cookie::parse(cookies[0].clone()).unwrap();
        assert_eq!(cookie.name(), REFERRER_COOKIE);
        assert_eq!(cookie.value(), "AFF42");
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::seconds(604_800)));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_ne!(cookie.http_only(), Some(true));
    }

    #[test]
    fn test_existing_marker_is_kept() {
        let mut jar = CookieJar::new();
        jar.add_original(Cookie::new(REFERRER_COOKIE, "FIRST"));

        let response = capture(&jar, "SECOND", false);

        assert_eq!(response.headers().get(LOCATION).unwrap(), "/deals");
        assert!(set_cookie_headers(&response).is_empty());
    }

    #[test]
    fn test_empty_code_sets_nothing() {
        let response = capture(&CookieJar::new(), "", false);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/deals");
        assert!(set_cookie_headers(&response).is_empty());
    }

    #[test]
    fn test_secure_flag_follows_config() {
        let response = capture(&CookieJar::new(), "AFF42", true);
        let cookie = Cookie::parse(set_cookie_headers(&response)[0].clone()).unwrap();
        assert_eq!(cookie.secure(), Some(true));
    }
}
