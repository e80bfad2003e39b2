use axum_extra::extract::cookie::Cookie;

pub(crate) const ACCESS_COOKIE: &str = "accessToken";
pub(crate) const REFRESH_COOKIE: &str = "refreshToken";

/// HttpOnly + Secure cookie scoped to the whole site; used for both session
/// credentials and the view-history cookie.
pub(crate) fn secure_cookie(name: &'static str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_path("/");
    cookie
}

/// Matching cookie for `CookieJar::remove`; name and path must line up with
/// the cookie being cleared.
pub(crate) fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie
}
