use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

pub const STATE_COOKIE: &str = "state";

pub fn state_cookie(value: &str, secure: bool) -> Cookie<'static> {
    transient_cookie(STATE_COOKIE, value, secure)
}

pub fn clear_state_cookie() -> Cookie<'static> {
    clear_cookie(STATE_COOKIE)
}

pub fn state_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(STATE_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

pub fn clear_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), String::new()))
        .path("/")
        .http_only(true)
        .max_age(Duration::seconds(0))
        .build()
}

/// Session-scoped cookie: no max-age, so the browser drops it on exit.
pub fn transient_cookie(name: &str, value: &str, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_string(), value.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    if secure {
        cookie.set_secure(true);
    }
    cookie
}
