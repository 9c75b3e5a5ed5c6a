use crate::api::auth::{clear_state_cookie, state_cookie, state_from_jar};
use crate::api::AppState;
use crate::auth::oidc::generate_state;
use crate::util::http::constant_time_eq;
use axum::extract::{RawQuery, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;
use url::Url;

const LOGIN_VIEW: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Login</title>
</head>
<body>
    <a href="{{uri}}">zitadel</a>
</body>
</html>
"#;

#[derive(Debug, Default, PartialEq, Eq)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

impl CallbackParams {
    /// First occurrence of each key wins.
    fn parse(raw: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(raw) = raw else {
            return params;
        };
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "code" if params.code.is_none() => params.code = Some(value.into_owned()),
                "state" if params.state.is_none() => params.state = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(login_page))
        .route("/auth", get(auth_start))
        .route("/callback", get(callback))
        .with_state(state)
}

fn internal_error(context: &str, err: String) -> (StatusCode, String) {
    tracing::warn!(error = %err, "{context}");
    (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
}

/// `get` routes also match HEAD; the login routes answer GET only.
fn ensure_get(method: &Method) -> Result<(), (StatusCode, String)> {
    if *method == Method::GET {
        return Ok(());
    }
    Err((
        StatusCode::METHOD_NOT_ALLOWED,
        "method not allowed".to_string(),
    ))
}

async fn login_page(
    method: Method,
    State(state): State<AppState>,
) -> Result<Html<String>, (StatusCode, String)> {
    ensure_get(&method)?;
    render_login_page(&state.auth_uri)
        .map(Html)
        .map_err(|err| internal_error("login page render failed", err))
}

fn render_login_page(auth_uri: &str) -> Result<String, String> {
    let url = Url::parse(auth_uri).map_err(|_| format!("invalid auth uri {auth_uri:?}"))?;
    Ok(LOGIN_VIEW.replace("{{uri}}", &escape_html(url.as_str())))
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

async fn auth_start(
    method: Method,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, (StatusCode, String)> {
    ensure_get(&method)?;
    let state_token = generate_state();
    let location = state
        .provider
        .auth_url(&state_token)
        .map_err(|err| internal_error("authorization url invalid", err))?;
    let jar = jar.add(state_cookie(&state_token, state.secure_cookies));
    tracing::debug!(state = %state_token, "redirecting to identity provider");
    Ok((StatusCode::FOUND, jar, [(header::LOCATION, location)]).into_response())
}

async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    RawQuery(raw): RawQuery,
) -> (CookieJar, Response) {
    let expected = state_from_jar(&jar);
    let jar = jar.add(clear_state_cookie());
    let params = CallbackParams::parse(raw.as_deref());
    let response = match complete_login(&state, expected.as_deref(), &params).await {
        Ok(claims) => Json(claims).into_response(),
        Err(err) => err.into_response(),
    };
    (jar, response)
}

async fn complete_login(
    state: &AppState,
    expected_state: Option<&str>,
    params: &CallbackParams,
) -> Result<Value, (StatusCode, String)> {
    validate_state(expected_state, params.state.as_deref())?;
    let code = params
        .code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or((StatusCode::BAD_REQUEST, "missing code".to_string()))?;
    let tokens = state
        .provider
        .exchange_code(code)
        .await
        .map_err(|err| internal_error("code exchange failed", err))?;
    let id_token = tokens
        .id_token()
        .map_err(|err| internal_error("id token missing", err))?;
    let claims = state
        .provider
        .verify_id_token(id_token)
        .await
        .map_err(|err| internal_error("id token verification failed", err))?;
    let subject = claims
        .get("sub")
        .and_then(Value::as_str)
        .unwrap_or_default();
    tracing::info!(sub = %subject, "login completed");
    Ok(claims)
}

fn validate_state(
    expected: Option<&str>,
    received: Option<&str>,
) -> Result<(), (StatusCode, String)> {
    let Some(expected) = expected else {
        return Err((StatusCode::UNAUTHORIZED, "missing state cookie".into()));
    };
    let Some(received) = received else {
        return Err((StatusCode::UNAUTHORIZED, "missing state".into()));
    };
    if !constant_time_eq(expected.as_bytes(), received.as_bytes()) {
        return Err((StatusCode::UNAUTHORIZED, "invalid state".into()));
    }
    Ok(())
}
