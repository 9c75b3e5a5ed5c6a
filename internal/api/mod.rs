use crate::auth::oidc::RelyingParty;
use crate::util::config::Config;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod rp;
pub mod server;

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub auth_uri: String,
    pub secure_cookies: bool,
    pub provider: Arc<RelyingParty>,
}

impl AppState {
    /// Discover the provider named by `config`; fails when it is unreachable.
    pub async fn new(config: &Config) -> Result<Self, String> {
        let provider = RelyingParty::discover(config.oidc.clone()).await?;
        Ok(Self::from_parts(
            config.auth_uri(),
            config.secure_cookies(),
            provider,
        ))
    }

    pub fn from_parts(auth_uri: String, secure_cookies: bool, provider: RelyingParty) -> Self {
        Self {
            auth_uri,
            secure_cookies,
            provider: Arc::new(provider),
        }
    }
}

pub fn router(state: AppState) -> Router {
    rp::router(state).layer(TraceLayer::new_for_http())
}
