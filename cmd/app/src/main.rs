use rp_core::util::config::Config;
use rp_core::util::http::install_crypto_provider;
use rp_core::util::shutdown::{shutdown_signal, DRAIN_TIMEOUT};
use rp_core::util::usage::{self, Usage};
use rp_core::{api, obs};

const APP_VERSION: &str = match option_env!("RPDEMO_APP_VERSION") {
    Some(value) => value,
    None => env!("CARGO_PKG_VERSION"),
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let usage = Usage {
        name: "rpdemo-app",
        text: usage::APP_USAGE,
        version: APP_VERSION,
    };
    if usage::handle_cli_flags(&usage) {
        return Ok(());
    }

    install_crypto_provider();
    obs::init_tracing();

    let config = Config::load()?;
    let state = api::AppState::new(&config).await?;
    let app = api::router(state);

    let listener = api::server::bind(&config.listen).await?;
    tracing::info!(
        listen = %config.listen,
        issuer = %config.oidc.issuer_url,
        auth_uri = %config.auth_uri(),
        "start server listen"
    );
    api::server::serve_with_drain(listener, app, shutdown_signal(), DRAIN_TIMEOUT).await?;
    tracing::info!("done server shutdown");
    Ok(())
}
