use rp_core::util::config::ProvisionConfig;
use rp_core::util::http::install_crypto_provider;
use rp_core::util::usage::{self, Usage};
use rp_core::{obs, provision};

const APP_VERSION: &str = match option_env!("RPDEMO_APP_VERSION") {
    Some(value) => value,
    None => env!("CARGO_PKG_VERSION"),
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let usage = Usage {
        name: "rpdemo-oidcrp",
        text: usage::OIDCRP_USAGE,
        version: APP_VERSION,
    };
    if usage::handle_cli_flags(&usage) {
        return Ok(());
    }

    install_crypto_provider();
    obs::init_tracing();

    let config = ProvisionConfig::load()?;
    tracing::info!(
        management_url = %config.management_url,
        redirect_uri = %config.redirect_uri,
        "start oidc rp creation"
    );
    let client = provision::connect(&config).await?;
    let app = provision::create_oidc_app(&client, &config.redirect_uri).await?;
    tracing::info!(
        app_id = %app.app_id,
        client_id = %app.client_id,
        client_secret = %app.client_secret,
        "oidc rp created"
    );
    Ok(())
}
