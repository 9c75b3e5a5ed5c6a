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
        name: "rpdemo-user",
        text: usage::USER_USAGE,
        version: APP_VERSION,
    };
    if usage::handle_cli_flags(&usage) {
        return Ok(());
    }

    install_crypto_provider();
    obs::init_tracing();

    let config = ProvisionConfig::load()?;
    tracing::info!(management_url = %config.management_url, "start user creation");
    let client = provision::connect(&config).await?;
    let user = provision::create_test_user(&client).await?;
    tracing::info!(
        user_id = %user.user_id,
        user_name = %user.user_name,
        email = %user.email,
        "user created"
    );
    Ok(())
}
