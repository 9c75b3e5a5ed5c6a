use crate::util::config::ProvisionConfig;
use uuid::Uuid;

pub mod key;
pub mod management;

pub use key::ServiceAccountKey;
pub use management::{CreatedApp, ManagementClient};

use management::{HumanEmail, HumanProfile, HumanUserRequest, OidcAppRequest};

pub const INITIAL_PASSWORD: &str = "Password1!";
pub const TEST_USER_PASSWORD: &str = "P@ssword1";
const TEST_USER_PROFILE_NAME: &str = "test";

#[derive(Debug, Clone)]
pub struct ProvisionedUser {
    pub user_id: String,
    pub user_name: String,
    pub email: String,
}

/// Load the key file named by `config` and authenticate to the management API.
pub async fn connect(config: &ProvisionConfig) -> Result<ManagementClient, String> {
    let key = ServiceAccountKey::load(&config.key_file)?;
    ManagementClient::connect(&config.management_url, &key).await
}

/// Create a web app with a random name in the first project the key can see.
pub async fn create_oidc_app(
    client: &ManagementClient,
    redirect_uri: &str,
) -> Result<CreatedApp, String> {
    let projects = client.list_projects().await?;
    let project = projects
        .first()
        .ok_or_else(|| "no project found".to_string())?;
    let name = Uuid::new_v4().to_string();
    tracing::info!(
        project_id = %project.id,
        project_name = %project.name,
        app_name = %name,
        "adding oidc app"
    );
    client
        .add_oidc_app(&project.id, &OidcAppRequest::web_app(&name, redirect_uri))
        .await
}

/// Create a verified human user, then replace the initial password with
/// `TEST_USER_PASSWORD` so no change is required at first login.
pub async fn create_test_user(client: &ManagementClient) -> Result<ProvisionedUser, String> {
    let user_name = Uuid::new_v4().to_string();
    let email = format!("{user_name}@example.com");
    let request = HumanUserRequest {
        user_name: user_name.clone(),
        profile: HumanProfile {
            first_name: TEST_USER_PROFILE_NAME.into(),
            last_name: TEST_USER_PROFILE_NAME.into(),
            nick_name: TEST_USER_PROFILE_NAME.into(),
            display_name: TEST_USER_PROFILE_NAME.into(),
        },
        email: HumanEmail {
            email: email.clone(),
            is_email_verified: true,
        },
        initial_password: INITIAL_PASSWORD.into(),
    };
    let user_id = client.add_human_user(&request).await?;
    tracing::info!(user_id = %user_id, email = %email, "human user added");
    client
        .set_human_password(&user_id, TEST_USER_PASSWORD, true)
        .await?;
    Ok(ProvisionedUser {
        user_id,
        user_name,
        email,
    })
}
