use crate::provision::key::ServiceAccountKey;
use crate::util::http::{build_client, ensure_success};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const MANAGEMENT_SCOPE: &str = "openid urn:zitadel:iam:org:project:id:zitadel:aud";

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ProjectSearchResponse {
    #[serde(default)]
    result: Vec<Project>,
}

/// Body of `AddOIDCApp`. Enum fields use the API's string names.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcAppRequest {
    pub name: String,
    pub redirect_uris: Vec<String>,
    pub response_types: Vec<String>,
    pub grant_types: Vec<String>,
    pub app_type: String,
    pub auth_method_type: String,
    pub post_logout_redirect_uris: Vec<String>,
    pub version: String,
    pub dev_mode: bool,
    pub access_token_type: String,
    pub access_token_role_assertion: bool,
    pub id_token_role_assertion: bool,
    pub id_token_userinfo_assertion: bool,
    pub clock_skew: String,
    pub additional_origins: Vec<String>,
}

impl OidcAppRequest {
    /// Confidential web app using the code flow and basic client auth.
    pub fn web_app(name: &str, redirect_uri: &str) -> Self {
        Self {
            name: name.to_string(),
            redirect_uris: vec![redirect_uri.to_string()],
            response_types: vec!["OIDC_RESPONSE_TYPE_CODE".into()],
            grant_types: vec!["OIDC_GRANT_TYPE_AUTHORIZATION_CODE".into()],
            app_type: "OIDC_APP_TYPE_WEB".into(),
            auth_method_type: "OIDC_AUTH_METHOD_TYPE_BASIC".into(),
            post_logout_redirect_uris: Vec::new(),
            version: "OIDC_VERSION_1_0".into(),
            dev_mode: true,
            access_token_type: "OIDC_TOKEN_TYPE_JWT".into(),
            access_token_role_assertion: false,
            id_token_role_assertion: false,
            id_token_userinfo_assertion: false,
            clock_skew: "0s".into(),
            additional_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedApp {
    pub app_id: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanProfile {
    pub first_name: String,
    pub last_name: String,
    pub nick_name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanEmail {
    pub email: String,
    pub is_email_verified: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanUserRequest {
    pub user_name: String,
    pub profile: HumanProfile,
    pub email: HumanEmail,
    pub initial_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HumanUserResponse {
    user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SetPasswordRequest<'a> {
    password: &'a str,
    no_change_required: bool,
}

/// Authenticated client for the management REST API.
pub struct ManagementClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl std::fmt::Debug for ManagementClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ManagementClient {
    /// Exchange a service-account assertion for an access token.
    pub async fn connect(base_url: &str, key: &ServiceAccountKey) -> Result<Self, String> {
        let client = build_client()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let assertion = key.assertion(&base_url, chrono::Utc::now().timestamp())?;
        let response = client
            .post(format!("{base_url}/oauth/v2/token"))
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("scope", MANAGEMENT_SCOPE),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|err| format!("management token request failed: {err}"))?;
        let response = ensure_success(response, "management token request").await?;
        let token: AccessTokenResponse = response
            .json()
            .await
            .map_err(|_| "management token payload invalid".to_string())?;
        tracing::debug!(base_url = %base_url, "management api authenticated");
        Ok(Self {
            client,
            base_url,
            access_token: token.access_token,
        })
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, String> {
        let response: ProjectSearchResponse = self
            .post_json(
                "/management/v1/projects/_search",
                &serde_json::json!({}),
                "list projects",
            )
            .await?;
        Ok(response.result)
    }

    pub async fn add_oidc_app(
        &self,
        project_id: &str,
        request: &OidcAppRequest,
    ) -> Result<CreatedApp, String> {
        self.post_json(
            &format!("/management/v1/projects/{project_id}/apps/oidc"),
            request,
            "add oidc app",
        )
        .await
    }

    /// Returns the new user's id.
    pub async fn add_human_user(&self, request: &HumanUserRequest) -> Result<String, String> {
        let response: HumanUserResponse = self
            .post_json("/management/v1/users/human", request, "add human user")
            .await?;
        Ok(response.user_id)
    }

    pub async fn set_human_password(
        &self,
        user_id: &str,
        password: &str,
        no_change_required: bool,
    ) -> Result<(), String> {
        let _: serde_json::Value = self
            .post_json(
                &format!("/management/v1/users/{user_id}/password"),
                &SetPasswordRequest {
                    password,
                    no_change_required,
                },
                "set human password",
            )
            .await?;
        Ok(())
    }

    async fn post_json<B, T>(&self, path: &str, body: &B, operation: &str) -> Result<T, String>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|err| format!("{operation} request failed: {err}"))?;
        let response = ensure_success(response, operation).await?;
        response
            .json()
            .await
            .map_err(|_| format!("{operation} payload invalid"))
    }
}
