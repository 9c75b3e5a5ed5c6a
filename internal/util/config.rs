use std::env;

pub const DEFAULT_PORT: &str = "8080";
pub const DEFAULT_SCOPES: &str = "openid";
pub const DEFAULT_MANAGEMENT_URL: &str = "http://localhost:8080";
pub const DEFAULT_KEY_FILE: &str = "./machinekey/zitadel-admin-sa.json";
pub const DEFAULT_RP_REDIRECT_URI: &str = "http://localhost:7070/callback";

#[derive(Debug, Clone)]
pub struct OidcConfig {
    pub issuer_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen: String,
    pub public_base_url: String,
    pub oidc: OidcConfig,
}

impl Config {
    pub fn load() -> Result<Self, String> {
        let port = env_or_default("PORT", DEFAULT_PORT);
        let port = parse_port(&port)?;
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        let oidc = load_oidc_config(&public_base_url)?;
        let config = Self {
            listen: format!("0.0.0.0:{port}"),
            public_base_url,
            oidc,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn auth_uri(&self) -> String {
        format!("{}/auth", self.public_base_url)
    }

    pub fn secure_cookies(&self) -> bool {
        self.public_base_url.starts_with("https://")
    }

    fn validate(&self) -> Result<(), String> {
        if !is_http_url(&self.oidc.issuer_url) {
            return Err("ISSUER must be an absolute http/https URL".into());
        }
        if !is_http_url(&self.public_base_url) {
            return Err("PUBLIC_BASE_URL must be an absolute http/https URL".into());
        }
        if self.oidc.scopes.is_empty() {
            return Err("SCOPES must contain at least one scope".into());
        }
        if self.oidc.client_id.trim().is_empty() {
            tracing::warn!("CLIENT_ID is empty; run rpdemo-oidcrp to provision an application");
        }
        Ok(())
    }
}

/// Settings shared by the provisioning tools.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub management_url: String,
    pub key_file: String,
    pub redirect_uri: String,
}

impl ProvisionConfig {
    pub fn load() -> Result<Self, String> {
        let management_url = env_or_default("ZITADEL_URL", DEFAULT_MANAGEMENT_URL)
            .trim_end_matches('/')
            .to_string();
        if !is_http_url(&management_url) {
            return Err("ZITADEL_URL must be an absolute http/https URL".into());
        }
        let redirect_uri = env_or_default("RP_REDIRECT_URI", DEFAULT_RP_REDIRECT_URI);
        if !is_http_url(&redirect_uri) {
            return Err("RP_REDIRECT_URI must be an absolute http/https URL".into());
        }
        Ok(Self {
            management_url,
            key_file: env_or_default("ZITADEL_KEY_FILE", DEFAULT_KEY_FILE),
            redirect_uri,
        })
    }
}

fn load_oidc_config(public_base_url: &str) -> Result<OidcConfig, String> {
    let issuer_url = env::var("ISSUER")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| "ISSUER is required".to_string())?;
    Ok(OidcConfig {
        issuer_url: issuer_url.trim().to_string(),
        client_id: env_or_default("CLIENT_ID", ""),
        client_secret: env_or_default("CLIENT_SECRET", ""),
        redirect_url: format!("{public_base_url}/callback"),
        scopes: split_scopes(&env_or_default("SCOPES", DEFAULT_SCOPES)),
    })
}

fn parse_port(raw: &str) -> Result<u16, String> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(format!("PORT must be a valid tcp port, got {raw:?}")),
    }
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ' ' || c == ',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}

fn env_or_default(key: &str, default_value: &str) -> String {
    env::var(key).unwrap_or_else(|_| default_value.to_string())
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
