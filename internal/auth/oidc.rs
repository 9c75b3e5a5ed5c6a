use crate::util::config::OidcConfig;
use crate::util::http::{build_client, ensure_success};
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::form_urlencoded::byte_serialize;
use url::Url;
use uuid::Uuid;

const CLOCK_LEEWAY_SECONDS: u64 = 60;

/// The subset of `/.well-known/openid-configuration` a relying party needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub id_token_signing_alg_values_supported: Vec<String>,
    #[serde(default)]
    pub token_endpoint_auth_methods_supported: Vec<String>,
}

/// Token endpoint response. Fields outside the OAuth2 core set, `id_token`
/// included, are kept in `extra`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TokenResponse {
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn id_token(&self) -> Result<&str, String> {
        match self.extra("id_token") {
            Some(Value::String(token)) if !token.trim().is_empty() => Ok(token),
            Some(Value::String(_)) | None => Err("oidc token payload missing id_token".into()),
            Some(_) => Err("oidc token payload id_token is not a string".into()),
        }
    }
}

/// Relying-party client bound to one provider. Metadata is discovered once
/// and never refreshed.
#[derive(Debug, Clone)]
pub struct RelyingParty {
    client: reqwest::Client,
    config: OidcConfig,
    metadata: ProviderMetadata,
}

pub fn generate_state() -> String {
    Uuid::new_v4().to_string()
}

impl RelyingParty {
    pub async fn discover(config: OidcConfig) -> Result<Self, String> {
        let client = build_client()?;
        let metadata = fetch_discovery(&client, &config.issuer_url).await?;
        ensure_issuer_matches(&config.issuer_url, &metadata.issuer)?;
        tracing::debug!(issuer = %metadata.issuer, "oidc provider discovered");
        Ok(Self {
            client,
            config,
            metadata,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.config.client_id
    }

    pub fn auth_url(&self, state: &str) -> Result<String, String> {
        let mut url = Url::parse(&self.metadata.authorization_endpoint)
            .map_err(|_| "invalid authorization endpoint".to_string())?;
        if url.cannot_be_a_base() {
            return Err("invalid authorization endpoint".into());
        }
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", state);
        Ok(url.to_string())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, String> {
        let request = self
            .client
            .post(&self.metadata.token_endpoint)
            .header("Accept", "application/json");
        let request = if uses_basic_auth(&self.metadata) {
            request
                .basic_auth(
                    form_encode(&self.config.client_id),
                    Some(form_encode(&self.config.client_secret)),
                )
                .form(&token_exchange_form(&self.config, code, false))
        } else {
            request.form(&token_exchange_form(&self.config, code, true))
        };
        let response = request
            .send()
            .await
            .map_err(|_| "oidc token request failed".to_string())?;
        let response = ensure_success(response, "oidc token exchange").await?;
        let payload = response
            .json::<TokenResponse>()
            .await
            .map_err(|_| "oidc token payload invalid".to_string())?;
        if payload.access_token.trim().is_empty() {
            return Err("oidc token payload missing access_token".into());
        }
        Ok(payload)
    }

    /// Check signature and standard claims, then hand back the full claim set.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<Value, String> {
        let header = decode_header(id_token).map_err(|_| "oidc token header invalid".to_string())?;
        ensure_supported_signing_alg(
            header.alg,
            &self.metadata.id_token_signing_alg_values_supported,
        )?;
        let jwks = fetch_jwks(&self.client, &self.metadata.jwks_uri).await?;
        let jwk = select_jwk(&jwks.keys, header.kid.as_deref())?;
        let key = DecodingKey::from_jwk(jwk).map_err(|_| "oidc key parse failed".to_string())?;
        let validation = token_validation(header.alg, &self.metadata, &self.config.client_id);
        let claims = decode::<Value>(id_token, &key, &validation)
            .map_err(|err| format!("oidc token validation failed: {err}"))?
            .claims;
        ensure_issued_at(&claims)?;
        ensure_authorized_party(&claims, &self.config.client_id)?;
        Ok(claims)
    }
}

async fn fetch_discovery(
    client: &reqwest::Client,
    issuer_url: &str,
) -> Result<ProviderMetadata, String> {
    let response = client
        .get(discovery_url(issuer_url))
        .send()
        .await
        .map_err(|_| "oidc discovery request failed".to_string())?;
    let response = ensure_success(response, "oidc discovery").await?;
    response
        .json::<ProviderMetadata>()
        .await
        .map_err(|_| "oidc discovery payload invalid".to_string())
}

fn discovery_url(issuer_url: &str) -> String {
    format!(
        "{}/.well-known/openid-configuration",
        issuer_url.trim_end_matches('/')
    )
}

fn ensure_issuer_matches(configured: &str, advertised: &str) -> Result<(), String> {
    if configured.trim_end_matches('/') == advertised.trim_end_matches('/') {
        return Ok(());
    }
    Err(format!(
        "oidc issuer mismatch: configured {configured}, provider reports {advertised}"
    ))
}

fn uses_basic_auth(metadata: &ProviderMetadata) -> bool {
    let methods = &metadata.token_endpoint_auth_methods_supported;
    let post_only = methods.iter().any(|method| method == "client_secret_post")
        && !methods.iter().any(|method| method == "client_secret_basic");
    !post_only
}

fn form_encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

fn token_exchange_form(
    config: &OidcConfig,
    code: &str,
    include_credentials: bool,
) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("grant_type", "authorization_code".to_string()),
        ("code", code.to_string()),
        ("redirect_uri", config.redirect_url.clone()),
    ];
    if include_credentials {
        form.push(("client_id", config.client_id.clone()));
        form.push(("client_secret", config.client_secret.clone()));
    }
    form
}

fn ensure_supported_signing_alg(alg: Algorithm, advertised: &[String]) -> Result<(), String> {
    if !is_supported_alg(alg) {
        return Err("unsupported oidc signing algorithm".into());
    }
    let name = format!("{alg:?}");
    if advertised.is_empty() || advertised.iter().any(|value| *value == name) {
        return Ok(());
    }
    Err(format!("oidc signing algorithm {name} not advertised"))
}

fn is_supported_alg(alg: Algorithm) -> bool {
    matches!(
        alg,
        Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512
            | Algorithm::ES256
            | Algorithm::ES384
            | Algorithm::EdDSA
    )
}

async fn fetch_jwks(client: &reqwest::Client, jwks_uri: &str) -> Result<JwkSet, String> {
    let response = client
        .get(jwks_uri)
        .send()
        .await
        .map_err(|_| "oidc jwks request failed".to_string())?;
    let response = ensure_success(response, "oidc jwks fetch").await?;
    response
        .json::<JwkSet>()
        .await
        .map_err(|_| "oidc jwks payload invalid".to_string())
}

fn select_jwk<'a>(keys: &'a [Jwk], kid: Option<&str>) -> Result<&'a Jwk, String> {
    if let Some(kid) = kid {
        return keys
            .iter()
            .find(|key| key.common.key_id.as_deref() == Some(kid))
            .ok_or_else(|| "oidc jwks key id not found".to_string());
    }
    match keys {
        [only] => Ok(only),
        _ => Err("oidc token missing key id".into()),
    }
}

fn token_validation(alg: Algorithm, metadata: &ProviderMetadata, client_id: &str) -> Validation {
    let mut validation = Validation::new(alg);
    validation.leeway = CLOCK_LEEWAY_SECONDS;
    validation.validate_nbf = true;
    validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
    validation.set_issuer(&[metadata.issuer.as_str()]);
    validation.set_audience(&[client_id]);
    validation
}

fn ensure_issued_at(claims: &Value) -> Result<(), String> {
    match claims.get("iat") {
        Some(value) if value.is_number() => Ok(()),
        _ => Err("oidc token missing iat claim".into()),
    }
}

fn ensure_authorized_party(claims: &Value, client_id: &str) -> Result<(), String> {
    let azp = claims.get("azp").and_then(Value::as_str);
    if let Some(azp) = azp {
        if azp != client_id {
            return Err("oidc token azp does not match client id".into());
        }
        return Ok(());
    }
    match claims.get("aud") {
        Some(Value::Array(audiences)) if audiences.len() > 1 => {
            Err("oidc token with several audiences must carry azp".into())
        }
        _ => Ok(()),
    }
}
