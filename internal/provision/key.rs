use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;

const ASSERTION_LIFETIME_SECONDS: i64 = 3600;

/// Machine key downloaded for a service account (`zitadel-admin-sa.json`).
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub key_id: String,
    pub key: String,
    pub user_id: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("key_id", &self.key_id)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|err| format!("read key file {} failed: {err}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, String> {
        let key: Self =
            serde_json::from_str(raw).map_err(|err| format!("key file invalid: {err}"))?;
        if key.key_type != "serviceaccount" {
            return Err(format!(
                "key file type must be serviceaccount, got {:?}",
                key.key_type
            ));
        }
        if key.key_id.trim().is_empty() || key.user_id.trim().is_empty() {
            return Err("key file must carry keyId and userId".into());
        }
        Ok(key)
    }

    /// RS256 JWT-profile assertion for the token endpoint at `audience`.
    pub fn assertion(&self, audience: &str, now: i64) -> Result<String, String> {
        let encoding_key = EncodingKey::from_rsa_pem(self.key.as_bytes())
            .map_err(|_| "key file private key is not a valid RSA PEM".to_string())?;
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key_id.clone());
        let claims = AssertionClaims {
            iss: &self.user_id,
            sub: &self.user_id,
            aud: audience,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECONDS,
        };
        encode(&header, &claims, &encoding_key)
            .map_err(|err| format!("sign assertion failed: {err}"))
    }
}
