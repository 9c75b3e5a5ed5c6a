use std::time::Duration;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outbound client used for every provider and management API call.
pub fn build_client() -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(CLIENT_TIMEOUT)
        .build()
        .map_err(|err| format!("http client init failed: {err}"))
}

/// Install the ring provider for rustls. Safe to call more than once.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

pub fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    let mut diff = left.len() ^ right.len();
    let max_len = left.len().max(right.len());
    let mut index = 0usize;
    while index < max_len {
        let left_byte = left.get(index).copied().unwrap_or(0);
        let right_byte = right.get(index).copied().unwrap_or(0);
        diff |= (left_byte ^ right_byte) as usize;
        index += 1;
    }
    diff == 0
}

/// Turn a non-2xx response into an error naming the operation and status.
pub async fn ensure_success(
    response: reqwest::Response,
    operation: &str,
) -> Result<reqwest::Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        return Err(format!("{operation} failed: {}", status.as_u16()));
    }
    Err(format!(
        "{operation} failed: {}: {}",
        status.as_u16(),
        truncate(body, 200)
    ))
}

fn truncate(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}
