// src/services/pionex/auth.rs

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Millisecond timestamp, required on every signed request.
pub fn current_timestamp() -> String {
    Utc::now().timestamp_millis().to_string()
}

/// Sign a REST request (HMAC SHA-256 over METHOD + path-with-sorted-query
/// + body, hex digest). Pionex expects query parameters, including
/// `timestamp`, sorted by key before signing.
pub fn sign_rest(secret: &str, method: &str, path_with_query: &str, body: &str) -> String {
    let prehash = format!("{}{}{}", method, path_with_query, body);
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key bits of any size");
    mac.update(prehash.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Build the `?k=v&...` suffix with keys sorted, as the signature scheme
/// requires.
pub fn sorted_query(params: &[(&str, String)]) -> String {
    let mut params: Vec<_> = params.iter().collect();
    params.sort_by(|a, b| a.0.cmp(b.0));
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}
