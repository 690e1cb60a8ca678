//! HMAC check for widget session initialization.
//!
//! Environments with notification-center encryption require the embedding
//! application to sign the subscriber id with the environment API key; the
//! widget forwards the hex digest as `hmacHash`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub fn sign_subscriber_id(api_key: &str, subscriber_id: &str) -> String {
    // HMAC accepts keys of any length
    let mut mac = match HmacSha256::new_from_slice(api_key.as_bytes()) {
        Ok(m) => m,
        Err(_) => return String::new(),
    };
    mac.update(subscriber_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison of a presented hex digest.
pub fn verify_subscriber_hash(api_key: &str, subscriber_id: &str, presented: &str) -> bool {
    let Ok(bytes) = hex::decode(presented.trim()) else { return false; };
    let Ok(mut mac) = HmacSha256::new_from_slice(api_key.as_bytes()) else { return false; };
    mac.update(subscriber_id.as_bytes());
    mac.verify_slice(&bytes).is_ok()
}
