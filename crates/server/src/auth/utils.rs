use base64::prelude::BASE64_URL_SAFE_NO_PAD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

const API_KEY_BYTES: usize = 32;

/// Opaque, URL-safe API key backed by OS randomness.
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; API_KEY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_url_safe_and_distinct() {
        let first = generate_api_key();
        let second = generate_api_key();
        assert_eq!(first.len(), 43);
        assert_ne!(first, second);
        assert!(first
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'));
    }
}
