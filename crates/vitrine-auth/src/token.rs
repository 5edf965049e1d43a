//! Opaque bearer tokens.

/// Generate a cryptographically secure token string with a type prefix,
/// e.g. `sess_hjK3...`.
pub fn generate_secure_id(prefix: &str) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::Rng;

    let bytes: [u8; 24] = rand::thread_rng().gen();
    format!("{}_{}", prefix, URL_SAFE_NO_PAD.encode(bytes))
}
