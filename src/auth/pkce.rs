use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sha2::{Digest, Sha256};

/// RFC 3986 unreserved characters, the set RFC 7636 allows in a verifier.
const VERIFIER_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

const VERIFIER_LENGTH: usize = 64;

/// Generates a random PKCE code verifier.
///
/// Returns a 64-character string drawn uniformly from the unreserved
/// URL-safe character set `[A-Za-z0-9-._~]`. `rand::rng()` is a CSPRNG;
/// verifier predictability would defeat the point of PKCE.
pub fn generate_verifier() -> String {
    let mut rng = rand::rng();
    (0..VERIFIER_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..VERIFIER_CHARSET.len());
            VERIFIER_CHARSET[idx] as char
        })
        .collect()
}

/// Derives the S256 code challenge for a verifier.
///
/// Computes SHA-256 over the verifier's UTF-8 bytes and base64url-encodes
/// the digest without padding. Deterministic for a given verifier.
pub fn code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}
