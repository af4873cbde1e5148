//! Password hashing (Argon2id) and HS256 bearer-token signing.

#![forbid(unsafe_code)]

use anyhow::{anyhow, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime granted by [`sign`].
const TOKEN_TTL_SECS: i64 = 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Hash a password into a PHC-format Argon2id string with a random salt.
pub fn encrypt(pwd: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(pwd.as_bytes(), &salt)
        .map_err(|e| anyhow!("hashing password: {e}"))?;

    Ok(hash.to_string())
}

/// Check a password against a stored hash; errors on mismatch or on a hash
/// that cannot be parsed.
pub fn compare(hashed: &str, pwd: &str) -> Result<()> {
    let parsed = PasswordHash::new(hashed).map_err(|e| anyhow!("parsing password hash: {e}"))?;

    Argon2::default()
        .verify_password(pwd.as_bytes(), &parsed)
        .map_err(|_| anyhow!("password does not match"))
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
    kid: String,
}

/// Registered claims carried by a signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub exp: i64,
    pub nbf: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// Issue a compact HS256 token valid for one minute. `secret_id` is placed in
/// the header's `kid` field so the verifier can look up the key.
pub fn sign(secret_id: &str, secret_key: &str, iss: &str, aud: &str) -> Result<String> {
    let now = Utc::now().timestamp();
    let header = Header {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
        kid: secret_id.to_string(),
    };
    let claims = Claims {
        exp: now + TOKEN_TTL_SECS,
        nbf: now,
        iat: now,
        iss: iss.to_string(),
        aud: aud.to_string(),
    };

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?),
    );

    Ok(format!("{signing_input}.{}", signature(secret_key, &signing_input)?))
}

/// Verify a compact token's structure and signature, returning its claims.
/// Expiry enforcement is left to the caller, which knows its clock policy.
pub fn verify(token: &str, secret_key: &str) -> Result<Claims, TokenError> {
    let mut parts = token.splitn(3, '.');
    let (header_b64, claims_b64, sig_b64) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(c), Some(s)) => (h, c, s),
        _ => return Err(TokenError::Malformed),
    };

    let header_bytes = URL_SAFE_NO_PAD.decode(header_b64).map_err(|_| TokenError::Malformed)?;
    let header: Header =
        serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
    if header.alg != "HS256" {
        return Err(TokenError::UnsupportedAlgorithm(header.alg));
    }

    let signing_input = format!("{header_b64}.{claims_b64}");
    let sig = URL_SAFE_NO_PAD.decode(sig_b64).map_err(|_| TokenError::Malformed)?;
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|_| TokenError::Malformed)?;
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&sig).map_err(|_| TokenError::SignatureMismatch)?;

    let claims_bytes = URL_SAFE_NO_PAD.decode(claims_b64).map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&claims_bytes).map_err(|_| TokenError::Malformed)
}

fn signature(secret_key: &str, signing_input: &str) -> Result<String> {
    // HMAC accepts keys of any length; the error arm is unreachable in practice
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| anyhow!("building hmac: {e}"))?;
    mac.update(signing_input.as_bytes());

    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_compare() {
        let hashed = encrypt("Wto1260644864!").unwrap();
        assert!(hashed.starts_with("$argon2"));
        assert!(compare(&hashed, "Wto1260644864!").is_ok());
        assert!(compare(&hashed, "wrong-password").is_err());
        assert!(compare("not a phc string", "x").is_err());

        // salts are random, hashes differ per call
        assert_ne!(hashed, encrypt("Wto1260644864!").unwrap());
    }

    #[test]
    fn sign_and_verify() {
        let token = sign("secret-id", "secret-key", "issuer", "audience").unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = verify(&token, "secret-key").unwrap();
        assert_eq!(claims.iss, "issuer");
        assert_eq!(claims.aud, "audience");
        assert_eq!(claims.exp, claims.iat + 60);
        assert_eq!(claims.nbf, claims.iat);
    }

    #[test]
    fn verify_rejects_forgeries() {
        let token = sign("kid", "right-key", "iss", "aud").unwrap();
        assert_eq!(verify(&token, "wrong-key"), Err(TokenError::SignatureMismatch));
        assert_eq!(verify("garbage", "right-key"), Err(TokenError::Malformed));
        assert_eq!(verify("a.b.c", "right-key"), Err(TokenError::Malformed));
    }

    #[test]
    fn kid_is_carried_in_the_header() {
        let token = sign("my-kid", "k", "i", "a").unwrap();
        let header_b64 = token.split('.').next().unwrap();
        let header: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header_b64).unwrap()).unwrap();
        assert_eq!(header["kid"], "my-kid");
        assert_eq!(header["alg"], "HS256");
    }
}
