//! Server-signed session tokens
//!
//! A token is `hex(claims_json) + "." + hex(ed25519_signature)`. The signing
//! key is derived from the configured secret, repeated until it covers the
//! 32-byte seed.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session secret is empty")]
    EmptySecret,
    #[error("malformed session token")]
    Malformed,
    #[error("invalid session signature")]
    BadSignature,
    #[error("session expired")]
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Session id, v7 so ids sort by issue time
    pub sid: String,
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Unix seconds
    pub exp: i64,
}

pub struct SessionSigner {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl SessionSigner {
    pub fn from_secret(secret: &str) -> Result<Self, SessionError> {
        if secret.is_empty() {
            return Err(SessionError::EmptySecret);
        }
        let mut seed = secret.to_string();
        while seed.len() < 32 {
            seed.push_str(secret);
        }
        let seed_bytes: [u8; 32] = seed.as_bytes()[0..32]
            .try_into()
            .map_err(|_| SessionError::EmptySecret)?;

        Ok(Self::from_seed(seed_bytes))
    }

    /// Key that lives as long as the process; sessions do not survive a restart.
    pub fn ephemeral() -> Self {
        let mut seed = [0u8; 32];
        seed[..16].copy_from_slice(Uuid::now_v7().as_bytes());
        seed[16..].copy_from_slice(Uuid::now_v7().as_bytes());
        Self::from_seed(seed)
    }

    fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    pub fn mint(&self, uid: &str, email: Option<&str>, exp: i64) -> String {
        let claims = SessionClaims {
            sid: Uuid::now_v7().to_string(),
            uid: uid.to_string(),
            email: email.map(str::to_string),
            exp,
        };
        // Serializing a struct of strings and an integer cannot fail.
        let payload = serde_json::to_vec(&claims).unwrap_or_default();
        let signature = self.signing_key.sign(&payload);
        format!("{}.{}", hex::encode(&payload), hex::encode(signature.to_bytes()))
    }

    /// Claims of a token signed by this key that has not expired at `now`.
    pub fn verify(&self, token: &str, now: i64) -> Result<SessionClaims, SessionError> {
        let (payload_hex, sig_hex) = token.split_once('.').ok_or(SessionError::Malformed)?;
        let payload = hex::decode(payload_hex).map_err(|_| SessionError::Malformed)?;
        let sig_bytes = hex::decode(sig_hex).map_err(|_| SessionError::Malformed)?;
        let signature = Signature::from_slice(&sig_bytes).map_err(|_| SessionError::Malformed)?;

        self.verifying_key
            .verify(&payload, &signature)
            .map_err(|_| SessionError::BadSignature)?;

        let claims: SessionClaims =
            serde_json::from_slice(&payload).map_err(|_| SessionError::Malformed)?;
        if now >= claims.exp {
            return Err(SessionError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "correct horse battery";

    #[test]
    fn test_mint_then_verify() {
        let signer = SessionSigner::from_secret(SECRET).unwrap();
        let token = signer.mint("uid-1", Some("ops@example.com"), 2_000);
        let claims = signer.verify(&token, 1_999).unwrap();
        assert_eq!(claims.uid, "uid-1");
        assert_eq!(claims.email.as_deref(), Some("ops@example.com"));
        assert!(!claims.sid.is_empty());
    }

    #[test]
    fn test_expired_at_exp_second() {
        let signer = SessionSigner::from_secret(SECRET).unwrap();
        let token = signer.mint("uid-1", None, 2_000);
        assert_eq!(signer.verify(&token, 2_000), Err(SessionError::Expired));
    }

    #[test]
    fn test_other_key_rejected() {
        let signer = SessionSigner::from_secret(SECRET).unwrap();
        let other = SessionSigner::from_secret("a different secret").unwrap();
        let token = other.mint("uid-1", None, 2_000);
        assert_eq!(signer.verify(&token, 1_000), Err(SessionError::BadSignature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let signer = SessionSigner::from_secret(SECRET).unwrap();
        let token = signer.mint("uid-1", None, 2_000);
        let (_, sig) = token.split_once('.').unwrap();
        let forged_claims = br#"{"sid":"x","uid":"admin","email":null,"exp":99999999999}"#;
        let forged = format!("{}.{}", hex::encode(forged_claims), sig);
        assert_eq!(signer.verify(&forged, 1_000), Err(SessionError::BadSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let signer = SessionSigner::from_secret(SECRET).unwrap();
        assert_eq!(signer.verify("nonsense", 0), Err(SessionError::Malformed));
        assert_eq!(signer.verify("zz.zz", 0), Err(SessionError::Malformed));
        assert_eq!(SessionSigner::from_secret("").err(), Some(SessionError::EmptySecret));
    }

    #[test]
    fn test_short_secret_is_repeated_into_seed() {
        let a = SessionSigner::from_secret("abc").unwrap();
        let b = SessionSigner::from_secret("abcabcabcabcabcabcabcabcabcabcab").unwrap();
        let token = a.mint("uid", None, 10);
        assert!(b.verify(&token, 0).is_ok());
    }
}
