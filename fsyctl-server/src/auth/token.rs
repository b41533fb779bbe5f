//! HS256 session tokens in JWT compact form

use std::time::Duration;

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Shortest accepted signing key
pub const MIN_SECRET_LEN: usize = 16;

/// Longest accepted session lifetime, in seconds
pub const MAX_TTL_SECS: u64 = i32::MAX as u64;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i32,
    pub user_type: String,
    pub full_name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing key plus token lifetime
#[derive(Clone)]
pub struct SessionKeys {
    mac: HmacSha256,
    ttl: Duration,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, AuthError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::WeakSecret { min: MIN_SECRET_LEN });
        }
        if ttl.as_secs() == 0 || ttl.as_secs() > MAX_TTL_SECS {
            return Err(AuthError::InvalidTtl { max: MAX_TTL_SECS });
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| AuthError::WeakSecret { min: MIN_SECRET_LEN })?;
        Ok(Self { mac, ttl })
    }

    /// Sign a token for a user, valid from `now` (unix seconds) for the TTL.
    pub fn issue(
        &self,
        user_id: i32,
        user_type: &str,
        full_name: &str,
        now: i64,
    ) -> Result<String, AuthError> {
        // ttl is capped in `new`; only an absurd `now` can overflow.
        let exp = now
            .checked_add(self.ttl.as_secs() as i64)
            .ok_or(AuthError::InvalidTtl { max: MAX_TTL_SECS })?;
        let header = Header {
            alg: "HS256".into(),
            typ: "JWT".into(),
        };
        let claims = Claims {
            user_id,
            user_type: user_type.to_string(),
            full_name: full_name.to_string(),
            iat: now,
            exp,
        };

        let header = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
        let payload = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signing_input = format!("{header}.{payload}");

        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        let signature = BASE64_URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Check signature, algorithm and expiry; return the claims.
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::MalformedToken);
        };

        let signature = BASE64_URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::MalformedToken)?;
        let mut mac = self.mac.clone();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        let header: Header = decode_part(header)?;
        if header.alg != "HS256" {
            return Err(AuthError::MalformedToken);
        }

        let claims: Claims = decode_part(payload)?;
        if claims.exp <= now {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}

fn decode_part<T: serde::de::DeserializeOwned>(part: &str) -> Result<T, AuthError> {
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_750_000_000;

    fn keys() -> SessionKeys {
        SessionKeys::new("0123456789abcdef-test", Duration::from_secs(3600)).unwrap()
    }

    #[test]
    fn issue_then_verify() {
        let token = keys().issue(7, "Coordinator", "Ana Reyes", NOW).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = keys().verify(&token, NOW + 10).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.full_name, "Ana Reyes");
        assert_eq!(claims.exp, NOW + 3600);
    }

    #[test]
    fn lifetime_must_be_positive_and_bounded() {
        let secret = "0123456789abcdef-test";
        for secs in [0, MAX_TTL_SECS + 1, u64::MAX] {
            let err = SessionKeys::new(secret, Duration::from_secs(secs)).unwrap_err();
            assert!(matches!(err, AuthError::InvalidTtl { .. }), "{secs}");
        }

        let keys = SessionKeys::new(secret, Duration::from_secs(MAX_TTL_SECS)).unwrap();
        let token = keys.issue(1, "Coordinator", "X", NOW).unwrap();
        let claims = keys.verify(&token, NOW + 1).unwrap();
        assert_eq!(claims.exp, NOW + MAX_TTL_SECS as i64);
    }

    #[test]
    fn issue_rejects_overflowing_expiry() {
        let err = keys().issue(1, "Coordinator", "X", i64::MAX - 10).unwrap_err();
        assert!(matches!(err, AuthError::InvalidTtl { .. }));
    }

    #[test]
    fn claims_use_camel_case() {
        let token = keys().issue(1, "Coordinator", "X", NOW).unwrap();
        let payload = token.split('.').nth(1).unwrap();
        let json = String::from_utf8(BASE64_URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
        assert!(json.contains("\"userId\":1"));
        assert!(json.contains("\"userType\""));
        assert!(json.contains("\"fullName\""));
    }

    #[test]
    fn expired_token_rejected() {
        let token = keys().issue(7, "Coordinator", "A", NOW).unwrap();
        let err = keys().verify(&token, NOW + 3600).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
    }

    #[test]
    fn other_key_rejected() {
        let token = keys().issue(7, "Coordinator", "A", NOW).unwrap();
        let other = SessionKeys::new("another-secret-0123456", Duration::from_secs(60)).unwrap();
        assert!(matches!(other.verify(&token, NOW), Err(AuthError::BadSignature)));
    }

    #[test]
    fn tampered_payload_rejected() {
        let token = keys().issue(7, "Coordinator", "A", NOW).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = BASE64_URL_SAFE_NO_PAD.encode(
            br#"{"userId":1,"userType":"Coordinator","fullName":"B","iat":0,"exp":99999999999}"#,
        );
        parts[1] = &forged;
        assert!(matches!(
            keys().verify(&parts.join("."), NOW),
            Err(AuthError::BadSignature)
        ));
    }

    #[test]
    fn malformed_tokens() {
        for token in ["", "abc", "a.b", "a.b.c.d", "a.b.!!!"] {
            assert!(keys().verify(token, NOW).is_err(), "{token} accepted");
        }
    }

    #[test]
    fn short_secret_refused() {
        let err = SessionKeys::new("short", Duration::from_secs(60)).unwrap_err();
        assert!(matches!(err, AuthError::WeakSecret { min: 16 }));
    }
}
