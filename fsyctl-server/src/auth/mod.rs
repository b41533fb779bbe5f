//! Authentication: password hashing and signed session tokens

pub mod password;
pub mod token;

pub use password::{hash_secret, verify_secret};
pub use token::{Claims, SessionKeys, MAX_TTL_SECS, MIN_SECRET_LEN};

/// Authentication error
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("malformed token")]
    MalformedToken,

    #[error("invalid token signature")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("session secret must be at least {min} bytes")]
    WeakSecret { min: usize },

    #[error("session lifetime must be between 1 and {max} seconds")]
    InvalidTtl { max: u64 },

    #[error("token encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// PINs are 4 to 8 digits.
pub fn is_valid_pin(pin: &str) -> bool {
    (4..=8).contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit())
}
