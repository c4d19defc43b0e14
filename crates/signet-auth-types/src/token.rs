//! JWT bearer-token issuance and validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "issuer", test))]
use serde::Serialize;
use uuid::Uuid;

/// Access-token lifetime in seconds (1 hour).
pub const ACCESS_TOKEN_TTL_SECS: u64 = 3600;

/// Authenticated identity derived from a validated bearer token.
/// Reconstructed fresh on every request; never persisted.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub expires_at: u64,
}

/// Errors returned by [`validate_access_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload shared by token creation and validation.
///
/// [`Deserialize`] is always available — all consumers validate tokens.
/// [`Serialize`] requires the **`issuer`** cargo feature; only the auth
/// service enables it because it is the sole token issuer.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "issuer", test), derive(Serialize))]
pub struct JwtClaims {
    /// User ID (UUID string).
    pub sub: String,
    /// Issuance timestamp (seconds since UNIX epoch).
    pub iat: u64,
    /// Expiration timestamp (seconds since UNIX epoch).
    pub exp: u64,
}

// ── Core decode (private) ────────────────────────────────────────────────

/// Decode and validate a JWT, returning raw claims.
///
/// Validation: HS256, exp checked, required claims: `exp` + `sub`.
/// Zero leeway — a token is invalid the instant `exp` passes. Issuer and
/// validators share one clock, so there is no skew to tolerate.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_) => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

// ── Public: all consumers ────────────────────────────────────────────────

/// Validate a bearer token and return the embedded principal.
///
/// Purely a function of the token bytes and the secret — no store lookup,
/// hence no revocation capability.
pub fn validate_access_token(token: &str, secret: &str) -> Result<Principal, AuthError> {
    let claims = decode_jwt(token, secret)?;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(Principal {
        user_id,
        expires_at: claims.exp,
    })
}

// ── Feature-gated: issuer only ───────────────────────────────────────────

#[cfg(any(feature = "issuer", test))]
fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Issue a signed access token for `user_id`, returning the compact token
/// and its expiration timestamp.
///
/// Requires the `issuer` feature. The secret is process-wide state, loaded
/// once at startup and never rotated within a process lifetime.
#[cfg(any(feature = "issuer", test))]
pub fn issue_access_token(
    user_id: Uuid,
    secret: &str,
) -> Result<(String, u64), jsonwebtoken::errors::Error> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let iat = now_secs();
    let exp = iat + ACCESS_TOKEN_TTL_SECS;
    let claims = JwtClaims {
        sub: user_id.to_string(),
        iat,
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, exp))
}
