//! Bearer-auth helpers for integration tests.
//!
//! Requests behind the auth gate carry an `Authorization: Bearer <jwt>`
//! header. `TestBearer` issues a real signed token so no running issuer
//! is needed in tests.

use http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use signet_auth_types::token::issue_access_token;

/// A signed bearer credential for a test user.
pub struct TestBearer {
    pub user_id: Uuid,
    pub token: String,
}

impl TestBearer {
    /// Issue a token for `user_id` signed with `secret`.
    ///
    /// Panics on encoding failure — acceptable in test setup.
    pub fn new(user_id: Uuid, secret: &str) -> Self {
        let (token, _exp) = issue_access_token(user_id, secret).expect("issue test token");
        Self { user_id, token }
    }

    /// Return headers as a client would send them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Bearer {}", self.token)).unwrap(),
        );
        map
    }
}
