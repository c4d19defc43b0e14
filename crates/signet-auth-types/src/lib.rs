//! Bearer-token types shared between the token issuer and its consumers.
//!
//! Provides JWT issuance (feature-gated) and validation, plus the
//! [`principal::Principal`] request extractor used behind the auth gate.

pub mod principal;
pub mod token;
