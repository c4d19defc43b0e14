//! Test utilities for Signet services.
//!
//! Import in `#[cfg(test)]` blocks or dev-dependencies only — never in
//! production code.

pub mod auth;
