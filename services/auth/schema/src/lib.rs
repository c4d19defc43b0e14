//! sea-orm entities for the auth service.

pub mod otp_codes;
pub mod users;
