pub mod otp;
pub mod signup;
pub mod token;
