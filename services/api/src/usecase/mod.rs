pub mod account;
pub mod cleanup;
pub mod login;
pub mod otp;
pub mod password;
pub mod password_reset;
pub mod patient;
pub mod prediction;
pub mod registration;

#[cfg(test)]
pub(crate) mod testkit;
