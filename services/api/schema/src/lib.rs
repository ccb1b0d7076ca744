//! sea-orm entities for the Second Opinion API database.

pub mod otp_codes;
pub mod otp_issuances;
pub mod patients;
pub mod predictions;
pub mod users;
