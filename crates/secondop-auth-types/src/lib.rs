//! Auth types shared across the Second Opinion backend.
//!
//! Provides JWT signing/validation and the `BearerToken` extractor.

pub mod bearer;
pub mod token;
