//! Student-to-university matching: attribute-fit scoring blended with learned
//! pairwise preferences, served as interactive ranking sessions.

pub mod catalog;
pub mod config;
pub mod error;
pub mod matching;
pub mod session;
pub mod telemetry;
