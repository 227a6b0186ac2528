//! Common types and checks shared by the AI Note tooling.
pub mod config;
pub mod manifest;
pub mod readiness;
pub mod runtime;
