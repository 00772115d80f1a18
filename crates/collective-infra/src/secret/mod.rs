//! Credential resolution.
//!
//! Bedrock credentials are read from the environment only; nothing secret is
//! ever persisted by the application.

pub mod env;
