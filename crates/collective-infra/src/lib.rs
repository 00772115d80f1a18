//! Infrastructure layer for Collective.
//!
//! Implements the ports defined in `collective-core`: the AWS Bedrock LLM
//! provider, a JSON-file key-value store, configuration loading and
//! environment credential resolution.

pub mod config;
pub mod llm;
pub mod secret;
pub mod storage;
