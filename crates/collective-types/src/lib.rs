//! Shared domain types for the Collective chatroom.
//!
//! This crate contains the types used across the workspace: chat messages,
//! bot personas, room settings, LLM request/response shapes, configuration,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, secrecy.

pub mod config;
pub mod error;
pub mod llm;
pub mod message;
pub mod persona;
pub mod response;
pub mod room;
