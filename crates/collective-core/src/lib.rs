//! Business logic and port definitions for the Collective chatroom.
//!
//! This crate defines the orchestration core (prompt building, completion,
//! fan-out dispatch, chat session) and the ports the infrastructure layer
//! implements. It depends only on `collective-types` -- never on
//! `collective-infra` or any HTTP/filesystem crate.

pub mod chat;
pub mod completion;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod storage;
pub mod store;
