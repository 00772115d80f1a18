//! Chat session management.
//!
//! `ChatSession` owns the transcript and drives one dispatch per human turn.

pub mod session;
