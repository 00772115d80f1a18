//! Persona and room stores.
//!
//! Both are plain values owned by the application and passed by reference;
//! the orchestrator only ever sees cloned snapshots of them.

pub mod defaults;
pub mod persona;
pub mod room;
