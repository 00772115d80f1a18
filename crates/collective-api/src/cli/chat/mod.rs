//! Interactive room chat for Collective.
//!
//! Implements the terminal loop: welcome banner, slash commands for managing
//! personas and the room, and rendering of each turn's replies.
//! Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
