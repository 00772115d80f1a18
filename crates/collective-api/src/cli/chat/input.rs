//! Async readline input for the chat loop.
//!
//! Wraps `rustyline_async::Readline`, mapping EOF (Ctrl+D) and interrupt
//! (Ctrl+C) to explicit events. `/connect` lines are kept out of history.

use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};
use tracing::debug;

use super::commands::is_sensitive;

/// Events produced by the input handler.
#[derive(Debug)]
pub enum InputEvent {
    /// User submitted a line (already trimmed).
    Line(String),
    /// End of file (Ctrl+D).
    Eof,
    /// Interrupt signal (Ctrl+C).
    Interrupted,
}

pub struct ChatInput {
    rl: Readline,
}

impl ChatInput {
    /// Create the input handler with its prompt.
    ///
    /// Also returns a `SharedWriter`; output written through it does not
    /// clobber the prompt line.
    pub fn new(prompt: String) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, writer) = Readline::new(prompt)?;
        Ok((Self { rl }, writer))
    }

    pub async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                let trimmed = line.trim().to_string();
                if !trimmed.is_empty() && !is_sensitive(&trimmed) {
                    self.rl.add_history_entry(trimmed.clone());
                }
                InputEvent::Line(trimmed)
            }
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(e) => {
                debug!(error = %e, "readline failed, treating as EOF");
                InputEvent::Eof
            }
        }
    }

    /// Restore the terminal before exit.
    pub fn flush(&mut self) -> Result<(), ReadlineError> {
        self.rl.flush()
    }
}
