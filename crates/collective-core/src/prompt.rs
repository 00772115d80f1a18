//! Per-persona prompt rendering.
//!
//! `PromptBuilder` turns a conversation history, one persona and the room
//! settings into a single text prompt. Everything here is pure: no IO, no
//! clock, no randomness, so identical inputs render identical prompts.

use collective_types::message::Message;
use collective_types::persona::BotPersona;
use collective_types::room::RoomSettings;

/// Number of most recent messages rendered into a prompt.
pub const HISTORY_WINDOW: usize = 20;

/// Renders prompts for bot personas.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Render the prompt for `persona` in `room` given the conversation so far.
    ///
    /// Only the last [`HISTORY_WINDOW`] messages are included. An empty
    /// history leaves the "Recent Conversation" section empty.
    pub fn build(history: &[Message], persona: &BotPersona, room: &RoomSettings) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "You are {}, a character in \"{}\".\n\n",
            persona.name, room.name
        ));
        prompt.push_str(&format!("Setting: {}\n", room.setting));
        prompt.push_str(&format!("Room Context: {}\n\n", room.context));
        prompt.push_str(&format!("Your Personality: {}\n\n", persona.personality));
        prompt.push_str(&format!("System Instructions: {}\n\n", persona.system_prompt));
        prompt.push_str("Recent Conversation:\n");
        prompt.push_str(&Self::conversation_section(history));
        prompt.push_str(&format!(
            "\n\nRespond as {} would, staying true to your personality and the room's setting. \
             Keep responses conversational and engaging.",
            persona.name
        ));

        prompt
    }

    /// Render the trailing history window as `sender: content` lines.
    pub fn conversation_section(history: &[Message]) -> String {
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        history[start..]
            .iter()
            .map(|m| format!("{}: {}", m.sender, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Append the raw human utterance as the final turn of a rendered prompt.
    pub fn final_turn(prompt: &str, persona: &BotPersona, utterance: &str) -> String {
        format!(
            "{prompt}\n\nHuman just said: \"{utterance}\"\n\nRespond as {}:",
            persona.name
        )
    }
}
