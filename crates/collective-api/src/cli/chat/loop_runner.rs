//! Main chat loop.
//!
//! Reads lines, routes slash commands to the stores and plain text to the
//! session, and renders each turn's replies and errors. Store mutations are
//! persisted immediately; a failed save is reported but does not end the
//! session.

use std::io::Write;

use console::style;
use tracing::{info, warn};

use collective_core::prompt::PromptBuilder;
use collective_core::store::defaults::Catalogue;
use collective_types::config::BedrockCredentials;
use collective_types::persona::{BotPersona, NewPersona};

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand, ConnectArgs, ConnectAuth, RoomField};
use super::input::{ChatInput, InputEvent};
use super::renderer::{
    print_capacity_warning, print_error, print_message, print_notice, print_personas,
    print_presets, print_room, print_templates, print_warning,
};

/// Whether the loop keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run the interactive room until `/quit` or Ctrl+D.
pub async fn run_chat_loop(state: &mut AppState) -> anyhow::Result<()> {
    let prompt = format!(
        "  {} ",
        style(format!("{} >", state.session.human_name())).green().bold()
    );
    let (mut input, mut out) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let model = state.client().describe().await;
    print_welcome_banner(
        &mut out,
        state.room.current(),
        state.personas.active().len(),
        state.personas.len(),
        model
            .as_ref()
            .zip(state.auth_label)
            .map(|((_, model_id), auth)| (model_id.as_str(), auth)),
    )?;
    print_capacity_warning(
        &mut out,
        state.personas.active().len(),
        state.room.current().max_bots,
    )?;
    info!(data_dir = %state.data_dir.display(), "room opened");

    loop {
        match input.read_line().await {
            InputEvent::Eof => {
                writeln!(out, "\n  {}", style("Left the room.").dim())?;
                break;
            }
            InputEvent::Interrupted => {
                writeln!(out, "\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim())?;
            }
            InputEvent::Line(text) => {
                if text.is_empty() {
                    continue;
                }
                if handle_line(state, &text, &mut out).await? == Flow::Quit {
                    writeln!(out, "\n  {}", style("Left the room.").dim())?;
                    break;
                }
            }
        }
    }

    input
        .flush()
        .map_err(|e| anyhow::anyhow!("Failed to restore terminal: {e}"))?;
    Ok(())
}

/// Handle one submitted line: a slash command or a message to the room.
pub async fn handle_line(
    state: &mut AppState,
    text: &str,
    out: &mut impl Write,
) -> anyhow::Result<Flow> {
    match commands::parse(text) {
        Some(command) => execute(state, command, out).await,
        None => {
            send(state, text, out).await?;
            Ok(Flow::Continue)
        }
    }
}

async fn send(state: &mut AppState, text: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let active = state.personas.active().len();
    if active == 0 {
        print_warning(out, "No active personas; nobody will answer. Try /bots and /toggle.")?;
    } else {
        writeln!(out, "  {}", style(format!("{active} thinking...")).dim())?;
    }

    let before = state.session.messages().len();
    state
        .session
        .send_message(text, state.personas.list(), state.room.current())
        .await;

    for message in state.session.messages().iter().skip(before) {
        if !message.is_human() {
            print_message(out, message)?;
        }
    }
    if let Some(error) = state.session.error() {
        print_error(out, error)?;
    }
    writeln!(out)?;
    Ok(())
}

/// The persona shown as number `n` by `/bots`.
fn persona_at(state: &AppState, n: usize) -> Option<&BotPersona> {
    n.checked_sub(1).and_then(|i| state.personas.list().get(i))
}

async fn save_personas(state: &AppState, out: &mut impl Write) -> std::io::Result<()> {
    if let Err(e) = state.save_personas().await {
        warn!(error = %e, "persona save failed");
        print_warning(out, &format!("{e:#}"))?;
    }
    Ok(())
}

async fn save_room(state: &AppState, out: &mut impl Write) -> std::io::Result<()> {
    if let Err(e) = state.save_room().await {
        warn!(error = %e, "room save failed");
        print_warning(out, &format!("{e:#}"))?;
    }
    Ok(())
}

/// Build credentials from `/connect` arguments over the configured defaults.
fn credentials_from(
    state: &AppState,
    args: ConnectArgs,
) -> Result<BedrockCredentials, collective_types::error::ConfigError> {
    let settings = &state.config.bedrock;
    let region = args.region.unwrap_or_else(|| settings.region.clone());
    let model = args.model.unwrap_or_else(|| settings.model_id.clone());
    match args.auth {
        ConnectAuth::Token(token) => BedrockCredentials::bearer_token(region, model, &token),
        ConnectAuth::Keys {
            access_key_id,
            secret_access_key,
            session_token,
        } => BedrockCredentials::access_key(
            region,
            model,
            &access_key_id,
            &secret_access_key,
            session_token.as_deref(),
        ),
    }
}

fn check_capacity(state: &AppState, out: &mut impl Write) -> std::io::Result<()> {
    print_capacity_warning(
        out,
        state.personas.active().len(),
        state.room.current().max_bots,
    )
}

async fn execute(
    state: &mut AppState,
    command: ChatCommand,
    out: &mut impl Write,
) -> anyhow::Result<Flow> {
    match command {
        ChatCommand::Help => commands::print_help(out)?,

        ChatCommand::Bots => {
            print_personas(out, state.personas.list())?;
            check_capacity(state, out)?;
        }

        ChatCommand::Add(name) => {
            state.personas.add(NewPersona::named(name.clone()));
            save_personas(state, out).await?;
            print_notice(
                out,
                &format!("Added {name} as #{}. It has no personality yet.", state.personas.len()),
            )?;
            check_capacity(state, out)?;
        }

        ChatCommand::Template { id, name } => {
            match state.personas.add_from_template(&id, name.as_deref()) {
                Ok(persona_id) => {
                    save_personas(state, out).await?;
                    let added = state
                        .personas
                        .get(persona_id)
                        .map(|p| p.name.clone())
                        .unwrap_or_default();
                    print_notice(out, &format!("Added {added} as #{}", state.personas.len()))?;
                    check_capacity(state, out)?;
                }
                Err(e) => print_warning(out, &format!("{e}. See /templates."))?,
            }
        }

        ChatCommand::Templates => print_templates(out, state.personas.templates())?,

        ChatCommand::Toggle(n) => match persona_at(state, n).map(|p| (p.id, p.is_active, p.name.clone())) {
            Some((id, was_active, name)) => {
                state.personas.set_active(id, !was_active)?;
                save_personas(state, out).await?;
                let now = if was_active { "inactive" } else { "active" };
                print_notice(out, &format!("{name} is now {now}"))?;
                check_capacity(state, out)?;
            }
            None => print_warning(out, &format!("No persona #{n}. See /bots."))?,
        },

        ChatCommand::Remove(n) => match persona_at(state, n).map(|p| p.id) {
            Some(id) => {
                let removed = state.personas.remove(id)?;
                save_personas(state, out).await?;
                print_notice(out, &format!("Removed {}", removed.name))?;
            }
            None => print_warning(out, &format!("No persona #{n}. See /bots."))?,
        },

        ChatCommand::ResetBots => {
            state.personas.reset_to_defaults();
            save_personas(state, out).await?;
            print_notice(out, "Personas restored to the defaults")?;
        }

        ChatCommand::Room => print_room(out, state.room.current())?,

        ChatCommand::Presets => {
            let mut presets = vec![Catalogue::builtin().default_preset.clone()];
            presets.extend_from_slice(state.room.presets());
            print_presets(out, &presets, &state.room.current().name)?;
        }

        ChatCommand::Preset(id) => {
            let applied = state.room.apply_preset(&id);
            save_room(state, out).await?;
            if applied.id == id {
                print_notice(out, &format!("The room is now {}", applied.name))?;
            } else {
                print_warning(
                    out,
                    &format!("Unknown preset '{id}'; restored {} instead", applied.name),
                )?;
            }
            check_capacity(state, out)?;
        }

        ChatCommand::ResetRoom => {
            state.room.reset_to_default();
            save_room(state, out).await?;
            print_notice(out, "Room restored to the default")?;
        }

        ChatCommand::Set { field, value } => match field.update(&value) {
            Ok(update) => {
                state.room.update(update);
                save_room(state, out).await?;
                print_notice(out, &format!("Updated {}", field.as_str()))?;
                if field == RoomField::MaxBots {
                    check_capacity(state, out)?;
                }
            }
            Err(message) => print_warning(out, &message)?,
        },

        ChatCommand::Prompt(n) => match persona_at(state, n) {
            Some(persona) => {
                let prompt =
                    PromptBuilder::build(state.session.messages(), persona, state.room.current());
                writeln!(out)?;
                for line in prompt.lines() {
                    writeln!(out, "  {}", style(line).dim())?;
                }
                writeln!(out)?;
            }
            None => print_warning(out, &format!("No persona #{n}. See /bots."))?,
        },

        ChatCommand::Connect(args) => match credentials_from(state, args) {
            Ok(credentials) => {
                let region = credentials.region.clone();
                let model = credentials.model_id.clone();
                match state.connect(credentials).await {
                    Ok(()) => print_notice(
                        out,
                        &format!(
                            "Connected to Bedrock in {region} ({model}) with {}",
                            state.auth_label.unwrap_or("credentials")
                        ),
                    )?,
                    Err(e) => print_warning(out, &format!("{e:#}"))?,
                }
            }
            Err(e) => print_warning(out, &e.to_string())?,
        },

        ChatCommand::Disconnect => {
            if state.client().is_initialized().await {
                state.disconnect().await;
                print_notice(out, "Disconnected from Bedrock. Use /connect to reconnect.")?;
            } else {
                print_warning(out, "Not connected. Use /connect to add credentials.")?;
            }
        }

        ChatCommand::Clear => {
            state.session.clear_messages();
            print_notice(out, "Conversation cleared")?;
        }

        ChatCommand::Dismiss => state.session.clear_error(),

        ChatCommand::Quit => return Ok(Flow::Quit),

        ChatCommand::Invalid(usage) => print_warning(out, &usage)?,

        ChatCommand::Unknown(name) => print_warning(
            out,
            &format!("Unknown command: {name}. Type /help for available commands."),
        )?,
    }

    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use collective_core::store::persona::PersonaStore;
    use collective_core::store::room::RoomStore;
    use collective_types::config::AppConfig;

    async fn state(tmp: &TempDir) -> AppState {
        console::set_colors_enabled(false);
        AppState::open(tmp.path().to_path_buf(), AppConfig::default(), None)
            .await
            .unwrap()
    }

    async fn run(state: &mut AppState, line: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = handle_line(state, line, &mut out).await.unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_add_persists_persona() {
        let tmp = TempDir::new().unwrap();
        let mut state = state(&tmp).await;
        let before = state.personas.len();

        let (flow, text) = run(&mut state, "/add Zed").await;
        assert_eq!(flow, Flow::Continue);
        assert!(text.contains("Added Zed"));
        assert_eq!(state.personas.len(), before + 1);

        let reloaded = PersonaStore::load(&state.kv).await;
        assert!(reloaded.list().iter().any(|p| p.name == "Zed"));
    }

    #[tokio::test]
    async fn test_toggle_and_remove_by_number() {
        let tmp = TempDir::new().unwrap();
        let mut state = state(&tmp).await;
        let first = state.personas.list()[0].clone();

        let (_, text) = run(&mut state, "/toggle 1").await;
        assert!(text.contains(&format!("{} is now", first.name)));
        assert_eq!(
            state.personas.get(first.id).unwrap().is_active,
            !first.is_active
        );

        run(&mut state, "/remove 1").await;
        assert!(state.personas.get(first.id).is_none());

        let (_, text) = run(&mut state, "/toggle 99").await;
        assert!(text.contains("No persona #99"));
    }

    #[tokio::test]
    async fn test_template_unknown_id_warns() {
        let tmp = TempDir::new().unwrap();
        let mut state = state(&tmp).await;
        let before = state.personas.len();

        let (_, text) = run(&mut state, "/template nobody").await;
        assert!(text.contains("'nobody' not found"));
        assert_eq!(state.personas.len(), before);
    }

    #[tokio::test]
    async fn test_preset_and_set_persist_room() {
        let tmp = TempDir::new().unwrap();
        let mut state = state(&tmp).await;

        let (_, text) = run(&mut state, "/preset tavern").await;
        assert!(text.contains("The room is now"));
        run(&mut state, "/set context Dragons were sighted nearby").await;

        let reloaded = RoomStore::load(&state.kv).await;
        assert_eq!(reloaded.current().context, "Dragons were sighted nearby");
        assert_eq!(reloaded.current().name, state.room.current().name);

        let (_, text) = run(&mut state, "/preset atlantis").await;
        assert!(text.contains("Unknown preset 'atlantis'"));
    }

    #[tokio::test]
    async fn test_lowering_max_bots_warns() {
        let tmp = TempDir::new().unwrap();
        let mut state = state(&tmp).await;
        assert!(state.personas.active().len() > 1);

        let (_, text) = run(&mut state, "/set max-bots 1").await;
        assert!(text.contains("suggests at most 1"));

        let (_, text) = run(&mut state, "/set max-bots lots").await;
        assert!(text.contains("whole number"));
        assert_eq!(state.room.current().max_bots, 1);
    }

    #[tokio::test]
    async fn test_message_without_provider_reports_failures() {
        let tmp = TempDir::new().unwrap();
        let mut state = state(&tmp).await;

        let (_, text) = run(&mut state, "hello room").await;
        assert!(text.contains("Some bots failed to respond"));
        assert_eq!(state.session.messages().len(), 1);
        assert!(state.session.error().is_some());

        run(&mut state, "/dismiss").await;
        assert!(state.session.error().is_none());

        run(&mut state, "/clear").await;
        assert!(state.session.messages().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_shows_rendered_prompt() {
        let tmp = TempDir::new().unwrap();
        let mut state = state(&tmp).await;
        let name = state.personas.list()[0].name.clone();

        let (_, text) = run(&mut state, "/prompt 1").await;
        assert!(text.contains(&format!("You are {name}")));
        assert!(text.contains("Recent Conversation:"));
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let tmp = TempDir::new().unwrap();
        let mut state = state(&tmp).await;

        let (_, text) = run(&mut state, "/connect token abc region=us-west-2 model=test-model").await;
        assert!(text.contains("Connected to Bedrock in us-west-2 (test-model) with bearer token"));
        assert_eq!(state.auth_label, Some("bearer token"));
        let (provider, model) = state.client().describe().await.unwrap();
        assert_eq!(provider, "bedrock");
        assert_eq!(model, "test-model");

        let (_, text) = run(&mut state, "/disconnect").await;
        assert!(text.contains("Disconnected from Bedrock"));
        assert!(!state.client().is_initialized().await);

        let (_, text) = run(&mut state, "hello again").await;
        assert!(text.contains("not initialized"));

        let (_, text) = run(&mut state, "/disconnect").await;
        assert!(text.contains("Not connected"));
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_input() {
        let tmp = TempDir::new().unwrap();
        let mut state = state(&tmp).await;

        let (_, text) = run(&mut state, "/connect token abc region=Mars_1").await;
        assert!(text.contains("invalid region"));
        assert!(!state.client().is_initialized().await);

        let (_, text) = run(&mut state, "/connect keys AKID").await;
        assert!(text.contains("usage: /connect"));
        assert!(state.auth_label.is_none());
    }

    #[tokio::test]
    async fn test_quit_and_unknown() {
        let tmp = TempDir::new().unwrap();
        let mut state = state(&tmp).await;

        let (flow, _) = run(&mut state, "/quit").await;
        assert_eq!(flow, Flow::Quit);

        let (flow, text) = run(&mut state, "/dance").await;
        assert_eq!(flow, Flow::Continue);
        assert!(text.contains("Unknown command: /dance"));
    }
}
