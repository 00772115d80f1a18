//! Slash command parsing and help for the chat loop.
//!
//! Commands start with `/` and manage the persona roster, the room, and the
//! transcript. Persona numbers are the 1-based positions shown by `/bots`.

use std::fmt;
use std::io::{self, Write};

use console::style;

use collective_types::room::RoomSettingsUpdate;

/// Room fields editable with `/set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomField {
    Name,
    Description,
    Setting,
    Context,
    MaxBots,
    Color,
    Background,
}

impl RoomField {
    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().replace('_', "-").as_str() {
            "name" => Some(Self::Name),
            "description" | "desc" => Some(Self::Description),
            "setting" => Some(Self::Setting),
            "context" => Some(Self::Context),
            "max-bots" => Some(Self::MaxBots),
            "color" | "primary-color" => Some(Self::Color),
            "background" | "background-image" => Some(Self::Background),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Setting => "setting",
            Self::Context => "context",
            Self::MaxBots => "max-bots",
            Self::Color => "color",
            Self::Background => "background",
        }
    }

    /// Build the partial update that sets this field to `value`.
    pub fn update(self, value: &str) -> Result<RoomSettingsUpdate, String> {
        let value = value.trim().to_string();
        let mut update = RoomSettingsUpdate::default();
        match self {
            Self::Name => update.name = Some(value),
            Self::Description => update.description = Some(value),
            Self::Setting => update.setting = Some(value),
            Self::Context => update.context = Some(value),
            Self::MaxBots => {
                let max = value
                    .parse::<u32>()
                    .map_err(|_| format!("max-bots must be a whole number, got '{value}'"))?;
                update.max_bots = Some(max);
            }
            Self::Color => update.primary_color = Some(value),
            Self::Background => update.background_image = Some(value),
        }
        Ok(update)
    }
}

/// Credentials typed at `/connect`.
#[derive(Clone, PartialEq, Eq)]
pub enum ConnectAuth {
    /// A Bedrock API key.
    Token(String),
    /// An IAM access key pair with an optional session token.
    Keys {
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
    },
}

impl fmt::Debug for ConnectAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token([REDACTED])"),
            Self::Keys { access_key_id, .. } => f
                .debug_struct("Keys")
                .field("access_key_id", access_key_id)
                .finish_non_exhaustive(),
        }
    }
}

/// Arguments of `/connect`. `region` and `model` override the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectArgs {
    pub auth: ConnectAuth,
    pub region: Option<String>,
    pub model: Option<String>,
}

const CONNECT_USAGE: &str =
    "/connect token <api-key> | keys <access-key-id> <secret> [session=<token>], then [region=<r>] [model=<id>]";

impl ConnectArgs {
    fn parse(arg: Option<&str>) -> Option<Self> {
        let mut positional = Vec::new();
        let mut session = None;
        let mut region = None;
        let mut model = None;
        for word in arg?.split_whitespace() {
            match word.split_once('=') {
                Some(("session", v)) => session = Some(v.to_string()),
                Some(("region", v)) => region = Some(v.to_string()),
                Some(("model", v)) => model = Some(v.to_string()),
                _ => positional.push(word),
            }
        }

        let auth = match positional.as_slice() {
            [mode, token] if mode.eq_ignore_ascii_case("token") && session.is_none() => {
                ConnectAuth::Token(token.to_string())
            }
            [mode, id, secret] if mode.eq_ignore_ascii_case("keys") => ConnectAuth::Keys {
                access_key_id: id.to_string(),
                secret_access_key: secret.to_string(),
                session_token: session,
            },
            _ => return None,
        };
        Some(Self {
            auth,
            region: region.filter(|r| !r.is_empty()),
            model: model.filter(|m| !m.is_empty()),
        })
    }
}

/// Whether `line` carries secrets and must stay out of input history.
pub fn is_sensitive(line: &str) -> bool {
    line.trim_start()
        .split_whitespace()
        .next()
        .is_some_and(|cmd| cmd.eq_ignore_ascii_case("/connect"))
}

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    /// List the persona roster.
    Bots,
    /// Add a blank persona with this name.
    Add(String),
    /// Add a persona from a template, optionally renamed.
    Template { id: String, name: Option<String> },
    Templates,
    /// Flip a persona's active flag.
    Toggle(usize),
    Remove(usize),
    ResetBots,
    /// Show the room settings.
    Room,
    Presets,
    Preset(String),
    ResetRoom,
    Set { field: RoomField, value: String },
    /// Show the prompt a persona would receive right now.
    Prompt(usize),
    /// Install a Bedrock provider for this session.
    Connect(ConnectArgs),
    /// Remove the provider; personas report errors until `/connect`.
    Disconnect,
    /// Empty the transcript.
    Clear,
    /// Dismiss the current error.
    Dismiss,
    Quit,
    /// A known command with bad arguments; holds the usage hint.
    Invalid(String),
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim()).filter(|s| !s.is_empty());

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/bots" => ChatCommand::Bots,
        "/add" => match arg {
            Some(name) => ChatCommand::Add(name.to_string()),
            None => invalid("/add <name>"),
        },
        "/template" => match arg {
            Some(rest) => {
                let mut it = rest.splitn(2, ' ');
                let id = it.next().unwrap_or_default().to_string();
                let name = it
                    .next()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                ChatCommand::Template { id, name }
            }
            None => invalid("/template <id> [name]"),
        },
        "/templates" => ChatCommand::Templates,
        "/toggle" => match number(arg) {
            Some(n) => ChatCommand::Toggle(n),
            None => invalid("/toggle <number>"),
        },
        "/remove" | "/rm" => match number(arg) {
            Some(n) => ChatCommand::Remove(n),
            None => invalid("/remove <number>"),
        },
        "/reset-bots" => ChatCommand::ResetBots,
        "/room" => ChatCommand::Room,
        "/presets" => ChatCommand::Presets,
        "/preset" => match arg {
            Some(id) => ChatCommand::Preset(id.to_string()),
            None => invalid("/preset <id>"),
        },
        "/reset-room" => ChatCommand::ResetRoom,
        "/set" => {
            let mut it = arg.unwrap_or_default().splitn(2, ' ');
            let field = it.next().and_then(RoomField::parse);
            let value = it.next().map(str::trim).filter(|s| !s.is_empty());
            match (field, value) {
                (Some(field), Some(value)) => ChatCommand::Set {
                    field,
                    value: value.to_string(),
                },
                _ => invalid(
                    "/set <name|description|setting|context|max-bots|color|background> <value>",
                ),
            }
        }
        "/prompt" => match number(arg) {
            Some(n) => ChatCommand::Prompt(n),
            None => invalid("/prompt <number>"),
        },
        "/connect" => match ConnectArgs::parse(arg) {
            Some(args) => ChatCommand::Connect(args),
            None => invalid(CONNECT_USAGE),
        },
        "/disconnect" => ChatCommand::Disconnect,
        "/clear" => ChatCommand::Clear,
        "/dismiss" => ChatCommand::Dismiss,
        "/quit" | "/exit" | "/q" => ChatCommand::Quit,
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

fn invalid(usage: &str) -> ChatCommand {
    ChatCommand::Invalid(format!("usage: {usage}"))
}

/// A 1-based persona number.
fn number(arg: Option<&str>) -> Option<usize> {
    arg.and_then(|s| s.parse::<usize>().ok()).filter(|n| *n > 0)
}

/// Write the help text listing all available commands.
pub fn print_help(out: &mut impl Write) -> io::Result<()> {
    let rows = [
        ("/bots", "List personas with their numbers"),
        ("/add <name>", "Add a blank persona"),
        ("/template <id> [name]", "Add a persona from a template"),
        ("/templates", "List persona templates"),
        ("/toggle <n>", "Activate or deactivate persona n"),
        ("/remove <n>", "Remove persona n"),
        ("/reset-bots", "Restore the default personas"),
        ("/prompt <n>", "Show the prompt persona n would receive"),
        ("/room", "Show the room settings"),
        ("/presets", "List room presets"),
        ("/preset <id>", "Switch the room to a preset"),
        ("/set <field> <value>", "Change one room setting"),
        ("/reset-room", "Restore the default room"),
        ("/connect token <key>", "Connect to Bedrock with an API key"),
        ("/connect keys <id> <secret>", "Connect with an access key pair"),
        ("/disconnect", "Disconnect from Bedrock"),
        ("/clear", "Clear the conversation"),
        ("/dismiss", "Dismiss the current error"),
        ("/quit", "Leave the room"),
    ];

    writeln!(out)?;
    writeln!(out, "  {}", style("Available commands:").bold())?;
    writeln!(out)?;
    for (command, description) in rows {
        writeln!(out, "  {}  {}", style(format!("{command:<28}")).cyan(), description)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "  {}",
        style("Anything else is sent to every active persona. Ctrl+D to exit.").dim()
    )?;
    writeln!(out)?;
    Ok(())
}
