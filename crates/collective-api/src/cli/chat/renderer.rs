//! Terminal rendering for transcript messages and room state.
//!
//! Everything writes to a caller-supplied `Write` so the loop can route
//! output through the readline `SharedWriter` and tests can capture it.

use std::io::{self, Write};

use console::style;

use collective_types::message::{Message, SenderType};
use collective_types::persona::{BotPersona, BotTemplate};
use collective_types::room::{RoomPreset, RoomSettings};

/// Write one transcript message. Continuation lines are indented under the
/// first.
pub fn print_message(out: &mut impl Write, message: &Message) -> io::Result<()> {
    let label = match message.sender_type {
        SenderType::Human => style(&message.sender).green().bold(),
        SenderType::Bot => style(&message.sender).cyan().bold(),
    };
    let mut lines = message.content.lines();
    writeln!(out, "  {} {}", label, lines.next().unwrap_or_default())?;
    for line in lines {
        writeln!(out, "    {line}")?;
    }
    Ok(())
}

/// Write the session's aggregate error.
pub fn print_error(out: &mut impl Write, error: &str) -> io::Result<()> {
    writeln!(out, "  {} {}", style("!").red().bold(), error)?;
    writeln!(out, "  {}", style("/dismiss to hide this message").dim())
}

/// Write a short status line.
pub fn print_notice(out: &mut impl Write, notice: &str) -> io::Result<()> {
    writeln!(out, "  {} {}", style("*").cyan().bold(), notice)
}

/// Write a warning line.
pub fn print_warning(out: &mut impl Write, warning: &str) -> io::Result<()> {
    writeln!(out, "  {} {}", style("!").yellow().bold(), warning)
}

/// Warn when more personas are active than the room's advisory cap.
pub fn print_capacity_warning(
    out: &mut impl Write,
    active: usize,
    max_bots: u32,
) -> io::Result<()> {
    if active > max_bots as usize {
        print_warning(
            out,
            &format!("{active} personas are active but this room suggests at most {max_bots}"),
        )?;
    }
    Ok(())
}

/// Write the numbered persona roster.
pub fn print_personas(out: &mut impl Write, personas: &[BotPersona]) -> io::Result<()> {
    writeln!(out)?;
    if personas.is_empty() {
        writeln!(out, "  {}", style("No personas. /add or /template to create one.").dim())?;
    }
    for (i, persona) in personas.iter().enumerate() {
        let marker = if persona.is_active {
            style("●").green()
        } else {
            style("○").dim()
        };
        writeln!(
            out,
            "  {:>2}. {} {}",
            i + 1,
            marker,
            style(&persona.name).bold()
        )?;
        if !persona.personality.is_empty() {
            writeln!(out, "      {}", style(&persona.personality).dim())?;
        }
    }
    writeln!(out)?;
    Ok(())
}

pub fn print_templates(out: &mut impl Write, templates: &[BotTemplate]) -> io::Result<()> {
    writeln!(out)?;
    for template in templates {
        writeln!(
            out,
            "  {}  {}",
            style(format!("{:<12}", template.id)).cyan(),
            style(&template.name).bold()
        )?;
        writeln!(out, "  {:<12}  {}", "", style(&template.personality).dim())?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn print_room(out: &mut impl Write, room: &RoomSettings) -> io::Result<()> {
    let rows = [
        ("name", room.name.clone()),
        ("description", room.description.clone()),
        ("setting", room.setting.clone()),
        ("context", room.context.clone()),
        ("max-bots", room.max_bots.to_string()),
        ("color", room.primary_color.clone()),
        ("background", room.background_image.clone()),
    ];
    writeln!(out)?;
    for (field, value) in rows {
        let value = if value.is_empty() { "-".to_string() } else { value };
        writeln!(out, "  {}  {}", style(format!("{field:<12}")).bold(), value)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Write the preset list, marking the one whose name matches the room.
pub fn print_presets(
    out: &mut impl Write,
    presets: &[RoomPreset],
    current_name: &str,
) -> io::Result<()> {
    writeln!(out)?;
    for preset in presets {
        let marker = if preset.name == current_name { "*" } else { " " };
        writeln!(
            out,
            "  {} {}  {}",
            marker,
            style(format!("{:<12}", preset.id)).cyan(),
            preset.name
        )?;
        writeln!(out, "    {:<12}  {}", "", style(&preset.description).dim())?;
    }
    writeln!(out)?;
    Ok(())
}
