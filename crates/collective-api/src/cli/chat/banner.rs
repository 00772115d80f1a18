//! Welcome banner shown when the room opens.

use std::io::{self, Write};

use console::style;

use collective_types::room::RoomSettings;

/// Write the welcome banner: room identity, roster size and provider status.
pub fn print_welcome_banner(
    out: &mut impl Write,
    room: &RoomSettings,
    active: usize,
    total: usize,
    model: Option<(&str, &str)>,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {}", style(&room.name).cyan().bold())?;
    if !room.description.is_empty() {
        writeln!(out, "  {}", style(&room.description).dim())?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "  {}  {} active of {}",
        style("Personas:").bold(),
        active,
        total
    )?;
    match model {
        Some((model_id, auth)) => writeln!(
            out,
            "  {}     {} {}",
            style("Model:").bold(),
            style(model_id).dim(),
            style(format!("({auth})")).dim()
        )?,
        None => writeln!(
            out,
            "  {}     {}",
            style("Model:").bold(),
            style("not configured; use /connect or set AWS credentials").yellow()
        )?,
    }
    writeln!(out)?;
    writeln!(out, "  {}", style("Type /help for commands, Ctrl+D to exit").dim())?;
    writeln!(out, "  {}", style("---").dim())?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use collective_core::store::room::RoomStore;

    #[test]
    fn test_banner_without_provider() {
        let room = RoomStore::with_default().settings();
        let mut out = Vec::new();
        print_welcome_banner(&mut out, &room, 2, 3, None).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&room.name));
        assert!(text.contains("2 active of 3"));
        assert!(text.contains("not configured"));
    }

    #[test]
    fn test_banner_with_provider() {
        let room = RoomStore::with_default().settings();
        let mut out = Vec::new();
        print_welcome_banner(&mut out, &room, 1, 1, Some(("model-x", "bearer token"))).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("model-x"));
        assert!(text.contains("(bearer token)"));
    }
}
