use crate::terminal::Terminal;
use crossterm::cursor::MoveTo;
use crossterm::event::KeyCode;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use std::io::{self, stdout, Write};

/// Placement of the help box: top-left corner and outer size in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OverlayBox {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    text_width: usize,
}

fn layout(width: u16, height: u16, help_text: &str) -> OverlayBox {
    let lines = help_text.lines().count();
    let text_width = help_text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = text_width + 4; // 2 chars padding each side
    let box_height = lines + 2;

    OverlayBox {
        x: (width as usize).saturating_sub(box_width) / 2,
        y: (height as usize).saturating_sub(box_height) / 2,
        width: box_width,
        height: box_height,
        text_width,
    }
}

/// Show a modal help overlay without modifying the back buffer.
/// Returns true if the user requested quit (q/Esc) while the overlay is open.
pub fn show_help_modal(term: &mut Terminal, help_text: &str) -> io::Result<bool> {
    if help_text.is_empty() {
        return Ok(false);
    }

    let (width, height) = term.size();
    render_help_overlay_direct(width, height, help_text)?;

    loop {
        if let Some(code) = term.wait_key(50)? {
            match code {
                KeyCode::Char('?') => break,
                KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                _ => {}
            }
        }
    }

    // Restore previous frame from back buffer.
    term.present()?;
    Ok(false)
}

fn render_help_overlay_direct(width: u16, height: u16, help_text: &str) -> io::Result<()> {
    let b = layout(width, height, help_text);
    let border_color = Color::White;
    let text_color = Color::Grey;
    let right = (b.x + b.width - 1) as u16;
    let horizontal = "─".repeat(b.width - 2);

    let mut out = stdout();

    queue!(
        out,
        MoveTo(b.x as u16, b.y as u16),
        SetForegroundColor(border_color),
        Print('┌'),
        Print(&horizontal),
        Print('┐')
    )?;

    for (i, line) in help_text.lines().enumerate() {
        let y = (b.y + 1 + i) as u16;
        let padding = b.text_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));

        queue!(out, MoveTo(b.x as u16, y), SetForegroundColor(border_color), Print('│'))?;
        queue!(out, SetForegroundColor(text_color), Print(padded))?;
        queue!(out, MoveTo(right, y), SetForegroundColor(border_color), Print('│'))?;
    }

    let bottom = (b.y + b.height - 1) as u16;
    queue!(out, MoveTo(b.x as u16, bottom), Print('└'), Print(&horizontal), Print('┘'))?;

    queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_is_centered() {
        let b = layout(80, 24, "abc\nlonger line");
        assert_eq!(b.text_width, 11);
        assert_eq!((b.width, b.height), (15, 4));
        assert_eq!((b.x, b.y), (32, 10));
    }

    #[test]
    fn overlay_clamps_to_small_terminals() {
        let b = layout(4, 2, "far too wide for this");
        assert_eq!((b.x, b.y), (0, 0));
    }
}
