use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{disable_raw_mode, enable_raw_mode, size, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Marks the cell covered by the right half of a double-width glyph
pub const WIDE_TAIL: char = '\0';

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
        }
    }
}

/// Something the user did since the last frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Input {
    Key(KeyCode, KeyModifiers),
    /// Pointer moved to a cell
    Pointer(u16, u16),
    Resize(u16, u16),
}

impl Terminal {
    /// Initialize the terminal for drawing
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide, EnableMouseCapture)?;
        }

        Ok(Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            alternate_screen,
        })
    }

    /// Back buffer of a fixed size that never touches the tty (print mode
    /// when stdout is not a terminal)
    pub fn offscreen(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            alternate_screen: false,
        }
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Reallocate the back buffer for new dimensions
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
    }

    /// Set a character at position with optional colors
    pub fn set_cell(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bg: Option<Color>) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bg };
        }
    }

    /// Render the entire buffer to screen, emitting colour changes only
    /// when they differ from the previous cell
    pub fn present(&self) -> io::Result<()> {
        let mut out = stdout();
        let mut last_fg: Option<Color> = None;
        let mut last_bg: Option<Color> = None;

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;

            for cell in row {
                // placeholder behind a double-width glyph
                if cell.ch == WIDE_TAIL {
                    continue;
                }
                if cell.fg != last_fg {
                    queue!(out, SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(out, SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
                    last_bg = cell.bg;
                }
                queue!(out, Print(cell.ch))?;
            }
        }

        queue!(out, ResetColor)?;
        out.flush()?;
        Ok(())
    }

    /// Check for input (non-blocking)
    pub fn poll_input(&self) -> io::Result<Option<Input>> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                    return Ok(Some(Input::Key(key_event.code, key_event.modifiers)));
                }
                Event::Mouse(mouse) => {
                    if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
                        return Ok(Some(Input::Pointer(mouse.column, mouse.row)));
                    }
                }
                Event::Resize(w, h) => return Ok(Some(Input::Resize(w, h))),
                _ => {}
            }
        }
        Ok(None)
    }

    /// Wait for a keypress with timeout
    pub fn wait_key(&self, timeout_ms: u64) -> io::Result<Option<KeyCode>> {
        if poll(Duration::from_millis(timeout_ms))? {
            if let Event::Key(key_event) = read()? {
                return Ok(Some(key_event.code));
            }
        }
        Ok(None)
    }

    /// Sleep for specified duration
    pub fn sleep(&self, seconds: f32) {
        std::thread::sleep(frame_delay(seconds));
    }

    /// Print buffer to stdout with ANSI colors (for print mode)
    pub fn print_to_stdout(&self) {
        let mut out = String::new();
        for row in &self.buffer {
            for cell in row {
                if cell.ch == WIDE_TAIL {
                    continue;
                }
                if let Some(Color::Rgb { r, g, b }) = cell.bg {
                    out.push_str(&format!("\x1b[48;2;{};{};{}m", r, g, b));
                }
                if let Some(Color::Rgb { r, g, b }) = cell.fg {
                    out.push_str(&format!("\x1b[38;2;{};{};{}m", r, g, b));
                }
                out.push(cell.ch);
                out.push_str("\x1b[0m");
            }
            out.push('\n');
        }
        print!("{}", out);
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), DisableMouseCapture, Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

/// Longest pause between frames
const MAX_FRAME_DELAY: f32 = 1.0;

/// Frame delay for a time step, clamped to `0..=MAX_FRAME_DELAY`; NaN counts as 0
fn frame_delay(seconds: f32) -> Duration {
    if seconds.is_nan() {
        return Duration::ZERO;
    }
    Duration::from_secs_f32(seconds.clamp(0.0, MAX_FRAME_DELAY))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Visible text of one row, skipping double-width placeholders
    fn row_text(term: &Terminal, y: usize) -> String {
        term.buffer[y].iter().filter(|c| c.ch != WIDE_TAIL).map(|c| c.ch).collect()
    }

    #[test]
    fn set_cell_ignores_out_of_bounds() {
        let mut term = Terminal::offscreen(4, 2);
        term.set_cell(-1, 0, 'x', None, None);
        term.set_cell(4, 1, 'x', None, None);
        term.set_cell(1, 1, 'y', Some(Color::Red), Some(Color::Blue));
        assert_eq!(row_text(&term, 0), "    ");
        assert_eq!(row_text(&term, 1), " y  ");
        assert_eq!(term.buffer[1][1].bg, Some(Color::Blue));
    }

    #[test]
    fn wide_tail_is_not_text() {
        let mut term = Terminal::offscreen(3, 1);
        term.set_cell(0, 0, '江', None, None);
        term.set_cell(1, 0, WIDE_TAIL, None, None);
        assert_eq!(row_text(&term, 0), "江 ");
    }

    #[test]
    fn frame_delay_is_bounded() {
        assert_eq!(frame_delay(0.5), Duration::from_millis(500));
        assert_eq!(frame_delay(-1.0), Duration::ZERO);
        assert_eq!(frame_delay(f32::NAN), Duration::ZERO);
        assert_eq!(frame_delay(f32::INFINITY), Duration::from_secs(1));
        assert_eq!(frame_delay("inf".parse().expect("float")), Duration::from_secs(1));
    }

    #[test]
    fn resize_reallocates() {
        let mut term = Terminal::offscreen(2, 1);
        term.resize(5, 3);
        assert_eq!(term.size(), (5, 3));
        assert_eq!(row_text(&term, 2).chars().count(), 5);
    }
}
