//! Terminal screen for the vessel table: header, vessel rows, footer.

use crate::listview::{format_row, ListState};
use aisview::view::{ViewProjector, Viewport};
use crossterm::style::{self, Attribute, Color, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, terminal, ExecutableCommand, QueueableCommand};
use std::io::{self, Write};

pub struct Tui {
    stdout: io::Stdout,
}

/// Switches to the alternate screen and hides the cursor.
fn enter_screen<W: Write>(out: &mut W) -> io::Result<()> {
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    Ok(())
}

/// Undoes `enter_screen` and raw mode. Best effort: every step runs even
/// if an earlier one failed.
pub fn restore_screen<W: Write>(out: &mut W) {
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Tui {
    /// Takes over the terminal. On failure the terminal is left as it was.
    pub fn setup() -> io::Result<Tui> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        if let Err(e) = enter_screen(&mut stdout) {
            restore_screen(&mut stdout);
            return Err(e);
        }
        Ok(Tui { stdout })
    }

    pub fn teardown(&mut self) {
        restore_screen(&mut self.stdout);
    }

    /// Rows available for vessels: everything but the header and the footer.
    pub fn body_height(rows: u16) -> usize {
        usize::from(rows).saturating_sub(2)
    }

    pub fn draw(&mut self, projector: &ViewProjector, list: &ListState, footer: &str) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let width = usize::from(cols);

        self.stdout.queue(cursor::MoveTo(0, 0))?;
        self.stdout
            .queue(terminal::Clear(terminal::ClearType::All))?;

        // Header
        self.stdout.queue(SetForegroundColor(Color::DarkCyan))?;
        self.stdout.queue(SetBackgroundColor(Color::DarkBlue))?;
        self.stdout.queue(SetAttribute(Attribute::Bold))?;
        self.stdout
            .queue(style::Print(format_row(projector.header(), width)))?;
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(style::ResetColor)?;

        // Vessels
        for (line, row) in list.visible_rows().enumerate() {
            let cells = match projector.row(row) {
                Some(cells) => cells,
                None => break,
            };
            self.stdout.queue(cursor::MoveTo(0, (line + 1) as u16))?;
            if row == list.focus() {
                self.stdout.queue(SetAttribute(Attribute::Reverse))?;
            }
            self.stdout.queue(style::Print(format_row(cells, width)))?;
            self.stdout.queue(SetAttribute(Attribute::Reset))?;
        }

        // Footer
        self.stdout.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
        self.stdout.queue(SetForegroundColor(Color::DarkCyan))?;
        self.stdout.queue(SetBackgroundColor(Color::DarkBlue))?;
        self.stdout.queue(SetAttribute(Attribute::Bold))?;
        self.stdout.queue(style::Print(format_row(&[footer], width)))?;
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(style::ResetColor)?;

        self.stdout.flush()
    }
}
