use colored::Colorize;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, ClearType},
};
use std::io::{Stdout, Write, stdout};

/// Request/response prompts used by every flow. Each prompt returns `None`
/// when the user presses Esc or Ctrl-C.
pub trait Prompter {
    /// Arrow-key select menu. Returns the selected index.
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Option<usize>;
    /// Text input pre-filled with `default`.
    fn input(&mut self, prompt: &str, default: &str) -> Option<String>;
    /// Masked input.
    fn password(&mut self, prompt: &str) -> Option<String>;
    /// y/n confirmation.
    fn confirm(&mut self, prompt: &str, default: bool) -> Option<bool>;
    /// Print one line of output.
    fn say(&mut self, line: &str);
}

/// The interactive terminal. Raw mode is entered only while a prompt is
/// reading keys, so plain output and logging see a cooked terminal.
pub struct Terminal<W: Write = Stdout> {
    out: W,
}

impl Terminal {
    pub fn new() -> Self {
        Self::with_writer(stdout())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Terminal<W> {
    /// Plain output and prompt echoes go to `out`.
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    fn echo(&mut self, prompt: &str, value: impl std::fmt::Display) {
        self.say(&format!("  {}: {}", prompt, value));
    }
}

impl<W: Write> Prompter for Terminal<W> {
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Option<usize> {
        let _raw = RawMode::enter();
        raw_select(prompt, items, default)
    }

    fn input(&mut self, prompt: &str, default: &str) -> Option<String> {
        let value = {
            let _raw = RawMode::enter();
            raw_input(prompt, default)
        };
        if let Some(v) = &value {
            self.echo(prompt, v.dimmed());
        }
        value
    }

    fn password(&mut self, prompt: &str) -> Option<String> {
        let value = {
            let _raw = RawMode::enter();
            raw_password(prompt)
        };
        if let Some(v) = &value {
            self.echo(prompt, "*".repeat(v.chars().count()).dimmed());
        }
        value
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Option<bool> {
        let _raw = RawMode::enter();
        raw_confirm(prompt, default)
    }

    fn say(&mut self, line: &str) {
        writeln!(self.out, "{}", line).ok();
        self.out.flush().ok();
    }
}

/// Raw mode with a hidden cursor until dropped.
struct RawMode;

impl RawMode {
    fn enter() -> Self {
        terminal::enable_raw_mode().ok();
        execute!(stdout(), cursor::Hide).ok();
        RawMode
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        execute!(stdout(), cursor::Show).ok();
        terminal::disable_raw_mode().ok();
    }
}

/// Render lines at current position using per-line clear (flicker-free).
fn raw_render_lines(stdout: &mut impl Write, lines: &[String], prev_count: usize) {
    if prev_count > 0 {
        crossterm::queue!(stdout, cursor::MoveUp(prev_count as u16)).ok();
    }
    for line in lines {
        crossterm::queue!(
            stdout,
            terminal::Clear(ClearType::CurrentLine),
            crossterm::style::Print(line),
            crossterm::style::Print("\r\n")
        )
        .ok();
    }
    if lines.len() < prev_count {
        let extra = prev_count - lines.len();
        for _ in 0..extra {
            crossterm::queue!(
                stdout,
                terminal::Clear(ClearType::CurrentLine),
                crossterm::style::Print("\r\n")
            )
            .ok();
        }
        crossterm::queue!(stdout, cursor::MoveUp(extra as u16)).ok();
    }
    stdout.flush().ok();
}

/// Clear N lines above cursor.
fn raw_clear_lines(stdout: &mut impl Write, count: usize) {
    if count == 0 {
        return;
    }
    crossterm::queue!(stdout, cursor::MoveUp(count as u16)).ok();
    for _ in 0..count {
        crossterm::queue!(
            stdout,
            terminal::Clear(ClearType::CurrentLine),
            crossterm::style::Print("\r\n")
        )
        .ok();
    }
    crossterm::queue!(stdout, cursor::MoveUp(count as u16)).ok();
    stdout.flush().ok();
}

fn is_interrupt(key: &event::KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Arrow-key select menu. Returns selected index or None on Esc.
fn raw_select(prompt: &str, items: &[String], default: usize) -> Option<usize> {
    if items.is_empty() {
        return None;
    }
    let mut stdout = stdout();
    let mut pos = default.min(items.len() - 1);
    let mut prev_lines = 0;

    loop {
        let mut lines = Vec::with_capacity(items.len() + 1);
        lines.push(format!("  {}", prompt.bold()));
        for (i, item) in items.iter().enumerate() {
            if i == pos {
                lines.push(format!("  {} {}", ">".yellow().bold(), item));
            } else {
                lines.push(format!("    {}", item));
            }
        }

        raw_render_lines(&mut stdout, &lines, prev_lines);
        prev_lines = lines.len();

        let Ok(Event::Key(key)) = event::read() else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if is_interrupt(&key) {
            raw_clear_lines(&mut stdout, prev_lines);
            return None;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                pos = if pos == 0 { items.len() - 1 } else { pos - 1 };
            }
            KeyCode::Down | KeyCode::Char('j') => {
                pos = (pos + 1) % items.len();
            }
            KeyCode::Enter => {
                raw_clear_lines(&mut stdout, prev_lines);
                return Some(pos);
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                raw_clear_lines(&mut stdout, prev_lines);
                return None;
            }
            _ => {}
        }
    }
}

/// y/n confirmation. Returns Some(bool) or None on Esc.
fn raw_confirm(prompt: &str, default: bool) -> Option<bool> {
    let mut stdout = stdout();
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    let line = format!("  {} {}", prompt, hint.dimmed());

    crossterm::queue!(
        stdout,
        crossterm::style::Print(&line),
        crossterm::style::Print("\r\n")
    )
    .ok();
    stdout.flush().ok();

    loop {
        let Ok(Event::Key(key)) = event::read() else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if is_interrupt(&key) {
            raw_clear_lines(&mut stdout, 1);
            return None;
        }
        let answer = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(true),
            KeyCode::Char('n') | KeyCode::Char('N') => Some(false),
            KeyCode::Enter => Some(default),
            KeyCode::Esc | KeyCode::Char('q') => None,
            _ => continue,
        };
        raw_clear_lines(&mut stdout, 1);
        return answer;
    }
}

/// Line editor shared by text and password input. `masked` renders `*`
/// instead of the typed characters.
fn raw_read_line(prompt: &str, default: &str, masked: bool) -> Option<String> {
    let mut stdout = stdout();
    let mut value = default.to_string();

    // Show cursor while typing
    execute!(stdout, cursor::Show).ok();

    let finish = |stdout: &mut std::io::Stdout| {
        crossterm::queue!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
        )
        .ok();
        execute!(stdout, cursor::Hide).ok();
    };

    loop {
        let shown = if masked {
            "*".repeat(value.chars().count())
        } else {
            value.clone()
        };
        let display = format!("  {}: {}", prompt, shown);
        crossterm::queue!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            crossterm::style::Print(&display),
        )
        .ok();
        stdout.flush().ok();

        let Ok(Event::Key(key)) = event::read() else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if is_interrupt(&key) {
            finish(&mut stdout);
            return None;
        }
        match key.code {
            KeyCode::Enter => {
                finish(&mut stdout);
                return Some(value);
            }
            KeyCode::Esc => {
                finish(&mut stdout);
                return None;
            }
            KeyCode::Backspace => {
                value.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                value.clear();
            }
            KeyCode::Char(c) => {
                value.push(c);
            }
            _ => {}
        }
    }
}

/// Text input with default. Returns Some(value) on Enter, None on Esc.
fn raw_input(prompt: &str, default: &str) -> Option<String> {
    raw_read_line(prompt, default, false)
}

/// Password input (masked). Returns Some(value) or None.
fn raw_password(prompt: &str) -> Option<String> {
    raw_read_line(prompt, "", true)
}
