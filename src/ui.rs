// UI layer: terminal input through `dialoguer`, colored output lines,
// spinners for slow network calls and plain text tables.

use crossterm::style::{Color, Stylize};
use crossterm::tty::IsTty;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use crate::collector::{InputMode, InputSource, PromptSpec, ScriptedInput};
use crate::error::CollectError;

/// Extra questions a handler may ask outside a collector flow.
pub trait Confirmer {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, CollectError>;
}

/// Everything a handler needs to read from the operator.
pub trait Prompter: InputSource + Confirmer {}

impl<T: InputSource + Confirmer> Prompter for T {}

/// Interactive prompts on the controlling terminal.
///
/// `Input::interact_text()` and `Password::interact()` block until the
/// operator presses Enter; Ctrl-C surfaces as an interrupted I/O error.
pub struct TerminalInput {
    theme: ColorfulTheme,
}

impl TerminalInput {
    pub fn new() -> Self {
        TerminalInput { theme: ColorfulTheme::default() }
    }
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for TerminalInput {
    fn read(&mut self, spec: &PromptSpec) -> Result<String, CollectError> {
        let value = match spec.mode() {
            InputMode::Plain => Input::<String>::with_theme(&self.theme)
                .with_prompt(spec.message())
                .allow_empty(true)
                .interact_text(),
            // `Password` hides input in the terminal.
            InputMode::Masked => Password::with_theme(&self.theme)
                .with_prompt(spec.message())
                .allow_empty_password(true)
                .interact(),
        };
        value.map_err(CollectError::from_terminal)
    }

    fn reject(&mut self, _spec: &PromptSpec, reason: &str) {
        eprintln!("{}", format!("✖ {reason}").with(Color::Red));
    }
}

impl Confirmer for TerminalInput {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, CollectError> {
        Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(CollectError::from_terminal)
    }
}

impl Confirmer for ScriptedInput {
    /// Consumes the next scripted answer; `y`/`yes` confirm, blank takes the default.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, CollectError> {
        let answer = self.read(&PromptSpec::plain("confirm", message))?;
        Ok(match answer.trim().to_ascii_lowercase().as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }
}

/// In-memory sink that can be cloned into an [`Output`] and read back later.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Status lines for the operator. Success and info go to `out`, warnings
/// and errors to `err`.
pub struct Output {
    out: Box<dyn Write>,
    err: Box<dyn Write>,
    color: bool,
    interactive: bool,
}

impl Output {
    /// stdout/stderr, colored and with spinners when attached to a terminal.
    pub fn terminal() -> Self {
        let tty = io::stdout().is_tty();
        Output {
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
            color: tty,
            interactive: tty,
        }
    }

    /// Plain output into the given sinks; no color, no spinners.
    pub fn plain(out: impl Write + 'static, err: impl Write + 'static) -> Self {
        Output {
            out: Box::new(out),
            err: Box::new(err),
            color: false,
            interactive: false,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }

    pub fn success(&mut self, text: &str) {
        let line = self.paint(&format!("✅ {text}"), Color::Green);
        self.line(&line);
    }

    pub fn info(&mut self, text: &str) {
        let line = self.paint(text, Color::Blue);
        self.line(&line);
    }

    pub fn heading(&mut self, text: &str) {
        let line = self.paint(text, Color::Cyan);
        self.line(&line);
    }

    pub fn warn(&mut self, text: &str) {
        let line = self.paint(&format!("⚠️  {text}"), Color::Yellow);
        let _ = writeln!(self.err, "{line}");
    }

    pub fn error(&mut self, text: &str) {
        let line = self.paint(&format!("❌ {text}"), Color::Red);
        let _ = writeln!(self.err, "{line}");
    }

    /// Direct access to the success stream, for generated text.
    pub fn raw(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    pub fn table(&mut self, table: &Table) {
        let rendered = table.render();
        let _ = write!(self.out, "{rendered}");
    }

    /// Start a spinner; hidden when output is not a terminal.
    pub fn spinner(&self, message: &str) -> Spinner {
        Spinner::start(message, self.interactive)
    }
}

/// A running spinner, cleared when finished or dropped.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    fn start(message: &str, visible: bool) -> Self {
        let pb = if visible { ProgressBar::new_spinner() } else { ProgressBar::hidden() };
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Spinner { pb }
    }

    pub fn set_message(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.finish_and_clear();
        }
    }
}

/// Bordered text table with left-aligned columns.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Table {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let w = cell.chars().count();
                match widths.get_mut(i) {
                    Some(cur) => *cur = (*cur).max(w),
                    None => widths.push(w),
                }
            }
        }

        let rule: String = widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+");
        let rule = format!("+{rule}+\n");
        let fmt_row = |cells: &[String]| {
            let cols: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let cell = cells.get(i).map(String::as_str).unwrap_or("");
                    let pad = w - cell.chars().count();
                    format!(" {}{} ", cell, " ".repeat(pad))
                })
                .collect();
            format!("|{}|\n", cols.join("|"))
        };

        let mut out = rule.clone();
        out.push_str(&fmt_row(&self.headers));
        out.push_str(&rule);
        for row in &self.rows {
            out.push_str(&fmt_row(row));
        }
        out.push_str(&rule);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn table_pads_columns() {
        let mut t = Table::new(["ID", "Title"]);
        t.row(["1", "Two Sum"]);
        t.row(["1002", "LRU"]);
        assert_eq!(
            t.render(),
            "+------+---------+\n\
             | ID   | Title   |\n\
             +------+---------+\n\
             | 1    | Two Sum |\n\
             | 1002 | LRU     |\n\
             +------+---------+\n"
        );
    }

    #[test]
    fn plain_output_routes_streams() {
        let out = SharedBuffer::new();
        let err = SharedBuffer::new();
        let mut ui = Output::plain(out.clone(), err.clone());

        ui.success("done");
        ui.info("info");
        ui.warn("careful");
        ui.error("broken");

        assert_eq!(out.contents(), "✅ done\ninfo\n");
        assert_eq!(err.contents(), "⚠️  careful\n❌ broken\n");
    }

    #[test]
    fn scripted_confirm() {
        let mut input = ScriptedInput::new(["y", "", "nope"]);
        assert!(input.confirm("sure?", false).unwrap());
        assert!(input.confirm("sure?", true).unwrap());
        assert!(!input.confirm("sure?", true).unwrap());
        assert!(matches!(input.confirm("sure?", true), Err(CollectError::Aborted)));
    }
}
