//! Terminal rendering of controller events.

use std::io::{self, Stdout, Write};

use colored::Colorize;
use kisan_application::AppEvent;
use kisan_application::render::{display_query, format_timestamp};
use kisan_application::reveal::CURSOR;
use kisan_core::history::HistoryRecord;
use kisan_core::session::SubmissionState;

const BACKSPACE: char = '\u{8}';

pub struct TerminalView<W: Write = Stdout> {
    out: W,
    /// Characters of the current answer already on screen.
    shown: usize,
    revealing: bool,
    history: Vec<HistoryRecord>,
}

impl TerminalView<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: 0,
            revealing: false,
            history: Vec::new(),
        }
    }

    /// Draws one event. Returns `true` when an answer has been fully revealed.
    pub fn handle(&mut self, event: AppEvent) -> io::Result<bool> {
        match event {
            AppEvent::StateChanged(SubmissionState::Submitting) => {
                self.interrupt_reveal()?;
                writeln!(self.out, "{}", "Thinking...".bright_black())?;
            }
            AppEvent::StateChanged(_) => {}
            AppEvent::RevealFrame { text, done } => {
                self.draw_frame(&text, done)?;
                self.out.flush()?;
                return Ok(done);
            }
            AppEvent::HistoryChanged(records) => self.history = records,
            AppEvent::Notice(message) => self.notice(&message)?,
        }
        self.out.flush()?;
        Ok(false)
    }

    fn draw_frame(&mut self, frame: &str, done: bool) -> io::Result<()> {
        if !self.revealing {
            self.revealing = true;
            self.shown = 0;
            write!(self.out, "{} ", "kisan:".bright_green().bold())?;
        }

        let (delta, total) = reveal_delta(frame, self.shown);
        write!(self.out, "{}", delta.bright_blue())?;
        self.shown = total;

        if done {
            writeln!(self.out)?;
            self.revealing = false;
            self.shown = 0;
        } else {
            write!(self.out, "{CURSOR}{BACKSPACE}")?;
        }
        Ok(())
    }

    /// Ends a partially revealed answer so the next output starts on a fresh line.
    fn interrupt_reveal(&mut self) -> io::Result<()> {
        if self.revealing {
            writeln!(self.out, " ")?;
            self.revealing = false;
            self.shown = 0;
        }
        Ok(())
    }

    pub fn notice(&mut self, message: &str) -> io::Result<()> {
        self.interrupt_reveal()?;
        writeln!(self.out, "{}", message.yellow())?;
        self.out.flush()
    }

    pub fn info(&mut self, message: &str) -> io::Result<()> {
        self.interrupt_reveal()?;
        writeln!(self.out, "{}", message.bright_black())?;
        self.out.flush()
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        self.interrupt_reveal()?;
        writeln!(self.out, "{}", message.red())?;
        self.out.flush()
    }

    pub fn success(&mut self, message: &str) -> io::Result<()> {
        self.interrupt_reveal()?;
        writeln!(self.out, "{}", message.bright_green())?;
        self.out.flush()
    }

    /// Prints the history as of the last `HistoryChanged` event.
    pub fn show_history(&mut self) -> io::Result<()> {
        self.interrupt_reveal()?;
        if self.history.is_empty() {
            writeln!(self.out, "{}", "No questions yet.".bright_black())?;
            return self.out.flush();
        }

        for (index, record) in self.history.iter().enumerate() {
            writeln!(
                self.out,
                "{} {} {}",
                format!("{:>2}.", index + 1).bright_black(),
                display_query(record).green(),
                format!("({})", format_timestamp(record)).bright_black()
            )?;
            for line in record.answer.lines() {
                writeln!(self.out, "    {}", line.bright_blue())?;
            }
        }
        self.out.flush()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

/// Text of `frame` not yet on screen, and the frame's character count.
fn reveal_delta(frame: &str, shown: usize) -> (&str, usize) {
    let text = frame.strip_suffix(CURSOR).unwrap_or(frame);
    let start = text
        .char_indices()
        .nth(shown)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    (&text[start..], text.chars().count())
}
