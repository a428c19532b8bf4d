//! The interactive loop.
//!
//! One task owns the controller and multiplexes user input, controller events,
//! the in-flight fetch and the location lookup with `tokio::select!`.

use std::future::{Future, pending};
use std::pin::Pin;

use anyhow::Result;
use colored::Colorize;
use kisan_application::render::render_history_document;
use kisan_application::{AppEvent, CompletedQuery, QueryController};
use kisan_core::query::GeoLocation;
use kisan_infrastructure::load_image;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::commands::{COMMANDS, Command};
use crate::input::{InputEvent, InputThread};
use crate::view::TerminalView;

type Task<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// What to do after handling a line.
enum Flow {
    /// Show the prompt again.
    Prompt,
    /// Something is still running; the prompt comes back when it finishes.
    Wait,
    Quit,
}

pub struct Repl {
    controller: QueryController,
    events: UnboundedReceiver<AppEvent>,
    view: TerminalView,
    fetch: Option<Task<CompletedQuery>>,
    locating: Option<Task<Option<GeoLocation>>>,
    /// The prompt is held back until the current answer is fully revealed.
    awaiting_reveal: bool,
    /// The user asked for `/locate` and is waiting for the result.
    locate_requested: bool,
}

impl Repl {
    pub fn new(controller: QueryController, events: UnboundedReceiver<AppEvent>) -> Self {
        Self {
            controller,
            events,
            view: TerminalView::stdout(),
            fetch: None,
            locating: None,
            awaiting_reveal: false,
            locate_requested: false,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        self.print_banner();

        // Best-effort location for the whole session; never blocks the prompt.
        if let Some(request) = self.controller.location_request() {
            self.locating = Some(Box::pin(request.run()));
        }

        let (line_tx, mut line_rx) = mpsc::unbounded_channel();
        let input = InputThread::spawn(line_tx)?;
        self.prompt(&input)?;

        loop {
            tokio::select! {
                Some(event) = self.events.recv() => {
                    let revealed = self.view.handle(event)?;
                    if revealed && self.awaiting_reveal {
                        self.awaiting_reveal = false;
                        self.prompt(&input)?;
                    }
                }
                input_event = line_rx.recv() => {
                    let flow = match input_event {
                        Some(InputEvent::Line(line)) => self.handle_line(&line).await?,
                        Some(InputEvent::Interrupted) => {
                            self.view.notice("CTRL-C detected. Type 'quit' to exit.")?;
                            self.controller.clear_draft();
                            Flow::Prompt
                        }
                        Some(InputEvent::Eof) | None => Flow::Quit,
                        Some(InputEvent::Failed(e)) => {
                            self.view.error(&format!("Input error: {e}"))?;
                            Flow::Quit
                        }
                    };
                    match flow {
                        Flow::Prompt => self.prompt(&input)?,
                        Flow::Wait => {}
                        Flow::Quit => break,
                    }
                }
                completed = next(&mut self.fetch) => {
                    self.fetch = None;
                    // The reveal's final frame brings the prompt back.
                    self.controller.finish_submit(completed).await;
                }
                located = next(&mut self.locating) => {
                    self.locating = None;
                    self.on_located(located)?;
                    if std::mem::take(&mut self.locate_requested) {
                        self.prompt(&input)?;
                    }
                }
            }
        }

        self.controller.cancel_reveal();
        self.controller.stop_speaking().await;
        input.stop();
        println!("{}", "Goodbye!".bright_green());
        Ok(())
    }

    /// Draws anything already queued, then shows the prompt.
    fn prompt(&mut self, input: &InputThread) -> Result<()> {
        while let Ok(event) = self.events.try_recv() {
            self.view.handle(event)?;
        }
        input.prompt(self.controller.state().draft.clone());
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let command = Command::parse(line);
        tracing::debug!("[REPL] {:?}", command);

        let flow = match command {
            Command::Ask(text) => match self.controller.begin_submit(&text) {
                Ok(pending) => {
                    self.fetch = Some(Box::pin(pending.run()));
                    self.awaiting_reveal = true;
                    Flow::Wait
                }
                // Already reported through a notice event.
                Err(_) => Flow::Prompt,
            },
            Command::Image(Some(path)) => {
                match load_image(&path).await {
                    Ok(image) => {
                        let message = format!(
                            "Photo attached: {} ({} KB). It will be sent with your next question.",
                            image.file_name,
                            image.len().div_ceil(1024)
                        );
                        self.controller.select_image(image);
                        self.view.success(&message)?;
                    }
                    Err(e) => self.view.error(&e.to_string())?,
                }
                Flow::Prompt
            }
            Command::Image(None) => {
                let message = match self.controller.state().pending_image() {
                    Some(image) => format!("Attached to your next question: {}", image.file_name),
                    None => "No photo attached. Use /image <path> to add one.".to_string(),
                };
                self.view.info(&message)?;
                Flow::Prompt
            }
            Command::Language(Some(code)) => {
                match self.controller.set_language(&code) {
                    Ok(()) => self.view.success(&format!("Language set to {code}"))?,
                    Err(e) => self.view.error(&e.to_string())?,
                }
                Flow::Prompt
            }
            Command::Language(None) => {
                let message = format!("Current language: {}", self.controller.state().language);
                self.view.info(&message)?;
                Flow::Prompt
            }
            Command::History => {
                self.view.show_history()?;
                Flow::Prompt
            }
            Command::HistoryHtml(path) => {
                let document = render_history_document(&self.controller.history_html());
                match tokio::fs::write(&path, document).await {
                    Ok(()) => self
                        .view
                        .success(&format!("History saved to {}", path.display()))?,
                    Err(e) => self
                        .view
                        .error(&format!("Could not write {}: {e}", path.display()))?,
                }
                Flow::Prompt
            }
            Command::HistoryClear => {
                match self.controller.clear_history().await {
                    Ok(()) => self.view.success("History cleared.")?,
                    Err(e) => self.view.error(&format!("Could not clear history: {e}"))?,
                }
                Flow::Prompt
            }
            Command::Listen => {
                if self.controller.capabilities().voice_input.is_some() {
                    self.view.info("Listening... speak your question.")?;
                }
                if self.controller.dictate().await.is_empty() {
                    self.view.info("Nothing was heard.")?;
                }
                Flow::Prompt
            }
            Command::Speak => {
                if let Err(e) = self.controller.speak_last_answer().await {
                    self.view.notice(&e.to_string())?;
                }
                Flow::Prompt
            }
            Command::Escalate => {
                match self.controller.escalate().await {
                    Ok(message) => self.view.success(&format!(
                        "Opened a message to {} in your mail app.",
                        message.recipient
                    ))?,
                    Err(e) => self.view.notice(&e.to_string())?,
                }
                Flow::Prompt
            }
            Command::Locate => self.request_location()?,
            Command::Help => {
                self.print_help();
                Flow::Prompt
            }
            Command::Quit => Flow::Quit,
            Command::Usage(usage) => {
                self.view.notice(&format!("Usage: {usage}"))?;
                Flow::Prompt
            }
            Command::Unknown(name) => {
                self.view
                    .notice(&format!("Unknown command {name}. Type /help for a list."))?;
                Flow::Prompt
            }
        };

        Ok(flow)
    }

    fn request_location(&mut self) -> Result<Flow> {
        if let Some(location) = self.controller.state().context.location() {
            self.view.info(&format_location(location))?;
            return Ok(Flow::Prompt);
        }

        if self.locating.is_none() {
            match self.controller.location_request() {
                Some(request) => self.locating = Some(Box::pin(request.run())),
                None => {
                    self.view.notice("Location is not available.")?;
                    return Ok(Flow::Prompt);
                }
            }
        }

        self.view.info("Looking up your location...")?;
        self.locate_requested = true;
        Ok(Flow::Wait)
    }

    fn on_located(&mut self, located: Option<GeoLocation>) -> Result<()> {
        if let Some(location) = located {
            self.controller.apply_location(location);
        }

        if self.locate_requested {
            match self.controller.state().context.location() {
                Some(location) => self.view.success(&format_location(location))?,
                None => self.view.notice("Could not determine your location.")?,
            }
        }
        Ok(())
    }

    fn print_banner(&self) {
        println!("{}", "=== Kisan ===".bright_magenta().bold());
        println!(
            "{}",
            "Ask a farming question, or type /help for commands and 'quit' to exit.".bright_black()
        );

        let available: Vec<&str> = self
            .controller
            .capabilities()
            .summary()
            .into_iter()
            .filter_map(|(name, enabled)| enabled.then_some(name))
            .collect();
        if !available.is_empty() {
            println!(
                "{}",
                format!("Available: {}", available.join(", ")).bright_black()
            );
        }
        println!();
    }

    fn print_help(&self) {
        for (_, usage, help) in COMMANDS {
            println!("  {:<22} {}", usage.bright_cyan(), help);
        }
        println!("  {:<22} {}", "quit".bright_cyan(), "Leave Kisan");
    }
}

fn format_location(location: GeoLocation) -> String {
    format!(
        "Using approximate location {:.3}, {:.3}",
        location.latitude, location.longitude
    )
}

/// Resolves with the task's output, or never when there is no task.
async fn next<T>(task: &mut Option<Task<T>>) -> T {
    match task {
        Some(task) => task.await,
        None => pending().await,
    }
}
