//! Line editor running on its own thread.
//!
//! Rustyline blocks while reading, so it lives on a dedicated OS thread and
//! hands lines to the async event loop. The loop tells the thread when to show
//! the next prompt, which keeps answers from being drawn over the prompt.

use std::sync::mpsc as std_mpsc;
use std::thread::{self, JoinHandle};

use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tokio::sync::mpsc;

use crate::cli_helper::CliHelper;

const PROMPT: &str = ">> ";

#[derive(Debug)]
pub enum InputEvent {
    Line(String),
    Interrupted,
    Eof,
    Failed(String),
}

#[derive(Debug)]
pub enum PromptRequest {
    /// Show the prompt, prefilled with `initial`.
    Ready { initial: String },
    Stop,
}

pub struct InputThread {
    prompts: std_mpsc::Sender<PromptRequest>,
    handle: Option<JoinHandle<()>>,
}

impl InputThread {
    pub fn spawn(lines: mpsc::UnboundedSender<InputEvent>) -> anyhow::Result<Self> {
        let (prompts, prompt_rx) = std_mpsc::channel::<PromptRequest>();

        let handle = thread::Builder::new()
            .name("kisan-input".to_string())
            .spawn(move || run(lines, prompt_rx))?;

        Ok(Self {
            prompts,
            handle: Some(handle),
        })
    }

    /// Asks for the next line.
    pub fn prompt(&self, initial: impl Into<String>) {
        let _ = self.prompts.send(PromptRequest::Ready {
            initial: initial.into(),
        });
    }

    /// Stops the thread once it is idle.
    pub fn stop(mut self) {
        let _ = self.prompts.send(PromptRequest::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(lines: mpsc::UnboundedSender<InputEvent>, prompts: std_mpsc::Receiver<PromptRequest>) {
    let mut rl: Editor<CliHelper, DefaultHistory> = match Editor::new() {
        Ok(rl) => rl,
        Err(e) => {
            let _ = lines.send(InputEvent::Failed(e.to_string()));
            return;
        }
    };
    rl.set_helper(Some(CliHelper::new()));

    while let Ok(PromptRequest::Ready { initial }) = prompts.recv() {
        let event = match rl.readline_with_initial(PROMPT, (&initial, "")) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                InputEvent::Line(line)
            }
            Err(ReadlineError::Interrupted) => InputEvent::Interrupted,
            Err(ReadlineError::Eof) => InputEvent::Eof,
            Err(e) => InputEvent::Failed(e.to_string()),
        };

        let finished = matches!(event, InputEvent::Eof | InputEvent::Failed(_));
        if lines.send(event).is_err() || finished {
            break;
        }
    }
}
