//! Speech collaborators backed by external programs.
//!
//! - `CommandVoiceInput` runs a transcriber (e.g. a whisper wrapper) and takes
//!   the last non-empty stdout line as the final transcript.
//! - `CommandVoiceOutput` runs a TTS program (e.g. `espeak-ng`) with the text as
//!   its last argument, killing any utterance still playing first.

use std::process::Stdio;

use async_trait::async_trait;
use kisan_core::capability::{VoiceInput, VoiceOutput};
use kisan_core::{KisanError, Result};
use tokio::process::Child;
use tokio::sync::Mutex;

use crate::external_command::{self, CommandSpec};

pub struct CommandVoiceInput {
    spec: CommandSpec,
}

impl CommandVoiceInput {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }

    /// Builds the collaborator if the configured program is installed.
    pub fn detect(argv: &[String]) -> Option<Self> {
        let spec = CommandSpec::from_argv(argv)?;
        if !external_command::is_available(spec.program()) {
            tracing::info!("[Voice] Input program '{}' not found", spec.program());
            return None;
        }
        Some(Self::new(spec))
    }
}

#[async_trait]
impl VoiceInput for CommandVoiceInput {
    async fn listen(&self, language: &str) -> Result<String> {
        let output = self
            .spec
            .to_command(language)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                KisanError::capability(
                    "voice input",
                    format!("Failed to run '{}': {}", self.spec.program(), e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KisanError::capability(
                "voice input",
                format!("Transcriber exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        final_transcript(&stdout)
            .map(str::to_string)
            .ok_or_else(|| KisanError::capability("voice input", "No speech recognised"))
    }
}

/// The last non-empty line; earlier lines are interim results.
fn final_transcript(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
}

pub struct CommandVoiceOutput {
    spec: CommandSpec,
    current: Mutex<Option<Child>>,
}

impl CommandVoiceOutput {
    pub fn new(spec: CommandSpec) -> Self {
        Self {
            spec,
            current: Mutex::new(None),
        }
    }

    pub fn detect(argv: &[String]) -> Option<Self> {
        let spec = CommandSpec::from_argv(argv)?;
        if !external_command::is_available(spec.program()) {
            tracing::info!("[Voice] Output program '{}' not found", spec.program());
            return None;
        }
        Some(Self::new(spec))
    }
}

#[async_trait]
impl VoiceOutput for CommandVoiceOutput {
    async fn speak(&self, text: &str, language: &str) -> Result<()> {
        let mut current = self.current.lock().await;
        if let Some(mut previous) = current.take() {
            let _ = previous.kill().await;
        }

        let child = self
            .spec
            .to_command(language)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                KisanError::capability(
                    "voice output",
                    format!("Failed to run '{}': {}", self.spec.program(), e),
                )
            })?;

        *current = Some(child);
        Ok(())
    }

    async fn cancel(&self) {
        if let Some(mut child) = self.current.lock().await.take() {
            let _ = child.kill().await;
        }
    }
}
