//! Escalation through the system's default mail handler.

use async_trait::async_trait;
use kisan_core::capability::{EscalationHandler, EscalationMessage};
use kisan_core::{KisanError, Result};

use crate::external_command;

/// Builds an RFC 6068 `mailto:` URI with percent-encoded subject and body.
pub fn to_mailto_uri(message: &EscalationMessage) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        message.recipient,
        urlencoding::encode(&message.subject),
        urlencoding::encode(&message.body)
    )
}

/// Opens `mailto:` URIs with the platform opener.
pub struct MailtoEscalation {
    opener: &'static str,
}

impl MailtoEscalation {
    fn platform_opener() -> &'static str {
        if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(windows) {
            "explorer"
        } else {
            "xdg-open"
        }
    }

    /// Returns the handler if the platform opener is installed.
    pub fn detect() -> Option<Self> {
        let opener = Self::platform_opener();
        if !external_command::is_available(opener) {
            tracing::info!("[Escalation] '{}' not found, escalation disabled", opener);
            return None;
        }
        Some(Self { opener })
    }
}

#[async_trait]
impl EscalationHandler for MailtoEscalation {
    async fn hand_off(&self, message: &EscalationMessage) -> Result<()> {
        let uri = to_mailto_uri(message);
        tracing::info!("[Escalation] Opening mail draft to {}", message.recipient);

        let status = tokio::process::Command::new(self.opener)
            .arg(&uri)
            .status()
            .await
            .map_err(|e| {
                KisanError::capability("escalation", format!("Failed to run {}: {}", self.opener, e))
            })?;

        if !status.success() {
            return Err(KisanError::capability(
                "escalation",
                format!("{} exited with {}", self.opener, status),
            ));
        }
        Ok(())
    }
}
