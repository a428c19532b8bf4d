//! Optional device collaborators.
//!
//! Speech, geolocation and escalation are best-effort. Each is injected at
//! startup as `Option<Arc<dyn ...>>`; `None` means the capability is not
//! available on this machine and the related command is disabled.

mod escalation;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::query::GeoLocation;

pub use escalation::EscalationMessage;

/// Produces a single final transcript from the user's voice.
#[async_trait]
pub trait VoiceInput: Send + Sync {
    async fn listen(&self, language: &str) -> Result<String>;
}

/// Speaks text aloud.
///
/// Implementations cancel any utterance still playing before starting a new one.
#[async_trait]
pub trait VoiceOutput: Send + Sync {
    async fn speak(&self, text: &str, language: &str) -> Result<()>;

    /// Stops the current utterance, if any.
    async fn cancel(&self);
}

/// Best-effort approximate location lookup.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self) -> Result<GeoLocation>;
}

/// Hands a composed escalation message to the system's default handler.
#[async_trait]
pub trait EscalationHandler: Send + Sync {
    async fn hand_off(&self, message: &EscalationMessage) -> Result<()>;
}

/// The set of collaborators detected at startup.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub voice_input: Option<Arc<dyn VoiceInput>>,
    pub voice_output: Option<Arc<dyn VoiceOutput>>,
    pub geolocator: Option<Arc<dyn Geolocator>>,
    pub escalation: Option<Arc<dyn EscalationHandler>>,
}

impl Capabilities {
    /// Human-readable list of what is available, for the startup banner.
    pub fn summary(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("voice input", self.voice_input.is_some()),
            ("voice output", self.voice_output.is_some()),
            ("location", self.geolocator.is_some()),
            ("escalation", self.escalation.is_some()),
        ]
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.summary()).finish()
    }
}
