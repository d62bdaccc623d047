//! Commands exposed to the webview.
//!
//! [`CommandError`] is the error shape every command returns; the Tauri
//! handlers themselves are only built with the `desktop` feature.

use serde::Serialize;

use crate::player::PlayerError;
use crate::speech::SpeechError;

#[cfg(feature = "desktop")]
pub mod player;
#[cfg(feature = "desktop")]
pub mod suggest;

pub const ERROR_SPEECH_UNAVAILABLE: &str = "SPEECH_UNAVAILABLE";
pub const ERROR_SYNTHESIS_FAILED: &str = "SYNTHESIS_FAILED";
pub const ERROR_PLAYBACK_FAILED: &str = "PLAYBACK_FAILED";

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CommandError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl CommandError {
    pub fn new(code: &str, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details,
        }
    }
}

impl From<PlayerError> for CommandError {
    fn from(value: PlayerError) -> Self {
        match value {
            PlayerError::SpeechUnavailable | PlayerError::Speech(SpeechError::Unavailable) => {
                CommandError::new(
                    ERROR_SPEECH_UNAVAILABLE,
                    "Text-to-speech is not available on this system",
                    None,
                )
            }
            PlayerError::Speech(SpeechError::Synthesis(err)) => CommandError::new(
                ERROR_SYNTHESIS_FAILED,
                "Failed to synthesize the step",
                Some(err.to_string()),
            ),
            PlayerError::Speech(SpeechError::Playback(details)) => CommandError::new(
                ERROR_PLAYBACK_FAILED,
                "Failed to play the step",
                Some(details),
            ),
        }
    }
}
