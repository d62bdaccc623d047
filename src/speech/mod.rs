//! Speech engine boundary used by the step player.
//!
//! An engine accepts one [`Utterance`] at a time and reports natural
//! completion by sending the utterance's [`UtteranceId`] on the completion
//! channel it was built with. Cancelling an utterance suppresses that
//! notification. The default [`UnavailableSpeech`] engine stands in when no
//! text-to-speech backend can be found, so callers get an explicit error
//! instead of silence.

pub mod lexicon;
pub mod piper;
#[cfg(feature = "playback")]
pub mod playback;
pub mod ticket;
pub mod voices;

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

use serde::Serialize;
use thiserror::Error;

pub use lexicon::{Lexicon, LexiconEntry, LexiconError};
pub use piper::{PiperSynthesizer, SynthesisFailure, SynthesisOutput, SynthesisRequest, Synthesizer};
#[cfg(feature = "playback")]
pub use playback::PiperSpeech;
pub use ticket::{PlaybackGenerations, PlaybackTicket};
pub use voices::{VoiceError, VoiceInfo, VoiceLibrary};

/// Locale attached to every utterance unless configured otherwise.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Identifies one submitted utterance. Ids are never reused by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utterance-{}", self.0)
    }
}

/// A single unit of text handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub locale: String,
}

pub type CompletionSender = Sender<UtteranceId>;
pub type CompletionReceiver = Receiver<UtteranceId>;

/// Channel pair engines use to report utterances that finished naturally.
pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    mpsc::channel()
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech synthesis is not available")]
    Unavailable,
    #[error(transparent)]
    Synthesis(#[from] SynthesisFailure),
    #[error("audio playback failed: {0}")]
    Playback(String),
}

pub trait SpeechEngine: Send {
    /// Whether the engine can speak at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Start speaking `utterance`.
    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError>;

    fn pause(&mut self);

    fn resume(&mut self);

    /// Stop and discard the active utterance without reporting completion.
    fn cancel(&mut self);

    /// `true` while an utterance is suspended by [`SpeechEngine::pause`].
    fn is_paused(&self) -> bool;
}

impl<E: SpeechEngine + ?Sized> SpeechEngine for Box<E> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError> {
        (**self).speak(utterance)
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn resume(&mut self) {
        (**self).resume()
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }

    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }
}

/// Engine installed when no synthesis backend could be set up.
#[derive(Debug, Default)]
pub struct UnavailableSpeech;

impl SpeechEngine for UnavailableSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&mut self, _utterance: Utterance) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn cancel(&mut self) {}

    fn is_paused(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_engine_refuses_to_speak() {
        let mut engine: Box<dyn SpeechEngine> = Box::new(UnavailableSpeech);
        assert!(!engine.is_available());
        let result = engine.speak(Utterance {
            id: UtteranceId(1),
            text: "Boil water".into(),
            locale: DEFAULT_LOCALE.into(),
        });
        assert!(matches!(result, Err(SpeechError::Unavailable)));
        assert!(!engine.is_paused());
    }

    #[test]
    fn utterance_ids_display_with_prefix() {
        assert_eq!(UtteranceId(7).to_string(), "utterance-7");
    }
}
