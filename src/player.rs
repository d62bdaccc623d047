//! Step-by-step reader for recipe instructions.
//!
//! [`StepPlayer`] owns the parsed steps, a cursor into them and a speech
//! engine. It is a two-state machine (`Paused`, `Speaking`) driven by user
//! actions and by engine completions. Only the most recently submitted
//! utterance is tracked; a completion for any other id is dropped, so a
//! cancelled utterance can never advance the reader.

use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::instructions::InstructionSteps;
use crate::speech::{SpeechEngine, SpeechError, Utterance, UtteranceId, DEFAULT_LOCALE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Paused,
    Speaking,
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("speech synthesis is not available on this system")]
    SpeechUnavailable,
    #[error(transparent)]
    Speech(#[from] SpeechError),
}

/// Snapshot of the player handed to the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStatus {
    pub visible: bool,
    pub state: PlaybackState,
    pub auto_advance: bool,
    pub cursor: usize,
    pub step_count: usize,
    pub label: String,
    pub current_step: Option<String>,
}

pub struct StepPlayer<E: SpeechEngine> {
    engine: E,
    locale: String,
    steps: InstructionSteps,
    cursor: usize,
    state: PlaybackState,
    auto_advance: bool,
    visible: bool,
    active: Option<UtteranceId>,
    next_id: u64,
}

impl<E: SpeechEngine> StepPlayer<E> {
    pub fn new(engine: E) -> Self {
        Self::with_locale(engine, DEFAULT_LOCALE)
    }

    pub fn with_locale(engine: E, locale: impl Into<String>) -> Self {
        Self {
            engine,
            locale: locale.into(),
            steps: InstructionSteps::default(),
            cursor: 0,
            state: PlaybackState::Paused,
            auto_advance: false,
            visible: false,
            active: None,
            next_id: 0,
        }
    }

    /// Replace the instructions being read.
    ///
    /// When the derived steps change, any utterance in flight is cancelled,
    /// the player pauses and the cursor returns to the first step. Text that
    /// yields the same steps leaves playback untouched.
    pub fn set_instructions(&mut self, text: impl Into<String>) {
        if !self.steps.replace(text) {
            return;
        }
        info!("Loaded instructions with {} step(s)", self.steps.len());
        if self.active.take().is_some() {
            self.engine.cancel();
        }
        self.state = PlaybackState::Paused;
        self.cursor = 0;
    }

    /// Visibility only affects rendering; playback carries on while hidden.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle_play(&mut self) -> Result<PlaybackState, PlayerError> {
        match self.state {
            PlaybackState::Speaking => {
                self.engine.pause();
                self.state = PlaybackState::Paused;
                debug!("Paused at step {}", self.cursor + 1);
            }
            PlaybackState::Paused => {
                if !self.engine.is_available() {
                    warn!("Play requested but no speech engine is available");
                    return Err(PlayerError::SpeechUnavailable);
                }
                if self.engine.is_paused() {
                    self.engine.resume();
                    self.state = PlaybackState::Speaking;
                    debug!("Resumed step {}", self.cursor + 1);
                } else {
                    self.speak_step(self.cursor)?;
                }
            }
        }
        Ok(self.state)
    }

    pub fn next(&mut self) -> Result<usize, PlayerError> {
        let target = (self.cursor + 1).min(self.steps.last_index());
        self.move_to(target)
    }

    pub fn previous(&mut self) -> Result<usize, PlayerError> {
        let target = self.cursor.saturating_sub(1);
        self.move_to(target)
    }

    pub fn toggle_auto_advance(&mut self) -> bool {
        self.auto_advance = !self.auto_advance;
        self.auto_advance
    }

    pub fn set_auto_advance(&mut self, enabled: bool) {
        self.auto_advance = enabled;
    }

    /// Handle the engine reporting that `id` finished on its own.
    pub fn on_utterance_end(&mut self, id: UtteranceId) -> Result<PlaybackState, PlayerError> {
        if self.active != Some(id) {
            debug!("Ignoring completion of stale {id}");
            return Ok(self.state);
        }
        if self.state != PlaybackState::Speaking {
            debug!("Ignoring completion of {id} while paused");
            return Ok(self.state);
        }

        if self.auto_advance && self.cursor + 1 < self.steps.len() {
            self.cursor += 1;
            self.speak_step(self.cursor)?;
        } else {
            self.active = None;
            self.state = PlaybackState::Paused;
        }
        Ok(self.state)
    }

    /// Release the engine: whatever is playing or queued is cancelled.
    pub fn teardown(&mut self) {
        self.engine.cancel();
        self.active = None;
        self.state = PlaybackState::Paused;
        debug!("Player torn down");
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn steps(&self) -> &[String] {
        self.steps.steps()
    }

    pub fn active_utterance(&self) -> Option<UtteranceId> {
        self.active
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// `Step {n}/{total}`; with no steps this reads `Step 1/0`.
    pub fn label(&self) -> String {
        format!("Step {}/{}", self.cursor + 1, self.steps.len())
    }

    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            visible: self.visible,
            state: self.state,
            auto_advance: self.auto_advance,
            cursor: self.cursor,
            step_count: self.steps.len(),
            label: self.label(),
            current_step: self.steps.get(self.cursor).map(str::to_string),
        }
    }

    fn move_to(&mut self, target: usize) -> Result<usize, PlayerError> {
        if target == self.cursor {
            return Ok(self.cursor);
        }
        self.cursor = target;
        if self.state == PlaybackState::Speaking {
            self.speak_step(target)?;
        }
        Ok(self.cursor)
    }

    /// Submit step `index`, cancelling whatever is outstanding first.
    /// Out-of-range indices do nothing.
    fn speak_step(&mut self, index: usize) -> Result<(), PlayerError> {
        let Some(text) = self.steps.get(index) else {
            return Ok(());
        };
        let text = text.to_string();

        if self.active.take().is_some() {
            self.engine.cancel();
        }

        self.next_id += 1;
        let id = UtteranceId(self.next_id);
        let utterance = Utterance {
            id,
            text,
            locale: self.locale.clone(),
        };
        if let Err(err) = self.engine.speak(utterance) {
            warn!("Failed to speak step {}: {err}", index + 1);
            self.state = PlaybackState::Paused;
            return Err(err.into());
        }

        debug!("Speaking step {} as {id}", index + 1);
        self.active = Some(id);
        self.state = PlaybackState::Speaking;
        Ok(())
    }
}

impl<E: SpeechEngine> Drop for StepPlayer<E> {
    fn drop(&mut self) {
        if self.active.take().is_some() {
            self.engine.cancel();
        }
    }
}
