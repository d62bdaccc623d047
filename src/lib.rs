//! Recipe Reader: reads recipe instructions aloud one step at a time.
//!
//! The library holds the step parser, the [`player::StepPlayer`] state
//! machine and the speech engines behind it, plus the ingredient typeahead.
//! The `desktop` feature adds the Tauri commands used by the webview.

pub mod cmds;
pub mod instructions;
pub mod player;
pub mod settings;
pub mod speech;
pub mod state;
pub mod typeahead;
pub mod util;

pub use instructions::{parse_steps, InstructionSteps};
pub use player::{PlaybackState, PlayerError, PlayerStatus, StepPlayer};
pub use settings::ReaderSettings;
