use std::fs;

use anyhow::{Context, Result};
use log::{info, warn};
use parking_lot::Mutex;

use crate::{
    player::StepPlayer,
    settings::ReaderSettings,
    speech::{completion_channel, CompletionReceiver, SpeechEngine, UnavailableSpeech},
    typeahead::IngredientCatalog,
};

pub type SharedPlayer = Mutex<StepPlayer<Box<dyn SpeechEngine>>>;

pub struct AppState {
    pub player: SharedPlayer,
    pub ingredients: IngredientCatalog,
    settings: ReaderSettings,
}

impl AppState {
    /// Assemble the application from `settings`. The returned receiver
    /// carries engine completions and must be pumped into the player.
    pub fn initialise(settings: ReaderSettings) -> Result<(Self, CompletionReceiver)> {
        fs::create_dir_all(&settings.output_dir).with_context(|| {
            format!(
                "unable to create output directory {}",
                settings.output_dir.display()
            )
        })?;

        let ingredients = IngredientCatalog::load_or_default(settings.ingredients_path.clone())
            .context("failed to load ingredient catalog")?;
        info!("Ingredient catalog holds {} item(s)", ingredients.len());

        let (completions, receiver) = completion_channel();
        let engine = build_engine(&settings, completions)?;
        let player = StepPlayer::with_locale(engine, settings.locale.clone());

        Ok((
            Self {
                player: Mutex::new(player),
                ingredients,
                settings,
            },
            receiver,
        ))
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }
}

#[cfg(feature = "playback")]
fn build_engine(
    settings: &ReaderSettings,
    completions: crate::speech::CompletionSender,
) -> Result<Box<dyn SpeechEngine>> {
    use crate::speech::{Lexicon, PiperSpeech, PiperSynthesizer, VoiceLibrary};
    use crate::util::piper_path;

    let lexicon = Lexicon::load_or_builtin(&settings.lexicon_path)
        .context("failed to load pronunciation lexicon")?;

    let command = match piper_path::resolve(&settings.runtime_dir, settings.piper_command.as_deref())
    {
        Ok(command) => command,
        Err(err) => {
            warn!("Speech disabled: {err}");
            return Ok(Box::new(UnavailableSpeech));
        }
    };

    let voices = VoiceLibrary::new(settings.voices_dir.clone());
    let voice = match voices.for_locale(&settings.locale) {
        Ok(voice) => voice,
        Err(err) => {
            warn!("Speech disabled: {err} in {}", voices.base_dir().display());
            return Ok(Box::new(UnavailableSpeech));
        }
    };

    Ok(Box::new(PiperSpeech::new(
        PiperSynthesizer::new(&command),
        voice,
        lexicon,
        settings.output_dir.clone(),
        completions,
    )))
}

#[cfg(not(feature = "playback"))]
fn build_engine(
    _settings: &ReaderSettings,
    _completions: crate::speech::CompletionSender,
) -> Result<Box<dyn SpeechEngine>> {
    warn!("Speech disabled: built without the playback feature");
    Ok(Box::new(UnavailableSpeech))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerError;

    #[test]
    fn initialise_creates_output_and_loads_catalog() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("ingredients.json"), r#"["saffron","salt"]"#).unwrap();
        let settings = ReaderSettings {
            runtime_dir: temp.path().to_path_buf(),
            voices_dir: temp.path().join("voices"),
            output_dir: temp.path().join("output"),
            ingredients_path: temp.path().join("ingredients.json"),
            lexicon_path: temp.path().join("lexicon.json"),
            piper_command: Some("piper".into()),
            ..ReaderSettings::default()
        };

        let (state, _completions) = AppState::initialise(settings).unwrap();
        assert!(temp.path().join("output").exists());
        assert_eq!(state.ingredients.suggest("sa"), vec!["saffron", "salt"]);

        // no voices installed, so speech falls back to the unavailable engine
        let mut player = state.player.lock();
        player.set_instructions("Season to taste.");
        assert!(matches!(
            player.toggle_play(),
            Err(PlayerError::SpeechUnavailable)
        ));
    }
}
