use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("no voice for locale '{0}'")]
    NoVoiceForLocale(String),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VoiceInfo {
    pub id: String,
    pub label: String,
    pub language: Option<String>,
    pub model_path: PathBuf,
}

/// Piper voices discovered under a directory.
#[derive(Default)]
pub struct VoiceLibrary {
    base_dir: PathBuf,
    voices: RwLock<HashMap<String, VoiceInfo>>,
}

impl VoiceLibrary {
    pub fn new(base_dir: PathBuf) -> Self {
        let library = Self {
            base_dir,
            voices: RwLock::new(HashMap::new()),
        };
        library.refresh();
        library
    }

    pub fn refresh(&self) {
        let mut discovered = HashMap::new();
        if self.base_dir.exists() {
            for entry in WalkDir::new(&self.base_dir)
                .into_iter()
                .filter_map(Result::ok)
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("onnx") {
                    continue;
                }
                if let Some(info) = build_voice_info(path) {
                    discovered.insert(info.id.clone(), info);
                }
            }
        }
        log::debug!(
            "Discovered {} voice(s) under {}",
            discovered.len(),
            self.base_dir.display()
        );
        *self.voices.write() = discovered;
    }

    pub fn list(&self) -> Vec<VoiceInfo> {
        let mut voices: Vec<_> = self.voices.read().values().cloned().collect();
        voices.sort_by(|a, b| a.id.cmp(&b.id));
        voices
    }

    /// First voice (by id) whose language code matches `locale`. Voices
    /// without metadata match when their file stem starts with the code.
    pub fn for_locale(&self, locale: &str) -> Result<VoiceInfo, VoiceError> {
        let code = normalise_locale(locale);
        let voices = self.list();
        voices
            .iter()
            .find(|voice| {
                voice
                    .language
                    .as_deref()
                    .is_some_and(|language| normalise_locale(language) == code)
            })
            .or_else(|| {
                voices
                    .iter()
                    .find(|voice| voice.language.is_none() && normalise_locale(&voice.id).starts_with(&code))
            })
            .cloned()
            .ok_or_else(|| VoiceError::NoVoiceForLocale(locale.to_string()))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

fn normalise_locale(locale: &str) -> String {
    locale.replace('-', "_").to_lowercase()
}

fn build_voice_info(path: &Path) -> Option<VoiceInfo> {
    let id = path.file_stem()?.to_string_lossy().to_string();
    let metadata = metadata_path_for(path).and_then(|path| match fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str::<Value>(&contents)
            .map_err(|err| {
                log::warn!("Failed to parse metadata {}: {err}", path.display());
                err
            })
            .ok(),
        Err(err) => {
            log::warn!("Failed to read metadata {}: {err}", path.display());
            None
        }
    });

    let language = metadata
        .as_ref()
        .and_then(|value| value.get("language"))
        .and_then(|lang| lang.get("code"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let label = metadata
        .as_ref()
        .and_then(|value| value.get("language"))
        .and_then(|lang| lang.get("name_english").or_else(|| lang.get("name")))
        .and_then(Value::as_str)
        .map(|lang| format!("{lang} · {id}"))
        .unwrap_or_else(|| id.clone());

    Some(VoiceInfo {
        id,
        label,
        language,
        model_path: path.to_path_buf(),
    })
}

fn metadata_path_for(path: &Path) -> Option<PathBuf> {
    let mut metadata_path = path.to_path_buf();
    metadata_path.set_extension("onnx.json");
    metadata_path.exists().then_some(metadata_path)
}
