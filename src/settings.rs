use std::path::PathBuf;

use crate::speech::DEFAULT_LOCALE;

/// Runtime configuration, read once from `RECIPE_READER_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderSettings {
    pub runtime_dir: PathBuf,
    pub locale: String,
    pub voices_dir: PathBuf,
    pub output_dir: PathBuf,
    pub ingredients_path: PathBuf,
    pub lexicon_path: PathBuf,
    pub piper_command: Option<String>,
}

impl ReaderSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let runtime_dir = var("RECIPE_READER_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("runtime"));

        Self {
            locale: var("RECIPE_READER_LOCALE").unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            voices_dir: var("RECIPE_READER_VOICES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assets/voices")),
            output_dir: var("RECIPE_READER_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| runtime_dir.join("output")),
            ingredients_path: var("RECIPE_READER_INGREDIENTS")
                .map(PathBuf::from)
                .unwrap_or_else(|| runtime_dir.join("ingredients.json")),
            lexicon_path: var("RECIPE_READER_LEXICON")
                .map(PathBuf::from)
                .unwrap_or_else(|| runtime_dir.join("lexicon.json")),
            piper_command: var("RECIPE_READER_PIPER_COMMAND"),
            runtime_dir,
        }
    }
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_live_under_runtime() {
        let settings = ReaderSettings::default();
        assert_eq!(settings.locale, "en-US");
        assert_eq!(settings.output_dir, PathBuf::from("runtime/output"));
        assert_eq!(settings.ingredients_path, PathBuf::from("runtime/ingredients.json"));
        assert_eq!(settings.voices_dir, PathBuf::from("assets/voices"));
        assert_eq!(settings.piper_command, None);
    }

    #[test]
    fn variables_override_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("RECIPE_READER_RUNTIME_DIR", "/opt/reader"),
            ("RECIPE_READER_LOCALE", "es-ES"),
            ("RECIPE_READER_LEXICON", "/etc/lexicon.json"),
            ("RECIPE_READER_PIPER_COMMAND", "  "),
        ]);
        let settings = ReaderSettings::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(settings.runtime_dir, PathBuf::from("/opt/reader"));
        assert_eq!(settings.output_dir, PathBuf::from("/opt/reader/output"));
        assert_eq!(settings.locale, "es-ES");
        assert_eq!(settings.lexicon_path, PathBuf::from("/etc/lexicon.json"));
        assert_eq!(settings.piper_command, None);
    }
}
