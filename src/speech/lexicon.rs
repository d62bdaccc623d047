//! Pronunciation fixes applied to step text before it is synthesized.
//!
//! Recipes are full of abbreviations ("2 tbsp", "350 F", "10 min") that a
//! voice reads letter by letter. The lexicon rewrites whole words,
//! case-insensitively, into their spoken form.

use std::{
    fs,
    path::{Path, PathBuf},
};

use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse lexicon JSON {0}: {1}")]
    Parse(PathBuf, #[source] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LexiconEntry {
    pub word: String,
    pub replacement: String,
}

const BUILTIN: &[(&str, &str)] = &[
    ("tbsp", "tablespoons"),
    ("tsp", "teaspoons"),
    ("oz", "ounces"),
    ("lb", "pounds"),
    ("min", "minutes"),
];

struct Rule {
    key: String,
    pattern: Regex,
    replacement: String,
}

#[derive(Default)]
pub struct Lexicon {
    rules: RwLock<Vec<Rule>>,
}

impl Lexicon {
    /// Lexicon holding only the built-in cooking abbreviations.
    pub fn builtin() -> Self {
        let lexicon = Self::default();
        lexicon.extend(BUILTIN.iter().map(|(word, replacement)| LexiconEntry {
            word: (*word).to_string(),
            replacement: (*replacement).to_string(),
        }));
        lexicon
    }

    /// Built-in entries plus the ones stored at `path`. A missing file is not
    /// an error. File entries override built-in ones for the same word.
    pub fn load_or_builtin(path: &Path) -> Result<Self, LexiconError> {
        let lexicon = Self::builtin();
        if !path.exists() {
            return Ok(lexicon);
        }

        let data =
            fs::read_to_string(path).map_err(|err| LexiconError::Io(path.to_path_buf(), err))?;
        let parsed: Vec<LexiconEntry> = serde_json::from_str(&data)
            .map_err(|err| LexiconError::Parse(path.to_path_buf(), err))?;
        lexicon.extend(parsed);
        Ok(lexicon)
    }

    pub fn extend(&self, entries: impl IntoIterator<Item = LexiconEntry>) {
        let mut rules = self.rules.write();
        for entry in entries {
            let word = entry.word.trim();
            if word.is_empty() {
                continue;
            }
            let Ok(pattern) = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(word)))
                .case_insensitive(true)
                .build()
            else {
                log::warn!("Skipping lexicon entry {word:?}: invalid pattern");
                continue;
            };
            // matching is case-insensitive, so "MIN" replaces "min"
            let key = word.to_lowercase();
            rules.retain(|rule| rule.key != key);
            rules.push(Rule {
                key,
                pattern,
                replacement: entry.replacement,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    pub fn apply(&self, input: &str) -> String {
        let rules = self.rules.read();
        let mut output = input.to_string();
        for rule in rules.iter() {
            output = rule
                .pattern
                .replace_all(&output, regex::NoExpand(&rule.replacement))
                .into_owned();
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn expands_builtin_abbreviations() {
        let lexicon = Lexicon::builtin();
        assert_eq!(
            lexicon.apply("Add 2 TBSP butter and simmer 10 min"),
            "Add 2 tablespoons butter and simmer 10 minutes"
        );
    }

    #[test]
    fn only_whole_words_are_replaced() {
        let lexicon = Lexicon::builtin();
        assert_eq!(lexicon.apply("Mince the garlic"), "Mince the garlic");
    }

    #[test]
    fn file_entries_override_builtin() {
        let file = assert_fs::NamedTempFile::new("lexicon.json").unwrap();
        file.write_str(r#"[{"word":"min","replacement":"mins"},{"word":"C","replacement":"Celsius"},{"word":" ","replacement":"x"}]"#)
            .unwrap();
        let lexicon = Lexicon::load_or_builtin(file.path()).unwrap();
        assert_eq!(lexicon.len(), BUILTIN.len() + 1);
        assert_eq!(lexicon.apply("Bake at 180 C for 20 min"), "Bake at 180 Celsius for 20 mins");
    }

    #[test]
    fn overrides_ignore_letter_case() {
        let file = assert_fs::NamedTempFile::new("lexicon.json").unwrap();
        file.write_str(r#"[{"word":"MIN","replacement":"mins"},{"word":"Tsp","replacement":"teaspoon"}]"#)
            .unwrap();
        let lexicon = Lexicon::load_or_builtin(file.path()).unwrap();
        assert_eq!(lexicon.len(), BUILTIN.len());
        assert_eq!(lexicon.apply("1 tsp salt, 10 min"), "1 teaspoon salt, 10 mins");
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let lexicon = Lexicon::load_or_builtin(Path::new("missing/lexicon.json")).unwrap();
        assert_eq!(lexicon.len(), BUILTIN.len());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file = assert_fs::NamedTempFile::new("lexicon.json").unwrap();
        file.write_str("{not json").unwrap();
        assert!(matches!(
            Lexicon::load_or_builtin(file.path()),
            Err(LexiconError::Parse(..))
        ));
    }
}
