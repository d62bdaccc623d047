//! Prefix suggestions for the ingredient and cuisine search boxes.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use parking_lot::RwLock;
use regex::RegexBuilder;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read ingredient catalog {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse ingredient catalog {0}: {1}")]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// Items of `items` starting with `text`, ignoring case, in sorted order.
/// Empty text suggests nothing.
pub fn suggest<I, S>(items: I, text: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if text.is_empty() {
        return Vec::new();
    }
    let Ok(prefix) = RegexBuilder::new(&format!("^{}", regex::escape(text)))
        .case_insensitive(true)
        .build()
    else {
        return Vec::new();
    };
    let mut matches: Vec<String> = items
        .into_iter()
        .filter(|item| prefix.is_match(item.as_ref()))
        .map(|item| item.as_ref().to_string())
        .collect();
    matches.sort();
    matches
}

/// Text box state: what has been typed and what is being offered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeAhead {
    pub text: String,
    pub suggestions: Vec<String>,
}

impl TypeAhead {
    pub fn on_text_change<I, S>(&mut self, items: I, text: &str)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.suggestions = suggest(items, text);
        self.text = text.to_string();
    }

    pub fn select(&mut self, value: &str) {
        self.text = value.to_string();
        self.suggestions.clear();
    }
}

/// Known ingredient names, loaded from a JSON array of strings.
#[derive(Debug, Default)]
pub struct IngredientCatalog {
    path: PathBuf,
    items: RwLock<BTreeSet<String>>,
}

impl IngredientCatalog {
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: PathBuf::new(),
            items: RwLock::new(normalise(items)),
        }
    }

    pub fn load_or_default(path: PathBuf) -> Result<Self, CatalogError> {
        if !path.exists() {
            log::info!("No ingredient catalog at {}", path.display());
            return Ok(Self {
                path,
                items: RwLock::default(),
            });
        }

        let data =
            fs::read_to_string(&path).map_err(|err| CatalogError::Io(path.clone(), err))?;
        let parsed: Vec<String> =
            serde_json::from_str(&data).map_err(|err| CatalogError::Parse(path.clone(), err))?;
        Ok(Self {
            path,
            items: RwLock::new(normalise(parsed)),
        })
    }

    pub fn suggest(&self, text: &str) -> Vec<String> {
        suggest(self.items.read().iter(), text)
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn normalise<I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items
        .into_iter()
        .map(Into::into)
        .map(|item: String| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
