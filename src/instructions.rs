//! Turns a recipe's free-text instructions into readable steps.
//!
//! Instructions arrive as a single blob where sentences are separated by a
//! period. Each trimmed, non-empty fragment becomes one step, in the order it
//! appears in the text.

/// Split `text` on `.` into trimmed, non-empty steps.
pub fn parse_steps(text: &str) -> Vec<String> {
    text.split('.')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Raw instruction text together with the steps derived from it.
///
/// The steps are never edited directly; replacing the text recomputes them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionSteps {
    source: String,
    steps: Vec<String>,
}

impl InstructionSteps {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let steps = parse_steps(&source);
        Self { source, steps }
    }

    /// Replace the raw text and re-derive the steps. Returns `true` when the
    /// derived sequence differs from the previous one.
    pub fn replace(&mut self, source: impl Into<String>) -> bool {
        self.source = source.into();
        let steps = parse_steps(&self.source);
        let changed = steps != self.steps;
        self.steps = steps;
        changed
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.steps.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the final step, `0` when there are none.
    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}
