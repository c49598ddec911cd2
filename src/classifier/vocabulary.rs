//! The fixed label set a classifier was trained on.

use crate::error::VocabularyError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Opaque sign label. The engine never interprets its contents.
pub type Symbol = String;

/// Signs supported by the bundled reference model.
pub const DEFAULT_SIGNS: [&str; 18] = [
    "HELLO",
    "THANKS",
    "YES",
    "NO",
    "PLEASE",
    "GOOD",
    "BEAUTIFUL",
    "BETTER",
    "HAPPY",
    "GREAT",
    "NAME",
    "MY",
    "LOOK",
    "TALK",
    "SAY",
    "ASK",
    "EAT",
    "DRINK",
];

/// Closed, ordered set of labels known when a session starts.
///
/// Index order matters: score vectors are aligned with it and ranking ties are
/// broken by ascending index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    labels: Vec<Symbol>,
}

impl Vocabulary {
    pub fn new<I, S>(labels: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let labels: Vec<Symbol> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(VocabularyError::Empty);
        }

        let mut seen = HashSet::with_capacity(labels.len());
        for (index, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(VocabularyError::EmptyLabel(index));
            }
            if !seen.insert(label.as_str()) {
                return Err(VocabularyError::Duplicate(label.clone()));
            }
        }

        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Symbol] {
        &self.labels
    }

    pub fn get(&self, index: usize) -> Option<&Symbol> {
        self.labels.get(index)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Compare the loaded labels against the signs a deployment aims to support.
    pub fn coverage(&self, target: &[&str]) -> VocabularyCoverage {
        let (available, missing): (Vec<&str>, Vec<&str>) =
            target.iter().copied().partition(|sign| self.contains(sign));
        let extra = self
            .labels
            .iter()
            .filter(|label| !target.contains(&label.as_str()))
            .cloned()
            .collect();

        let coverage_percentage = if target.is_empty() {
            100.0
        } else {
            available.len() as f64 / target.len() as f64 * 100.0
        };

        VocabularyCoverage {
            total_target_signs: target.len(),
            total_loaded_signs: self.labels.len(),
            available: available.into_iter().map(str::to_string).collect(),
            missing: missing.into_iter().map(str::to_string).collect(),
            extra,
            coverage_percentage,
        }
    }
}

/// Which target signs a vocabulary can recognize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocabularyCoverage {
    pub total_target_signs: usize,
    pub total_loaded_signs: usize,
    /// Target signs present in the vocabulary, in target order.
    pub available: Vec<Symbol>,
    pub missing: Vec<Symbol>,
    /// Loaded labels that are not target signs.
    pub extra: Vec<Symbol>,
    pub coverage_percentage: f64,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            labels: DEFAULT_SIGNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = VocabularyError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.labels
    }
}
