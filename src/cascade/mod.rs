//! Cascade routing state machine.
//!
//! Routes an input text from a coarse script family down to a concrete
//! language code. The family stage picks a branch; non-terminal branches
//! run one or two more stages. There is no backtracking: once a stage
//! commits to a branch, earlier stages are never revisited, and the whole
//! call fails if any stage fails.
//!
//! # Example
//!
//! ```no_run
//! use glossa::Cascade;
//!
//! let cascade = Cascade::from_model_dir("model_assets");
//! assert_eq!(cascade.detect("こんにちは").unwrap(), "ja");
//! ```

mod stage;
mod types;

#[cfg(test)]
mod samples_test;

pub use stage::{ClassifierStage, Stage};
pub use types::{CyrillicBranch, FamilyLabel, StageKind};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexicon::LexiconStore;
use crate::model::ModelStore;
use crate::Error;

// Hiragana, katakana, phonetic extensions, halfwidth forms, and the
// prolongation/iteration marks. Any hit is unambiguously Japanese.
static KANA_OR_JAPANESE_MARKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{3040}-\x{30ff}\x{31f0}-\x{31ff}\x{ff66}-\x{ff9f}]").unwrap());

/// The cascade: a family stage plus per-family stages.
pub struct Cascade {
    stages: HashMap<StageKind, Box<dyn Stage>>,
}

impl Cascade {
    /// Create a cascade from explicit stages (mainly for testing the
    /// routing in isolation).
    pub fn with_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages: stages.into_iter().map(|s| (s.kind(), s)).collect(),
        }
    }

    /// Create the full cascade over a model-assets directory.
    ///
    /// All eight stages share one model store and one lexicon store;
    /// artifacts load lazily, so stages off the taken path cost nothing.
    pub fn from_model_dir<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        let models = Arc::new(ModelStore::new(root));
        let lexicons = Arc::new(LexiconStore::with_cache_dir(root.join("tell_lists")));

        Self::with_stages(
            StageKind::ALL
                .iter()
                .map(|&kind| {
                    Box::new(ClassifierStage::new(
                        kind,
                        Arc::clone(&models),
                        Arc::clone(&lexicons),
                    )) as Box<dyn Stage>
                })
                .collect(),
        )
    }

    /// Detect the language of `text`, returning a lowercase language code.
    pub fn detect(&self, text: &str) -> Result<String, Error> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput);
        }

        // Script short-circuit: kana bypasses the statistical cascade.
        if KANA_OR_JAPANESE_MARKS.is_match(text) {
            return Ok("ja".to_string());
        }

        let family_label = self.run(StageKind::Family, text)?;
        let family = FamilyLabel::from_label(&family_label).ok_or_else(|| {
            Error::Classification(format!(
                "family stage returned unknown label {:?}",
                family_label
            ))
        })?;

        match family {
            FamilyLabel::El | FamilyLabel::Ko => Ok(family.as_str().to_string()),
            FamilyLabel::Indic => self.run(StageKind::Indic, text),
            FamilyLabel::JaZh => self.run(StageKind::JaZh, text),
            FamilyLabel::PersoArabic => self.run(StageKind::PersoArabic, text),
            FamilyLabel::Cyrillic => {
                let branch = CyrillicBranch::from_label(&self.run(StageKind::Cyrillic, text)?);
                self.run(branch.stage(), text)
            }
        }
    }

    /// Number of configured stages.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    fn run(&self, kind: StageKind, text: &str) -> Result<String, Error> {
        let stage = self.stages.get(&kind).ok_or_else(|| {
            Error::Configuration(format!("no stage configured for {}", kind))
        })?;
        stage.classify(text)
    }
}
