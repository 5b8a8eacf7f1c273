//! Stage trait and the classifier-backed stage.

use std::sync::Arc;

use crate::cascade::StageKind;
use crate::features;
use crate::lexicon::LexiconStore;
use crate::model::{Classify, ModelStore};
use crate::Error;

/// A single stage in the classification cascade.
///
/// Each stage maps a text to exactly one label string. Stages hold no
/// per-call state; whatever they load (models, lexicons) is cached and
/// reused across calls.
pub trait Stage: Send + Sync {
    /// Which node of the cascade this stage serves.
    fn kind(&self) -> StageKind;

    /// Classify the text, returning one label.
    ///
    /// Errors propagate up and abort the whole cascade call; there is no
    /// partial-result fallback.
    fn classify(&self, text: &str) -> Result<String, Error>;
}

/// A stage backed by a fitted vectorizer and a trained ensemble.
///
/// The pipeline per call: case-fold the input, build the base lexical
/// vector, extract extended tell features with the stage's bound lexicon
/// (if any), assemble the augmented vector through the stage schema, and
/// let the ensemble pick a label. Model and lexicon are loaded lazily on
/// first use and memoized in the shared stores.
pub struct ClassifierStage {
    kind: StageKind,
    models: Arc<ModelStore>,
    lexicons: Arc<LexiconStore>,
}

impl ClassifierStage {
    pub fn new(kind: StageKind, models: Arc<ModelStore>, lexicons: Arc<LexiconStore>) -> Self {
        Self {
            kind,
            models,
            lexicons,
        }
    }
}

impl Stage for ClassifierStage {
    fn kind(&self) -> StageKind {
        self.kind
    }

    fn classify(&self, text: &str) -> Result<String, Error> {
        let folded = text.to_lowercase();

        let lexicon = match self.kind.lexicon_family() {
            Some(family) => Some(self.lexicons.lexicon(family)?),
            None => None,
        };

        let tools = self.models.tools(self.kind, lexicon.as_deref())?;

        let base = tools.vectorizer.transform(&[folded.as_str()])?;
        let extended = match &lexicon {
            Some(lx) => Some(features::extract(&[folded.as_str()], lx)?),
            None => None,
        };

        let x = tools.schema.assemble(base, extended)?;
        tools
            .model
            .predict(x.row(0))
            .map_err(|e| Error::Classification(format!("stage {}: {}", self.kind, e)))
    }
}
