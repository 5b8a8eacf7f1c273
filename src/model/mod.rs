//! Model store: per-stage vectorizer and ensemble artifacts.
//!
//! Artifacts live under a root directory, keyed by stage name:
//!
//! ```text
//! <root>/vectorizers/ld_<stage>_vectorizer.json
//! <root>/models/ld_<stage>_ensemble_model.json
//! <root>/tell_lists/ld_<family>_tell_lists.json   (optional cache)
//! ```
//!
//! Loading is a pure read, performed lazily on first use and memoized for
//! the process lifetime. A missing artifact is a deployment defect, not a
//! transient condition: it fails with [`Error::ModelNotFound`] and is never
//! retried.

mod classifier;
mod vectorizer;

pub use classifier::{Classify, Estimator, VotingEnsemble};
pub use vectorizer::{Analyzer, Vectorizer};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;

use crate::cascade::StageKind;
use crate::features::FeatureSchema;
use crate::lexicon::TellLexicon;
use crate::Error;

/// Everything one stage needs to turn a text into a label.
pub struct StageTools {
    pub vectorizer: Vectorizer,
    pub model: VotingEnsemble,
    pub schema: FeatureSchema,
}

/// Loads and memoizes per-stage tools.
pub struct ModelStore {
    root: PathBuf,
    cache: Mutex<HashMap<StageKind, Arc<StageTools>>>,
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the tools for a stage, loading them on first use.
    ///
    /// The stage's bound lexicon (if any) fixes the extended-block widths;
    /// the resulting schema is validated against the model's declared
    /// feature count before the tools are handed out.
    pub fn tools(
        &self,
        kind: StageKind,
        lexicon: Option<&TellLexicon>,
    ) -> Result<Arc<StageTools>, Error> {
        if let Some(tools) = self.cache().get(&kind) {
            return Ok(Arc::clone(tools));
        }

        let tools = Arc::new(self.load(kind, lexicon)?);
        self.cache().insert(kind, Arc::clone(&tools));
        Ok(tools)
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<StageKind, Arc<StageTools>>> {
        // a poisoned cache still holds valid immutable tools
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load(&self, kind: StageKind, lexicon: Option<&TellLexicon>) -> Result<StageTools, Error> {
        let vectorizer_path = self
            .root
            .join("vectorizers")
            .join(format!("ld_{}_vectorizer.json", kind.key()));
        let model_path = self
            .root
            .join("models")
            .join(format!("ld_{}_ensemble_model.json", kind.key()));

        let vectorizer: Vectorizer = read_artifact(&vectorizer_path)?;
        vectorizer.validate()?;

        let model: VotingEnsemble = read_artifact(&model_path)?;
        model.validate()?;

        let schema = FeatureSchema::new(vectorizer.width(), lexicon);
        schema.validate_model_width(model.n_features())?;

        Ok(StageTools {
            vectorizer,
            model,
            schema,
        })
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::ModelNotFound(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::Configuration(format!("malformed artifact {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{LexiconStore, ScriptFamily};
    use std::fs;

    /// Write a minimal, well-formed artifact pair for one stage.
    fn write_stage_artifacts(root: &Path, key: &str, n_features: usize, classes: &[&str]) {
        fs::create_dir_all(root.join("vectorizers")).unwrap();
        fs::create_dir_all(root.join("models")).unwrap();

        let vectorizer = serde_json::json!({
            "analyzer": "char",
            "ngram_range": [2, 2],
            "vocabulary": {"αβ": 0, "βγ": 1},
            "idf": [1.0, 1.0],
            "sublinear_tf": false
        });
        fs::write(
            root.join("vectorizers")
                .join(format!("ld_{}_vectorizer.json", key)),
            serde_json::to_vec(&vectorizer).unwrap(),
        )
        .unwrap();

        let n_classes = classes.len();
        let model = serde_json::json!({
            "classes": classes,
            "n_features": n_features,
            "estimators": [{
                "kind": "logistic",
                "coef": vec![vec![0.1f32; n_features]; n_classes],
                "intercept": vec![0.0f32; n_classes]
            }]
        });
        fs::write(
            root.join("models")
                .join(format!("ld_{}_ensemble_model.json", key)),
            serde_json::to_vec(&model).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_missing_artifact_is_model_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        match store.tools(StageKind::Family, None) {
            Err(Error::ModelNotFound(path)) => {
                assert!(path.contains("ld_family_vectorizer.json"));
            }
            other => panic!("expected ModelNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_tools_load_and_memoize() {
        let dir = tempfile::tempdir().unwrap();
        // family stage binds no lexicon: base width 2 is the whole vector
        write_stage_artifacts(dir.path(), "family", 2, &["el", "ko"]);

        let store = ModelStore::new(dir.path());
        let a = store.tools(StageKind::Family, None).unwrap();
        let b = store.tools(StageKind::Family, None).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.schema.total_width(), 2);
    }

    #[test]
    fn test_schema_width_checked_against_model() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon = LexiconStore::new()
            .lexicon(ScriptFamily::EasternSlavic)
            .unwrap();
        // declared n_features ignores the extended blocks: fail fast
        write_stage_artifacts(dir.path(), "eastern_cyrillic", 2, &["be", "ru", "uk"]);

        let store = ModelStore::new(dir.path());
        match store.tools(StageKind::EasternCyrillic, Some(lexicon.as_ref())) {
            Err(Error::DimensionMismatch(_)) => {}
            other => panic!("expected DimensionMismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_tools_with_lexicon_width() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon = LexiconStore::new()
            .lexicon(ScriptFamily::EasternSlavic)
            .unwrap();
        let width = 2 + lexicon.characters().len() + lexicon.scoring_groups().len();
        write_stage_artifacts(dir.path(), "eastern_cyrillic", width, &["be", "ru", "uk"]);

        let store = ModelStore::new(dir.path());
        let tools = store
            .tools(StageKind::EasternCyrillic, Some(lexicon.as_ref()))
            .unwrap();
        assert_eq!(tools.schema.total_width(), width);
        assert_eq!(tools.model.classes(), &["be", "ru", "uk"]);
    }

    #[test]
    fn test_malformed_artifact_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("vectorizers")).unwrap();
        fs::write(
            dir.path()
                .join("vectorizers")
                .join("ld_family_vectorizer.json"),
            b"{broken",
        )
        .unwrap();

        let store = ModelStore::new(dir.path());
        match store.tools(StageKind::Family, None) {
            Err(Error::Configuration(_)) => {}
            other => panic!("expected Configuration error, got {:?}", other.map(|_| ())),
        }
    }
}
