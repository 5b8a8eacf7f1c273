//! Glossa - cascading language identifier
//!
//! Identifies the natural language of a short text fragment by routing it
//! through a cascade of script-family classifiers. Each stage combines a
//! fitted char n-gram TF-IDF vector with hand-curated "tell" features
//! (distinguishing characters, word endings, bigrams) and feeds the
//! augmented vector to a soft-voting ensemble loaded from a model-assets
//! directory.
//!
//! # Architecture
//!
//! The cascade routes coarse to fine:
//! 1. A script short-circuit returns `ja` for any kana input
//! 2. The family stage picks a script family (el, ko, indic, ja_zh,
//!    perso-arabic, cyrillic)
//! 3. Non-terminal families route into per-family stages until a concrete
//!    language code falls out
//!
//! # Example
//!
//! ```no_run
//! use glossa::Cascade;
//!
//! let cascade = Cascade::from_model_dir("model_assets");
//! let code = cascade.detect("Здравствуйте").unwrap();
//! println!("{code}");
//! ```

pub use error::Error;

// Cascade routing state machine and classification stages
pub mod cascade;

// Tell-signal feature extraction
pub mod features;

// Per-family tell lexicons
pub mod lexicon;

// Model store: fitted vectorizers and trained ensembles
pub mod model;

pub use cascade::Cascade;

mod error {
    use std::fmt;

    #[derive(Debug)]
    pub enum Error {
        Io(std::io::Error),
        Json(serde_json::Error),
        Shape(ndarray::ShapeError),
        /// Empty or whitespace-only input, rejected before any stage runs.
        InvalidInput,
        /// Malformed lexicon or model artifact.
        Configuration(String),
        /// Missing vectorizer/model artifact for a stage. Non-retryable.
        ModelNotFound(String),
        /// Row-count or feature-width inconsistency between blocks.
        DimensionMismatch(String),
        /// Failure inside a stage's classify call.
        Classification(String),
    }

    impl fmt::Display for Error {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Error::Io(e) => write!(f, "IO error: {}", e),
                Error::Json(e) => write!(f, "JSON error: {}", e),
                Error::Shape(e) => write!(f, "Shape error: {}", e),
                Error::InvalidInput => write!(f, "Input string cannot be empty"),
                Error::Configuration(e) => write!(f, "Configuration error: {}", e),
                Error::ModelNotFound(e) => write!(f, "Model not found: {}", e),
                Error::DimensionMismatch(e) => write!(f, "Dimension mismatch: {}", e),
                Error::Classification(e) => write!(f, "Classification error: {}", e),
            }
        }
    }

    impl std::error::Error for Error {}

    impl From<std::io::Error> for Error {
        fn from(e: std::io::Error) -> Self {
            Error::Io(e)
        }
    }

    impl From<serde_json::Error> for Error {
        fn from(e: serde_json::Error) -> Self {
            Error::Json(e)
        }
    }

    impl From<ndarray::ShapeError> for Error {
        fn from(e: ndarray::ShapeError) -> Self {
            Error::Shape(e)
        }
    }
}
