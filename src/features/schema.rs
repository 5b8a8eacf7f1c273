//! Explicit feature layout shared between training artifacts and the
//! inference-time assembler.
//!
//! The augmented vector a trained model expects is a weighted horizontal
//! concatenation of blocks in a fixed declared order. Making that layout an
//! explicit schema turns a silent column-order mismatch into a fail-fast
//! width check at load time.

use ndarray::{concatenate, Array2, Axis};

use crate::lexicon::TellLexicon;
use crate::Error;

use super::ExtendedFeatures;

pub const WEIGHT_BASE: f32 = 1.0;
pub const WEIGHT_CHARACTERS: f32 = 1.5;
pub const WEIGHT_RADICALS: f32 = 1.0;
pub const WEIGHT_ENDINGS: f32 = 2.0;
pub const WEIGHT_BIGRAMS: f32 = 2.0;
pub const WEIGHT_TELL_SCORE: f32 = 0.5;

/// One named block of the augmented vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSpec {
    pub name: &'static str,
    pub width: usize,
    pub weight: f32,
}

/// The ordered block layout for one stage: base lexical features first,
/// then the extended blocks. Absent signal families get zero-width blocks,
/// so the declared order never varies.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    blocks: Vec<BlockSpec>,
}

impl FeatureSchema {
    /// Build the schema for a stage from its fitted vectorizer width and
    /// its bound lexicon (if any).
    pub fn new(base_width: usize, lexicon: Option<&TellLexicon>) -> Self {
        let (chars, radicals, endings, bigrams, groups) = match lexicon {
            Some(lx) => (
                lx.characters().len(),
                lx.radicals().map(|r| r.len()).unwrap_or(0),
                lx.endings().map(|e| e.len() * 2).unwrap_or(0),
                lx.bigrams().map(|b| b.len() * 2).unwrap_or(0),
                lx.scoring_groups().len(),
            ),
            None => (0, 0, 0, 0, 0),
        };

        Self {
            blocks: vec![
                BlockSpec { name: "base", width: base_width, weight: WEIGHT_BASE },
                BlockSpec { name: "characters", width: chars, weight: WEIGHT_CHARACTERS },
                BlockSpec { name: "radicals", width: radicals, weight: WEIGHT_RADICALS },
                BlockSpec { name: "endings", width: endings, weight: WEIGHT_ENDINGS },
                BlockSpec { name: "bigrams", width: bigrams, weight: WEIGHT_BIGRAMS },
                BlockSpec { name: "tell_score", width: groups, weight: WEIGHT_TELL_SCORE },
            ],
        }
    }

    pub fn blocks(&self) -> &[BlockSpec] {
        &self.blocks
    }

    /// Total width of the augmented vector.
    pub fn total_width(&self) -> usize {
        self.blocks.iter().map(|b| b.width).sum()
    }

    /// Check the schema against the feature count a trained model declares.
    pub fn validate_model_width(&self, n_features: usize) -> Result<(), Error> {
        if self.total_width() != n_features {
            return Err(Error::DimensionMismatch(format!(
                "schema width {} does not match model's expected {} features",
                self.total_width(),
                n_features
            )));
        }
        Ok(())
    }

    /// Weight each block and concatenate in declared order:
    /// base, characters, radicals, endings, bigrams, tell score.
    pub fn assemble(
        &self,
        base: Array2<f32>,
        extended: Option<ExtendedFeatures>,
    ) -> Result<Array2<f32>, Error> {
        let rows = base.nrows();

        let (characters, radicals, endings, bigrams, tell_scores) = match extended {
            Some(f) => (
                f.characters,
                f.radicals.unwrap_or_else(|| Array2::zeros((rows, 0))),
                f.endings.unwrap_or_else(|| Array2::zeros((rows, 0))),
                f.bigrams.unwrap_or_else(|| Array2::zeros((rows, 0))),
                f.tell_scores,
            ),
            None => (
                Array2::zeros((rows, 0)),
                Array2::zeros((rows, 0)),
                Array2::zeros((rows, 0)),
                Array2::zeros((rows, 0)),
                Array2::zeros((rows, 0)),
            ),
        };

        let blocks = [base, characters, radicals, endings, bigrams, tell_scores];

        for (block, spec) in blocks.iter().zip(&self.blocks) {
            if block.nrows() != rows {
                return Err(Error::DimensionMismatch(format!(
                    "block {} has {} rows, expected {}",
                    spec.name,
                    block.nrows(),
                    rows
                )));
            }
            if block.ncols() != spec.width {
                return Err(Error::DimensionMismatch(format!(
                    "block {} is {} columns wide, schema declares {}",
                    spec.name,
                    block.ncols(),
                    spec.width
                )));
            }
        }

        let weighted: Vec<Array2<f32>> = blocks
            .into_iter()
            .zip(&self.blocks)
            .map(|(block, spec)| {
                if spec.weight == 1.0 {
                    block
                } else {
                    block * spec.weight
                }
            })
            .collect();

        let views: Vec<_> = weighted.iter().map(|b| b.view()).collect();
        Ok(concatenate(Axis(1), &views)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract;
    use crate::lexicon::{LexiconStore, ScriptFamily};

    fn southern() -> std::sync::Arc<TellLexicon> {
        LexiconStore::new()
            .lexicon(ScriptFamily::SouthernSlavic)
            .unwrap()
    }

    #[test]
    fn test_block_order_and_total_width() {
        let lx = southern();
        let schema = FeatureSchema::new(10, Some(lx.as_ref()));
        let names: Vec<&str> = schema.blocks().iter().map(|b| b.name).collect();
        assert_eq!(
            names,
            ["base", "characters", "radicals", "endings", "bigrams", "tell_score"]
        );
        let expected = 10
            + lx.characters().len()
            + lx.endings().unwrap().len() * 2
            + lx.bigrams().unwrap().len() * 2
            + lx.scoring_groups().len();
        assert_eq!(schema.total_width(), expected);
    }

    #[test]
    fn test_assemble_applies_weights() {
        let lx = southern();
        // ќ is an mk tell, so the character block is non-zero
        let texts = ["ќерка"];
        let features = extract(&texts, &lx).unwrap();
        let raw_chars = features.characters.clone();
        assert!(raw_chars.iter().any(|&v| v == 1.0));

        let schema = FeatureSchema::new(2, Some(lx.as_ref()));
        let base = Array2::from_shape_vec((1, 2), vec![1.0, 3.0]).unwrap();
        let assembled = schema.assemble(base, Some(features)).unwrap();

        // base passes through unweighted
        assert_eq!(assembled[[0, 0]], 1.0);
        assert_eq!(assembled[[0, 1]], 3.0);
        // character block is scaled by 1.5
        for (col, &v) in raw_chars.row(0).iter().enumerate() {
            assert_eq!(assembled[[0, 2 + col]], v * WEIGHT_CHARACTERS);
        }
    }

    #[test]
    fn test_assemble_without_lexicon_is_base_only() {
        let schema = FeatureSchema::new(3, None);
        assert_eq!(schema.total_width(), 3);
        let base = Array2::from_shape_vec((2, 3), vec![0.0; 6]).unwrap();
        let assembled = schema.assemble(base, None).unwrap();
        assert_eq!(assembled.dim(), (2, 3));
    }

    #[test]
    fn test_absent_optional_blocks_are_zero_width() {
        // eastern slavic has neither endings nor bigrams
        let lx = LexiconStore::new()
            .lexicon(ScriptFamily::EasternSlavic)
            .unwrap();
        let features = extract(&["привет"], &lx).unwrap();
        let schema = FeatureSchema::new(1, Some(lx.as_ref()));
        let base = Array2::from_shape_vec((1, 1), vec![1.0]).unwrap();
        let assembled = schema.assemble(base, Some(features)).unwrap();
        assert_eq!(
            assembled.ncols(),
            1 + lx.characters().len() + lx.scoring_groups().len()
        );
    }

    #[test]
    fn test_row_mismatch_is_fatal() {
        let lx = southern();
        let features = extract(&["градот"], &lx).unwrap();
        let schema = FeatureSchema::new(2, Some(lx.as_ref()));
        let base = Array2::from_shape_vec((2, 2), vec![0.0; 4]).unwrap();
        match schema.assemble(base, Some(features)) {
            Err(Error::DimensionMismatch(_)) => {}
            other => panic!("expected DimensionMismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_validate_model_width() {
        let schema = FeatureSchema::new(5, None);
        assert!(schema.validate_model_width(5).is_ok());
        assert!(matches!(
            schema.validate_model_width(6),
            Err(Error::DimensionMismatch(_))
        ));
    }
}
