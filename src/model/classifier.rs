//! Classification capability.
//!
//! The cascade only ever sees the [`Classify`] trait: a label set plus a
//! probability row per input vector. The concrete implementation is a
//! soft-voting ensemble of inference-only estimators deserialized from a
//! trained-model artifact; the learning algorithms themselves live in the
//! offline training pipeline.

use ndarray::{Array1, ArrayView1};
use serde::Deserialize;

use crate::Error;

/// A trained classifier: class labels and per-class probabilities.
pub trait Classify: Send + Sync {
    /// Class labels, in probability-column order.
    fn classes(&self) -> &[String];

    /// Probability per class for one feature vector.
    fn predict_proba(&self, x: ArrayView1<f32>) -> Result<Array1<f32>, Error>;

    /// The most probable class label.
    fn predict(&self, x: ArrayView1<f32>) -> Result<String, Error> {
        let probs = self.predict_proba(x)?;
        let (best, _) = probs
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| Error::Classification("classifier has no classes".to_string()))?;
        Ok(self.classes()[best].clone())
    }
}

/// One member of the ensemble.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    /// Naive-Bayes-style: softmax over class prior + feature log probabilities.
    NaiveBayes {
        class_log_prior: Vec<f32>,
        feature_log_prob: Vec<Vec<f32>>,
    },
    /// One-vs-rest linear model: per-class sigmoid scores, normalized.
    Logistic {
        coef: Vec<Vec<f32>>,
        intercept: Vec<f32>,
    },
}

impl Estimator {
    fn validate(&self, n_classes: usize, n_features: usize) -> Result<(), Error> {
        let (name, rows, cols, biases) = match self {
            Estimator::NaiveBayes {
                class_log_prior,
                feature_log_prob,
            } => (
                "naive_bayes",
                feature_log_prob.len(),
                feature_log_prob.iter().map(Vec::len).collect::<Vec<_>>(),
                class_log_prior.len(),
            ),
            Estimator::Logistic { coef, intercept } => (
                "logistic",
                coef.len(),
                coef.iter().map(Vec::len).collect::<Vec<_>>(),
                intercept.len(),
            ),
        };

        if rows != n_classes || biases != n_classes {
            return Err(Error::Configuration(format!(
                "{} estimator has {} coefficient rows and {} biases for {} classes",
                name, rows, biases, n_classes
            )));
        }
        if let Some(bad) = cols.iter().find(|&&c| c != n_features) {
            return Err(Error::DimensionMismatch(format!(
                "{} estimator row is {} features wide, model declares {}",
                name, bad, n_features
            )));
        }
        Ok(())
    }

    fn predict_proba(&self, x: ArrayView1<f32>) -> Array1<f32> {
        match self {
            Estimator::NaiveBayes {
                class_log_prior,
                feature_log_prob,
            } => {
                let jll: Vec<f32> = feature_log_prob
                    .iter()
                    .zip(class_log_prior)
                    .map(|(row, prior)| prior + dot(x, row))
                    .collect();
                Array1::from_vec(softmax(&jll))
            }
            Estimator::Logistic { coef, intercept } => {
                let scores: Vec<f32> = coef
                    .iter()
                    .zip(intercept)
                    .map(|(row, b)| sigmoid(b + dot(x, row)))
                    .collect();
                let sum: f32 = scores.iter().sum();
                if sum > 0.0 {
                    Array1::from_vec(scores.iter().map(|s| s / sum).collect())
                } else {
                    Array1::from_elem(scores.len(), 1.0 / scores.len() as f32)
                }
            }
        }
    }
}

/// Soft-voting ensemble: the mean of the estimators' probability rows.
#[derive(Debug, Deserialize)]
pub struct VotingEnsemble {
    classes: Vec<String>,
    n_features: usize,
    estimators: Vec<Estimator>,
}

impl VotingEnsemble {
    /// Sanity-check a freshly deserialized artifact.
    pub fn validate(&self) -> Result<(), Error> {
        if self.classes.is_empty() {
            return Err(Error::Configuration(
                "model declares no classes".to_string(),
            ));
        }
        if self.estimators.is_empty() {
            return Err(Error::Configuration(
                "model declares no estimators".to_string(),
            ));
        }
        for estimator in &self.estimators {
            estimator.validate(self.classes.len(), self.n_features)?;
        }
        Ok(())
    }

    /// Feature width the trained model expects.
    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

impl Classify for VotingEnsemble {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, x: ArrayView1<f32>) -> Result<Array1<f32>, Error> {
        if x.len() != self.n_features {
            return Err(Error::DimensionMismatch(format!(
                "input vector has {} features, model expects {}",
                x.len(),
                self.n_features
            )));
        }

        let mut mean = Array1::<f32>::zeros(self.classes.len());
        for estimator in &self.estimators {
            mean += &estimator.predict_proba(x);
        }
        mean /= self.estimators.len() as f32;
        Ok(mean)
    }
}

fn dot(x: ArrayView1<f32>, row: &[f32]) -> f32 {
    x.iter().zip(row).map(|(a, b)| a * b).sum()
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp_sum: f32 = logits.iter().map(|x| (x - max).exp()).sum();
    logits.iter().map(|x| (x - max).exp() / exp_sum).collect()
}
