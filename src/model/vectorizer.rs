//! Fitted char n-gram TF-IDF transform.
//!
//! Inference-side counterpart of the vectorizer fitted offline: a fixed
//! vocabulary of character n-grams with per-term IDF weights. Transforming
//! a text counts its in-vocabulary n-grams, optionally damps the counts
//! sublinearly, multiplies by IDF and L2-normalizes the row. Out-of-
//! vocabulary n-grams are ignored.

use std::collections::HashMap;

use ndarray::Array2;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;

use crate::Error;

static ASCII_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]+").unwrap());

/// How n-grams are drawn from the preprocessed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analyzer {
    /// Sliding windows across the whole string.
    Char,
    /// Sliding windows within each space-padded word.
    CharWb,
}

/// A fitted vectorizer, loaded from a per-stage artifact.
#[derive(Debug, Deserialize)]
pub struct Vectorizer {
    analyzer: Analyzer,
    ngram_range: (usize, usize),
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    #[serde(default = "default_sublinear_tf")]
    sublinear_tf: bool,
}

fn default_sublinear_tf() -> bool {
    true
}

impl Vectorizer {
    /// Sanity-check a freshly deserialized artifact.
    pub fn validate(&self) -> Result<(), Error> {
        let (lo, hi) = self.ngram_range;
        if lo == 0 || lo > hi {
            return Err(Error::Configuration(format!(
                "invalid ngram range ({}, {})",
                lo, hi
            )));
        }
        if self.idf.len() != self.vocabulary.len() {
            return Err(Error::Configuration(format!(
                "vectorizer has {} vocabulary entries but {} idf weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        for (term, &col) in &self.vocabulary {
            if col >= self.idf.len() {
                return Err(Error::Configuration(format!(
                    "vocabulary term {:?} maps to column {} beyond width {}",
                    term,
                    col,
                    self.idf.len()
                )));
            }
        }
        Ok(())
    }

    /// Width of the base feature block.
    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    /// Transform texts into the base lexical feature block.
    pub fn transform(&self, texts: &[&str]) -> Result<Array2<f32>, Error> {
        let width = self.width();
        let mut out = Array2::zeros((texts.len(), width));

        for (row, text) in texts.iter().enumerate() {
            let prepared = preprocess(text);

            let mut counts: HashMap<usize, f32> = HashMap::new();
            self.for_each_ngram(&prepared, |ngram| {
                if let Some(&col) = self.vocabulary.get(ngram) {
                    *counts.entry(col).or_insert(0.0) += 1.0;
                }
            });

            let mut norm = 0.0f32;
            for (&col, &tf) in &counts {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                let v = tf * self.idf[col];
                out[[row, col]] = v;
                norm += v * v;
            }

            if norm > 0.0 {
                let norm = norm.sqrt();
                for &col in counts.keys() {
                    out[[row, col]] /= norm;
                }
            }
        }

        Ok(out)
    }

    fn for_each_ngram(&self, prepared: &str, mut f: impl FnMut(&str)) {
        let (lo, hi) = self.ngram_range;
        match self.analyzer {
            Analyzer::Char => {
                let chars: Vec<char> = prepared.chars().collect();
                emit_windows(&chars, lo, hi, &mut f);
            }
            Analyzer::CharWb => {
                for word in prepared.split_whitespace() {
                    let padded: Vec<char> = std::iter::once(' ')
                        .chain(word.chars())
                        .chain(std::iter::once(' '))
                        .collect();
                    emit_windows(&padded, lo, hi, &mut f);
                }
            }
        }
    }
}

fn emit_windows(chars: &[char], lo: usize, hi: usize, f: &mut impl FnMut(&str)) {
    let mut buf = String::new();
    for n in lo..=hi {
        if n > chars.len() {
            break;
        }
        for window in chars.windows(n) {
            buf.clear();
            buf.extend(window.iter());
            f(&buf);
        }
    }
}

/// NFC-normalize, lowercase, and strip ASCII alphanumerics, matching the
/// preprocessing the vectorizer was fitted with.
fn preprocess(text: &str) -> String {
    let normalized: String = text.nfc().collect::<String>().to_lowercase();
    ASCII_ALNUM.replace_all(&normalized, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer(
        analyzer: Analyzer,
        range: (usize, usize),
        terms: &[(&str, usize)],
        idf: &[f32],
        sublinear: bool,
    ) -> Vectorizer {
        Vectorizer {
            analyzer,
            ngram_range: range,
            vocabulary: terms.iter().map(|(t, i)| (t.to_string(), *i)).collect(),
            idf: idf.to_vec(),
            sublinear_tf: sublinear,
        }
    }

    #[test]
    fn test_char_ngram_counting_and_l2_norm() {
        // two terms hit once each: after idf=1 and l2, both 1/sqrt(2)
        let v = vectorizer(
            Analyzer::Char,
            (2, 2),
            &[("αβ", 0), ("βγ", 1)],
            &[1.0, 1.0],
            false,
        );
        let x = v.transform(&["αβγ"]).unwrap();
        let expected = 1.0 / 2.0f32.sqrt();
        assert!((x[[0, 0]] - expected).abs() < 1e-6);
        assert!((x[[0, 1]] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_vocabulary_ngrams_ignored() {
        let v = vectorizer(Analyzer::Char, (2, 2), &[("αβ", 0)], &[1.0], false);
        let x = v.transform(&["δεζ"]).unwrap();
        assert!(x.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_ascii_alphanumerics_stripped() {
        let v = vectorizer(Analyzer::Char, (2, 2), &[("αβ", 0)], &[1.0], false);
        // latin letters and digits vanish before n-gram extraction
        let x = v.transform(&["αabc123β"]).unwrap();
        assert!(x[[0, 0]] > 0.0);
    }

    #[test]
    fn test_char_wb_pads_words() {
        let v = vectorizer(Analyzer::CharWb, (3, 3), &[(" αβ", 0), ("αβ ", 1)], &[1.0, 1.0], false);
        let x = v.transform(&["αβ αβ"]).unwrap();
        // each word contributes its padded edge trigrams
        assert!(x[[0, 0]] > 0.0);
        assert!(x[[0, 1]] > 0.0);
    }

    #[test]
    fn test_sublinear_tf_damps_counts() {
        let plain = vectorizer(Analyzer::Char, (1, 1), &[("α", 0), ("β", 1)], &[1.0, 1.0], false);
        let damped = vectorizer(Analyzer::Char, (1, 1), &[("α", 0), ("β", 1)], &[1.0, 1.0], true);
        // α appears 4x, β once; damping narrows the gap between columns
        let text = "ααααβ";
        let p = plain.transform(&[text]).unwrap();
        let d = damped.transform(&[text]).unwrap();
        assert!(d[[0, 0]] / d[[0, 1]] < p[[0, 0]] / p[[0, 1]]);
    }

    #[test]
    fn test_idf_weighting() {
        let v = vectorizer(Analyzer::Char, (1, 1), &[("α", 0), ("β", 1)], &[3.0, 1.0], false);
        let x = v.transform(&["αβ"]).unwrap();
        assert!(x[[0, 0]] > x[[0, 1]]);
    }

    #[test]
    fn test_row_l2_norm_is_unit() {
        let v = vectorizer(
            Analyzer::Char,
            (1, 2),
            &[("α", 0), ("β", 1), ("αβ", 2)],
            &[1.3, 0.7, 2.1],
            true,
        );
        let x = v.transform(&["αββα"]).unwrap();
        let norm: f32 = x.row(0).iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_validate_rejects_width_mismatch() {
        let v = vectorizer(Analyzer::Char, (1, 1), &[("α", 0), ("β", 1)], &[1.0], false);
        assert!(matches!(v.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_artifact_deserialization() {
        let json = r#"{
            "analyzer": "char_wb",
            "ngram_range": [1, 5],
            "vocabulary": {"αβ": 0},
            "idf": [1.5],
            "sublinear_tf": true
        }"#;
        let v: Vectorizer = serde_json::from_str(json).unwrap();
        v.validate().unwrap();
        assert_eq!(v.analyzer, Analyzer::CharWb);
        assert_eq!(v.width(), 1);
    }
}
