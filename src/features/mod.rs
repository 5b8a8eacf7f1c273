//! Tell-signal feature extraction.
//!
//! Turns a batch of case-folded text strings into five aligned numeric
//! blocks, using the tell lexicon of one script family:
//!
//! 1. character presence binaries (repetition does not increase them)
//! 2. radical counts (logographic families only)
//! 3. ending presence + count pairs
//! 4. bigram presence + count pairs
//! 5. per-group tell scores, a length-normalized, damped aggregate of all
//!    tell signals for each language group
//!
//! Rows are independent, so the per-row work runs in parallel.

mod schema;

pub use schema::{BlockSpec, FeatureSchema};

use std::collections::HashSet;

use ndarray::Array2;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::lexicon::TellLexicon;
use crate::Error;

static PUNCT_OR_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{P}\p{S}]+").unwrap());

/// Per-group raw signal totals for one row, aligned to the lexicon's
/// scoring groups. Feeds tell scoring only, never exposed as a block.
type GroupTotals = Vec<f32>;

/// The five feature blocks for a batch of texts.
///
/// Optional blocks are `None` when the lexicon does not define the
/// corresponding signal family; the assembler treats those as zero-width.
#[derive(Debug)]
pub struct ExtendedFeatures {
    pub characters: Array2<f32>,
    pub radicals: Option<Array2<f32>>,
    pub endings: Option<Array2<f32>>,
    pub bigrams: Option<Array2<f32>>,
    pub tell_scores: Array2<f32>,
}

/// Extract all five feature blocks for `texts`.
///
/// Texts are expected case-folded by the caller; each row is NFC-normalized
/// here before matching. An empty batch yields zero-row blocks.
pub fn extract(texts: &[&str], lexicon: &TellLexicon) -> Result<ExtendedFeatures, Error> {
    let normalized: Vec<String> = texts
        .par_iter()
        .map(|s| s.nfc().collect::<String>())
        .collect();

    let (characters, char_totals) = build_character_block(&normalized, lexicon)?;
    let radicals = build_radical_block(&normalized, lexicon)?;
    let (endings, ending_totals) = build_ending_block(&normalized, lexicon)?;
    let (bigrams, bigram_totals) = build_bigram_block(&normalized, lexicon)?;
    let tell_scores = build_tell_scores(
        &normalized,
        lexicon,
        &char_totals,
        ending_totals.as_deref(),
        bigram_totals.as_deref(),
    )?;

    Ok(ExtendedFeatures {
        characters,
        radicals,
        endings,
        bigrams,
        tell_scores,
    })
}

/// Presence binaries over the flat character list, plus raw per-group
/// occurrence totals. Presence is set membership: a character repeated five
/// times lights the same single column as one occurrence.
fn build_character_block(
    texts: &[String],
    lexicon: &TellLexicon,
) -> Result<(Array2<f32>, Vec<GroupTotals>), Error> {
    let characters = lexicon.characters();
    let groups = lexicon.scoring_groups();

    let rows: Vec<(Vec<f32>, GroupTotals)> = texts
        .par_iter()
        .map(|s| {
            let present: HashSet<char> = s.chars().collect();

            let mut row = vec![0.0f32; characters.len()];
            for (col, ch) in characters.iter().enumerate() {
                if present.contains(ch) {
                    row[col] = 1.0;
                }
            }

            let totals = groups
                .iter()
                .map(|group| {
                    lexicon
                        .group_characters(group)
                        .iter()
                        .map(|ch| s.chars().filter(|c| c == ch).count() as f32)
                        .sum()
                })
                .collect();

            (row, totals)
        })
        .collect();

    let (flat, totals) = split_rows(rows);
    let block = Array2::from_shape_vec((texts.len(), characters.len()), flat)?;
    Ok((block, totals))
}

/// Raw occurrence counts per radical, or `None` when the family has no
/// radicals group. Counts, not binaries.
fn build_radical_block(
    texts: &[String],
    lexicon: &TellLexicon,
) -> Result<Option<Array2<f32>>, Error> {
    let Some(radicals) = lexicon.radicals() else {
        return Ok(None);
    };

    let rows: Vec<Vec<f32>> = texts
        .par_iter()
        .map(|s| {
            radicals
                .iter()
                .map(|rad| s.chars().filter(|c| c == rad).count() as f32)
                .collect()
        })
        .collect();

    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    let block = Array2::from_shape_vec((texts.len(), radicals.len()), flat)?;
    Ok(Some(block))
}

/// Ending presence and word-count pairs. Width is `2 × endings`: presence
/// columns first, count columns at a fixed offset of half the width, both
/// in flat ending order.
fn build_ending_block(
    texts: &[String],
    lexicon: &TellLexicon,
) -> Result<(Option<Array2<f32>>, Option<Vec<GroupTotals>>), Error> {
    let Some(endings) = lexicon.endings() else {
        return Ok((None, None));
    };
    let groups = lexicon.scoring_groups();
    let width = endings.len();

    let rows: Vec<(Vec<f32>, GroupTotals)> = texts
        .par_iter()
        .map(|s| {
            let words = split_words(s);

            let mut row = vec![0.0f32; width * 2];
            for (col, ending) in endings.iter().enumerate() {
                let count = words.iter().filter(|w| w.ends_with(ending)).count();
                if count > 0 {
                    row[col] = 1.0;
                    row[col + width] = count as f32;
                }
            }

            let totals = groups
                .iter()
                .map(|group| {
                    lexicon
                        .group_endings(group)
                        .iter()
                        .map(|e| words.iter().filter(|w| w.ends_with(e)).count() as f32)
                        .sum()
                })
                .collect();

            (row, totals)
        })
        .collect();

    let (flat, totals) = split_rows(rows);
    let block = Array2::from_shape_vec((texts.len(), width * 2), flat)?;
    Ok((Some(block), Some(totals)))
}

/// Bigram presence and count pairs, same doubled layout as endings, but
/// counts are substring occurrences across the whole text rather than
/// word-boundary restricted.
fn build_bigram_block(
    texts: &[String],
    lexicon: &TellLexicon,
) -> Result<(Option<Array2<f32>>, Option<Vec<GroupTotals>>), Error> {
    let Some(bigrams) = lexicon.bigrams() else {
        return Ok((None, None));
    };
    let groups = lexicon.scoring_groups();
    let width = bigrams.len();

    let rows: Vec<(Vec<f32>, GroupTotals)> = texts
        .par_iter()
        .map(|s| {
            let mut row = vec![0.0f32; width * 2];
            for (col, bigram) in bigrams.iter().enumerate() {
                let count = s.matches(bigram.as_str()).count();
                if count > 0 {
                    row[col] = 1.0;
                    row[col + width] = count as f32;
                }
            }

            let totals = groups
                .iter()
                .map(|group| {
                    lexicon
                        .group_bigrams(group)
                        .iter()
                        .map(|b| s.matches(b.as_str()).count() as f32)
                        .sum()
                })
                .collect();

            (row, totals)
        })
        .collect();

    let (flat, totals) = split_rows(rows);
    let block = Array2::from_shape_vec((texts.len(), width * 2), flat)?;
    Ok((Some(block), Some(totals)))
}

/// One column per scoring group: `sqrt(clamp(total / max(1, chars), 0, 4))`.
///
/// Division by text length normalizes for word length, the clamp bounds
/// outliers from very short signal-dense strings, and the square root damps
/// the piling-up seen with Cyrillic tells.
fn build_tell_scores(
    texts: &[String],
    lexicon: &TellLexicon,
    char_totals: &[GroupTotals],
    ending_totals: Option<&[GroupTotals]>,
    bigram_totals: Option<&[GroupTotals]>,
) -> Result<Array2<f32>, Error> {
    let groups = lexicon.scoring_groups();

    check_row_count(texts.len(), char_totals.len(), "character totals")?;
    if let Some(totals) = ending_totals {
        check_row_count(texts.len(), totals.len(), "ending totals")?;
    }
    if let Some(totals) = bigram_totals {
        check_row_count(texts.len(), totals.len(), "bigram totals")?;
    }

    let mut flat = Vec::with_capacity(texts.len() * groups.len());
    for (row, s) in texts.iter().enumerate() {
        let len = s.chars().count().max(1) as f32;
        for g in 0..groups.len() {
            let mut total = char_totals[row][g];
            if let Some(totals) = ending_totals {
                total += totals[row][g];
            }
            if let Some(totals) = bigram_totals {
                total += totals[row][g];
            }
            flat.push((total / len).clamp(0.0, 4.0).sqrt());
        }
    }

    Ok(Array2::from_shape_vec((texts.len(), groups.len()), flat)?)
}

fn check_row_count(texts: usize, rows: usize, what: &str) -> Result<(), Error> {
    if texts != rows {
        return Err(Error::DimensionMismatch(format!(
            "row count mismatch between texts ({}) and {} ({})",
            texts, what, rows
        )));
    }
    Ok(())
}

/// Strip punctuation/symbol runs to whitespace and split into words.
fn split_words(s: &str) -> Vec<String> {
    PUNCT_OR_SYMBOL
        .replace_all(s, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn split_rows(rows: Vec<(Vec<f32>, GroupTotals)>) -> (Vec<f32>, Vec<GroupTotals>) {
    let mut flat = Vec::new();
    let mut totals = Vec::with_capacity(rows.len());
    for (row, row_totals) in rows {
        flat.extend(row);
        totals.push(row_totals);
    }
    (flat, totals)
}
