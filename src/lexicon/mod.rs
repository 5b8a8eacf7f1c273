//! Per-family tell lexicons.
//!
//! A [`TellLexicon`] holds the curated tell signals for one script family
//! together with derived flat signal lists. The flat lists are the union of
//! all per-language groups, sorted and deduplicated, which pins a stable
//! signal-to-column ordering across runs without persisting a separate
//! index table.
//!
//! Lexicons are derived once from the static tables in [`tables`] and
//! shared via [`LexiconStore`]; they are never mutated after creation.

mod tables;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Group keys excluded from tell scoring.
pub const PSEUDO_GROUPS: [&str; 2] = ["overlapping", "radicals"];

/// A script family with a registered tell lexicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptFamily {
    PersoArabic,
    JaZh,
    EasternSlavic,
    SouthernSlavic,
    Turkic,
    Indic,
}

impl ScriptFamily {
    pub const ALL: [ScriptFamily; 6] = [
        ScriptFamily::PersoArabic,
        ScriptFamily::JaZh,
        ScriptFamily::EasternSlavic,
        ScriptFamily::SouthernSlavic,
        ScriptFamily::Turkic,
        ScriptFamily::Indic,
    ];

    /// Get the string representation, as used in artifact file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptFamily::PersoArabic => "perso_arabic",
            ScriptFamily::JaZh => "ja_zh",
            ScriptFamily::EasternSlavic => "eastern_slavic",
            ScriptFamily::SouthernSlavic => "southern_slavic",
            ScriptFamily::Turkic => "turkic",
            ScriptFamily::Indic => "indic",
        }
    }
}

impl fmt::Display for ScriptFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serialized form of a lexicon: just the group maps. Flat lists and
/// column orderings are re-derived on load, so the cache can never go
/// stale relative to the derivation rule.
#[derive(Debug, Serialize, Deserialize)]
struct TellListsArtifact {
    characters: BTreeMap<String, Vec<char>>,
    endings: Option<BTreeMap<String, Vec<String>>>,
    bigrams: Option<BTreeMap<String, Vec<String>>>,
}

/// The tell signals of one script family, with derived column orderings.
#[derive(Debug)]
pub struct TellLexicon {
    family: ScriptFamily,
    char_groups: BTreeMap<String, Vec<char>>,
    ending_groups: Option<BTreeMap<String, Vec<String>>>,
    bigram_groups: Option<BTreeMap<String, Vec<String>>>,
    /// Flat sorted+deduplicated signal lists; index = feature column.
    characters: Vec<char>,
    radicals: Option<Vec<char>>,
    endings: Vec<String>,
    bigrams: Vec<String>,
    /// Non-pseudo character group keys, sorted. One tell-score column each.
    scoring_groups: Vec<String>,
}

impl TellLexicon {
    fn from_maps(
        family: ScriptFamily,
        char_groups: BTreeMap<String, Vec<char>>,
        ending_groups: Option<BTreeMap<String, Vec<String>>>,
        bigram_groups: Option<BTreeMap<String, Vec<String>>>,
    ) -> Result<Self, Error> {
        if char_groups.is_empty() {
            return Err(Error::Configuration(format!(
                "no tell-character groups registered for family {}",
                family
            )));
        }

        let characters: Vec<char> = char_groups
            .values()
            .flatten()
            .copied()
            .collect::<BTreeSet<char>>()
            .into_iter()
            .collect();

        let radicals = char_groups.get("radicals").map(|chars| {
            let mut r = chars.clone();
            r.sort_unstable();
            r.dedup();
            r
        });

        let endings = flatten_groups(ending_groups.as_ref());
        let bigrams = flatten_groups(bigram_groups.as_ref());

        let scoring_groups: Vec<String> = char_groups
            .keys()
            .filter(|g| !PSEUDO_GROUPS.contains(&g.as_str()))
            .cloned()
            .collect();

        Ok(Self {
            family,
            char_groups,
            ending_groups,
            bigram_groups,
            characters,
            radicals,
            endings,
            bigrams,
            scoring_groups,
        })
    }

    /// Derive the lexicon for a family from the static tables.
    pub fn derive(family: ScriptFamily) -> Result<Self, Error> {
        let table = tables::family_table(family);

        let char_groups: BTreeMap<String, Vec<char>> = table
            .characters
            .iter()
            .map(|(group, chars)| {
                let mut cs: Vec<char> = chars.chars().collect();
                cs.sort_unstable();
                cs.dedup();
                (group.to_string(), cs)
            })
            .collect();

        Self::from_maps(
            family,
            char_groups,
            group_map(table.endings),
            group_map(table.bigrams),
        )
    }

    pub fn family(&self) -> ScriptFamily {
        self.family
    }

    /// Flat character list; index = column in the presence block.
    pub fn characters(&self) -> &[char] {
        &self.characters
    }

    /// Flat radical list, if this family defines one.
    pub fn radicals(&self) -> Option<&[char]> {
        self.radicals.as_deref()
    }

    /// Flat ending list; `None` when the family has no ending groups.
    pub fn endings(&self) -> Option<&[String]> {
        self.ending_groups.as_ref().map(|_| self.endings.as_slice())
    }

    /// Flat bigram list; `None` when the family has no bigram groups.
    pub fn bigrams(&self) -> Option<&[String]> {
        self.bigram_groups.as_ref().map(|_| self.bigrams.as_slice())
    }

    /// Sorted non-pseudo group keys; one tell-score column each.
    pub fn scoring_groups(&self) -> &[String] {
        &self.scoring_groups
    }

    pub fn group_characters(&self, group: &str) -> &[char] {
        self.char_groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn group_endings(&self, group: &str) -> &[String] {
        self.ending_groups
            .as_ref()
            .and_then(|m| m.get(group))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn group_bigrams(&self, group: &str) -> &[String] {
        self.bigram_groups
            .as_ref()
            .and_then(|m| m.get(group))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn to_artifact(&self) -> TellListsArtifact {
        TellListsArtifact {
            characters: self.char_groups.clone(),
            endings: self.ending_groups.clone(),
            bigrams: self.bigram_groups.clone(),
        }
    }
}

fn flatten_groups(groups: Option<&BTreeMap<String, Vec<String>>>) -> Vec<String> {
    match groups {
        Some(map) => map
            .values()
            .flatten()
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect(),
        None => Vec::new(),
    }
}

fn group_map(
    table: &[(&'static str, &'static [&'static str])],
) -> Option<BTreeMap<String, Vec<String>>> {
    if table.is_empty() {
        return None;
    }
    Some(
        table
            .iter()
            .map(|(group, items)| {
                let mut v: Vec<String> = items.iter().map(|s| s.to_string()).collect();
                v.sort_unstable();
                (group.to_string(), v)
            })
            .collect(),
    )
}

/// Hands out per-family lexicons, memoized for the process lifetime.
///
/// With a cache directory configured, lexicons are additionally persisted
/// as `ld_<family>_tell_lists.json` and re-read on later runs; derivation
/// is deterministic, so the disk cache is purely a warm start.
pub struct LexiconStore {
    cache_dir: Option<PathBuf>,
    memo: Mutex<HashMap<ScriptFamily, Arc<TellLexicon>>>,
}

impl LexiconStore {
    /// Create a store without a disk cache.
    pub fn new() -> Self {
        Self {
            cache_dir: None,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Create a store that persists derived lexicons under `dir`.
    pub fn with_cache_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: Some(dir.into()),
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Get the lexicon for a family, deriving and caching it on first use.
    pub fn lexicon(&self, family: ScriptFamily) -> Result<Arc<TellLexicon>, Error> {
        if let Some(lexicon) = self.memo().get(&family) {
            return Ok(Arc::clone(lexicon));
        }

        let lexicon = Arc::new(self.load_or_derive(family)?);
        self.memo().insert(family, Arc::clone(&lexicon));
        Ok(lexicon)
    }

    fn memo(&self) -> std::sync::MutexGuard<'_, HashMap<ScriptFamily, Arc<TellLexicon>>> {
        // a poisoned memo only means a panic elsewhere; the map itself is
        // still a valid cache of immutable lexicons
        self.memo.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load_or_derive(&self, family: ScriptFamily) -> Result<TellLexicon, Error> {
        let path = self
            .cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("ld_{}_tell_lists.json", family)));

        if let Some(path) = &path {
            match fs::read(path) {
                Ok(bytes) => {
                    let artifact: TellListsArtifact =
                        serde_json::from_slice(&bytes).map_err(|e| {
                            Error::Configuration(format!(
                                "malformed tell-lists artifact {}: {}",
                                path.display(),
                                e
                            ))
                        })?;
                    return TellLexicon::from_maps(
                        family,
                        artifact.characters,
                        artifact.endings,
                        artifact.bigrams,
                    );
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        let lexicon = TellLexicon::derive(family)?;

        // Cache write is best-effort; a read-only assets dir is not an error.
        if let Some(path) = &path {
            if let Ok(bytes) = serde_json::to_vec(&lexicon.to_artifact()) {
                if let Some(parent) = path.parent() {
                    let _ = fs::create_dir_all(parent);
                }
                let _ = fs::write(path, bytes);
            }
        }

        Ok(lexicon)
    }
}

impl Default for LexiconStore {
    fn default() -> Self {
        Self::new()
    }
}
