//! End-to-end cascade tests over a temporary model store.
//!
//! The artifacts written here are tiny rigged models: a couple of
//! vocabulary terms and hand-set coefficients per stage, just enough to
//! steer known sample inputs down each branch of the cascade.

use std::fs;
use std::path::Path;

use crate::cascade::Cascade;
use crate::lexicon::{LexiconStore, ScriptFamily};
use crate::Error;

fn write_vectorizer(root: &Path, key: &str, terms: &[&str]) {
    fs::create_dir_all(root.join("vectorizers")).unwrap();
    let vocabulary: serde_json::Map<String, serde_json::Value> = terms
        .iter()
        .enumerate()
        .map(|(i, t)| (t.to_string(), serde_json::json!(i)))
        .collect();
    let artifact = serde_json::json!({
        "analyzer": "char",
        "ngram_range": [1, 1],
        "vocabulary": vocabulary,
        "idf": vec![1.0f32; terms.len()],
        "sublinear_tf": false
    });
    fs::write(
        root.join("vectorizers").join(format!("ld_{}_vectorizer.json", key)),
        serde_json::to_vec(&artifact).unwrap(),
    )
    .unwrap();
}

fn write_model(root: &Path, key: &str, classes: &[&str], coef: Vec<Vec<f32>>) {
    fs::create_dir_all(root.join("models")).unwrap();
    let n_features = coef[0].len();
    let artifact = serde_json::json!({
        "classes": classes,
        "n_features": n_features,
        "estimators": [{
            "kind": "logistic",
            "coef": coef,
            "intercept": vec![0.0f32; classes.len()]
        }]
    });
    fs::write(
        root.join("models").join(format!("ld_{}_ensemble_model.json", key)),
        serde_json::to_vec(&artifact).unwrap(),
    )
    .unwrap();
}

/// Family stage: `о` votes cyrillic, `γ` votes el. Base features only.
fn write_family_stage(root: &Path) {
    write_vectorizer(root, "family", &["о", "γ"]);
    write_model(
        root,
        "family",
        &["cyrillic", "el"],
        vec![vec![5.0, 0.0], vec![0.0, 5.0]],
    );
}

/// Cyrillic stage: `ъ` votes eastern, `ј` votes southern. Base only.
fn write_cyrillic_stage(root: &Path) {
    write_vectorizer(root, "cyrillic", &["ъ", "ј"]);
    write_model(
        root,
        "cyrillic",
        &["eastern_cyrillic", "southern_cyrillic"],
        vec![vec![5.0, 0.0], vec![0.0, 5.0]],
    );
}

/// Eastern-cyrillic stage: decided by the tell-character presence columns,
/// with a single throwaway base term.
fn write_eastern_stage(root: &Path) {
    let lexicon = LexiconStore::new()
        .lexicon(ScriptFamily::EasternSlavic)
        .unwrap();
    let chars = lexicon.characters();
    let base_width = 1usize;
    let n_features = base_width + chars.len() + lexicon.scoring_groups().len();

    write_vectorizer(root, "eastern_cyrillic", &["з"]);

    let classes = ["be", "ru", "uk"];
    let mut coef = vec![vec![0.0f32; n_features]; classes.len()];
    for (class_idx, class) in classes.iter().enumerate() {
        for tell in lexicon.group_characters(class) {
            let col = base_width + chars.iter().position(|c| c == tell).unwrap();
            coef[class_idx][col] = 1.0;
        }
    }
    write_model(root, "eastern_cyrillic", &classes, coef);
}

#[test]
fn test_greek_is_terminal_at_family_stage() {
    let dir = tempfile::tempdir().unwrap();
    write_family_stage(dir.path());

    let cascade = Cascade::from_model_dir(dir.path());
    assert_eq!(cascade.detect("Γειά σου").unwrap(), "el");
}

#[test]
fn test_kana_short_circuits_without_any_artifacts() {
    // empty model dir: any stage run would fail, so a result proves the
    // statistical cascade never ran
    let dir = tempfile::tempdir().unwrap();
    let cascade = Cascade::from_model_dir(dir.path());
    assert_eq!(cascade.detect("こんにちは").unwrap(), "ja");
}

#[test]
fn test_russian_routes_through_cyrillic_branch() {
    let dir = tempfile::tempdir().unwrap();
    write_family_stage(dir.path());
    write_cyrillic_stage(dir.path());
    write_eastern_stage(dir.path());

    let cascade = Cascade::from_model_dir(dir.path());
    // family -> cyrillic -> eastern_cyrillic -> ru; the eastern stage has
    // no ending/bigram tables, so its augmented vector is the narrower one
    assert_eq!(cascade.detect("объём").unwrap(), "ru");
}

#[test]
fn test_empty_input_fails_before_stages() {
    let dir = tempfile::tempdir().unwrap();
    let cascade = Cascade::from_model_dir(dir.path());
    assert!(matches!(cascade.detect(""), Err(Error::InvalidInput)));
    assert!(matches!(cascade.detect(" \t "), Err(Error::InvalidInput)));
}

#[test]
fn test_missing_stage_artifact_aborts_detection() {
    let dir = tempfile::tempdir().unwrap();
    write_family_stage(dir.path());
    // family routes to cyrillic, whose artifacts are absent
    let cascade = Cascade::from_model_dir(dir.path());
    assert!(matches!(
        cascade.detect("объём"),
        Err(Error::ModelNotFound(_))
    ));
}

#[test]
fn test_detection_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    write_family_stage(dir.path());
    write_cyrillic_stage(dir.path());
    write_eastern_stage(dir.path());

    let cascade = Cascade::from_model_dir(dir.path());
    let first = cascade.detect("объём").unwrap();
    for _ in 0..3 {
        assert_eq!(cascade.detect("объём").unwrap(), first);
    }
}
