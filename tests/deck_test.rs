//! 単語帳デッキテスト
//!
//! デッキJSONの保存・読み込みと語彙マージを検証

use photo_lingo_common::AnalysisResult;
use photo_lingo_rust::deck::{Deck, DeckEntry};
use photo_lingo_rust::error::PhotoLingoError;
use tempfile::tempdir;

fn sample_deck() -> Deck {
    let mut cat = AnalysisResult::mock();
    cat.description = "A cat on a sofa.".to_string();
    cat.keywords = vec!["cat".to_string(), "sofa".to_string()];
    cat.phonetics.clear();
    cat.phonetics.insert("cat".to_string(), "kat".to_string());

    Deck::new(vec![
        DeckEntry::from_result("cat.jpg", cat),
        DeckEntry::from_result("coffee.jpg", AnalysisResult::mock()),
    ])
}

/// 保存 → 読み込みで内容が保たれる
#[test]
fn test_deck_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("deck.json");

    let deck = sample_deck();
    deck.save(&path).expect("デッキ保存失敗");

    let loaded = Deck::load(&path).expect("デッキ読み込み失敗");
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.entries[0].file_name, "cat.jpg");
    assert_eq!(loaded.entries[0].description, "A cat on a sofa.");
    assert_eq!(
        loaded.entries[0].phonetics.get("cat").map(String::as_str),
        Some("kat")
    );
}

/// 読み込んだデッキからの語彙マージ（重複は最初の出現が勝つ）
#[test]
fn test_deck_vocabulary_after_roundtrip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("deck.json");

    sample_deck().save(&path).expect("デッキ保存失敗");
    let loaded = Deck::load(&path).expect("デッキ読み込み失敗");

    let vocab = loaded.vocabulary();
    let words: Vec<&str> = vocab.iter().map(|v| v.word.as_str()).collect();
    // cat.jpgのcat/sofaが先、coffee.jpgのモック語彙が続く
    assert_eq!(&words[..2], &["cat", "sofa"]);
    assert!(words.contains(&"coffee"));

    // 同じ単語は2度出ない
    let mut sorted = words.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), words.len());
}

/// 存在しないデッキファイル
#[test]
fn test_deck_load_missing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = Deck::load(&dir.path().join("missing.json"));
    assert!(matches!(result, Err(PhotoLingoError::FileNotFound(_))));
}

/// JSONとして壊れたデッキファイル
#[test]
fn test_deck_load_corrupt_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("deck.json");
    std::fs::write(&path, "{ broken").unwrap();

    let result = Deck::load(&path);
    assert!(matches!(result, Err(PhotoLingoError::InvalidDeck(_))));
}

/// バージョン不一致のデッキファイル
#[test]
fn test_deck_load_version_mismatch() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("deck.json");
    std::fs::write(&path, r#"{"version": 999, "entries": []}"#).unwrap();

    let result = Deck::load(&path);
    assert!(matches!(result, Err(PhotoLingoError::InvalidDeck(_))));
}
