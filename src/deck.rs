//! 単語帳デッキ
//!
//! フォルダ一括解析の結果をJSONファイルとして保存し、
//! クイズ用の語彙リストへ変換する。

use crate::error::{PhotoLingoError, Result};
use photo_lingo_common::{AnalysisResult, ResultSource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// デッキの1エントリ（写真1枚ぶん）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckEntry {
    pub file_name: String,
    pub added_at: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub phonetics: HashMap<String, String>,
    #[serde(default)]
    pub source: ResultSource,
}

impl DeckEntry {
    pub fn from_result(file_name: impl Into<String>, result: AnalysisResult) -> Self {
        DeckEntry {
            file_name: file_name.into(),
            added_at: chrono::Local::now().format("%Y-%m-%d").to_string(),
            description: result.description,
            keywords: result.keywords,
            phonetics: result.phonetics,
            source: result.source,
        }
    }
}

/// クイズ用の語彙1件
#[derive(Debug, Clone, PartialEq)]
pub struct VocabEntry {
    pub word: String,
    pub phonetic: Option<String>,
    /// 出題時のヒントに使う英文
    pub description: String,
    pub file_name: String,
}

/// 単語帳デッキファイル
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    version: u32,
    pub entries: Vec<DeckEntry>,
}

impl Deck {
    const CURRENT_VERSION: u32 = 1;

    pub fn new(entries: Vec<DeckEntry>) -> Self {
        Deck {
            version: Self::CURRENT_VERSION,
            entries,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PhotoLingoError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let deck: Deck = serde_json::from_reader(reader)
            .map_err(|e| PhotoLingoError::InvalidDeck(format!("{}: {}", path.display(), e)))?;

        if deck.version != Self::CURRENT_VERSION {
            return Err(PhotoLingoError::InvalidDeck(format!(
                "バージョン不一致: {} (期待値: {})",
                deck.version,
                Self::CURRENT_VERSION
            )));
        }

        Ok(deck)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 全エントリの語彙をマージする
    ///
    /// 同じ単語（大文字小文字の違いを無視）は最初の出現だけを残す。
    /// 出現順は保たれる。
    pub fn vocabulary(&self) -> Vec<VocabEntry> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut vocab = Vec::new();

        for entry in &self.entries {
            for word in &entry.keywords {
                let key = word.to_lowercase();
                if key.is_empty() || !seen.insert(key) {
                    continue;
                }

                vocab.push(VocabEntry {
                    word: word.clone(),
                    phonetic: entry.phonetics.get(word).cloned(),
                    description: entry.description.clone(),
                    file_name: entry.file_name.clone(),
                });
            }
        }

        vocab
    }
}
