//! 解析結果キャッシュモジュール
//!
//! 画像のSHA-256ハッシュをキーにして解析結果をキャッシュし、
//! 同じ画像の再解析をスキップする。

use crate::error::Result;
use crate::scanner::ImageInfo;
use photo_lingo_common::AnalysisResult;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

const CACHE_FILE_NAME: &str = ".analysis-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// ファイルハッシュ → 解析結果のマップ
    entries: HashMap<String, CacheEntry>,
}

/// キャッシュエントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// ファイル名
    pub file_name: String,
    /// ファイルサイズ
    pub file_size: u64,
    /// 解析日時
    pub analyzed_at: String,
    /// 解析結果
    pub result: AnalysisResult,
}

impl CacheFile {
    const CURRENT_VERSION: u32 = 1;

    /// キャッシュファイルを読み込み
    pub fn load(folder: &Path) -> Self {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader(reader) {
            Ok(cache) => {
                let cache: CacheFile = cache;
                // バージョンチェック
                if cache.version != Self::CURRENT_VERSION {
                    eprintln!("キャッシュバージョン不一致、再生成します");
                    return Self::default();
                }
                cache
            }
            Err(_) => Self::default(),
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, folder: &Path) -> Result<()> {
        let cache_path = Self::cache_path(folder);
        let file = File::create(cache_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn cache_path(folder: &Path) -> std::path::PathBuf {
        folder.join(CACHE_FILE_NAME)
    }

    /// キャッシュをルックアップ
    pub fn get(&self, hash: &str) -> Option<&AnalysisResult> {
        self.entries.get(hash).map(|e| &e.result)
    }

    /// キャッシュに追加
    pub fn insert(&mut self, hash: String, file_name: String, file_size: u64, result: AnalysisResult) {
        self.entries.insert(
            hash,
            CacheEntry {
                file_name,
                file_size,
                analyzed_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                result,
            },
        );
    }

    /// キャッシュ件数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// キャッシュファイルを削除（存在したらtrue）
    pub fn clear(folder: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&cache_path)?;
        Ok(true)
    }
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// 画像ファイルのSHA-256ハッシュを計算
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let buffer = std::fs::read(path)?;
    let digest = Sha256::digest(&buffer);
    Ok(hex::encode(digest))
}

/// キャッシュを使用して解析結果を取得
///
/// - キャッシュにある画像は結果とペアで返す
/// - ない画像はハッシュとペアで返す（ハッシュ計算失敗時は空文字列）
///
/// ハッシュ計算はファイルごとに独立なので並列に行う。
pub fn filter_cached_images(
    images: &[ImageInfo],
    cache: &CacheFile,
) -> (Vec<(ImageInfo, AnalysisResult)>, Vec<(ImageInfo, String)>) {
    let hashed: Vec<(ImageInfo, String)> = images
        .par_iter()
        .map(|img| {
            let hash = compute_file_hash(&img.path).unwrap_or_default();
            (img.clone(), hash)
        })
        .collect();

    let mut cached_results = Vec::new();
    let mut uncached_images = Vec::new();

    for (img, hash) in hashed {
        if hash.is_empty() {
            // ハッシュ計算失敗時は未キャッシュとして扱う
            uncached_images.push((img, hash));
            continue;
        }

        if let Some(result) = cache.get(&hash) {
            cached_results.push((img, result.clone()));
        } else {
            uncached_images.push((img, hash));
        }
    }

    (cached_results, uncached_images)
}
