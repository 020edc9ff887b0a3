//! 解析結果の型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - AnalysisResult: 写真1枚ぶんの学習素材（英文説明＋単語＋発音）
//! - ProcessingStatus: 解析フローの状態
//! - CaptureInput: 取り込んだ画像データとプレビューリソース

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::PreviewHandle;

/// 結果の出どころ
///
/// モデル未検出時はサンプル結果を返すため、UI側で
/// 「本物の解析か、サンプルか」を区別できるようにしておく。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    #[default]
    Model,
    Mock,
}

/// AI解析結果
///
/// keywordsは小文字の英単語3〜5個を想定するが、個数は強制しない。
/// phoneticsのキーはkeywordsと一致する想定だが、欠けや余剰があっても
/// そのまま保持する（表示側が単語ごとに引き当てる）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub description: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    /// 単語 → 発音表記（例: "coffee" → "KAW-fee"）
    #[serde(default)]
    pub phonetics: HashMap<String, String>,

    #[serde(default)]
    pub source: ResultSource,
}

impl AnalysisResult {
    /// モデル未検出時に返すサンプル結果
    pub fn mock() -> Self {
        let mut phonetics = HashMap::new();
        phonetics.insert("coffee".to_string(), "KAW-fee".to_string());
        phonetics.insert("cup".to_string(), "KUHP".to_string());
        phonetics.insert("table".to_string(), "TAY-buhl".to_string());
        phonetics.insert("wood".to_string(), "WUD".to_string());

        AnalysisResult {
            description: "A cup of coffee sitting on a wooden table.".to_string(),
            keywords: vec![
                "coffee".to_string(),
                "cup".to_string(),
                "table".to_string(),
                "wood".to_string(),
            ],
            phonetics,
            source: ResultSource::Mock,
        }
    }

    /// 単語に対応する発音表記（なければNone）
    pub fn phonetic_for(&self, keyword: &str) -> Option<&str> {
        self.phonetics.get(keyword).map(String::as_str)
    }

    pub fn is_mock(&self) -> bool {
        self.source == ResultSource::Mock
    }
}

/// 解析フローの状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    #[default]
    Idle,
    Processing,
    Success,
    Error,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Idle => "idle",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Success => "success",
            ProcessingStatus::Error => "error",
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, ProcessingStatus::Processing)
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 取り込んだ画像1枚ぶんの入力データ
///
/// 解析開始時にセッションへ渡す使い切りの値。プレビューリソースは
/// セッションが引き取り、差し替え・リセット時に解放する。
pub struct CaptureInput {
    /// base64エンコード済みの画像本体（データURLのヘッダ部は含まない）
    pub image_base64: String,
    /// 例: "image/jpeg"
    pub mime_type: String,
    /// プレビュー用リソースのハンドル
    pub preview: Box<dyn PreviewHandle>,
    /// 表示用ラベル（ファイル名など）
    pub label: String,
}

impl CaptureInput {
    pub fn new(
        image_base64: impl Into<String>,
        mime_type: impl Into<String>,
        preview: Box<dyn PreviewHandle>,
        label: impl Into<String>,
    ) -> Self {
        CaptureInput {
            image_base64: image_base64.into(),
            mime_type: mime_type.into(),
            preview,
            label: label.into(),
        }
    }
}

impl fmt::Debug for CaptureInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureInput")
            .field("image_base64_len", &self.image_base64.len())
            .field("mime_type", &self.mime_type)
            .field("label", &self.label)
            .finish()
    }
}
