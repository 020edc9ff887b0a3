//! エラー型定義
//!
//! 解析フローで発生するエラーを種別ごとに分類し、
//! UI表示用メッセージへの変換を提供する。

use thiserror::Error;

/// デバイスアクセス失敗の内訳
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorKind {
    /// ユーザーがアクセス許可を拒否した
    PermissionDenied,
    /// 利用可能なデバイスが見つからない
    NotFound,
    /// 実行環境がデバイスAPIに対応していない
    Unsupported,
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// AIモデル（言語モデルAPI）が利用できない
    #[error("AI model unavailable")]
    Unavailable,

    /// AI応答を結果に変換できなかった（構文・構造の両方）
    #[error("Interpretation error: {0}")]
    Interpretation(String),

    /// カメラ等のデバイスアクセス失敗
    #[error("Device access error: {message}")]
    Device {
        kind: DeviceErrorKind,
        message: String,
    },

    /// 上記に分類できない失敗
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// デバイスエラーのコンストラクタ
    pub fn device(kind: DeviceErrorKind, message: impl Into<String>) -> Self {
        Error::Device {
            kind,
            message: message.into(),
        }
    }

    /// UI表示用のメッセージ
    ///
    /// 解釈失敗とその他の失敗で文言を分け、ユーザーが
    /// 「応答が壊れていた」のか「処理自体が失敗した」のか判別できるようにする。
    pub fn user_message(&self) -> String {
        match self {
            Error::Unavailable => {
                "AIモデルが利用できないため、サンプル結果を表示しています".to_string()
            }
            Error::Interpretation(_) => {
                "AIの応答を理解できませんでした。もう一度お試しください".to_string()
            }
            Error::Device { message, .. } => message.clone(),
            Error::Unknown(message) => {
                if message.is_empty() {
                    "エラーが発生しました。もう一度お試しください".to_string()
                } else {
                    message.clone()
                }
            }
        }
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
