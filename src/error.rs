use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotoLingoError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("解析に失敗しました: {0}")]
    AnalysisFailed(String),

    #[error("デッキファイルが不正: {0}")]
    InvalidDeck(String),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PhotoLingoError>;
