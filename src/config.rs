use crate::error::{PhotoLingoError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AI CLIプロバイダー名（claude / gemini / codex / mock）
    pub default_provider: String,
    /// 読み上げ言語（BCP 47）
    pub speech_lang: String,
    /// 読み上げに使う外部コマンドの上書き（未指定ならOS標準を探す）
    pub speech_command: Option<String>,
    /// 長辺がこれを超える画像は縮小してから送る
    pub max_image_size: u32,
    /// モデル未検出時のサンプル結果を返すまでの擬似待機（ミリ秒）
    pub mock_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PhotoLingoError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("photo-lingo").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            default_provider: "claude".into(),
            speech_lang: photo_lingo_common::DEFAULT_SPEECH_LANG.into(),
            speech_command: None,
            max_image_size: 1280,
            mock_delay_ms: 600,
        }
    }

    /// 読み上げコマンドの解決
    ///
    /// 環境変数を優先し、次に設定ファイルの値を使う。
    pub fn resolved_speech_command(&self) -> Option<String> {
        if let Ok(cmd) = std::env::var("PHOTO_LINGO_TTS") {
            if !cmd.is_empty() {
                return Some(cmd);
            }
        }

        self.speech_command.clone()
    }
}
