use clap::ValueEnum;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AiProvider {
    Claude,
    Codex,
    Gemini,
    /// AI CLIを呼ばず、常にサンプル結果を返す
    Mock,
}

impl AiProvider {
    /// 呼び出す外部コマンド名（Mockは外部コマンドなし）
    pub fn command_name(&self) -> Option<&'static str> {
        match self {
            AiProvider::Claude => Some("claude"),
            AiProvider::Codex => Some("codex"),
            AiProvider::Gemini => Some("gemini"),
            AiProvider::Mock => None,
        }
    }

    /// 設定ファイルの文字列から解決（不明な値はclaude）
    pub fn from_config_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "codex" => AiProvider::Codex,
            "gemini" => AiProvider::Gemini,
            "mock" => AiProvider::Mock,
            _ => AiProvider::Claude,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::Claude => "claude",
            AiProvider::Codex => "codex",
            AiProvider::Gemini => "gemini",
            AiProvider::Mock => "mock",
        }
    }
}
