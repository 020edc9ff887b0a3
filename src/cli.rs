use crate::ai_provider::AiProvider;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-lingo")]
#[command(about = "写真から英単語を学ぶAI画像解析ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// AIプロバイダ (claude/codex/gemini/mock、省略時はconfigの値)
    #[arg(long, global = true)]
    pub provider: Option<AiProvider>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真1枚を解析して説明文と単語を表示
    Analyze {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 結果をJSONで保存するパス
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 説明文を読み上げる
        #[arg(short, long)]
        speak: bool,

        /// 読み上げ言語（省略時はconfigの値）
        #[arg(long)]
        lang: Option<String>,
    },

    /// フォルダ内の写真を一括解析して単語帳デッキを作る
    Deck {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力JSONファイル（デフォルト: 入力フォルダ/deck.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// キャッシュを使用（再解析をスキップ）
        #[arg(long)]
        use_cache: bool,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// デッキから単語クイズを出題
    Quiz {
        /// デッキJSONファイル
        #[arg(required = true)]
        deck: PathBuf,

        /// 出題数（省略時は全問）
        #[arg(short, long)]
        count: Option<usize>,
    },

    /// テキストを読み上げる
    Speak {
        /// 読み上げるテキスト
        #[arg(required = true)]
        text: String,

        /// 読み上げ言語（省略時はconfigの値）
        #[arg(long)]
        lang: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// デフォルトのAIプロバイダを設定
        #[arg(long)]
        set_provider: Option<AiProvider>,

        /// 読み上げ言語を設定
        #[arg(long)]
        set_lang: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}
