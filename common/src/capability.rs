//! プラットフォーム能力の抽象化
//!
//! 解析コアはブラウザ(WASM)とCLIの両方から使うため、
//! 環境依存の機能を小さなトレイトに切り出して注入する:
//! - TextCompletion: 言語モデル呼び出し
//! - SpeechAnnouncer: 読み上げ
//! - PreviewHandle: プレビューリソースの解放

use async_trait::async_trait;

use crate::error::Result;

/// 読み上げのデフォルト言語
pub const DEFAULT_SPEECH_LANG: &str = "en-US";

/// 言語モデル呼び出しの抽象化
///
/// プロンプト文字列を渡して応答文字列を受け取るだけの契約。
/// WASM側のFutureはSendにならないため `?Send` で宣言する。
#[async_trait(?Send)]
pub trait TextCompletion {
    /// モデルが現在利用可能か
    async fn is_available(&self) -> bool;

    /// プロンプトを送り、応答テキストを受け取る
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// モック結果を返す前の擬似待機
    ///
    /// モデル未検出時も即答せず、実際の解析と同じ体感になるよう
    /// 各プラットフォームが自前のタイマーで上書きする。
    async fn mock_latency(&self) {}
}

/// 読み上げの抽象化
///
/// speakは常に新しい発話を開始する。直前の発話の停止は
/// セッション側（announce）が先にcancelを呼ぶことで保証する。
pub trait SpeechAnnouncer {
    fn speak(&mut self, text: &str, lang: &str);

    /// 進行中の発話を停止する。発話が無いときは何もしない
    fn cancel(&mut self);
}

/// プレビューリソースのハンドル
///
/// オブジェクトURLのような明示的な解放が必要なリソースを包む。
/// releaseは何度呼んでも安全であること。
pub trait PreviewHandle {
    fn release(&mut self);
}

/// 読み上げしないアナウンサー
///
/// CLIで読み上げを指定しなかった場合などに使う。
#[derive(Debug, Default)]
pub struct NullAnnouncer;

impl SpeechAnnouncer for NullAnnouncer {
    fn speak(&mut self, _text: &str, _lang: &str) {}

    fn cancel(&mut self) {}
}

/// 解放処理を持たないプレビューハンドル
///
/// データURLやファイルパスのようにOS/ブラウザ側の解放が不要な場合に使う。
#[derive(Debug, Default)]
pub struct InertPreview;

impl PreviewHandle for InertPreview {
    fn release(&mut self) {}
}
