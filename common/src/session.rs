//! 解析セッション（状態機械）
//!
//! 1枚の写真を解析するフローの状態を1つのオブジェクトで管理する:
//! idle → processing → success / error
//!
//! 処理中に新しい写真が投入された場合は世代番号で古い完了を破棄し、
//! 最後に投入した写真の結果だけを採用する。

use crate::capability::{PreviewHandle, SpeechAnnouncer, TextCompletion};
use crate::error::{Error, Result};
use crate::interpreter::Interpreter;
use crate::types::{AnalysisResult, CaptureInput, ProcessingStatus};

/// 解析の世代番号
///
/// begin_captureごとに増える。遅れて届いた完了は
/// 番号が一致しなければ捨てられる。
pub type Generation = u64;

/// begin_captureが返す「処理中の1件」
///
/// インタープリターに渡す画像データと、完了を報告するときの
/// 世代番号をまとめたもの。
#[derive(Debug)]
pub struct PendingCapture {
    pub generation: Generation,
    pub image_base64: String,
    pub mime_type: String,
}

/// フェーズ。結果は成功時のみ、メッセージはエラー時のみ持てる
enum Phase {
    Idle,
    Processing,
    Success(AnalysisResult),
    Error(String),
}

/// 解析セッション
///
/// プレビューリソースと読み上げを所有し、状態遷移にあわせて
/// 解放・停止を行う。非同期処理そのものは持たず、呼び出し側が
/// begin_capture / finish で囲む。
pub struct AnalysisSession {
    phase: Phase,
    generation: Generation,
    preview: Option<Box<dyn PreviewHandle>>,
    preview_label: Option<String>,
    announcer: Box<dyn SpeechAnnouncer>,
}

impl AnalysisSession {
    pub fn new(announcer: Box<dyn SpeechAnnouncer>) -> Self {
        AnalysisSession {
            phase: Phase::Idle,
            generation: 0,
            preview: None,
            preview_label: None,
            announcer,
        }
    }

    /// 新しい写真の解析を開始する
    ///
    /// 前の解析の状態は暗黙にリセットされる:
    /// - 読み上げを停止
    /// - 前のプレビューを解放して差し替え
    /// - 世代番号を進め、進行中だった解析の完了を無効化
    pub fn begin_capture(&mut self, input: CaptureInput) -> PendingCapture {
        self.announcer.cancel();
        self.generation += 1;
        self.phase = Phase::Processing;

        if let Some(mut old) = self.preview.take() {
            old.release();
        }
        self.preview = Some(input.preview);
        self.preview_label = Some(input.label);

        PendingCapture {
            generation: self.generation,
            image_base64: input.image_base64,
            mime_type: input.mime_type,
        }
    }

    /// 解析の完了を報告する
    ///
    /// 世代番号が現在と一致しない完了（古い解析や、リセット後に
    /// 届いた完了）は無視される。
    pub fn finish(&mut self, generation: Generation, outcome: Result<AnalysisResult>) {
        if generation != self.generation {
            log::debug!(
                "古い解析の完了を破棄: generation={} (現在={})",
                generation,
                self.generation
            );
            return;
        }
        if !matches!(self.phase, Phase::Processing) {
            return;
        }

        self.phase = match outcome {
            Ok(result) => Phase::Success(result),
            Err(error) => Phase::Error(error.user_message()),
        };
    }

    /// 解析開始前の失敗（カメラ拒否など）をエラー状態として記録する
    ///
    /// 進行中の解析があれば無効化し、読み上げも停止する。
    /// プレビューは保持したままにする。
    pub fn fail(&mut self, error: &Error) {
        self.announcer.cancel();
        self.generation += 1;
        self.phase = Phase::Error(error.user_message());
    }

    /// セッションをidleへ戻す
    ///
    /// 進行中の解析は無効化され、読み上げは停止する。
    /// fullの場合はプレビューリソースも解放する。
    pub fn reset(&mut self, full: bool) {
        self.announcer.cancel();
        self.generation += 1;
        self.phase = Phase::Idle;

        if full {
            if let Some(mut preview) = self.preview.take() {
                preview.release();
            }
            self.preview_label = None;
        }
    }

    /// テキストを読み上げる
    ///
    /// 進行中の発話があれば止めてから新しい発話を開始する。
    pub fn announce(&mut self, text: &str, lang: &str) {
        self.announcer.cancel();
        self.announcer.speak(text, lang);
    }

    pub fn status(&self) -> ProcessingStatus {
        match self.phase {
            Phase::Idle => ProcessingStatus::Idle,
            Phase::Processing => ProcessingStatus::Processing,
            Phase::Success(_) => ProcessingStatus::Success,
            Phase::Error(_) => ProcessingStatus::Error,
        }
    }

    /// 成功時のみSome
    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.phase {
            Phase::Success(result) => Some(result),
            _ => None,
        }
    }

    /// エラー時のみSome
    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn preview_label(&self) -> Option<&str> {
        self.preview_label.as_deref()
    }

    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        if let Some(mut preview) = self.preview.take() {
            preview.release();
        }
    }
}

/// 取り込みから完了までを一息に実行する
///
/// セッションを単独所有できる呼び出し側（CLIなど）向けのヘルパー。
/// Webではspawnを挟むため、begin_capture / finishを直接使う。
pub async fn submit_capture<C: TextCompletion>(
    session: &mut AnalysisSession,
    interpreter: &Interpreter<C>,
    input: CaptureInput,
) -> ProcessingStatus {
    let pending = session.begin_capture(input);
    let outcome = interpreter
        .interpret(&pending.image_base64, &pending.mime_type)
        .await;
    session.finish(pending.generation, outcome);
    session.status()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::NullAnnouncer;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    // =============================================
    // テスト用のフェイク
    // =============================================

    /// 解放回数を数えるプレビュー
    struct CountingPreview {
        releases: Rc<Cell<usize>>,
    }

    impl CountingPreview {
        fn new() -> (Self, Rc<Cell<usize>>) {
            let releases = Rc::new(Cell::new(0));
            (
                CountingPreview {
                    releases: Rc::clone(&releases),
                },
                releases,
            )
        }
    }

    impl PreviewHandle for CountingPreview {
        fn release(&mut self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    /// 呼び出し順を記録するアナウンサー
    struct RecordingAnnouncer {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl RecordingAnnouncer {
        fn new() -> (Self, Rc<RefCell<Vec<String>>>) {
            let events = Rc::new(RefCell::new(Vec::new()));
            (
                RecordingAnnouncer {
                    events: Rc::clone(&events),
                },
                events,
            )
        }
    }

    impl SpeechAnnouncer for RecordingAnnouncer {
        fn speak(&mut self, text: &str, _lang: &str) {
            self.events.borrow_mut().push(format!("speak:{}", text));
        }

        fn cancel(&mut self) {
            self.events.borrow_mut().push("cancel".to_string());
        }
    }

    struct FakeCompletion {
        available: bool,
        response: String,
    }

    #[async_trait(?Send)]
    impl TextCompletion for FakeCompletion {
        async fn is_available(&self) -> bool {
            self.available
        }

        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.response.clone())
        }
    }

    fn capture(preview: Box<dyn PreviewHandle>, label: &str) -> CaptureInput {
        CaptureInput::new("aW1hZ2U=", "image/jpeg", preview, label)
    }

    fn session() -> AnalysisSession {
        AnalysisSession::new(Box::new(NullAnnouncer))
    }

    fn cat_result() -> AnalysisResult {
        let json = r#"{"description": "A cat.", "keywords": ["cat"], "phonetics": {"cat": "kat"}}"#;
        serde_json::from_str(json).unwrap()
    }

    // =============================================
    // 状態遷移テスト
    // =============================================

    #[test]
    fn test_initial_state_is_idle() {
        let session = session();
        assert_eq!(session.status(), ProcessingStatus::Idle);
        assert!(session.result().is_none());
        assert!(session.error_message().is_none());
        assert!(!session.has_preview());
    }

    #[test]
    fn test_begin_then_finish_success() {
        let mut session = session();
        let (preview, _) = CountingPreview::new();

        let pending = session.begin_capture(capture(Box::new(preview), "cat.jpg"));
        assert_eq!(session.status(), ProcessingStatus::Processing);
        assert_eq!(pending.image_base64, "aW1hZ2U=");
        assert_eq!(session.preview_label(), Some("cat.jpg"));

        session.finish(pending.generation, Ok(cat_result()));
        assert_eq!(session.status(), ProcessingStatus::Success);
        assert_eq!(session.result(), Some(&cat_result()));
        assert!(session.error_message().is_none());
    }

    #[test]
    fn test_begin_then_finish_error() {
        let mut session = session();
        let (preview, _) = CountingPreview::new();

        let pending = session.begin_capture(capture(Box::new(preview), "cat.jpg"));
        session.finish(
            pending.generation,
            Err(Error::Interpretation("JSONパースエラー: parse failed".to_string())),
        );

        assert_eq!(session.status(), ProcessingStatus::Error);
        assert!(session.result().is_none());
        let message = session.error_message().unwrap();
        assert!(!message.is_empty());
        // プレビューはエラー後も表示のため保持される
        assert!(session.has_preview());
    }

    #[test]
    fn test_stale_finish_is_discarded() {
        let mut session = session();
        let (first, _) = CountingPreview::new();
        let (second, _) = CountingPreview::new();

        let pending_a = session.begin_capture(capture(Box::new(first), "a.jpg"));
        let pending_b = session.begin_capture(capture(Box::new(second), "b.jpg"));

        // 古い方が先に完了しても無視され、processingのまま
        session.finish(pending_a.generation, Ok(cat_result()));
        assert_eq!(session.status(), ProcessingStatus::Processing);

        let mut dog = cat_result();
        dog.description = "A dog.".to_string();
        session.finish(pending_b.generation, Ok(dog.clone()));
        assert_eq!(session.status(), ProcessingStatus::Success);
        assert_eq!(session.result().unwrap().description, "A dog.");
    }

    #[test]
    fn test_stale_finish_after_newer_completed() {
        let mut session = session();
        let (first, _) = CountingPreview::new();
        let (second, _) = CountingPreview::new();

        let pending_a = session.begin_capture(capture(Box::new(first), "a.jpg"));
        let pending_b = session.begin_capture(capture(Box::new(second), "b.jpg"));

        let mut dog = cat_result();
        dog.description = "A dog.".to_string();
        session.finish(pending_b.generation, Ok(dog));
        assert_eq!(session.status(), ProcessingStatus::Success);

        // 新しい方の成功後に届いた古い完了は状態を変えない
        session.finish(pending_a.generation, Ok(cat_result()));
        assert_eq!(session.result().unwrap().description, "A dog.");
    }

    #[test]
    fn test_stale_error_does_not_override() {
        let mut session = session();
        let (first, _) = CountingPreview::new();
        let (second, _) = CountingPreview::new();

        let pending_a = session.begin_capture(capture(Box::new(first), "a.jpg"));
        let pending_b = session.begin_capture(capture(Box::new(second), "b.jpg"));

        session.finish(
            pending_a.generation,
            Err(Error::Unknown("遅延した失敗".to_string())),
        );
        assert_eq!(session.status(), ProcessingStatus::Processing);

        session.finish(pending_b.generation, Ok(cat_result()));
        assert_eq!(session.status(), ProcessingStatus::Success);
    }

    #[test]
    fn test_begin_releases_previous_preview_exactly_once() {
        let mut session = session();
        let (first, first_releases) = CountingPreview::new();
        let (second, second_releases) = CountingPreview::new();

        session.begin_capture(capture(Box::new(first), "a.jpg"));
        assert_eq!(first_releases.get(), 0);

        session.begin_capture(capture(Box::new(second), "b.jpg"));
        assert_eq!(first_releases.get(), 1);
        assert_eq!(second_releases.get(), 0);
        assert_eq!(session.preview_label(), Some("b.jpg"));
    }

    #[test]
    fn test_begin_cancels_speech() {
        let (announcer, events) = RecordingAnnouncer::new();
        let mut session = AnalysisSession::new(Box::new(announcer));
        let (preview, _) = CountingPreview::new();

        session.begin_capture(capture(Box::new(preview), "a.jpg"));
        assert_eq!(events.borrow().as_slice(), ["cancel"]);
    }

    // =============================================
    // リセットテスト
    // =============================================

    #[test]
    fn test_full_reset_releases_preview() {
        let mut session = session();
        let (preview, releases) = CountingPreview::new();

        let pending = session.begin_capture(capture(Box::new(preview), "a.jpg"));
        session.finish(pending.generation, Ok(cat_result()));

        session.reset(true);
        assert_eq!(session.status(), ProcessingStatus::Idle);
        assert!(session.result().is_none());
        assert!(!session.has_preview());
        assert!(session.preview_label().is_none());
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn test_partial_reset_keeps_preview() {
        let mut session = session();
        let (preview, releases) = CountingPreview::new();

        session.begin_capture(capture(Box::new(preview), "a.jpg"));
        session.reset(false);

        assert_eq!(session.status(), ProcessingStatus::Idle);
        assert!(session.has_preview());
        assert_eq!(session.preview_label(), Some("a.jpg"));
        assert_eq!(releases.get(), 0);
    }

    #[test]
    fn test_reset_invalidates_inflight_capture() {
        let mut session = session();
        let (preview, _) = CountingPreview::new();

        let pending = session.begin_capture(capture(Box::new(preview), "a.jpg"));
        session.reset(true);

        // リセット後に届いた完了はidleを壊さない
        session.finish(pending.generation, Ok(cat_result()));
        assert_eq!(session.status(), ProcessingStatus::Idle);
        assert!(session.result().is_none());
    }

    #[test]
    fn test_reset_cancels_speech() {
        let (announcer, events) = RecordingAnnouncer::new();
        let mut session = AnalysisSession::new(Box::new(announcer));

        session.reset(true);
        assert_eq!(events.borrow().as_slice(), ["cancel"]);
    }

    #[test]
    fn test_drop_releases_preview() {
        let (preview, releases) = CountingPreview::new();
        {
            let mut session = session();
            session.begin_capture(capture(Box::new(preview), "a.jpg"));
        }
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn test_drop_after_full_reset_releases_once() {
        let (preview, releases) = CountingPreview::new();
        {
            let mut session = session();
            session.begin_capture(capture(Box::new(preview), "a.jpg"));
            session.reset(true);
        }
        assert_eq!(releases.get(), 1);
    }

    // =============================================
    // 読み上げ・失敗テスト
    // =============================================

    #[test]
    fn test_announce_cancels_before_speaking() {
        let (announcer, events) = RecordingAnnouncer::new();
        let mut session = AnalysisSession::new(Box::new(announcer));

        session.announce("coffee", "en-US");
        session.announce("cup", "en-US");

        assert_eq!(
            events.borrow().as_slice(),
            ["cancel", "speak:coffee", "cancel", "speak:cup"]
        );
    }

    #[test]
    fn test_fail_records_device_error() {
        let mut session = session();
        let error = Error::device(
            crate::error::DeviceErrorKind::PermissionDenied,
            "カメラへのアクセスが拒否されました",
        );

        session.fail(&error);
        assert_eq!(session.status(), ProcessingStatus::Error);
        assert_eq!(
            session.error_message(),
            Some("カメラへのアクセスが拒否されました")
        );
    }

    #[test]
    fn test_fail_invalidates_inflight_capture() {
        let mut session = session();
        let (preview, _) = CountingPreview::new();

        let pending = session.begin_capture(capture(Box::new(preview), "a.jpg"));
        session.fail(&Error::Unknown("デバイス切断".to_string()));

        session.finish(pending.generation, Ok(cat_result()));
        assert_eq!(session.status(), ProcessingStatus::Error);
    }

    // =============================================
    // submit_capture（取り込み→完了の一括実行）
    // =============================================

    #[test]
    fn test_submit_capture_end_to_end() {
        let mut session = session();
        let interpreter = Interpreter::new(FakeCompletion {
            available: true,
            response:
                r#"{"description": "A cat.", "keywords": ["cat"], "phonetics": {"cat": "kat"}}"#
                    .to_string(),
        });
        let (preview, _) = CountingPreview::new();

        let status = block_on(submit_capture(
            &mut session,
            &interpreter,
            capture(Box::new(preview), "cat.jpg"),
        ));

        assert_eq!(status, ProcessingStatus::Success);
        assert_eq!(session.result(), Some(&cat_result()));
    }

    #[test]
    fn test_submit_capture_invalid_response_ends_in_error() {
        let mut session = session();
        let interpreter = Interpreter::new(FakeCompletion {
            available: true,
            response: "not json".to_string(),
        });
        let (preview, _) = CountingPreview::new();

        let status = block_on(submit_capture(
            &mut session,
            &interpreter,
            capture(Box::new(preview), "cat.jpg"),
        ));

        assert_eq!(status, ProcessingStatus::Error);
        assert!(session.error_message().is_some());
        assert!(!session.error_message().unwrap().is_empty());
    }

    #[test]
    fn test_submit_capture_unavailable_model_yields_mock() {
        let mut session = session();
        let interpreter = Interpreter::new(FakeCompletion {
            available: false,
            response: String::new(),
        });
        let (preview, _) = CountingPreview::new();

        let status = block_on(submit_capture(
            &mut session,
            &interpreter,
            capture(Box::new(preview), "cat.jpg"),
        ));

        assert_eq!(status, ProcessingStatus::Success);
        assert!(session.result().unwrap().is_mock());
    }
}
