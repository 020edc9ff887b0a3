//! 応答インタープリター
//!
//! 完了API呼び出しと応答パースをまとめ、1枚の画像から
//! AnalysisResultを得るまでの流れを1箇所に閉じ込める。

use crate::capability::TextCompletion;
use crate::error::Result;
use crate::parser::parse_analysis_response;
use crate::prompts::{attach_image_payload, build_analysis_prompt};
use crate::types::AnalysisResult;

/// 画像1枚を解析するインタープリター
///
/// 完了APIが使えない環境ではサンプル結果へフォールバックする。
/// その際も擬似待機を挟み、実際の解析と同じ体感にする。
pub struct Interpreter<C> {
    capability: C,
}

impl<C: TextCompletion> Interpreter<C> {
    pub fn new(capability: C) -> Self {
        Interpreter { capability }
    }

    /// 画像を解析して結果を返す
    ///
    /// リトライはしない。失敗したらエラーを返し、
    /// やり直しはユーザー操作に委ねる。
    pub async fn interpret(&self, image_base64: &str, mime_type: &str) -> Result<AnalysisResult> {
        if !self.capability.is_available().await {
            log::warn!("完了APIが利用できないため、サンプル結果を返します");
            self.capability.mock_latency().await;
            return Ok(AnalysisResult::mock());
        }

        let prompt = attach_image_payload(&build_analysis_prompt(), image_base64, mime_type);
        let response = self.capability.complete(&prompt).await?;
        parse_analysis_response(&response)
    }

    pub fn capability(&self) -> &C {
        &self.capability
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::ResultSource;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::cell::RefCell;

    /// 決め打ちの応答を返すテスト用の完了API
    struct FakeCompletion {
        available: bool,
        response: String,
        prompts: RefCell<Vec<String>>,
    }

    impl FakeCompletion {
        fn answering(response: &str) -> Self {
            FakeCompletion {
                available: true,
                response: response.to_string(),
                prompts: RefCell::new(Vec::new()),
            }
        }

        fn unavailable() -> Self {
            FakeCompletion {
                available: false,
                response: String::new(),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl TextCompletion for FakeCompletion {
        async fn is_available(&self) -> bool {
            self.available
        }

        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok(self.response.clone())
        }
    }

    /// 常に失敗する完了API
    struct FailingCompletion;

    #[async_trait(?Send)]
    impl TextCompletion for FailingCompletion {
        async fn is_available(&self) -> bool {
            true
        }

        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(Error::Unknown("モデル呼び出しに失敗しました".to_string()))
        }
    }

    #[test]
    fn test_interpret_fenced_response() {
        let capability = FakeCompletion::answering(
            "```json\n{\"description\": \"A cat.\", \"keywords\": [\"cat\"], \"phonetics\": {\"cat\": \"kat\"}}\n```",
        );
        let interpreter = Interpreter::new(capability);

        let result = block_on(interpreter.interpret("aGVsbG8=", "image/png")).unwrap();
        assert_eq!(result.description, "A cat.");
        assert_eq!(result.keywords, vec!["cat"]);
        assert_eq!(result.phonetic_for("cat"), Some("kat"));
        assert_eq!(result.source, ResultSource::Model);
    }

    #[test]
    fn test_interpret_embeds_image_in_prompt() {
        let capability = FakeCompletion::answering(
            "{\"description\": \"A dog.\", \"keywords\": [\"dog\"]}",
        );
        let interpreter = Interpreter::new(capability);

        block_on(interpreter.interpret("cGF5bG9hZA==", "image/jpeg")).unwrap();

        let prompts = interpreter.capability().prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("cGF5bG9hZA=="));
        assert!(prompts[0].contains("image/jpeg"));
        assert!(prompts[0].contains("phonetics"));
    }

    #[test]
    fn test_interpret_unavailable_falls_back_to_mock() {
        let interpreter = Interpreter::new(FakeCompletion::unavailable());

        let result = block_on(interpreter.interpret("aGVsbG8=", "image/png")).unwrap();
        assert!(result.is_mock());
        assert!(!result.keywords.is_empty());
    }

    #[test]
    fn test_interpret_unavailable_never_calls_complete() {
        let interpreter = Interpreter::new(FakeCompletion::unavailable());
        block_on(interpreter.interpret("aGVsbG8=", "image/png")).unwrap();
        assert!(interpreter.capability().prompts.borrow().is_empty());
    }

    #[test]
    fn test_interpret_invalid_json_is_error() {
        let interpreter = Interpreter::new(FakeCompletion::answering("not json"));

        let result = block_on(interpreter.interpret("aGVsbG8=", "image/png"));
        assert!(matches!(result, Err(Error::Interpretation(_))));
    }

    #[test]
    fn test_interpret_propagates_completion_failure() {
        let interpreter = Interpreter::new(FailingCompletion);

        let result = block_on(interpreter.interpret("aGVsbG8=", "image/png"));
        assert!(matches!(result, Err(Error::Unknown(_))));
    }
}
