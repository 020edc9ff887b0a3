//! プロンプト生成モジュール
//!
//! CLIとWeb(WASM)で共有されるプロンプト生成ロジック:
//! - build_analysis_prompt: 写真解析用の固定プロンプト
//! - attach_image_payload: プロンプトに画像データを連結

/// 期待するキーワード数の下限・上限（プロンプトでの指示用。強制はしない）
pub const KEYWORD_COUNT_MIN: usize = 3;
pub const KEYWORD_COUNT_MAX: usize = 5;

/// 写真解析プロンプト生成
///
/// 英語学習用の教材データを1枚の写真から作らせる。
/// 出力はJSONオブジェクト1個のみを要求する。
///
/// # Returns
/// 解析用のプロンプト文字列（画像データは含まない）
pub fn build_analysis_prompt() -> String {
    format!(
        r#"あなたは英語学習アプリの画像解説エンジンです。写真を見て、英語学習者向けの教材データを作成してください。

## 出力形式（厳密にこのJSONオブジェクト形式で出力）
{{
  "description": "写真を説明する英語の1文",
  "keywords": ["写真に写っている物の英単語を{min}〜{max}個"],
  "phonetics": {{"keyword": "発音表記"}}
}}

## 注意
- description は自然で簡潔な英文1文
- keywords はすべて小文字の英単語
- phonetics のキーは keywords の各単語、値はカタカナではなく英語話者向けの発音表記（例: coffee → KAW-fee）
- JSONオブジェクトのみ出力。説明文やコードフェンスは不要"#,
        min = KEYWORD_COUNT_MIN,
        max = KEYWORD_COUNT_MAX,
    )
}

/// プロンプトに画像データを連結
///
/// 画像はbase64文字列としてプロンプト末尾に埋め込む。
/// 完了APIは「プロンプト文字列を受け取り応答文字列を返す」だけの
/// 契約なので、画像の受け渡しもこの1本の文字列に載せる。
pub fn attach_image_payload(prompt: &str, image_base64: &str, mime_type: &str) -> String {
    format!(
        "{}\n\n対象画像（{}, base64）:\n{}",
        prompt, mime_type, image_base64
    )
}
