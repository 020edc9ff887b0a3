//! AI応答パーサー
//!
//! 言語モデルの応答テキストからJSONペイロードを取り出し、
//! AnalysisResultへ変換する。モデルは指示通りに裸のJSONを返すこともあれば、
//! ```json フェンスや前後の説明文を付けてくることもある。

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{AnalysisResult, ResultSource};

/// 応答からJSONペイロード部分を抽出
///
/// 抽出手順:
/// 1. ```json ... ``` ブロックがあれば中身を返す
/// 2. なければ応答全体をそのまま返す（トリムのみ）
///
/// 閉じフェンスが無い場合もそのまま全体を返す。JSONとして不正なら
/// パース段階でエラーになる。
///
/// # Examples
/// ```
/// use photo_lingo_common::extract_payload;
///
/// let response = "```json\n{\"description\": \"A cat.\"}\n```";
/// assert_eq!(extract_payload(response), "{\"description\": \"A cat.\"}");
///
/// let bare = "{\"description\": \"A cat.\"}";
/// assert_eq!(extract_payload(bare), bare);
/// ```
pub fn extract_payload(response: &str) -> &str {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return response[start..end].trim();
        }
    }

    response.trim()
}

/// JSON値を文字列へ寄せる
///
/// モデルが数値や真偽値を返してきても落とさず文字列化する。
/// 配列・オブジェクト・nullは空文字列。
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn invalid_format() -> Error {
    Error::Interpretation(
        "応答の形式が正しくありません（description と keywords が必要です）".to_string(),
    )
}

/// AI応答をパースしてAnalysisResultへ変換
///
/// 検証は最小限:
/// - descriptionが空でない文字列であること
/// - keywordsが配列であること（個数は問わない）
///
/// phoneticsは任意。キーがkeywordsと一致しなくてもそのまま保持する。
///
/// # Returns
/// * `Err(Error::Interpretation)` - JSON構文エラー、または形式不正。
///   両者はメッセージで区別できる。
pub fn parse_analysis_response(response: &str) -> Result<AnalysisResult> {
    let payload = extract_payload(response);

    let value: Value = serde_json::from_str(payload)
        .map_err(|e| Error::Interpretation(format!("JSONパースエラー: {}", e)))?;

    let object = value.as_object().ok_or_else(invalid_format)?;

    let description = object
        .get("description")
        .map(value_to_string)
        .unwrap_or_default();
    if description.is_empty() {
        return Err(invalid_format());
    }

    let keywords = match object.get("keywords") {
        Some(Value::Array(items)) => items.iter().map(value_to_string).collect(),
        _ => return Err(invalid_format()),
    };

    let phonetics: HashMap<String, String> = match object.get("phonetics") {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(word, value)| (word.clone(), value_to_string(value)))
            .collect(),
        _ => HashMap::new(),
    };

    Ok(AnalysisResult {
        description,
        keywords,
        phonetics,
        source: ResultSource::Model,
    })
}
