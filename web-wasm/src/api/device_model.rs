//! オンデバイス言語モデル（Prompt API）連携
//!
//! window.LanguageModel を持つブラウザでのみ動作する。
//! グローバルの有無は実行時にしか分からないため、
//! 静的な#[wasm_bindgen]バインディングではなくReflectで引く。
//! 未提供の環境ではInterpreterがサンプル結果へフォールバックする。

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use photo_lingo_common::{Error, Result, TextCompletion};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::capture::js_error_message;

/// モデル未検出時、サンプル結果を返す前の擬似待機（ミリ秒）
const MOCK_DELAY_MS: u32 = 600;

/// ブラウザ組み込みの完了API
pub struct DeviceModelCompletion;

/// window.LanguageModel を取得（未提供ならNone）
fn language_model() -> Option<JsValue> {
    let window = web_sys::window()?;
    let model = Reflect::get(&window, &JsValue::from_str("LanguageModel")).ok()?;
    if model.is_undefined() || model.is_null() {
        None
    } else {
        Some(model)
    }
}

/// target.name(arg?) を呼び、返ってきたPromiseの解決を待つ
async fn call_async_method(
    target: &JsValue,
    name: &str,
    arg: Option<&JsValue>,
) -> Result<JsValue> {
    let method: Function = Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into().ok())
        .ok_or_else(|| Error::Unknown(format!("LanguageModel.{} が見つかりません", name)))?;

    let returned = match arg {
        Some(arg) => method.call1(target, arg),
        None => method.call0(target),
    }
    .map_err(|e| Error::Unknown(js_error_message(&e)))?;

    let promise: Promise = returned.dyn_into().map_err(|_| {
        Error::Unknown(format!("LanguageModel.{} がPromiseを返しませんでした", name))
    })?;

    JsFuture::from(promise)
        .await
        .map_err(|e| Error::Unknown(js_error_message(&e)))
}

#[async_trait(?Send)]
impl TextCompletion for DeviceModelCompletion {
    async fn is_available(&self) -> bool {
        let Some(model) = language_model() else {
            return false;
        };

        // availability()は"available"のほか"downloadable"等を返す。
        // 即時に使える状態のみ利用可能とみなす
        match call_async_method(&model, "availability", None).await {
            Ok(value) => value.as_string().as_deref() == Some("available"),
            Err(_) => false,
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let model = language_model().ok_or(Error::Unavailable)?;

        let session = call_async_method(&model, "create", None).await?;
        let response =
            call_async_method(&session, "prompt", Some(&JsValue::from_str(prompt))).await?;

        response
            .as_string()
            .ok_or_else(|| Error::Unknown("モデル応答が文字列ではありません".to_string()))
    }

    async fn mock_latency(&self) {
        gloo::timers::future::TimeoutFuture::new(MOCK_DELAY_MS).await;
    }
}
