//! 写真の取り込み（Web側）
//!
//! ファイル選択とカメラ撮影のどちらもデータURLへ揃え、
//! 共通コアに渡すCaptureInputへ変換する。

use std::cell::RefCell;
use std::rc::Rc;

use photo_lingo_common::{CaptureInput, Error, PreviewHandle};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{File, FileReader, Url};

/// Data URLからbase64データ部分を抽出
///
/// # Arguments
/// * `data_url` - "data:image/jpeg;base64,/9j/4AAQ..." 形式のData URL
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split(',').nth(1)
}

/// Data URLからMIMEタイプを抽出（抽出失敗時はimage/jpeg）
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .split(':')
        .nth(1)
        .and_then(|s| s.split(';').next())
        .unwrap_or("image/jpeg")
}

/// JsValueからエラーメッセージを取り出す
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(exception) = value.dyn_ref::<web_sys::DomException>() {
        return exception.message();
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

/// オブジェクトURLのプレビュー
///
/// releaseでURL.revokeObjectURLを呼び、ブラウザが保持している
/// Blob参照を解放する。revoke漏れはメモリリークになる。
pub struct ObjectUrlPreview {
    url: Option<String>,
}

impl ObjectUrlPreview {
    /// ファイルからオブジェクトURLを作る
    ///
    /// 表示用にURL文字列も返す。ハンドルがreleaseされた後の
    /// URLは無効になるため、表示側は差し替え時に必ず更新すること。
    pub fn from_file(file: &File) -> Result<(Self, String), Error> {
        let url = Url::create_object_url_with_blob(file)
            .map_err(|e| Error::Unknown(js_error_message(&e)))?;
        Ok((
            ObjectUrlPreview {
                url: Some(url.clone()),
            },
            url,
        ))
    }
}

impl PreviewHandle for ObjectUrlPreview {
    fn release(&mut self) {
        if let Some(url) = self.url.take() {
            let _ = Url::revoke_object_url(&url);
        }
    }
}

/// データURLからCaptureInputを作る
///
/// base64部分が取り出せない場合はプレビューを解放してからエラーを返す。
pub fn capture_from_data_url(
    data_url: &str,
    mut preview: Box<dyn PreviewHandle>,
    label: &str,
) -> Result<CaptureInput, Error> {
    let base64 = match extract_base64_from_data_url(data_url) {
        Some(base64) if !base64.is_empty() => base64,
        _ => {
            preview.release();
            return Err(Error::Unknown(
                "画像データの形式が不正です".to_string(),
            ));
        }
    };

    let mime_type = extract_mime_type_from_data_url(data_url);
    Ok(CaptureInput::new(base64, mime_type, preview, label))
}

/// スロットからプレビューを取り出して解放する
///
/// onload/onerrorのどちらか先に発火した側だけが取り出せる。
fn take_and_release(preview: &Rc<RefCell<Option<ObjectUrlPreview>>>) -> bool {
    match preview.borrow_mut().take() {
        Some(mut preview) => {
            preview.release();
            true
        }
        None => false,
    }
}

/// ファイルを読み込んでCaptureInputへ変換し、コールバックに渡す
///
/// 成功時は(入力, 表示用プレビューURL)のペアを渡す。
/// FileReaderは非同期のため、呼び出しはonload/onerrorのタイミングになる。
/// どの失敗経路でもプレビューを解放してからエラーを報告する。
pub fn read_file<F>(file: File, on_capture: F)
where
    F: Fn(Result<(CaptureInput, String), Error>) + 'static,
{
    let file_name = file.name();

    let (preview, preview_url) = match ObjectUrlPreview::from_file(&file) {
        Ok(pair) => pair,
        Err(e) => {
            on_capture(Err(e));
            return;
        }
    };
    let preview = Rc::new(RefCell::new(Some(preview)));
    let on_capture = Rc::new(on_capture);

    let reader = match FileReader::new() {
        Ok(reader) => reader,
        Err(e) => {
            take_and_release(&preview);
            on_capture(Err(Error::Unknown(js_error_message(&e))));
            return;
        }
    };

    let reader_clone = reader.clone();
    let onload = {
        let preview = Rc::clone(&preview);
        let on_capture = Rc::clone(&on_capture);
        let preview_url = preview_url.clone();
        Closure::wrap(Box::new(move |_: web_sys::ProgressEvent| {
            let Some(preview) = preview.borrow_mut().take() else {
                return;
            };

            let data_url = reader_clone.result().ok().and_then(|v| v.as_string());
            let outcome = match data_url {
                Some(data_url) => capture_from_data_url(&data_url, Box::new(preview), &file_name)
                    .map(|input| (input, preview_url.clone())),
                None => {
                    let mut preview = preview;
                    preview.release();
                    Err(Error::Unknown(
                        "ファイルを読み込めませんでした".to_string(),
                    ))
                }
            };
            on_capture(outcome);
        }) as Box<dyn FnMut(_)>)
    };
    reader.set_onload(Some(onload.as_ref().unchecked_ref()));
    onload.forget();

    // 読めないファイルはonloadが発火しない。エラーでもUIへ報告する
    let onerror = {
        let preview = Rc::clone(&preview);
        let on_capture = Rc::clone(&on_capture);
        Closure::wrap(Box::new(move |_: web_sys::ProgressEvent| {
            if !take_and_release(&preview) {
                return;
            }
            on_capture(Err(Error::Unknown(
                "ファイルを読み込めませんでした".to_string(),
            )));
        }) as Box<dyn FnMut(_)>)
    };
    reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    if let Err(e) = reader.read_as_data_url(&file) {
        take_and_release(&preview);
        on_capture(Err(Error::Unknown(js_error_message(&e))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_lingo_common::InertPreview;
    use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

    // File/FileReader/URLを使うテストがあるためブラウザで実行する
    wasm_bindgen_test_configure!(run_in_browser);

    struct CountingPreview(Rc<RefCell<u32>>);

    impl PreviewHandle for CountingPreview {
        fn release(&mut self) {
            *self.0.borrow_mut() += 1;
        }
    }

    fn text_file(name: &str, content: &str) -> File {
        let parts = js_sys::Array::new();
        parts.push(&JsValue::from_str(content));
        let options = web_sys::FilePropertyBag::new();
        options.set_type("text/plain");
        File::new_with_str_sequence_and_options(&parts, name, &options)
            .expect("テスト用ファイルを作成できない")
    }

    #[wasm_bindgen_test]
    fn test_extract_base64_from_data_url() {
        let data_url = "data:image/png;base64,aVZCT1J3";
        assert_eq!(extract_base64_from_data_url(data_url), Some("aVZCT1J3"));
        assert_eq!(extract_base64_from_data_url("no comma here"), None);
    }

    #[wasm_bindgen_test]
    fn test_extract_mime_type_from_data_url() {
        assert_eq!(
            extract_mime_type_from_data_url("data:image/png;base64,xxxx"),
            "image/png"
        );
        assert_eq!(extract_mime_type_from_data_url("garbage"), "image/jpeg");
    }

    #[wasm_bindgen_test]
    fn test_capture_from_data_url() {
        let input = capture_from_data_url(
            "data:image/webp;base64,d2VicA==",
            Box::new(InertPreview),
            "shot.webp",
        )
        .unwrap();

        assert_eq!(input.image_base64, "d2VicA==");
        assert_eq!(input.mime_type, "image/webp");
        assert_eq!(input.label, "shot.webp");
    }

    #[wasm_bindgen_test]
    fn test_capture_from_data_url_without_payload_is_error() {
        let result =
            capture_from_data_url("data:image/png;base64,", Box::new(InertPreview), "x.png");
        assert!(result.is_err());

        let result = capture_from_data_url("not a data url", Box::new(InertPreview), "x.png");
        assert!(result.is_err());
    }

    /// 変換に失敗したらプレビューは必ず1回解放される
    #[wasm_bindgen_test]
    fn test_capture_error_releases_preview() {
        let count = Rc::new(RefCell::new(0u32));
        let result = capture_from_data_url(
            "data:image/png;base64,",
            Box::new(CountingPreview(Rc::clone(&count))),
            "x.png",
        );
        assert!(result.is_err());
        assert_eq!(*count.borrow(), 1);
    }

    /// onload/onerrorのどちらか先の1回だけが取り出して解放できる
    #[wasm_bindgen_test]
    fn test_take_and_release_is_single_shot() {
        let file = text_file("coffee.txt", "coffee");
        let (preview, _url) = ObjectUrlPreview::from_file(&file).expect("プレビュー作成失敗");
        let slot = Rc::new(RefCell::new(Some(preview)));

        assert!(take_and_release(&slot));
        assert!(!take_and_release(&slot));
    }

    /// 読み込み完了でCaptureInputとプレビューURLが届く
    #[wasm_bindgen_test]
    async fn test_read_file_delivers_capture() {
        let file = text_file("coffee.txt", "coffee");

        let slot: Rc<RefCell<Option<Result<(CaptureInput, String), Error>>>> =
            Rc::new(RefCell::new(None));
        let sink = Rc::clone(&slot);
        read_file(file, move |outcome| {
            *sink.borrow_mut() = Some(outcome);
        });

        for _ in 0..200 {
            if slot.borrow().is_some() {
                break;
            }
            gloo::timers::future::TimeoutFuture::new(5).await;
        }

        let outcome = slot
            .borrow_mut()
            .take()
            .expect("コールバックが呼ばれなかった");
        let (input, url) = outcome.expect("読み込み失敗");
        assert!(!input.image_base64.is_empty());
        assert_eq!(input.mime_type, "text/plain");
        assert_eq!(input.label, "coffee.txt");
        assert!(url.starts_with("blob:"));
    }
}
