//! カメラ撮影コンポーネント
//!
//! getUserMediaで背面カメラ優先の映像を取得し、シャッターで
//! 1フレームをJPEGデータURLへ切り出す。ストリームは閉じる・
//! 撮影する・エラーになる・アンマウントされる、どの経路でも
//! 必ず停止する。

use leptos::prelude::*;
use leptos::task::spawn_local;
use photo_lingo_common::{CaptureInput, DeviceErrorKind, Error, InertPreview};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlCanvasElement, HtmlVideoElement, MediaStream, MediaStreamConstraints};

use crate::capture::{capture_from_data_url, js_error_message};

/// 起動中のカメラストリームの番人
///
/// stopで全トラックを停止する。停止漏れはカメラのインジケータが
/// 点いたままになるため、終了経路すべてでstopを呼ぶ。
pub struct StreamGuard {
    stream: Option<MediaStream>,
}

impl StreamGuard {
    pub fn empty() -> Self {
        StreamGuard { stream: None }
    }

    /// 新しいストリームへ差し替える。古いストリームは先に停止する
    pub fn replace(&mut self, stream: MediaStream) {
        self.stop();
        self.stream = Some(stream);
    }

    /// 全トラックを停止する。何度呼んでも安全
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            stop_tracks(&stream);
        }
    }
}

/// ストリームの全トラックを停止する
pub fn stop_tracks(stream: &MediaStream) {
    let tracks = stream.get_tracks();
    for i in 0..tracks.length() {
        if let Ok(track) = tracks.get(i).dyn_into::<web_sys::MediaStreamTrack>() {
            track.stop();
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.stop();
    }
}

fn unsupported() -> Error {
    Error::device(
        DeviceErrorKind::Unsupported,
        "この環境ではカメラを利用できません",
    )
}

/// getUserMediaの失敗をデバイスエラーへ割り当てる
fn map_device_error(value: &JsValue) -> Error {
    let name = value
        .dyn_ref::<web_sys::DomException>()
        .map(|e| e.name())
        .unwrap_or_default();

    match name.as_str() {
        "NotAllowedError" | "SecurityError" => Error::device(
            DeviceErrorKind::PermissionDenied,
            "カメラへのアクセスが拒否されました",
        ),
        "NotFoundError" | "OverconstrainedError" => Error::device(
            DeviceErrorKind::NotFound,
            "カメラが見つかりませんでした",
        ),
        "NotSupportedError" => unsupported(),
        _ => Error::Unknown(js_error_message(value)),
    }
}

/// 背面カメラ優先でストリームを開く
async fn open_stream() -> Result<MediaStream, Error> {
    let window = web_sys::window().ok_or_else(unsupported)?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|_| unsupported())?;

    let video = js_sys::Object::new();
    let _ = js_sys::Reflect::set(
        &video,
        &JsValue::from_str("facingMode"),
        &JsValue::from_str("environment"),
    );
    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&video.into());

    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| map_device_error(&e))?;
    let stream = JsFuture::from(promise)
        .await
        .map_err(|e| map_device_error(&e))?;

    stream
        .dyn_into::<MediaStream>()
        .map_err(|_| Error::Unknown("カメラストリームを取得できませんでした".to_string()))
}

/// 現在のフレームをJPEGデータURLへ切り出してCaptureInputにする
fn snapshot(video: &HtmlVideoElement) -> Result<(CaptureInput, String), Error> {
    let width = video.video_width();
    let height = video.video_height();
    if width == 0 || height == 0 {
        return Err(Error::Unknown(
            "カメラ映像の準備ができていません".to_string(),
        ));
    }

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(unsupported)?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .ok()
        .and_then(|e| e.dyn_into().ok())
        .ok_or_else(|| Error::Unknown("キャンバスを作成できませんでした".to_string()))?;
    canvas.set_width(width);
    canvas.set_height(height);

    let context: web_sys::CanvasRenderingContext2d = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|c| c.dyn_into().ok())
        .ok_or_else(|| Error::Unknown("描画コンテキストを取得できませんでした".to_string()))?;
    context
        .draw_image_with_html_video_element(video, 0.0, 0.0)
        .map_err(|e| Error::Unknown(js_error_message(&e)))?;

    let data_url = canvas
        .to_data_url_with_type("image/jpeg")
        .map_err(|e| Error::Unknown(js_error_message(&e)))?;

    // データURL自体を表示に使うため、解放が必要なリソースは無い
    let input = capture_from_data_url(&data_url, Box::new(InertPreview), "カメラ撮影")?;
    Ok((input, data_url))
}

#[component]
pub fn CameraView<F, FC>(on_capture: F, on_close: FC) -> impl IntoView
where
    F: Fn(Result<(CaptureInput, String), Error>) + 'static + Clone,
    FC: Fn(()) + 'static + Clone,
{
    let video_ref = NodeRef::<leptos::html::Video>::new();
    let guard = StoredValue::new_local(StreamGuard::empty());
    let (is_ready, set_is_ready) = signal(false);

    // マウント時にストリームを開く。失敗はエラー状態へ流してビューを閉じる
    {
        let on_capture = on_capture.clone();
        let on_close = on_close.clone();
        spawn_local(async move {
            match open_stream().await {
                Ok(stream) => {
                    // 待機中にビューが閉じられていると番人は破棄済み。
                    // 預けられないストリームはその場で止める
                    if guard
                        .try_update_value(|g| g.replace(stream.clone()))
                        .is_none()
                    {
                        stop_tracks(&stream);
                        return;
                    }
                    if let Some(video) = video_ref.get_untracked() {
                        video.set_src_object(Some(&stream));
                        let _ = video.play();
                    }
                    let _ = set_is_ready.try_set(true);
                }
                Err(e) => {
                    on_close(());
                    on_capture(Err(e));
                }
            }
        });
    }

    // アンマウント時（閉じる・フルリセット・再オープン）にも必ず停止する
    on_cleanup(move || {
        guard.try_update_value(|g| g.stop());
    });

    let on_shutter = {
        let on_capture = on_capture.clone();
        let on_close = on_close.clone();
        move |_| {
            let Some(video) = video_ref.get_untracked() else {
                return;
            };
            let outcome = snapshot(&video);
            guard.update_value(|g| g.stop());
            on_close(());
            on_capture(outcome);
        }
    };

    let on_close_click = {
        let on_close = on_close.clone();
        move |_| {
            guard.update_value(|g| g.stop());
            on_close(());
        }
    };

    view! {
        <div class="camera-view">
            <video
                class="camera-preview"
                autoplay=true
                playsinline=true
                muted=true
                node_ref=video_ref
            ></video>
            <div class="camera-controls">
                <button
                    class="btn btn-primary shutter-button"
                    disabled=move || !is_ready.get()
                    on:click=on_shutter
                >
                    "📸 撮影"
                </button>
                <button class="btn btn-secondary" on:click=on_close_click>
                    "閉じる"
                </button>
            </div>
        </div>
    }
}
