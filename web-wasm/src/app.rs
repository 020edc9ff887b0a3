//! メインアプリケーションコンポーネント
//!
//! 解析セッション（状態機械）を1箇所で所有し、状態遷移のたびに
//! シグナルへ写してUIを更新する。取り込み→解析はspawn_localで
//! 実行し、完了の採用可否はセッションの世代番号に委ねる。

use leptos::prelude::*;
use leptos::task::spawn_local;
use photo_lingo_common::{
    AnalysisResult, AnalysisSession, CaptureInput, Error, Interpreter, ProcessingStatus,
};

use crate::api::device_model::DeviceModelCompletion;
use crate::components::{
    camera_view::CameraView,
    capture_area::CaptureArea,
    header::Header,
    result_card::ResultCard,
    settings_panel::{load_speech_lang, SettingsPanel},
    status_panel::StatusPanel,
};
use crate::speech::SynthesisAnnouncer;

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    // セッションはSendでないためスレッドローカル領域に置く。
    // UIはこの状態を直接読まず、遷移のたびにシグナルへ写す
    let session = StoredValue::new_local(AnalysisSession::new(Box::new(
        SynthesisAnnouncer::new(),
    )));

    let (status, set_status) = signal(ProcessingStatus::Idle);
    let (result, set_result) = signal(None::<AnalysisResult>);
    let (error, set_error) = signal(None::<String>);
    let (preview_url, set_preview_url) = signal(None::<String>);
    let (preview_label, set_preview_label) = signal(None::<String>);
    let (show_camera, set_show_camera) = signal(false);
    let (speech_lang, set_speech_lang) = signal(load_speech_lang());

    // セッションの状態をシグナルへ写す
    let sync_signals = move || {
        session.with_value(|s| {
            set_status.set(s.status());
            set_result.set(s.result().cloned());
            set_error.set(s.error_message().map(str::to_string));
            set_preview_label.set(s.preview_label().map(str::to_string));
        });
    };

    // 取り込み完了ハンドラ（ファイル選択・カメラ撮影共通）
    let on_capture = move |outcome: Result<(CaptureInput, String), Error>| {
        match outcome {
            Ok((input, url)) => {
                let Some(pending) = session.try_update_value(|s| s.begin_capture(input)) else {
                    return;
                };
                set_preview_url.set(Some(url));
                sync_signals();

                spawn_local(async move {
                    let interpreter = Interpreter::new(DeviceModelCompletion);
                    let outcome = interpreter
                        .interpret(&pending.image_base64, &pending.mime_type)
                        .await;
                    // 新しい取り込みに追い越された完了はここで捨てられる
                    session.update_value(|s| s.finish(pending.generation, outcome));
                    sync_signals();
                });
            }
            Err(e) => {
                session.update_value(|s| s.fail(&e));
                sync_signals();
            }
        }
    };

    // エラー後のリトライ: idleへ戻し、プレビューは残す
    let on_retry = move |_: ()| {
        session.update_value(|s| s.reset(false));
        sync_signals();
    };

    // フルリセット: プレビューも解放して初期状態へ
    let on_clear = move |_: ()| {
        session.update_value(|s| s.reset(true));
        set_preview_url.set(None);
        set_show_camera.set(false);
        sync_signals();
    };

    let on_open_camera = move |_: ()| {
        set_show_camera.set(true);
    };

    let on_close_camera = move |_: ()| {
        set_show_camera.set(false);
    };

    let on_speak = move |text: String| {
        let lang = speech_lang.get_untracked();
        session.update_value(|s| s.announce(&text, &lang));
    };

    let is_processing = Signal::derive(move || status.get().is_processing());

    view! {
        <div class="container">
            <Header />

            <SettingsPanel speech_lang=speech_lang set_speech_lang=set_speech_lang />

            <Show
                when=move || show_camera.get()
                fallback=move || {
                    view! {
                        <CaptureArea
                            disabled=is_processing
                            on_capture=on_capture
                            on_open_camera=on_open_camera
                        />
                    }
                }
            >
                <CameraView on_capture=on_capture on_close=on_close_camera />
            </Show>

            <Show when=move || preview_url.get().is_some()>
                <div class="preview-panel">
                    <img
                        class="preview-image"
                        src=move || preview_url.get().unwrap_or_default()
                        alt="取り込んだ写真"
                    />
                    <p class="preview-label">{move || preview_label.get().unwrap_or_default()}</p>
                </div>
            </Show>

            <StatusPanel status=status error=error on_retry=on_retry />

            <Show when=move || result.get().is_some()>
                <ResultCard
                    result=Signal::derive(move || result.get().unwrap_or_default())
                    on_speak=on_speak
                    on_clear=on_clear
                />
            </Show>
        </div>
    }
}
