//! 取り込みエリアコンポーネント
//!
//! 写真1枚をドラッグ&ドロップまたはクリックで選択する。
//! カメラ撮影への切り替えボタンもここに置く。

use leptos::prelude::*;
use photo_lingo_common::{CaptureInput, Error};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, FileList};

use crate::capture::read_file;

#[component]
pub fn CaptureArea<F, FC>(
    /// 解析中は新しい取り込みを受け付けない
    disabled: Signal<bool>,
    on_capture: F,
    on_open_camera: FC,
) -> impl IntoView
where
    F: Fn(Result<(CaptureInput, String), Error>) + 'static + Clone,
    FC: Fn(()) + 'static + Clone,
{
    let (is_dragover, set_is_dragover) = signal(false);
    let is_enabled = move || !disabled.get();

    // 複数ファイルが来ても先頭の1枚だけを取り込む
    let handle_files = {
        let on_capture = on_capture.clone();
        move |files: FileList| {
            if let Some(file) = files.get(0) {
                read_file(file, on_capture.clone());
            }
        }
    };

    let on_drop = {
        let handle_files = handle_files.clone();
        move |ev: DragEvent| {
            ev.prevent_default();
            set_is_dragover.set(false);

            if !is_enabled() {
                return;
            }

            if let Some(dt) = ev.data_transfer() {
                if let Some(files) = dt.files() {
                    handle_files(files);
                }
            }
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        if is_enabled() {
            set_is_dragover.set(true);
        }
    };

    let on_dragleave = move |_: DragEvent| {
        set_is_dragover.set(false);
    };

    let on_click = {
        let handle_files = handle_files.clone();
        move |_| {
            if !is_enabled() {
                return;
            }

            // ファイル選択ダイアログを開く
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let Ok(input) = document.create_element("input") else {
                return;
            };
            let Ok(input) = input.dyn_into::<web_sys::HtmlInputElement>() else {
                return;
            };
            input.set_type("file");
            input.set_accept("image/*");

            let handle_files = handle_files.clone();
            let input_clone = input.clone();
            let closure = Closure::wrap(Box::new(move |_: web_sys::Event| {
                if let Some(files) = input_clone.files() {
                    handle_files(files);
                }
            }) as Box<dyn FnMut(_)>);

            input.set_onchange(Some(closure.as_ref().unchecked_ref()));
            closure.forget();
            input.click();
        }
    };

    view! {
        <div
            class=move || {
                let mut classes = vec!["capture-area"];
                if is_dragover.get() {
                    classes.push("dragover");
                }
                if !is_enabled() {
                    classes.push("disabled");
                }
                classes.join(" ")
            }
            on:drop=on_drop
            on:dragover=on_dragover
            on:dragleave=on_dragleave
            on:click=on_click
        >
            <div class="capture-icon">"📷"</div>
            <p>"写真をドラッグ&ドロップ または クリックして選択"</p>
            <p class="text-muted">"対応形式: JPEG, PNG, WebP"</p>
            <button
                class="btn btn-secondary"
                disabled=move || !is_enabled()
                on:click={
                    let on_open_camera = on_open_camera.clone();
                    move |ev: web_sys::MouseEvent| {
                        // 取り込みエリア自体のクリック（ファイル選択）を抑止
                        ev.stop_propagation();
                        on_open_camera(());
                    }
                }
            >
                "カメラで撮影"
            </button>
        </div>
    }
}
