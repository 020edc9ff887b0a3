//! 状態パネルコンポーネント
//!
//! 解析中のスピナーとエラー表示。エラー時はリトライ導線を出す。

use leptos::prelude::*;
use photo_lingo_common::ProcessingStatus;

#[component]
pub fn StatusPanel<FR>(
    status: ReadSignal<ProcessingStatus>,
    error: ReadSignal<Option<String>>,
    on_retry: FR,
) -> impl IntoView
where
    FR: Fn(()) + 'static + Clone + Send + Sync,
{
    view! {
        <Show when=move || status.get().is_processing()>
            <div class="progress-container">
                <div class="spinner"></div>
                <p class="progress-text">"解析中..."</p>
            </div>
        </Show>

        <Show when=move || status.get() == ProcessingStatus::Error>
            <div class="error-box">
                <p class="error-message">{move || error.get().unwrap_or_default()}</p>
                <button
                    class="btn btn-primary"
                    on:click={
                        let on_retry = on_retry.clone();
                        move |_| on_retry(())
                    }
                >
                    "もう一度試す"
                </button>
            </div>
        </Show>
    }
}
