//! 設定パネルコンポーネント
//!
//! 読み上げ言語の選択。選択はローカルストレージに保存され、
//! 次回起動時に復元される。

use gloo::storage::Storage as _;
use leptos::prelude::*;
use photo_lingo_common::DEFAULT_SPEECH_LANG;

const SPEECH_LANG_STORAGE_KEY: &str = "photo-lingo-speech-lang";

/// 保存済みの読み上げ言語（無ければデフォルト）
pub fn load_speech_lang() -> String {
    gloo::storage::LocalStorage::get(SPEECH_LANG_STORAGE_KEY)
        .unwrap_or_else(|_| DEFAULT_SPEECH_LANG.to_string())
}

#[component]
pub fn SettingsPanel(
    speech_lang: ReadSignal<String>,
    set_speech_lang: WriteSignal<String>,
) -> impl IntoView {
    let on_change = move |ev| {
        let value = event_target_value(&ev);
        if let Err(e) = gloo::storage::LocalStorage::set(SPEECH_LANG_STORAGE_KEY, &value) {
            gloo::console::warn!(format!("読み上げ言語を保存できませんでした: {:?}", e));
        }
        set_speech_lang.set(value);
    };

    view! {
        <div class="settings-panel">
            <div class="form-group">
                <label for="speech-lang">"読み上げ言語"</label>
                <select id="speech-lang" on:change=on_change>
                    <option value="en-US" selected=move || speech_lang.get() == "en-US">
                        "英語（アメリカ）"
                    </option>
                    <option value="en-GB" selected=move || speech_lang.get() == "en-GB">
                        "英語（イギリス）"
                    </option>
                    <option value="en-AU" selected=move || speech_lang.get() == "en-AU">
                        "英語（オーストラリア）"
                    </option>
                </select>
            </div>
        </div>
    }
}
