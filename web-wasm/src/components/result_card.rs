//! 解析結果カードコンポーネント
//!
//! 英文説明と単語チップ（発音表記つき）を表示する。
//! 説明文・単語はそれぞれタップで読み上げられる。

use leptos::prelude::*;
use photo_lingo_common::AnalysisResult;

#[component]
pub fn ResultCard<FS, FR>(
    result: Signal<AnalysisResult>,
    on_speak: FS,
    on_clear: FR,
) -> impl IntoView
where
    FS: Fn(String) + 'static + Clone + Send,
    FR: Fn(()) + 'static + Clone + Send,
{
    let on_speak_description = {
        let on_speak = on_speak.clone();
        move |_| on_speak(result.get_untracked().description)
    };

    view! {
        <div class="result-card">
            <Show when=move || result.get().is_mock()>
                <div class="mock-banner">
                    "⚠ AIモデル未検出のため、サンプル結果を表示しています"
                </div>
            </Show>

            <div class="description-row">
                <p class="description">{move || result.get().description}</p>
                <button class="btn btn-small btn-secondary" on:click=on_speak_description>
                    "🔊 読み上げ"
                </button>
            </div>

            <div class="keyword-list">
                <For
                    each=move || result.get().keywords
                    key=|word| word.clone()
                    children={
                        let on_speak = on_speak.clone();
                        move |word: String| {
                            let phonetic = result
                                .with_untracked(|r| r.phonetic_for(&word).map(str::to_string));
                            let on_speak = on_speak.clone();
                            let spoken = word.clone();
                            view! {
                                <button
                                    class="keyword-chip"
                                    on:click=move |_| on_speak(spoken.clone())
                                >
                                    <span class="keyword">{word.clone()}</span>
                                    {phonetic.map(|p| {
                                        view! { <span class="phonetic">"[" {p} "]"</span> }
                                    })}
                                </button>
                            }
                        }
                    }
                />
            </div>

            <div class="result-actions">
                <button
                    class="btn btn-tertiary"
                    on:click={
                        let on_clear = on_clear.clone();
                        move |_| on_clear(())
                    }
                >
                    "クリア"
                </button>
            </div>
        </div>
    }
}
