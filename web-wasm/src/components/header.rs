//! ヘッダーコンポーネント

use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header class="header">
            <h1>"Photo Lingo - 写真で学ぶ英単語"</h1>
        </header>
    }
}
