//! 読み上げ（Web側）
//!
//! SpeechSynthesis APIを共通のSpeechAnnouncerトレイトとして包む。
//! キューは使わず、常に最新の発話だけを再生する。

use photo_lingo_common::SpeechAnnouncer;
use web_sys::{SpeechSynthesis, SpeechSynthesisUtterance};

pub struct SynthesisAnnouncer {
    synthesis: Option<SpeechSynthesis>,
    warned: bool,
}

impl SynthesisAnnouncer {
    pub fn new() -> Self {
        let synthesis = web_sys::window().and_then(|w| w.speech_synthesis().ok());
        SynthesisAnnouncer {
            synthesis,
            warned: false,
        }
    }
}

impl Default for SynthesisAnnouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechAnnouncer for SynthesisAnnouncer {
    fn speak(&mut self, text: &str, lang: &str) {
        // SpeechSynthesis.speakは既定でキューに積む。常に最新だけを
        // 再生する契約なので、先に進行中の発話を打ち切る
        self.cancel();

        let Some(synthesis) = &self.synthesis else {
            if !self.warned {
                gloo::console::warn!(
                    "SpeechSynthesis APIが利用できないため、読み上げなしで続行します"
                );
                self.warned = true;
            }
            return;
        };

        let Ok(utterance) = SpeechSynthesisUtterance::new_with_text(text) else {
            return;
        };
        utterance.set_lang(lang);
        utterance.set_rate(1.0);
        utterance.set_pitch(1.0);
        synthesis.speak(&utterance);
    }

    fn cancel(&mut self) {
        if let Some(synthesis) = &self.synthesis {
            synthesis.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    /// 連続で呼んでも落ちない。2回目のspeakは1回目を打ち切って差し替える
    #[wasm_bindgen_test]
    fn test_speak_twice_replaces_utterance() {
        let mut announcer = SynthesisAnnouncer::new();
        announcer.speak("coffee", "en-US");
        announcer.speak("cup", "en-US");
        announcer.cancel();
    }

    /// API未対応環境でもspeak/cancelは安全なno-op
    #[wasm_bindgen_test]
    fn test_missing_api_is_noop() {
        let mut announcer = SynthesisAnnouncer {
            synthesis: None,
            warned: false,
        };
        announcer.speak("coffee", "en-US");
        announcer.speak("cup", "en-US");
        announcer.cancel();
        assert!(announcer.warned);
    }
}
