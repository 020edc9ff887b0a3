//! 読み上げ（CLI側）
//!
//! OS標準のTTSコマンドを子プロセスとして起動する:
//! - macOS: say
//! - Linux: espeak
//! - Windows: PowerShell (System.Speech)
//!
//! コマンドはconfigまたは環境変数PHOTO_LINGO_TTSで差し替えられる。

use photo_lingo_common::SpeechAnnouncer;
use std::process::{Child, Command, Stdio};

pub struct CommandSpeech {
    override_command: Option<String>,
    /// trueなら発話の完了を待つ（CLIの1回きりの読み上げ用）
    blocking: bool,
    child: Option<Child>,
    warned: bool,
}

impl CommandSpeech {
    pub fn new(override_command: Option<String>) -> Self {
        CommandSpeech {
            override_command,
            blocking: false,
            child: None,
            warned: false,
        }
    }

    /// 発話完了まで待つモード
    ///
    /// CLIは読み上げ直後にプロセスが終了するため、
    /// 待たないと発話が途中で切れる。
    pub fn blocking(override_command: Option<String>) -> Self {
        CommandSpeech {
            override_command,
            blocking: true,
            child: None,
            warned: false,
        }
    }

    fn invocation(&self, text: &str, lang: &str) -> (String, Vec<String>) {
        if let Some(cmd) = &self.override_command {
            return (cmd.clone(), vec![text.to_string()]);
        }
        default_invocation(text, lang)
    }
}

/// espeak用のvoice名（"en-US" -> "en-us"）
#[cfg(all(unix, not(target_os = "macos")))]
fn espeak_voice(lang: &str) -> String {
    lang.to_lowercase()
}

#[cfg(target_os = "macos")]
fn default_invocation(text: &str, _lang: &str) -> (String, Vec<String>) {
    ("say".to_string(), vec![text.to_string()])
}

#[cfg(all(unix, not(target_os = "macos")))]
fn default_invocation(text: &str, lang: &str) -> (String, Vec<String>) {
    (
        "espeak".to_string(),
        vec!["-v".to_string(), espeak_voice(lang), text.to_string()],
    )
}

#[cfg(windows)]
fn default_invocation(text: &str, _lang: &str) -> (String, Vec<String>) {
    let escaped = text.replace('\'', "''");
    (
        "powershell".to_string(),
        vec![
            "-Command".to_string(),
            format!(
                "Add-Type -AssemblyName System.Speech; (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak('{}')",
                escaped
            ),
        ],
    )
}

impl SpeechAnnouncer for CommandSpeech {
    fn speak(&mut self, text: &str, lang: &str) {
        self.cancel();

        let (program, args) = self.invocation(text, lang);
        let spawned = Command::new(&program)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                if self.blocking {
                    let _ = child.wait();
                } else {
                    self.child = Some(child);
                }
            }
            Err(e) => {
                if !self.warned {
                    log::warn!(
                        "読み上げコマンド {} を起動できません（読み上げなしで続行）: {}",
                        program,
                        e
                    );
                    self.warned = true;
                }
            }
        }
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            match child.try_wait() {
                // すでに終了していれば何もしない
                Ok(Some(_)) => {}
                _ => {
                    let _ = child.kill();
                    let _ = child.wait();
                }
            }
        }
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        self.cancel();
    }
}
