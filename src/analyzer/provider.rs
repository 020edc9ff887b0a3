//! AI CLI連携モジュール
//!
//! claude / gemini / codex の各CLIを子プロセスとして呼び出す。
//! プロンプトは画像のbase64を含んで大きくなるため、引数ではなく
//! 標準入力で渡す（Windowsの引数長制限を避ける）。

use crate::ai_provider::AiProvider;
use async_trait::async_trait;
use photo_lingo_common::{Error, TextCompletion};
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;

pub struct CliCompletion {
    provider: AiProvider,
    mock_delay: Duration,
    verbose: bool,
}

impl CliCompletion {
    pub fn new(provider: AiProvider, mock_delay_ms: u64, verbose: bool) -> Self {
        CliCompletion {
            provider,
            mock_delay: Duration::from_millis(mock_delay_ms),
            verbose,
        }
    }

    pub fn provider(&self) -> AiProvider {
        self.provider
    }
}

/// プロンプトを標準入力で渡すときのCLI引数
fn prompt_args(provider: AiProvider) -> Vec<&'static str> {
    match provider {
        AiProvider::Claude => vec!["-p", "--output-format", "text"],
        AiProvider::Gemini => vec![],
        AiProvider::Codex => vec!["exec", "-"],
        AiProvider::Mock => vec![],
    }
}

/// CLIコマンドを構築（Windowsではcmd /c経由）
fn build_command(program: &str, args: &[&str]) -> Command {
    #[cfg(windows)]
    {
        let mut command = Command::new("cmd");
        command.arg("/c").arg(program).args(args);
        command
    }

    #[cfg(not(windows))]
    {
        let mut command = Command::new(program);
        command.args(args);
        command
    }
}

/// CLIが存在し起動できるかを--versionで確認
fn probe_cli(program: &str) -> bool {
    build_command(program, &["--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// CLIを起動してプロンプトを標準入力で渡し、標準出力を回収する
fn run_cli(program: &str, args: &[&str], prompt: &str) -> Result<String, Error> {
    let mut child = build_command(program, args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::Unknown(format!("{} CLI実行エラー: {}", program, e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(prompt.as_bytes())
            .map_err(|e| Error::Unknown(format!("{} CLIへの書き込み失敗: {}", program, e)))?;
        // dropでEOFを送る
    }

    let output = child
        .wait_with_output()
        .map_err(|e| Error::Unknown(format!("{} CLI実行エラー: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Unknown(format!(
            "{} CLI failed (code {:?}): {}",
            program,
            output.status.code(),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[async_trait(?Send)]
impl TextCompletion for CliCompletion {
    async fn is_available(&self) -> bool {
        match self.provider.command_name() {
            Some(program) => probe_cli(program),
            // Mockは常に「モデルなし」として扱い、サンプル結果へ流す
            None => false,
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, Error> {
        let program = match self.provider.command_name() {
            Some(program) => program,
            None => return Err(Error::Unavailable),
        };

        if self.verbose {
            println!("  [{}] プロンプト長: {} chars", program, prompt.len());
        }

        let response = run_cli(program, &prompt_args(self.provider), prompt)?;

        if self.verbose {
            let preview: String = response.chars().take(500).collect();
            println!("  [{}] レスポンス: {}", program, preview);
        }

        Ok(response)
    }

    async fn mock_latency(&self) {
        tokio::time::sleep(self.mock_delay).await;
    }
}
