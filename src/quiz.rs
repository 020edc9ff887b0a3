//! 対話式単語クイズモジュール
//!
//! デッキの語彙から出題する。説明文の中の単語を伏せ字にして表示し、
//! ユーザーが単語を答える。

use crate::deck::{Deck, VocabEntry};
use crate::error::{PhotoLingoError, Result};
use dialoguer::Input;
use std::path::Path;

/// 説明文の中の単語を伏せ字にする
///
/// 大文字小文字は無視し、単語境界（英数字でない文字）で区切られた
/// 出現だけをマスクする。"cat" が "scatter" を壊すことはない。
pub fn mask_word(description: &str, word: &str) -> String {
    let word_chars: Vec<char> = word.chars().map(|c| c.to_ascii_lowercase()).collect();
    if word_chars.is_empty() {
        return description.to_string();
    }

    let desc_chars: Vec<char> = description.chars().collect();
    let n = desc_chars.len();
    let m = word_chars.len();

    let mut masked = String::with_capacity(description.len());
    let mut i = 0;
    while i < n {
        let matches = i + m <= n
            && desc_chars[i..i + m]
                .iter()
                .zip(&word_chars)
                .all(|(a, b)| a.to_ascii_lowercase() == *b)
            && (i == 0 || !desc_chars[i - 1].is_alphanumeric())
            && (i + m == n || !desc_chars[i + m].is_alphanumeric());

        if matches {
            masked.push_str("____");
            i += m;
        } else {
            masked.push(desc_chars[i]);
            i += 1;
        }
    }

    masked
}

/// 回答判定（前後空白と大文字小文字を無視）
pub fn check_answer(answer: &str, word: &str) -> bool {
    answer.trim().eq_ignore_ascii_case(word.trim())
}

/// クイズ中の操作
pub enum QuizAction {
    /// 回答を入力
    Answer(String),
    /// この問題をスキップ（正解を表示）
    Skip,
    /// クイズを終了
    Quit,
}

/// 対話式クイズを実行
pub fn run_quiz(deck_path: &Path, count: Option<usize>) -> Result<()> {
    let deck = Deck::load(deck_path)?;
    let vocab = deck.vocabulary();

    if vocab.is_empty() {
        println!("デッキに単語がありません: {}", deck_path.display());
        return Ok(());
    }

    let total = count
        .map(|c| c.min(vocab.len()))
        .unwrap_or(vocab.len());

    println!("✏️  単語クイズ - {}問", total);
    println!("---");
    println!("操作: [Enter/s]スキップ [q]終了 それ以外は回答として判定");
    println!("---\n");

    let mut correct = 0usize;
    let mut answered = 0usize;

    for (idx, entry) in vocab.iter().take(total).enumerate() {
        println!("[{}/{}] {}", idx + 1, total, mask_word(&entry.description, &entry.word));
        if let Some(phonetic) = &entry.phonetic {
            println!("  発音: {}", phonetic);
        }

        match prompt_quiz_action()? {
            QuizAction::Quit => {
                println!("終了します\n");
                break;
            }
            QuizAction::Skip => {
                println!("  → 正解: {} ({})\n", entry.word, entry.file_name);
            }
            QuizAction::Answer(answer) => {
                answered += 1;
                if check_answer(&answer, &entry.word) {
                    correct += 1;
                    println!("  ✓ 正解!\n");
                } else {
                    println!("  ✗ 不正解 (正解: {})\n", entry.word);
                }
            }
        }
    }

    if answered > 0 {
        println!("🎉 スコア: {}/{}", correct, answered);
    }

    Ok(())
}

/// 回答入力プロンプト
fn prompt_quiz_action() -> Result<QuizAction> {
    let input: String = Input::new()
        .with_prompt("単語")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| PhotoLingoError::CliExecution(e.to_string()))?;

    let trimmed = input.trim();

    match trimmed {
        "" | "s" => Ok(QuizAction::Skip),
        "q" | "Q" => Ok(QuizAction::Quit),
        _ => Ok(QuizAction::Answer(trimmed.to_string())),
    }
}
