use clap::Parser;
use photo_lingo_rust::{ai_provider, analyzer, cli, config, deck, error, quiz, speech};

use ai_provider::AiProvider;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use photo_lingo_common::{AnalysisResult, AnalysisSession, NullAnnouncer, SpeechAnnouncer};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let provider = cli
        .provider
        .unwrap_or_else(|| AiProvider::from_config_name(&config.default_provider));

    match cli.command {
        Commands::Analyze {
            image,
            output,
            speak,
            lang,
        } => {
            println!("📸 photo-lingo - 写真解析\n");

            let options = analyzer::AnalyzeOptions {
                provider,
                max_image_size: config.max_image_size,
                mock_delay_ms: config.mock_delay_ms,
                verbose: cli.verbose,
            };
            let announcer: Box<dyn SpeechAnnouncer> = if speak {
                Box::new(speech::CommandSpeech::blocking(
                    config.resolved_speech_command(),
                ))
            } else {
                Box::new(NullAnnouncer)
            };
            let mut session = AnalysisSession::new(announcer);

            println!("[1/2] AI解析中... ({})", provider.as_str());
            let result = analyzer::analyze_file(&image, &mut session, &options).await?;
            println!("✔ 解析完了\n");

            print_result(&result);

            if let Some(output) = output {
                println!("\n[2/2] 結果を保存中...");
                let json = serde_json::to_string_pretty(&result)?;
                std::fs::write(&output, json)?;
                println!("✔ 結果を保存: {}", output.display());
            }

            if speak {
                let lang = lang.unwrap_or_else(|| config.speech_lang.clone());
                println!("\n🔊 読み上げ中...");
                session.announce(&result.description, &lang);
            }

            println!("\n✅ 完了");
        }

        Commands::Deck {
            folder,
            output,
            use_cache,
            recursive,
        } => {
            println!("📚 photo-lingo - デッキ作成\n");

            let options = analyzer::AnalyzeOptions {
                provider,
                max_image_size: config.max_image_size,
                mock_delay_ms: config.mock_delay_ms,
                verbose: cli.verbose,
            };

            println!(
                "[1/2] フォルダを解析中...{}",
                if use_cache { " (キャッシュ有効)" } else { "" }
            );
            let analyses = analyzer::analyze_folder(&folder, recursive, use_cache, &options).await?;
            let cached_count = analyses.iter().filter(|a| a.from_cache).count();
            println!(
                "✔ {}枚を解析 (キャッシュ利用: {}枚)\n",
                analyses.len(),
                cached_count
            );

            println!("[2/2] デッキを保存中...");
            let entries = analyses
                .into_iter()
                .map(|a| deck::DeckEntry::from_result(a.image.file_name, a.result))
                .collect();
            let deck_file = deck::Deck::new(entries);
            let output = output.unwrap_or_else(|| folder.join("deck.json"));
            deck_file.save(&output)?;
            println!(
                "✔ デッキを保存: {} ({}枚, {}語)",
                output.display(),
                deck_file.len(),
                deck_file.vocabulary().len()
            );

            println!("\n✅ 完了");
        }

        Commands::Quiz { deck, count } => {
            quiz::run_quiz(&deck, count)?;
        }

        Commands::Speak { text, lang } => {
            let lang = lang.unwrap_or_else(|| config.speech_lang.clone());
            let mut session = AnalysisSession::new(Box::new(speech::CommandSpeech::blocking(
                config.resolved_speech_command(),
            )));

            println!("🔊 読み上げ: {}", text);
            session.announce(&text, &lang);
        }

        Commands::Config {
            set_provider,
            set_lang,
            show,
        } => {
            let mut config = config;
            let mut changed = false;

            if let Some(provider) = set_provider {
                config.default_provider = provider.as_str().to_string();
                changed = true;
                println!("✔ プロバイダを設定: {}", provider.as_str());
            }

            if let Some(lang) = set_lang {
                config.speech_lang = lang.clone();
                changed = true;
                println!("✔ 読み上げ言語を設定: {}", lang);
            }

            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定: {}", Config::config_path()?.display());
                println!("  プロバイダ: {}", config.default_provider);
                println!("  読み上げ言語: {}", config.speech_lang);
                println!(
                    "  読み上げコマンド: {}",
                    config.speech_command.as_deref().unwrap_or("(OS標準)")
                );
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  モック遅延: {}ms", config.mock_delay_ms);
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| std::path::PathBuf::from("."));
            let cache_path = analyzer::cache::CacheFile::cache_path(&target);

            if info || !clear {
                // デフォルトまたは--info: 情報表示
                if cache_path.exists() {
                    let cache = analyzer::cache::CacheFile::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match analyzer::cache::CacheFile::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}

/// 解析結果の表示
fn print_result(result: &AnalysisResult) {
    if result.is_mock() {
        println!("⚠ AIモデル未検出のため、サンプル結果を表示しています\n");
    }

    println!("📝 {}", result.description);
    println!();
    for keyword in &result.keywords {
        match result.phonetic_for(keyword) {
            Some(phonetic) => println!("  • {} [{}]", keyword, phonetic),
            None => println!("  • {}", keyword),
        }
    }
}
