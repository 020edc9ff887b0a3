//! 解析オーケストレーション（CLI側）
//!
//! 取り込み → セッション → インタープリター の流れを束ね、
//! 1枚解析とフォルダ一括解析を提供する。

pub mod cache;
mod provider;

pub use provider::CliCompletion;

use crate::ai_provider::AiProvider;
use crate::capture::capture_from_file;
use crate::error::{PhotoLingoError, Result};
use crate::scanner::{scan_folder, ImageInfo};
use indicatif::ProgressBar;
use photo_lingo_common::{
    submit_capture, AnalysisResult, AnalysisSession, Interpreter, ProcessingStatus,
};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub provider: AiProvider,
    pub max_image_size: u32,
    pub mock_delay_ms: u64,
    pub verbose: bool,
}

/// フォルダ一括解析の1件ぶんの結果
#[derive(Debug, Clone)]
pub struct FolderAnalysis {
    pub image: ImageInfo,
    pub result: AnalysisResult,
    pub from_cache: bool,
}

/// 1枚の画像を解析する
///
/// セッションは呼び出し側が所有する。読み上げ付きで実行したい場合は
/// アナウンサーを差したセッションを渡す。
pub async fn analyze_file(
    path: &Path,
    session: &mut AnalysisSession,
    options: &AnalyzeOptions,
) -> Result<AnalysisResult> {
    let input = capture_from_file(path, options.max_image_size)?;
    let interpreter = Interpreter::new(CliCompletion::new(
        options.provider,
        options.mock_delay_ms,
        options.verbose,
    ));

    let status = submit_capture(session, &interpreter, input).await;
    match status {
        ProcessingStatus::Success => match session.result() {
            Some(result) => Ok(result.clone()),
            None => Err(PhotoLingoError::AnalysisFailed("結果がありません".into())),
        },
        _ => Err(PhotoLingoError::AnalysisFailed(
            session
                .error_message()
                .unwrap_or("不明なエラー")
                .to_string(),
        )),
    }
}

/// フォルダ内の画像を一括解析する
///
/// キャッシュ使用時はファイルハッシュが一致する画像をスキップする。
/// 1枚の失敗で全体を止めず、読めない・解析できない画像は警告を出して飛ばす。
pub async fn analyze_folder(
    folder: &Path,
    recursive: bool,
    use_cache: bool,
    options: &AnalyzeOptions,
) -> Result<Vec<FolderAnalysis>> {
    let images = scan_folder(folder, recursive)?;
    if images.is_empty() {
        return Err(PhotoLingoError::NoImagesFound(folder.display().to_string()));
    }

    let mut cache = if use_cache {
        cache::CacheFile::load(folder)
    } else {
        cache::CacheFile::default()
    };

    // キャッシュ無効時はハッシュ計算そのものを省く
    let (cached, uncached) = if use_cache {
        cache::filter_cached_images(&images, &cache)
    } else {
        let uncached = images
            .iter()
            .map(|image| (image.clone(), String::new()))
            .collect();
        (Vec::new(), uncached)
    };
    if options.verbose && !cached.is_empty() {
        println!("  キャッシュ利用: {}枚", cached.len());
    }

    let interpreter = Interpreter::new(CliCompletion::new(
        options.provider,
        options.mock_delay_ms,
        options.verbose,
    ));
    let mut session = AnalysisSession::new(Box::new(photo_lingo_common::NullAnnouncer));

    let bar = ProgressBar::new(images.len() as u64);
    let mut analyses: Vec<FolderAnalysis> = Vec::new();

    for (image, result) in cached {
        bar.inc(1);
        analyses.push(FolderAnalysis {
            image,
            result,
            from_cache: true,
        });
    }

    for (image, hash) in uncached {
        bar.set_message(image.file_name.clone());

        let input = match capture_from_file(&image.path, options.max_image_size) {
            Ok(input) => input,
            Err(e) => {
                log::warn!("取り込み失敗、スキップ: {} ({})", image.file_name, e);
                bar.inc(1);
                continue;
            }
        };

        let status = submit_capture(&mut session, &interpreter, input).await;
        match status {
            ProcessingStatus::Success => {
                if let Some(result) = session.result() {
                    if use_cache && !hash.is_empty() {
                        let file_size = std::fs::metadata(&image.path)
                            .map(|m| m.len())
                            .unwrap_or(0);
                        cache.insert(hash, image.file_name.clone(), file_size, result.clone());
                    }
                    analyses.push(FolderAnalysis {
                        image,
                        result: result.clone(),
                        from_cache: false,
                    });
                }
            }
            _ => {
                log::warn!(
                    "解析失敗、スキップ: {} ({})",
                    image.file_name,
                    session.error_message().unwrap_or("不明なエラー")
                );
            }
        }
        bar.inc(1);
    }

    bar.finish_and_clear();

    if use_cache {
        cache.save(folder)?;
    }

    // スキャン順（ファイル名順）に揃える
    analyses.sort_by(|a, b| a.image.file_name.cmp(&b.image.file_name));

    Ok(analyses)
}
