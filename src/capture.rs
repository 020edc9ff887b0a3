//! 写真の取り込み（CLI側）
//!
//! ファイルパスから画像を読み込み、必要なら縮小して
//! base64エンコード済みのCaptureInputを作る。

use crate::error::{PhotoLingoError, Result};
use crate::scanner::is_image_extension;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::GenericImageView;
use photo_lingo_common::{CaptureInput, PreviewHandle};
use std::io::Cursor;
use std::path::Path;

/// ファイルパスのプレビュー
///
/// CLIではプレビューは単なるパス表示で、OS側の解放処理は無い。
/// releaseで表示対象から外れたことだけを記録する。
#[derive(Debug)]
pub struct PathPreview {
    path: String,
    released: bool,
}

impl PathPreview {
    pub fn new(path: &Path) -> Self {
        PathPreview {
            path: path.display().to_string(),
            released: false,
        }
    }

    pub fn path(&self) -> Option<&str> {
        if self.released {
            None
        } else {
            Some(&self.path)
        }
    }
}

impl PreviewHandle for PathPreview {
    fn release(&mut self) {
        if !self.released {
            log::debug!("プレビュー解放: {}", self.path);
            self.released = true;
        }
    }
}

/// 拡張子からMIMEタイプを引く
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// 画像ファイルからCaptureInputを作る
///
/// 長辺がmax_sizeを超える画像は縮小し、JPEGで再エンコードする。
/// 収まっている画像は元のバイト列をそのまま使う。
pub fn capture_from_file(path: &Path, max_size: u32) -> Result<CaptureInput> {
    if !path.exists() {
        return Err(PhotoLingoError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    if !is_image_extension(&ext) {
        return Err(PhotoLingoError::ImageLoad(format!(
            "対応していない画像形式です: {}",
            path.display()
        )));
    }

    let img = image::open(path)
        .map_err(|e| PhotoLingoError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    let (width, height) = img.dimensions();

    let (bytes, mime_type) = if width.max(height) > max_size {
        log::debug!(
            "画像を縮小: {}x{} -> 長辺{}以内",
            width,
            height,
            max_size
        );
        let resized = img.resize(max_size, max_size, image::imageops::FilterType::Triangle);
        // JPEGはアルファ非対応のためRGBへ落とす
        let rgb = image::DynamicImage::ImageRgb8(resized.to_rgb8());
        let mut buf = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .map_err(|e| PhotoLingoError::ImageLoad(format!("JPEG再エンコード失敗: {}", e)))?;
        (buf, "image/jpeg")
    } else {
        (std::fs::read(path)?, mime_for_extension(&ext))
    };

    let image_base64 = STANDARD.encode(&bytes);
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(CaptureInput::new(
        image_base64,
        mime_type,
        Box::new(PathPreview::new(path)),
        label,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension("jpg"), "image/jpeg");
        assert_eq!(mime_for_extension("JPEG"), "image/jpeg");
        assert_eq!(mime_for_extension("png"), "image/png");
        assert_eq!(mime_for_extension("webp"), "image/webp");
        assert_eq!(mime_for_extension("bin"), "application/octet-stream");
    }

    #[test]
    fn test_path_preview_release() {
        let mut preview = PathPreview::new(Path::new("/tmp/cat.jpg"));
        assert!(preview.path().is_some());

        preview.release();
        assert!(preview.path().is_none());

        // 二重解放は安全
        preview.release();
        assert!(preview.path().is_none());
    }

    #[test]
    fn test_capture_missing_file() {
        let result = capture_from_file(Path::new("/nonexistent/cat.jpg"), 1280);
        assert!(matches!(result, Err(PhotoLingoError::FileNotFound(_))));
    }

    #[test]
    fn test_capture_unsupported_extension() {
        let temp_dir = std::env::temp_dir().join("photo-lingo-test-capture-ext");
        std::fs::create_dir_all(&temp_dir).unwrap();
        let path = temp_dir.join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();

        let result = capture_from_file(&path, 1280);
        assert!(matches!(result, Err(PhotoLingoError::ImageLoad(_))));

        std::fs::remove_dir_all(&temp_dir).ok();
    }
}
