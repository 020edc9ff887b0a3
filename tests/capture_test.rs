//! 取り込み機能テスト
//!
//! 画像ファイル → CaptureInput 変換を検証

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use photo_lingo_rust::capture::capture_from_file;
use tempfile::tempdir;

/// 小さいPNGはそのままのバイト列がbase64化される
#[test]
fn test_capture_small_png_keeps_original_bytes() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("tiny.png");
    image::RgbImage::new(8, 8).save(&path).expect("PNG保存失敗");

    let input = capture_from_file(&path, 1280).expect("取り込み失敗");

    assert_eq!(input.mime_type, "image/png");
    assert_eq!(input.label, "tiny.png");

    let decoded = STANDARD.decode(&input.image_base64).expect("base64不正");
    assert_eq!(decoded, std::fs::read(&path).unwrap());
}

/// 長辺が上限を超える画像は縮小してJPEGで再エンコードされる
#[test]
fn test_capture_large_image_is_resized_to_jpeg() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("big.png");
    image::RgbImage::new(64, 32).save(&path).expect("PNG保存失敗");

    let input = capture_from_file(&path, 16).expect("取り込み失敗");

    assert_eq!(input.mime_type, "image/jpeg");

    let decoded = STANDARD.decode(&input.image_base64).expect("base64不正");
    let resized = image::load_from_memory(&decoded).expect("JPEGデコード失敗");
    assert!(resized.width() <= 16);
    assert!(resized.height() <= 16);
    // アスペクト比は保たれる（64x32 → 16x8）
    assert_eq!(resized.width(), 16);
    assert_eq!(resized.height(), 8);
}

/// JPEGファイルのMIMEタイプ
#[test]
fn test_capture_jpeg_mime_type() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("photo.jpg");
    image::RgbImage::new(4, 4).save(&path).expect("JPEG保存失敗");

    let input = capture_from_file(&path, 1280).expect("取り込み失敗");
    assert_eq!(input.mime_type, "image/jpeg");
}

/// 存在しないファイル・非対応形式はそれぞれ別のエラーになる
#[test]
fn test_capture_failures_are_distinct() {
    use photo_lingo_rust::error::PhotoLingoError;

    let dir = tempdir().expect("Failed to create temp dir");

    let missing = capture_from_file(&dir.path().join("nope.jpg"), 1280);
    assert!(matches!(missing, Err(PhotoLingoError::FileNotFound(_))));

    let text_path = dir.path().join("notes.txt");
    std::fs::write(&text_path, "not an image").unwrap();
    let unsupported = capture_from_file(&text_path, 1280);
    assert!(matches!(unsupported, Err(PhotoLingoError::ImageLoad(_))));

    // 拡張子は画像でも中身が壊れている場合
    let broken_path = dir.path().join("broken.png");
    std::fs::write(&broken_path, "garbage bytes").unwrap();
    let broken = capture_from_file(&broken_path, 1280);
    assert!(matches!(broken, Err(PhotoLingoError::ImageLoad(_))));
}
