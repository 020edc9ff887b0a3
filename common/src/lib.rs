//! Photo Lingo Common Library
//!
//! CLIとWeb(WASM)で共有される解析コア:
//! 型定義、応答パーサー、プロンプト、能力トレイト、解析セッション

pub mod capability;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod prompts;
pub mod session;
pub mod types;

pub use capability::{
    InertPreview, NullAnnouncer, PreviewHandle, SpeechAnnouncer, TextCompletion,
    DEFAULT_SPEECH_LANG,
};
pub use error::{DeviceErrorKind, Error, Result};
pub use interpreter::Interpreter;
pub use parser::{extract_payload, parse_analysis_response};
pub use prompts::{attach_image_payload, build_analysis_prompt};
pub use session::{submit_capture, AnalysisSession, Generation, PendingCapture};
pub use types::{AnalysisResult, CaptureInput, ProcessingStatus, ResultSource};
