//! エラーハンドリングシステム
//!
//! folio 全体で使用される統一されたエラー型とユーティリティを定義
//! 致命的エラーは即座に強制終了し、それ以外はインプットバーへ通知する

use std::time::{Duration, Instant};
use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug, Clone)]
pub enum FolioError {
    /// ファイル操作エラー
    #[error("File operation failed: {0}")]
    File(#[from] FileError),

    /// ドキュメント操作エラー
    #[error("Document operation failed: {0}")]
    Document(#[from] DocumentError),

    /// UI操作エラー
    #[error("UI operation failed: {0}")]
    Ui(#[from] UiError),

    /// 入力処理エラー
    #[error("Input processing failed: {0}")]
    Input(#[from] InputError),

    /// システムエラー
    #[error("System error: {0}")]
    System(#[from] SystemError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// ファイル操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("File already exists: {path}. Use :write! to overwrite it.")]
    AlreadyExists { path: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

/// ドキュメント操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("No document opened.")]
    NotOpened,

    #[error("Could not open page {page}")]
    PageOutOfRange { page: usize },

    #[error("Document lock poisoned")]
    LockPoisoned,

    #[error("This document does not contain any index")]
    NoIndex,

    #[error("File does not exist")]
    FileMissing { path: String },
}

/// UI操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UiError {
    #[error("Terminal initialization failed")]
    TerminalInit,

    #[error("Rendering failed: {component}")]
    RenderingFailed { component: String },
}

/// 入力処理固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("No valid key binding given.")]
    InvalidKeySpec { spec: String },

    #[error("No valid modifier given.")]
    InvalidModifier { spec: String },

    #[error("No such shortcut function exists")]
    UnknownShortcut { name: String },

    #[error("Unknown command.")]
    CommandNotFound { command: String },

    #[error("Invalid argument: {arg}")]
    InvalidArgument { arg: String },

    #[error("Invalid buffer pattern: {pattern}")]
    InvalidPattern { pattern: String },

    #[error("No export path specified")]
    MissingExportPath,

    #[error("No printer specified")]
    MissingPrinter,

    #[error("Can't set bookmark: bookmark name is empty")]
    EmptyBookmarkName,

    #[error("Can't set bookmark: reserved bookmark name")]
    ReservedBookmarkName { name: String },

    #[error("No matching bookmark found")]
    BookmarkNotFound { name: String },

    #[error("This document does not contain any {what}")]
    NothingToExport { what: String },
}

/// システム固有のエラー（致命的）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SystemError {
    #[error("Out of memory")]
    OutOfMemory,

    #[error("Search worker failed: {message}")]
    Worker { message: String },

    #[error("System call failed: {call}")]
    SystemCallFailed { call: String },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown option: {name}")]
    UnknownOption { name: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing value for {key}")]
    MissingValue { key: String },

    #[error("Invalid configuration file: {path}")]
    InvalidFile { path: String },
}

/// エラーレベル分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Info,
    Warning,
    Error,
    Fatal,
}

/// インプットバーに表示する通知
#[derive(Debug, Clone)]
pub struct ErrorDisplay {
    /// 表示メッセージ
    pub message: String,
    /// 通知レベル
    pub level: ErrorLevel,
    /// 表示開始時刻
    pub start_time: Instant,
    /// 表示持続時間
    pub duration: Duration,
}

impl ErrorDisplay {
    pub fn new(error: &FolioError) -> Self {
        let (message, level) = Self::format_error(error);
        Self::with_level(message, level)
    }

    /// 任意のメッセージを指定レベルで通知
    pub fn with_level(message: impl Into<String>, level: ErrorLevel) -> Self {
        Self {
            message: message.into(),
            level,
            start_time: Instant::now(),
            duration: Duration::from_secs(5),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(message, ErrorLevel::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(message, ErrorLevel::Warning)
    }

    fn format_error(error: &FolioError) -> (String, ErrorLevel) {
        match error {
            FolioError::File(inner) => (inner.to_string(), ErrorLevel::Error),
            FolioError::Document(DocumentError::PageOutOfRange { .. }) => {
                ("Could not open page".to_string(), ErrorLevel::Warning)
            }
            FolioError::Document(DocumentError::NoIndex) => {
                (DocumentError::NoIndex.to_string(), ErrorLevel::Warning)
            }
            FolioError::Document(inner) => (inner.to_string(), ErrorLevel::Error),
            FolioError::Input(InputError::CommandNotFound { .. }) => {
                ("Unknown command.".to_string(), ErrorLevel::Error)
            }
            FolioError::Input(inner) => (inner.to_string(), ErrorLevel::Warning),
            FolioError::Config(inner) => (inner.to_string(), ErrorLevel::Warning),
            FolioError::System(SystemError::OutOfMemory) => {
                ("Out of memory".to_string(), ErrorLevel::Fatal)
            }
            FolioError::System(inner) => (inner.to_string(), ErrorLevel::Error),
            FolioError::Ui(UiError::TerminalInit) => {
                ("Terminal initialization failed".to_string(), ErrorLevel::Fatal)
            }
            FolioError::Ui(inner) => (inner.to_string(), ErrorLevel::Error),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.level == ErrorLevel::Fatal
    }

    pub fn is_expired(&self) -> bool {
        self.start_time.elapsed() >= self.duration
    }
}

impl FolioError {
    /// 続行できないエラーか
    pub fn is_fatal(&self) -> bool {
        ErrorDisplay::new(self).is_fatal()
    }
}

/// 致命的エラー処理
pub fn handle_fatal_error(error: &FolioError, context: &str) -> ! {
    crate::frontend::restore_terminal();
    log::error!("FATAL in {}: {:?}", context, error);
    log::error!("Stack trace: {}", std::backtrace::Backtrace::capture());
    log::logger().flush();

    eprintln!("FATAL: {} ({})", error, context);
    std::process::exit(1);
}

/// パニックハンドラの設定
///
/// 端末を raw モードのまま放置しないよう、終了前に復帰処理を呼ぶ
pub fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        crate::frontend::restore_terminal();

        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s
        } else {
            "Unknown panic payload"
        };

        log::error!("PANIC at {}: {}", location, message);
        log::logger().flush();
        eprintln!("PANIC at {}: {}", location, message);
        eprintln!("Stack trace: {}", std::backtrace::Backtrace::capture());

        std::process::exit(1);
    }));
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, FolioError>;

impl From<std::io::Error> for FolioError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::OutOfMemory => FolioError::System(SystemError::OutOfMemory),
            _ => FolioError::File(FileError::from(error)),
        }
    }
}

impl From<std::io::Error> for FileError {
    fn from(error: std::io::Error) -> Self {
        FileError::Io { message: error.to_string() }
    }
}

impl FileError {
    /// パス情報付きで I/O エラーを分類する
    pub fn from_io(error: &std::io::Error, path: &std::path::Path) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            std::io::ErrorKind::NotFound => FileError::NotFound { path },
            std::io::ErrorKind::PermissionDenied => FileError::PermissionDenied { path },
            std::io::ErrorKind::AlreadyExists => FileError::AlreadyExists { path },
            _ => FileError::Io { message: format!("{}: {}", path, error) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_creation() {
        let error = FolioError::File(FileError::NotFound {
            path: "test.pdf".to_string(),
        });
        let display = ErrorDisplay::new(&error);

        assert_eq!(display.level, ErrorLevel::Error);
        assert!(display.message.contains("test.pdf"));
        assert!(!display.is_expired());
    }

    #[test]
    fn test_error_display_expiry() {
        let mut display = ErrorDisplay::warning("No matching bookmark found");
        assert!(!display.is_expired());

        display.start_time = Instant::now() - Duration::from_secs(6);
        assert!(display.is_expired());
    }

    #[test]
    fn test_unknown_command_message() {
        let error = FolioError::Input(InputError::CommandNotFound {
            command: "frobnicate".to_string(),
        });
        let display = ErrorDisplay::new(&error);

        assert_eq!(display.message, "Unknown command.");
        assert_eq!(display.level, ErrorLevel::Error);
    }

    #[test]
    fn test_fatal_error_detection() {
        let display = ErrorDisplay::new(&FolioError::System(SystemError::OutOfMemory));
        assert_eq!(display.level, ErrorLevel::Fatal);

        let io = std::io::Error::new(std::io::ErrorKind::OutOfMemory, "alloc");
        assert!(FolioError::from(io).is_fatal());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!FolioError::from(io).is_fatal());
        assert!(!FolioError::from(DocumentError::NotOpened).is_fatal());
    }

    #[test]
    fn test_io_error_classification() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = FileError::from_io(&io, std::path::Path::new("/tmp/missing.txt"));
        assert_eq!(
            error,
            FileError::NotFound {
                path: "/tmp/missing.txt".to_string()
            }
        );
    }
}
