//! ロギングシステム
//!
//! `log` クレートのバックエンドとして stderr / ファイルへの出力を提供する。
//! 端末UI実行中は画面を壊さないようファイル出力のみを使う。
//! レベルはコマンドライン、環境変数 `FOLIO_LOG`、既定値（warning）の順に決める。

use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// ログレベルを指定する環境変数
pub const LOG_ENV: &str = "FOLIO_LOG";

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn tag(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    fn from_log(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warning,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Debug,
        }
    }

    fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }

    /// `FOLIO_LOG` などの文字列表現から変換
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// コマンドラインの指定、環境変数の順に解釈できたものを使う
    pub fn resolve(flag: Option<&str>, env: Option<&str>) -> Self {
        flag.and_then(Self::parse)
            .or_else(|| env.and_then(Self::parse))
            .unwrap_or(LogLevel::Warning)
    }

    /// `FOLIO_LOG` を読んで解決する
    pub fn from_env(flag: Option<&str>) -> Self {
        let env = std::env::var(LOG_ENV).ok();
        Self::resolve(flag, env.as_deref())
    }
}

/// ロガー
///
/// * 既定では stderr へ出力
/// * `with_file_output` でファイルへ追記
#[derive(Debug)]
pub struct Logger {
    level: LogLevel,
    output_stderr: bool,
    output_file: Option<PathBuf>,
    file: Mutex<Option<File>>,
}

impl Logger {
    /// デフォルト構築
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            output_stderr: true,
            output_file: None,
            file: Mutex::new(None),
        }
    }

    /// 開発者向けロガー
    pub fn for_development() -> Self {
        Self::new(LogLevel::Debug)
    }

    /// ログレベルを取得
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// ログレベルを変更
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// ファイル出力を設定
    pub fn with_file_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// 標準エラー出力を無効化
    pub fn without_stderr(mut self) -> Self {
        self.output_stderr = false;
        self
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    fn format_line(level: LogLevel, target: &str, message: &str) -> String {
        format!("{}: {} in {}", level.tag(), message, target)
    }

    fn write_line(&self, line: &str) {
        if self.output_stderr {
            eprintln!("{}", line);
        }

        let Some(path) = &self.output_file else {
            return;
        };

        let Ok(mut guard) = self.file.lock() else {
            return;
        };

        if guard.is_none() {
            *guard = OpenOptions::new().create(true).append(true).open(path).ok();
        }

        if let Some(file) = guard.as_mut() {
            let _ = writeln!(file, "{}", line);
        }
    }

    /// グローバルロガーとして登録する
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let filter = self.level.filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(filter);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.should_log(LogLevel::from_log(metadata.level()))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = LogLevel::from_log(record.level());
        let message = record.args().to_string();
        self.write_line(&Self::format_line(level, record.target(), &message));
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}
