//! コマンドライン引数

use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use tempfile::NamedTempFile;

use crate::error::{FileError, Result};
use crate::logging::LogLevel;

/// 端末で動く vim 風の文書ビューア
#[derive(Debug, Clone, Parser)]
#[command(name = "folio", version, about)]
pub struct Cli {
    /// 設定ディレクトリ
    #[arg(short = 'c', long = "config-dir", value_name = "PATH")]
    pub config_dir: Option<PathBuf>,

    /// データディレクトリ（ブックマークの保存先）
    #[arg(short = 'd', long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// 埋め込み先のウィンドウ ID（端末版では記録のみ）
    #[arg(short = 'e', long = "reparent", value_name = "XID")]
    pub reparent: Option<String>,

    /// ログの出力先
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// ログレベル（debug, info, warning, error）。省略時は `FOLIO_LOG`
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// デバッグログを有効にする
    #[arg(long)]
    pub debug: bool,

    /// 開くファイル（`-` で標準入力）
    pub file: Option<String>,

    /// 文書のパスワード
    pub password: Option<String>,
}

impl Cli {
    pub fn log_level(&self) -> LogLevel {
        if self.debug {
            return LogLevel::Debug;
        }
        LogLevel::from_env(self.log_level.as_deref())
    }
}

/// 開く対象
#[derive(Debug)]
pub enum Source {
    Path(PathBuf),
    /// 標準入力を書き出した一時ファイル。ビューアが閉じるまで保持する
    Stdin(NamedTempFile),
}

impl Source {
    pub fn path(&self) -> PathBuf {
        match self {
            Source::Path(path) => path.clone(),
            Source::Stdin(file) => file.path().to_path_buf(),
        }
    }
}

/// ファイル引数を解釈する。`-` なら標準入力を一時ファイルへ移す
pub fn resolve_source(file: &str) -> Result<Source> {
    if file != "-" {
        let expanded = shellexpand::tilde(file);
        return Ok(Source::Path(PathBuf::from(expanded.as_ref())));
    }

    let mut content = Vec::new();
    io::stdin().read_to_end(&mut content)?;
    spool(&content)
}

fn spool(content: &[u8]) -> Result<Source> {
    let mut temp = tempfile::Builder::new()
        .prefix("folio-stdin-")
        .tempfile()
        .map_err(FileError::from)?;
    temp.write_all(content)?;
    temp.flush()?;
    Ok(Source::Stdin(temp))
}
