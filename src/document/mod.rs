//! ドキュメントエンジン
//!
//! 描画側と検索ワーカーの双方から参照されるため、エンジンは
//! `SharedDocument`（`Arc<Mutex<..>>`）越しに扱う。ロックはページ単位の
//! 短い操作の間だけ保持すること。

pub mod text;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{DocumentError, Result};

pub use text::TextDocument;

/// ページ内の矩形（行・列単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRect {
    /// 行番号（0 始まり）
    pub line: usize,
    /// 開始列（文字単位）
    pub start_column: usize,
    /// 終了列（文字単位、排他的）
    pub end_column: usize,
}

impl PageRect {
    pub fn width(&self) -> usize {
        self.end_column.saturating_sub(self.start_column)
    }
}

/// ページの大きさ（列数 × 行数）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// 目次の 1 項目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub title: String,
    /// 遷移先ページ（0 始まり）
    pub page: usize,
    pub children: Vec<OutlineEntry>,
}

/// 書き出し対象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Images,
    Attachments,
}

/// ドキュメントエンジンのインタフェース
pub trait DocumentEngine: Send {
    /// 開いているファイルのパス
    fn path(&self) -> &Path;

    fn page_count(&self) -> usize;

    /// ページラベル（印刷上のページ番号など）
    fn page_label(&self, page: usize) -> Option<String>;

    fn page_size(&self, page: usize) -> Option<PageSize>;

    /// ページの本文を行単位で返す
    fn page_lines(&self, page: usize) -> Option<Vec<String>>;

    /// ページ内のテキスト検索
    fn find_text(&self, page: usize, query: &str) -> Vec<PageRect>;

    /// 文書情報（名前と値の組）
    fn metadata(&self) -> Vec<(String, String)>;

    fn outline(&self) -> Vec<OutlineEntry>;

    /// 別名で保存する
    fn save_as(&self, path: &Path) -> Result<()>;

    /// 画像または添付ファイルを書き出し、書き出した件数を返す
    fn export(&self, kind: ExportKind, directory: &Path) -> Result<usize>;
}

/// 描画側と検索ワーカーで共有するドキュメント
pub type SharedDocument = Arc<Mutex<Box<dyn DocumentEngine>>>;

/// エンジンを共有可能な形に包む
pub fn share(engine: Box<dyn DocumentEngine>) -> SharedDocument {
    Arc::new(Mutex::new(engine))
}

/// ドキュメントロックを取得する
pub fn lock(document: &SharedDocument) -> Result<MutexGuard<'_, Box<dyn DocumentEngine>>> {
    document
        .lock()
        .map_err(|_| DocumentError::LockPoisoned.into())
}

/// 読み込み時の指定
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions<'a> {
    pub password: Option<&'a str>,
    /// テキスト文書の 1 ページの行数
    pub lines_per_page: usize,
}

/// ファイルを開くためのローダ
pub trait DocumentLoader {
    fn load(&self, path: &Path, options: &LoadOptions<'_>) -> Result<Box<dyn DocumentEngine>>;
}

/// テキストファイル用ローダ
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path, options: &LoadOptions<'_>) -> Result<Box<dyn DocumentEngine>> {
        if options.password.is_some() {
            log::info!("password ignored for plain text document {}", path.display());
        }
        let document = TextDocument::open(path, options.lines_per_page)?;
        Ok(Box::new(document))
    }
}

/// 表示用のファイル名
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// 絶対パスへ正規化（失敗時はそのまま）
pub fn absolute_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
