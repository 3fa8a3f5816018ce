//! ブックマークの保存
//!
//! ファイルごとに名前付きブックマークと、閉じたときの位置を記録する。
//! 保存形式は JSON（キーは文書の絶対パス）。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FileError, Result};

/// 位置保存用に予約された名前
pub const RESERVED_NAMES: &[&str] = &["page", "offset", "scale"];

/// 予約名か
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// ページ内の表示位置
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PagePosition {
    pub x: f64,
    pub y: f64,
}

/// 名前付きブックマーク
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    /// ページ番号（0 始まり）
    pub page: usize,
    /// 拡大率（%）
    pub scale: i64,
    #[serde(default)]
    pub position: PagePosition,
}

/// 最後に閉じたときの状態
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LastPosition {
    pub page: usize,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub scale: Option<i64>,
}

/// 1 ファイル分のブックマーク
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileBookmarks {
    #[serde(default)]
    pub last: Option<LastPosition>,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

impl FileBookmarks {
    /// 追加する。同名があれば上書きして true を返す
    pub fn upsert(&mut self, bookmark: Bookmark) -> bool {
        match self.bookmarks.iter_mut().find(|existing| existing.id == bookmark.id) {
            Some(existing) => {
                *existing = bookmark;
                true
            }
            None => {
                self.bookmarks.push(bookmark);
                false
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|bookmark| bookmark.id == id)
    }

    /// 削除する。見つからなければ false
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|bookmark| bookmark.id != id);
        before != self.bookmarks.len()
    }

    pub fn ids_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Bookmark> + 'a {
        self.bookmarks
            .iter()
            .filter(move |bookmark| bookmark.id.starts_with(prefix))
    }
}

/// ブックマークの永続化先
pub trait BookmarkStore {
    /// 文書のブックマークを読み込む（未登録なら空）
    fn load(&mut self, document: &str) -> Result<FileBookmarks>;

    /// 文書のブックマークを書き込む
    fn save(&mut self, document: &str, bookmarks: &FileBookmarks) -> Result<()>;
}

/// JSON ファイルに保存するストア
#[derive(Debug, Clone)]
pub struct JsonBookmarkStore {
    path: PathBuf,
}

impl JsonBookmarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, FileBookmarks>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(FileError::from_io(&err, &self.path).into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|err| {
            log::warn!("could not parse bookmark file {}: {}", self.path.display(), err);
            ConfigError::InvalidFile {
                path: self.path.display().to_string(),
            }
            .into()
        })
    }
}

impl BookmarkStore for JsonBookmarkStore {
    fn load(&mut self, document: &str) -> Result<FileBookmarks> {
        let mut all = self.read_all()?;
        Ok(all.remove(document).unwrap_or_default())
    }

    fn save(&mut self, document: &str, bookmarks: &FileBookmarks) -> Result<()> {
        // 他の文書の項目を消さないよう毎回読み直してから書く
        let mut all = self.read_all()?;
        all.insert(document.to_string(), bookmarks.clone());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| FileError::from_io(&err, parent))?;
            }
        }

        let content = serde_json::to_string_pretty(&all).map_err(|err| FileError::Io {
            message: err.to_string(),
        })?;
        fs::write(&self.path, content).map_err(|err| FileError::from_io(&err, &self.path))?;
        log::debug!("bookmarks saved to {}", self.path.display());
        Ok(())
    }
}

/// メモリ上だけのストア（データディレクトリが使えないときとテスト用）
#[derive(Debug, Clone, Default)]
pub struct MemoryBookmarkStore {
    files: BTreeMap<String, FileBookmarks>,
}

impl MemoryBookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookmarkStore for MemoryBookmarkStore {
    fn load(&mut self, document: &str) -> Result<FileBookmarks> {
        Ok(self.files.get(document).cloned().unwrap_or_default())
    }

    fn save(&mut self, document: &str, bookmarks: &FileBookmarks) -> Result<()> {
        self.files.insert(document.to_string(), bookmarks.clone());
        Ok(())
    }
}
