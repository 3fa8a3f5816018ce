//! 補完候補のプロバイダ
//!
//! コマンドごとにパラメータの候補を返す。新しいコマンドは
//! `CompletionProvider` を実装して登録すれば補完に参加できる。

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;

use super::{CompletionContext, CompletionGroup, CompletionResult};
use crate::settings::SETTINGS;

/// パラメータ補完のインタフェース
pub trait CompletionProvider {
    /// 入力途中のパラメータに対する候補を返す
    fn complete(&self, context: &CompletionContext<'_>, partial: &str) -> CompletionResult;
}

impl std::fmt::Debug for dyn CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CompletionProvider")
    }
}

/// ファイルパス補完
///
/// `~` と環境変数を展開して一覧を作るが、候補は入力された形のまま返す。
/// ディレクトリには末尾に `/` を付ける。隠しファイルは `.` から
/// 入力したときだけ候補にする。
#[derive(Debug, Clone, Copy, Default)]
pub struct PathProvider;

impl PathProvider {
    pub fn new() -> Self {
        Self
    }

    /// 入力を（表示用の親ディレクトリ部分, 読み込むディレクトリ, ファイル名の前半）に分ける
    fn split_input(partial: &str) -> (String, PathBuf, String) {
        let (typed_dir, file_prefix) = match partial.rfind('/') {
            Some(index) => (&partial[..=index], &partial[index + 1..]),
            None => ("", partial),
        };

        let directory = if typed_dir.is_empty() {
            PathBuf::from(".")
        } else {
            match shellexpand::full(typed_dir) {
                Ok(expanded) => PathBuf::from(expanded.as_ref()),
                Err(err) => {
                    log::debug!("path expansion failed for {}: {}", typed_dir, err);
                    PathBuf::from(typed_dir)
                }
            }
        };

        (typed_dir.to_string(), directory, file_prefix.to_string())
    }

    fn entries(directory: &Path, prefix: &str) -> Vec<String> {
        let Ok(read_dir) = fs::read_dir(directory) else {
            return Vec::new();
        };

        let show_hidden = prefix.starts_with('.');
        let mut entries: Vec<String> = read_dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if !show_hidden && name.starts_with('.') {
                    return None;
                }
                if !name.starts_with(prefix) {
                    return None;
                }
                let is_dir = entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false)
                    || entry.path().is_dir();
                Some(if is_dir { format!("{}/", name) } else { name })
            })
            .collect();

        entries.sort();
        entries
    }
}

impl CompletionProvider for PathProvider {
    fn complete(&self, _context: &CompletionContext<'_>, partial: &str) -> CompletionResult {
        let (typed_dir, directory, prefix) = Self::split_input(partial);

        let mut group = CompletionGroup::new(None);
        for entry in Self::entries(&directory, &prefix) {
            group.add(format!("{}{}", typed_dir, entry), None);
        }
        CompletionResult::single(group)
    }
}

/// 設定名の補完
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingProvider;

impl CompletionProvider for SettingProvider {
    fn complete(&self, _context: &CompletionContext<'_>, partial: &str) -> CompletionResult {
        let mut group = CompletionGroup::new(None);
        for info in SETTINGS.iter().filter(|info| info.name.starts_with(partial)) {
            group.add(info.name, Some(info.description.to_string()));
        }
        CompletionResult::single(group)
    }
}

/// ブックマーク名の補完
#[derive(Debug, Clone, Copy, Default)]
pub struct BookmarkProvider;

impl CompletionProvider for BookmarkProvider {
    fn complete(&self, context: &CompletionContext<'_>, partial: &str) -> CompletionResult {
        let mut group = CompletionGroup::new(None);
        for bookmark in context.bookmarks.ids_with_prefix(partial) {
            group.add(bookmark.id.clone(), Some(format!("Page {}", bookmark.page + 1)));
        }
        CompletionResult::single(group)
    }
}

/// `export` の対象
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportProvider;

impl CompletionProvider for ExportProvider {
    fn complete(&self, _context: &CompletionContext<'_>, _partial: &str) -> CompletionResult {
        let mut group = CompletionGroup::new(None);
        group.add("images", Some("Export images".to_string()));
        group.add("attachments", Some("Export attachments".to_string()));
        CompletionResult::single(group)
    }
}

/// プリンタ名の補完（`list_printer_command` の出力 1 行を 1 候補とする）
#[derive(Debug, Clone, Copy, Default)]
pub struct PrinterProvider;

impl CompletionProvider for PrinterProvider {
    fn complete(&self, context: &CompletionContext<'_>, partial: &str) -> CompletionResult {
        let mut group = CompletionGroup::new(None);

        let output = ProcessCommand::new("sh")
            .arg("-c")
            .arg(&context.settings.list_printer_command)
            .output();

        match output {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                for printer in stdout.lines().filter(|line| line.starts_with(partial)) {
                    group.add(printer, None);
                }
            }
            Err(err) => log::warn!("could not list printers: {}", err),
        }

        CompletionResult::single(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::{Bookmark, FileBookmarks, PagePosition};
    use crate::settings::Settings;
    use tempfile::TempDir;

    fn values(result: &CompletionResult) -> Vec<String> {
        result
            .groups
            .iter()
            .flat_map(|group| group.elements.iter().map(|element| element.value.clone()))
            .collect()
    }

    fn with_context<R>(f: impl FnOnce(&CompletionContext<'_>) -> R) -> R {
        let settings = Settings::default();
        let mut bookmarks = FileBookmarks::default();
        bookmarks.upsert(Bookmark {
            id: "chapter1".to_string(),
            page: 4,
            scale: 100,
            position: PagePosition::default(),
        });
        bookmarks.upsert(Bookmark {
            id: "appendix".to_string(),
            page: 20,
            scale: 100,
            position: PagePosition::default(),
        });
        let context = CompletionContext {
            settings: &settings,
            bookmarks: &bookmarks,
        };
        f(&context)
    }

    #[test]
    fn path_provider_lists_directory_with_typed_prefix() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("notes")).unwrap();
        fs::write(temp.path().join("notebook.txt"), "").unwrap();
        fs::write(temp.path().join("other.txt"), "").unwrap();
        fs::write(temp.path().join(".hidden"), "").unwrap();

        let typed = format!("{}/no", temp.path().display());
        let result = with_context(|context| PathProvider::new().complete(context, &typed));
        assert_eq!(
            values(&result),
            vec![
                format!("{}/notebook.txt", temp.path().display()),
                format!("{}/notes/", temp.path().display()),
            ]
        );

        let typed = format!("{}/.h", temp.path().display());
        let result = with_context(|context| PathProvider::new().complete(context, &typed));
        assert_eq!(values(&result).len(), 1);
    }

    #[test]
    fn path_provider_handles_missing_directory() {
        let result = with_context(|context| PathProvider::new().complete(context, "/no/such/dir/x"));
        assert!(result.is_empty());
    }

    #[test]
    fn setting_provider_filters_by_prefix() {
        let result = with_context(|context| SettingProvider.complete(context, "zoom_"));
        assert_eq!(values(&result), vec!["zoom_max", "zoom_min", "zoom_step"]);
        assert_eq!(
            result.groups[0].elements[0].description.as_deref(),
            Some("Zoom maximum")
        );
    }

    #[test]
    fn bookmark_provider_shows_page() {
        let result = with_context(|context| BookmarkProvider.complete(context, "ch"));
        assert_eq!(values(&result), vec!["chapter1"]);
        assert_eq!(
            result.groups[0].elements[0].description.as_deref(),
            Some("Page 5")
        );
    }

    #[test]
    fn export_provider_is_fixed() {
        let result = with_context(|context| ExportProvider.complete(context, ""));
        assert_eq!(values(&result), vec!["images", "attachments"]);
    }
}
