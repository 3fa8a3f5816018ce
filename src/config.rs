//! 設定ファイルとデータの置き場所
//!
//! 設定はシステム全体の rc を読んでからユーザーの rc を読む。
//! 1 行 1 コマンドで、`set` と `map` だけを受け付ける。

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{FileError, Result};
use crate::viewer::Viewer;

/// システム全体の設定ファイル
pub const GLOBAL_RC: &str = "/etc/folio/folio.rc";
/// 設定ディレクトリ内の設定ファイル名
pub const RC_FILE: &str = "folio.rc";
/// データディレクトリ内のブックマークファイル名
pub const BOOKMARKS_FILE: &str = "bookmarks.json";

/// 設定とデータのディレクトリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

impl Paths {
    /// コマンドラインの指定を優先し、なければ XDG の既定を使う
    pub fn resolve(config_dir: Option<&Path>, data_dir: Option<&Path>) -> Self {
        let config_dir = config_dir.map(expand).unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("folio")
        });
        let data_dir = data_dir.map(expand).unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("folio")
        });
        Self {
            config_dir,
            data_dir,
        }
    }

    /// 読む順の設定ファイル
    pub fn rc_files(&self) -> Vec<PathBuf> {
        vec![PathBuf::from(GLOBAL_RC), self.config_dir.join(RC_FILE)]
    }

    pub fn bookmarks_file(&self) -> PathBuf {
        self.data_dir.join(BOOKMARKS_FILE)
    }

    /// 設定ディレクトリとデータディレクトリを作る
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.data_dir] {
            fs::create_dir_all(dir).map_err(|err| FileError::from_io(&err, dir))?;
        }
        Ok(())
    }
}

/// 設定ファイルのコマンド行（空行と `#` コメントは除く）
///
/// ファイルが無ければ空を返す
pub fn read_config_lines(path: &Path) -> Result<Vec<String>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(FileError::from_io(&err, path).into()),
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// すべての設定ファイルを順に適用する。失敗した行は警告して読み飛ばす
pub fn load_config(viewer: &mut Viewer, paths: &Paths) -> usize {
    let mut applied = 0;
    for path in paths.rc_files() {
        let lines = match read_config_lines(&path) {
            Ok(lines) => lines,
            Err(err) => {
                log::warn!("could not read {}: {}", path.display(), err);
                continue;
            }
        };
        for line in lines {
            match viewer.run_config_line(&line) {
                Ok(()) => applied += 1,
                Err(err) => log::warn!("{}: '{}': {}", path.display(), line, err),
            }
        }
        log::debug!("loaded configuration from {}", path.display());
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::MemoryBookmarkStore;
    use crate::document::TextLoader;
    use crate::settings::Settings;

    #[test]
    fn reads_commands_and_skips_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RC_FILE);
        fs::write(&path, "# comment\n\nset scroll_step 5\n  map x quit\n").unwrap();

        let lines = read_config_lines(&path).unwrap();
        assert_eq!(lines, vec!["set scroll_step 5", "map x quit"]);
        assert!(read_config_lines(&dir.path().join("missing.rc")).unwrap().is_empty());
    }

    #[test]
    fn explicit_directories_win() {
        let paths = Paths::resolve(Some(Path::new("/tmp/cfg")), Some(Path::new("/tmp/data")));
        assert_eq!(paths.rc_files()[1], PathBuf::from("/tmp/cfg/folio.rc"));
        assert_eq!(paths.bookmarks_file(), PathBuf::from("/tmp/data/bookmarks.json"));
    }

    #[test]
    fn creates_config_and_data_directories() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("config/folio");
        let data_dir = dir.path().join("data/folio");
        let paths = Paths::resolve(Some(&config_dir), Some(&data_dir));

        paths.ensure_dirs().unwrap();
        assert!(config_dir.is_dir());
        assert!(data_dir.is_dir());
        // 既にあっても失敗しない
        paths.ensure_dirs().unwrap();
    }

    #[test]
    fn applies_user_configuration() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(RC_FILE),
            "set scroll_step 7\nset no_such_option 1\nmap x quit\n",
        )
        .unwrap();
        let paths = Paths::resolve(Some(dir.path()), Some(dir.path()));

        let mut viewer = Viewer::new(
            Settings::default(),
            Box::new(TextLoader),
            Box::new(MemoryBookmarkStore::new()),
        )
        .unwrap();
        let before = viewer.bindings().len();
        load_config(&mut viewer, &paths);

        assert_eq!(viewer.settings().scroll_step, 7.0);
        assert_eq!(viewer.bindings().len(), before + 1);
    }
}
