//! `:` コマンドの実行と設定ファイルの行

use std::path::PathBuf;
use std::process::Command as Process;

use super::{AdjustMode, GotoMode, ViewKind, Viewer};
use crate::bookmarks::{self, Bookmark};
use crate::command::CommandAction;
use crate::document::{self, ExportKind};
use crate::error::{DocumentError, FileError, InputError, Result, SystemError};
use crate::input::names::mode_from_name;
use crate::input::{parse_key_spec, Argument, Mode, ShortcutFunction};

/// コマンド実行後のインプットバーの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// インプットバーを閉じて文書ビューへ戻る
    Done,
    /// 入力行だけ消し、今のビューを保つ
    KeepView,
}

/// `~` と環境変数を展開する
fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(err) => {
            log::debug!("could not expand '{}': {}", raw, err);
            PathBuf::from(shellexpand::tilde(raw).as_ref())
        }
    }
}

/// シェルに渡す単一引用符クォート
fn shell_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', r"'\''"))
}

/// `%s` を順に埋める。足りない分は空文字
fn fill_placeholders(template: &str, values: &[&str]) -> String {
    let mut values = values.iter();
    let mut pieces = template.split("%s");
    let mut filled = pieces.next().unwrap_or_default().to_string();
    for piece in pieces {
        filled.push_str(values.next().copied().unwrap_or_default());
        filled.push_str(piece);
    }
    filled
}

impl Viewer {
    /// 登録済みコマンドを実行する
    pub fn run_command(&mut self, action: CommandAction, arguments: &[&str]) -> Result<CommandOutcome> {
        log::debug!("command {:?} {:?}", action, arguments);
        match action {
            CommandAction::Bookmark => self.cmd_bookmark(arguments),
            CommandAction::Close => {
                self.close_document();
                Ok(CommandOutcome::Done)
            }
            CommandAction::DeleteBookmark => self.cmd_delete_bookmark(arguments),
            CommandAction::Export => self.cmd_export(arguments),
            CommandAction::Info => {
                if self.document.is_none() {
                    return Err(DocumentError::NotOpened.into());
                }
                self.view = if self.view == ViewKind::Info {
                    ViewKind::Document
                } else {
                    ViewKind::Info
                };
                Ok(CommandOutcome::KeepView)
            }
            CommandAction::Map => self.cmd_map(arguments),
            CommandAction::Offset => self.cmd_offset(arguments),
            CommandAction::Open => {
                if arguments.is_empty() {
                    return Ok(CommandOutcome::Done);
                }
                let path = expand_path(&arguments.join(" "));
                self.open_document(&path, None)?;
                Ok(CommandOutcome::Done)
            }
            CommandAction::OpenBookmark => self.cmd_open_bookmark(arguments),
            CommandAction::Print => self.cmd_print(arguments),
            CommandAction::Quit => {
                self.quit();
                Ok(CommandOutcome::Done)
            }
            CommandAction::Rotate => {
                self.rotate();
                Ok(CommandOutcome::Done)
            }
            CommandAction::Set => self.cmd_set(arguments),
            CommandAction::Write => self.cmd_write(arguments, false),
            CommandAction::WriteForce => self.cmd_write(arguments, true),
        }
    }

    /// 設定ファイルの 1 行（`set` と `map` だけを解釈する）
    pub fn run_config_line(&mut self, line: &str) -> Result<()> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((name, arguments)) = tokens.split_first() else {
            return Ok(());
        };
        match *name {
            "set" => self.run_command(CommandAction::Set, arguments).map(|_| ()),
            "map" => self.run_command(CommandAction::Map, arguments).map(|_| ()),
            other => {
                log::warn!("ignoring unknown configuration command '{}'", other);
                Ok(())
            }
        }
    }

    fn cmd_bookmark(&mut self, arguments: &[&str]) -> Result<CommandOutcome> {
        let Some(document) = self.document.as_mut() else {
            return Err(DocumentError::NotOpened.into());
        };
        if arguments.is_empty() {
            return Err(InputError::EmptyBookmarkName.into());
        }

        let id = arguments.join(" ");
        if bookmarks::is_reserved(&id) {
            return Err(InputError::ReservedBookmarkName { name: id }.into());
        }

        let replaced = document.bookmarks.upsert(Bookmark {
            id: id.clone(),
            page: document.page,
            scale: document.scale,
            position: document.position,
        });
        log::info!(
            "{} bookmark '{}' at page {}",
            if replaced { "updated" } else { "added" },
            id,
            document.page + 1
        );
        self.persist_bookmarks()?;
        let verb = if replaced { "updated" } else { "created" };
        self.notify_info(format!("Bookmark successfully {}: {}", verb, id));
        Ok(CommandOutcome::Done)
    }

    fn cmd_open_bookmark(&mut self, arguments: &[&str]) -> Result<CommandOutcome> {
        let Some(document) = &self.document else {
            return Err(DocumentError::NotOpened.into());
        };
        let id = arguments.join(" ");
        let Some(bookmark) = document.bookmarks.find(&id).cloned() else {
            return Err(InputError::BookmarkNotFound { name: id }.into());
        };

        if !self.set_page(bookmark.page) {
            return Ok(CommandOutcome::Done);
        }
        if let Some(document) = self.document.as_mut() {
            if document.scale != bookmark.scale {
                document.scale = bookmark.scale;
                self.adjust_mode = AdjustMode::None;
            }
            document.position = bookmark.position;
        }
        self.clamp_position();
        self.update_scroll_percentage();
        Ok(CommandOutcome::Done)
    }

    fn cmd_delete_bookmark(&mut self, arguments: &[&str]) -> Result<CommandOutcome> {
        let Some(document) = self.document.as_mut() else {
            return Err(DocumentError::NotOpened.into());
        };
        let id = arguments.join(" ");
        if document.bookmarks.remove(&id) {
            self.persist_bookmarks()?;
            self.notify_info(format!("Removed bookmark: {}", id));
        } else {
            log::debug!("no bookmark named '{}' to delete", id);
        }
        Ok(CommandOutcome::Done)
    }

    fn cmd_export(&mut self, arguments: &[&str]) -> Result<CommandOutcome> {
        let Some(document) = &self.document else {
            return Err(DocumentError::NotOpened.into());
        };
        let (kind_name, path) = match arguments {
            [] => return Ok(CommandOutcome::Done),
            [_] => return Err(InputError::MissingExportPath.into()),
            [kind, path @ ..] => (*kind, path.join(" ")),
        };
        let kind = match kind_name {
            "images" => ExportKind::Images,
            "attachments" => ExportKind::Attachments,
            other => {
                return Err(InputError::InvalidArgument {
                    arg: other.to_string(),
                }
                .into())
            }
        };

        let directory = expand_path(&path);
        let count = document::lock(&document.engine)?.export(kind, &directory)?;
        if count == 0 {
            return Err(InputError::NothingToExport {
                what: kind_name.to_string(),
            }
            .into());
        }
        log::info!("exported {} {} to {}", count, kind_name, directory.display());
        Ok(CommandOutcome::Done)
    }

    fn cmd_map(&mut self, arguments: &[&str]) -> Result<CommandOutcome> {
        let [key, function, rest @ ..] = arguments else {
            return Ok(CommandOutcome::Done);
        };
        let function = ShortcutFunction::from_name(function).ok_or_else(|| {
            InputError::UnknownShortcut {
                name: function.to_string(),
            }
        })?;
        let spec = parse_key_spec(key)?;
        let argument = rest.first().map_or(Argument::None, |token| Argument::parse(token));
        let mode = match rest.get(1).and_then(|name| mode_from_name(name)) {
            Some(mode) => mode,
            None => Mode::NORMAL,
        };

        let outcome = self
            .bindings
            .bind(spec.mask, spec.key, mode, function, argument);
        log::debug!("map {} -> {} ({:?})", key, function.name(), outcome);
        Ok(CommandOutcome::Done)
    }

    fn cmd_offset(&mut self, arguments: &[&str]) -> Result<CommandOutcome> {
        let Some(document) = self.document.as_mut() else {
            return Err(DocumentError::NotOpened.into());
        };
        let Some(token) = arguments.first() else {
            return Ok(CommandOutcome::Done);
        };
        let value: i64 = token.parse().map_err(|_| InputError::InvalidArgument {
            arg: token.to_string(),
        })?;

        document.page_offset = document.page as i64 + 1 - value;
        self.goto_mode = if document.page_offset != 0 {
            GotoMode::Offset
        } else if document.labels_enabled {
            GotoMode::Labels
        } else {
            GotoMode::Default
        };
        Ok(CommandOutcome::Done)
    }

    fn cmd_print(&mut self, arguments: &[&str]) -> Result<CommandOutcome> {
        let Some(document) = &self.document else {
            return Err(DocumentError::NotOpened.into());
        };
        let Some(printer) = arguments.first() else {
            return Err(InputError::MissingPrinter.into());
        };

        let sites = arguments
            .get(1)
            .map_or_else(|| format!("1-{}", document.page_count), |sites| sites.to_string());
        let additional = arguments.get(2..).map_or_else(String::new, |rest| rest.join(" "));
        let file = shell_quote(&document.path.display().to_string());

        let command = fill_placeholders(
            &self.settings.print_command,
            &[printer, sites.as_str(), additional.as_str(), file.as_str()],
        );
        log::info!("print: {}", command);

        let status = Process::new("sh")
            .arg("-c")
            .arg(&command)
            .status()
            .map_err(|err| SystemError::SystemCallFailed {
                call: format!("{}: {}", command, err),
            })?;
        if !status.success() {
            return Err(SystemError::SystemCallFailed { call: command }.into());
        }
        Ok(CommandOutcome::Done)
    }

    fn cmd_set(&mut self, arguments: &[&str]) -> Result<CommandOutcome> {
        let Some((name, values)) = arguments.split_first() else {
            return Err(crate::error::ConfigError::MissingValue {
                key: "set".to_string(),
            }
            .into());
        };

        let effect = self.settings.set(name, values)?;
        if effect.reinit {
            self.inputbar.set_visible(self.settings.show_inputbar);
            self.statusbar_visible = self.settings.show_statusbar;
        }
        if effect.render {
            self.search.state_mut().needs_redraw = true;
        }
        Ok(CommandOutcome::Done)
    }

    fn cmd_write(&mut self, arguments: &[&str], force: bool) -> Result<CommandOutcome> {
        let Some(document) = &self.document else {
            return Err(DocumentError::NotOpened.into());
        };
        if arguments.is_empty() {
            return Ok(CommandOutcome::Done);
        }

        let path = expand_path(&arguments.join(" "));
        if path.exists() && !force {
            return Err(FileError::AlreadyExists {
                path: path.display().to_string(),
            }
            .into());
        }
        document::lock(&document.engine)?.save_as(&path)?;
        log::info!("saved {} as {}", document.path.display(), path.display());
        Ok(CommandOutcome::Done)
    }
}
