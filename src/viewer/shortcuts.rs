//! ショートカット・バッファコマンド・マーカーの実行

use super::markers::LAST_PAGE_MARKER;
use super::{AdjustMode, GotoMode, IndexView, ViewKind, Viewer};
use crate::document;
use crate::error::{DocumentError, ErrorDisplay};
use crate::input::names::mode_from_name;
use crate::input::{ArgKind, Argument, BufferAction, KeySym, Mode, ShortcutFunction};
use crate::search::SearchDirection;

/// バッファ末尾の 1 文字を除いた数値部分（`12G` なら 12）
///
/// 桁あふれは飽和させる。数字が無ければ `None`
pub fn leading_number(buffer: &str) -> Option<i64> {
    let mut chars = buffer.chars();
    chars.next_back()?;
    let digits = chars.as_str();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse::<i64>().unwrap_or(i64::MAX))
}

impl Viewer {
    /// バインディングに対応する処理を実行する
    pub fn run_shortcut(&mut self, function: ShortcutFunction, argument: &Argument) {
        let kind = argument.kind();
        match function {
            ShortcutFunction::Abort => self.abort(),
            ShortcutFunction::AdjustWindow => self.adjust_window(AdjustMode::from_kind(kind)),
            ShortcutFunction::ChangeBuffer => {
                if kind == Some(ArgKind::DeleteLast) {
                    self.buffer.pop_or_clear();
                }
            }
            ShortcutFunction::ChangeMode => self.change_mode(argument),
            ShortcutFunction::FocusInputbar => self.focus_prompt(argument),
            ShortcutFunction::Navigate => {
                if let Some(kind) = kind {
                    self.navigate(kind);
                }
            }
            ShortcutFunction::NavigateIndex => {
                if let Some(kind) = kind {
                    self.navigate_index(kind);
                }
            }
            ShortcutFunction::Paginate => {
                if let Some(kind) = kind {
                    self.paginate(kind);
                }
            }
            ShortcutFunction::Quit => self.quit(),
            ShortcutFunction::Recolor => {
                self.settings.recolor = !self.settings.recolor;
                self.search.state_mut().needs_redraw = true;
            }
            ShortcutFunction::Reload => {
                if let Err(err) = self.reload() {
                    self.notify_error(&err);
                }
            }
            ShortcutFunction::Rotate => self.rotate(),
            ShortcutFunction::Flip => self.flip(),
            ShortcutFunction::Scroll => {
                if let Some(kind) = kind {
                    self.scroll(kind);
                }
            }
            ShortcutFunction::Search => {
                let direction = kind
                    .and_then(SearchDirection::from_kind)
                    .unwrap_or(SearchDirection::Forward);
                self.search(direction, None);
            }
            ShortcutFunction::SwitchGotoMode => self.switch_goto_mode(),
            ShortcutFunction::ToggleFullscreen => self.toggle_fullscreen(),
            ShortcutFunction::ToggleIndex => self.toggle_index(),
            ShortcutFunction::ToggleInputbar => self.inputbar.toggle_visible(),
            ShortcutFunction::ToggleStatusbar => self.statusbar_visible = !self.statusbar_visible,
            ShortcutFunction::Zoom => {
                let value = match argument {
                    Argument::Number(value) => Some(*value),
                    _ => None,
                };
                self.zoom(kind, value);
            }
        }
    }

    /// バッファ規則に一致したときの処理
    pub fn run_buffer_action(&mut self, action: BufferAction, argument: &Argument, buffer: &str) {
        match action {
            BufferAction::Goto => self.goto_buffer(buffer),
            BufferAction::Scroll => {
                if let Some(percentage) = leading_number(buffer) {
                    self.scroll_to_percentage(percentage);
                }
            }
            BufferAction::Zoom => self.zoom(argument.kind(), leading_number(buffer)),
        }
    }

    /// マーカー擬似モードでのキー
    pub(super) fn handle_marker(&mut self, mode: Mode, key: KeySym) {
        let id = key.to_char();
        self.mode = Mode::NORMAL;

        let (Some(id), Some((page, position))) = (
            id,
            self.document
                .as_ref()
                .map(|document| (document.page, document.position)),
        ) else {
            return;
        };

        if mode == Mode::ADD_MARKER {
            if !self.markers.add(id, page, position) {
                log::debug!("invalid marker id {:?}", id);
            }
            return;
        }

        if id == LAST_PAGE_MARKER {
            let target = self.markers.swap_last(page);
            self.set_page(target);
            return;
        }

        let Some(marker) = self.markers.get(id).copied() else {
            return;
        };
        self.markers.swap_last(page);
        if self.set_page(marker.page) {
            if let Some(document) = self.document.as_mut() {
                document.position = marker.position;
            }
        }
    }

    /// `gg` `G` `<n>G`
    fn goto_buffer(&mut self, buffer: &str) {
        let Some(page_count) = self.document.as_ref().map(|document| document.page_count) else {
            return;
        };
        match buffer {
            "gg" => {
                self.set_page(0);
                return;
            }
            "G" => {
                self.set_page(page_count.saturating_sub(1));
                return;
            }
            _ => {}
        }

        let mut chars = buffer.chars();
        chars.next_back();
        let id = chars.as_str();

        if self.goto_mode == GotoMode::Labels {
            let found = self.document.as_ref().and_then(|document| {
                document.labels.iter().position(|label| label == id)
            });
            if let Some(page) = found {
                self.set_page(page);
                return;
            }
        }

        let Some(mut number) = leading_number(buffer) else {
            return;
        };
        if self.goto_mode == GotoMode::Offset {
            let offset = self.document.as_ref().map_or(0, |document| document.page_offset);
            number = number.saturating_add(offset);
        }

        if number < 1 {
            let page = number.max(0) as usize;
            self.notify_error(&DocumentError::PageOutOfRange { page }.into());
            return;
        }
        self.set_page((number - 1) as usize);
    }

    /// スクロール位置を保ったままページを移る
    fn paginate(&mut self, kind: ArgKind) {
        let Some(position) = self.document.as_ref().map(|document| document.position) else {
            return;
        };
        self.navigate(kind);
        if let Some(document) = self.document.as_mut() {
            document.position = position;
        }
        self.clamp_position();
    }

    fn focus_prompt(&mut self, argument: &Argument) {
        let text = match argument {
            Argument::Prompt {
                text,
                append_filepath,
            } => {
                let mut text = text.clone();
                if *append_filepath {
                    if let Some(document) = &self.document {
                        text.push_str(&document.path.display().to_string());
                    }
                }
                text
            }
            Argument::Text(text) => text.clone(),
            _ => return,
        };
        self.focus_inputbar(&text);
    }

    /// モード切り替え
    pub fn change_mode(&mut self, argument: &Argument) {
        self.mode = match argument {
            Argument::Kind(ArgKind::AddMarker) => Mode::ADD_MARKER,
            Argument::Kind(ArgKind::EvalMarker) => Mode::EVAL_MARKER,
            Argument::Kind(ArgKind::Index) => Mode::INDEX,
            Argument::Kind(ArgKind::Fullscreen) => Mode::FULLSCREEN,
            Argument::Text(name) => match mode_from_name(name) {
                Some(mode) if mode != Mode::ALL => mode,
                _ => Mode::NORMAL,
            },
            _ => Mode::NORMAL,
        };
    }

    /// Labels → Offset → Default → (Labels)
    pub fn switch_goto_mode(&mut self) {
        let labels_enabled = self
            .document
            .as_ref()
            .is_some_and(|document| document.labels_enabled);
        self.goto_mode = match self.goto_mode {
            GotoMode::Labels => GotoMode::Offset,
            GotoMode::Offset => GotoMode::Default,
            GotoMode::Default if labels_enabled => GotoMode::Labels,
            GotoMode::Default => GotoMode::Offset,
        };
    }

    /// 全画面の切り替え。バーを隠してページ全体に合わせる
    pub fn toggle_fullscreen(&mut self) {
        if self.mode == Mode::FULLSCREEN {
            self.mode = Mode::NORMAL;
            self.statusbar_visible = self.settings.show_statusbar;
            self.abort_inputbar();
            self.inputbar.set_visible(self.settings.show_inputbar);
        } else {
            self.mode = Mode::FULLSCREEN;
            self.statusbar_visible = false;
            self.adjust_window(AdjustMode::BestFit);
            self.abort_inputbar();
        }
    }

    /// 目次ビューの切り替え
    pub fn toggle_index(&mut self) {
        let Some(document) = &self.document else {
            return;
        };

        if self.view == ViewKind::Index {
            self.view = ViewKind::Document;
            self.mode = Mode::NORMAL;
            return;
        }

        if self.index.is_none() {
            let outline = document::lock(&document.engine).map(|engine| engine.outline());
            let outline = match outline {
                Ok(outline) => outline,
                Err(err) => {
                    self.notify_error(&err);
                    return;
                }
            };
            self.index = IndexView::new(outline);
        }

        if self.index.is_none() {
            self.notify_error(&DocumentError::NoIndex.into());
            return;
        }
        self.view = ViewKind::Index;
        self.mode = Mode::INDEX;
    }

    /// 目次の移動と選択
    pub fn navigate_index(&mut self, kind: ArgKind) {
        let Some(index) = self.index.as_mut() else {
            return;
        };
        match kind {
            ArgKind::Up => index.up(),
            ArgKind::Down => index.down(),
            ArgKind::Expand => index.expand(),
            ArgKind::Collapse => index.collapse(),
            ArgKind::Select => {
                let Some(page) = index.selected().map(|entry| entry.page) else {
                    return;
                };
                self.mode = Mode::NORMAL;
                self.set_page(page);
            }
            _ => {}
        }
    }

    /// 情報メッセージをインプットバーへ
    pub fn notify_info(&mut self, message: impl Into<String>) {
        self.inputbar.notify(ErrorDisplay::info(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::MemoryBookmarkStore;
    use crate::document::TextLoader;
    use crate::input::KeyEvent;
    use crate::settings::Settings;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn viewer_with_pages(pages: usize) -> (Viewer, NamedTempFile) {
        let mut file = NamedTempFile::new().unwrap();
        let text: Vec<String> = (0..pages).map(|page| format!("page {}", page + 1)).collect();
        write!(file, "{}", text.join("\u{0c}")).unwrap();

        let mut viewer = Viewer::new(
            Settings::default(),
            Box::new(TextLoader),
            Box::new(MemoryBookmarkStore::new()),
        )
        .unwrap();
        viewer.open_document(file.path(), None).unwrap();
        (viewer, file)
    }

    fn type_keys(viewer: &mut Viewer, keys: &str) {
        for c in keys.chars() {
            viewer.handle_key(KeyEvent::char(c));
        }
    }

    #[test]
    fn leading_number_parses_prefix() {
        assert_eq!(leading_number("12G"), Some(12));
        assert_eq!(leading_number("G"), None);
        assert_eq!(leading_number("99999999999999999999999G"), Some(i64::MAX));
    }

    #[test]
    fn buffer_goto_commands() {
        let (mut viewer, _file) = viewer_with_pages(20);
        type_keys(&mut viewer, "12G");
        assert_eq!(viewer.current_page(), Some(11));
        assert!(viewer.buffer().is_empty());

        type_keys(&mut viewer, "G");
        assert_eq!(viewer.current_page(), Some(19));
        type_keys(&mut viewer, "gg");
        assert_eq!(viewer.current_page(), Some(0));
    }

    #[test]
    fn offset_goto_mode_shifts_pages() {
        let (mut viewer, _file) = viewer_with_pages(20);
        viewer.goto_mode = GotoMode::Offset;
        if let Some(document) = viewer.document.as_mut() {
            document.page_offset = 2;
        }
        type_keys(&mut viewer, "3G");
        assert_eq!(viewer.current_page(), Some(4));
    }

    #[test]
    fn markers_jump_back() {
        let (mut viewer, _file) = viewer_with_pages(10);
        viewer.set_page(3);
        type_keys(&mut viewer, "ma");
        assert_eq!(viewer.mode(), Mode::NORMAL);

        viewer.set_page(8);
        type_keys(&mut viewer, "'a");
        assert_eq!(viewer.current_page(), Some(3));

        type_keys(&mut viewer, "''");
        assert_eq!(viewer.current_page(), Some(8));
    }

    #[test]
    fn goto_mode_cycle_without_labels() {
        let (mut viewer, _file) = viewer_with_pages(2);
        assert_eq!(viewer.goto_mode(), GotoMode::Default);
        viewer.switch_goto_mode();
        assert_eq!(viewer.goto_mode(), GotoMode::Offset);
        viewer.switch_goto_mode();
        assert_eq!(viewer.goto_mode(), GotoMode::Default);
    }

    #[test]
    fn fullscreen_hides_bars() {
        let (mut viewer, _file) = viewer_with_pages(2);
        viewer.toggle_fullscreen();
        assert_eq!(viewer.mode(), Mode::FULLSCREEN);
        assert!(!viewer.is_statusbar_visible());
        assert!(!viewer.inputbar().is_visible());

        viewer.toggle_fullscreen();
        assert_eq!(viewer.mode(), Mode::NORMAL);
        assert!(viewer.is_statusbar_visible());
        assert!(viewer.inputbar().is_visible());
    }

    #[test]
    fn index_without_outline_warns() {
        let (mut viewer, _file) = viewer_with_pages(2);
        viewer.toggle_index();
        assert_eq!(viewer.view(), ViewKind::Document);
        assert_eq!(
            viewer.inputbar().notification().map(|n| n.message.as_str()),
            Some("This document does not contain any index")
        );
    }

    #[test]
    fn change_mode_by_name() {
        let (mut viewer, _file) = viewer_with_pages(1);
        viewer.change_mode(&Argument::Text("index".to_string()));
        assert_eq!(viewer.mode(), Mode::INDEX);
        viewer.change_mode(&Argument::Text("all".to_string()));
        assert_eq!(viewer.mode(), Mode::NORMAL);
    }
}
