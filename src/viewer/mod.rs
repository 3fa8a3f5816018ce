//! ビューア本体
//!
//! 入力・コマンド・検索・文書の状態を 1 つのコンテキストにまとめる。
//! ハンドラはすべて `&mut Viewer` を受け取り、グローバルな状態は持たない。

pub mod commands;
pub mod index;
pub mod markers;
pub mod shortcuts;

use std::path::{Path, PathBuf};

use crate::bookmarks::{BookmarkStore, FileBookmarks, PagePosition};
use crate::command::{self, CommandRegistry, Dispatch, EditOutcome, Inputbar};
use crate::completion::{CompletionContext, CompletionDirection, CompletionEngine};
use crate::document::{self, DocumentLoader, LoadOptions, SharedDocument};
use crate::error::{DocumentError, ErrorDisplay, FolioError, Result};
use crate::input::{
    defaults, ArgKind, Argument, BindingTable, BufferAccumulator, BufferRules, InputbarFunction,
    KeyEvent, KeyRouter, KeySym, Mode, Route, ShortcutFunction,
};
use crate::search::{SearchCoordinator, SearchDirection, SearchHit, SearchState};
use crate::settings::Settings;

pub use commands::CommandOutcome;
pub use index::{IndexRow, IndexView};
pub use markers::{Marker, Markers};

/// 文書領域に表示しているもの
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Document,
    Index,
    Info,
}

/// バッファの `<n>G` の解釈
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GotoMode {
    Default,
    Labels,
    Offset,
}

impl GotoMode {
    /// ステータス表示用の 1 文字
    pub fn tag(self) -> &'static str {
        match self {
            GotoMode::Default => "D",
            GotoMode::Labels => "L",
            GotoMode::Offset => "O",
        }
    }
}

/// ページの自動調整
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustMode {
    None,
    BestFit,
    Width,
}

impl AdjustMode {
    pub fn from_kind(kind: Option<ArgKind>) -> Self {
        match kind {
            Some(ArgKind::AdjustBestfit) => AdjustMode::BestFit,
            Some(ArgKind::AdjustWidth) => AdjustMode::Width,
            _ => AdjustMode::None,
        }
    }

    /// `adjust_open` 設定のコード値から
    pub fn from_code(code: i64) -> Self {
        Self::from_kind(ArgKind::from_code(code))
    }
}

/// 文書を描く領域の大きさ（セル単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 80,
            height: 22,
        }
    }
}

/// 開いている文書とその表示状態
pub struct OpenDocument {
    pub engine: SharedDocument,
    pub path: PathBuf,
    /// ブックマークストアのキー
    pub key: String,
    pub password: Option<String>,
    /// 現在ページ（0 始まり）
    pub page: usize,
    pub page_count: usize,
    pub page_offset: i64,
    /// 拡大率（%）
    pub scale: i64,
    pub rotate: i64,
    /// ページ内のスクロール位置（列・行）
    pub position: PagePosition,
    pub scroll_percentage: i64,
    pub bookmarks: FileBookmarks,
    pub labels: Vec<String>,
    pub labels_enabled: bool,
}

/// ステータスバーの内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub file: String,
    pub buffer: String,
    pub state: String,
}

pub struct Viewer {
    settings: Settings,
    bindings: BindingTable<ShortcutFunction>,
    inputbar_bindings: BindingTable<InputbarFunction>,
    buffer_rules: BufferRules,
    buffer: BufferAccumulator,
    registry: CommandRegistry,
    completion: CompletionEngine,
    inputbar: Inputbar,
    search: SearchCoordinator,
    document: Option<OpenDocument>,
    loader: Box<dyn DocumentLoader>,
    bookmark_store: Box<dyn BookmarkStore>,
    mode: Mode,
    view: ViewKind,
    markers: Markers,
    index: Option<IndexView>,
    goto_mode: GotoMode,
    adjust_mode: AdjustMode,
    viewport: Viewport,
    statusbar_visible: bool,
    quit: bool,
}

impl Viewer {
    /// 既定のバインディングと組み込みコマンドで初期化する
    pub fn new(
        settings: Settings,
        loader: Box<dyn DocumentLoader>,
        bookmark_store: Box<dyn BookmarkStore>,
    ) -> Result<Self> {
        let buffer_rules = defaults::default_buffer_rules()?;
        Ok(Self {
            bindings: defaults::default_bindings(),
            inputbar_bindings: defaults::default_inputbar_bindings(),
            buffer_rules,
            buffer: BufferAccumulator::new(),
            registry: CommandRegistry::builtin(),
            completion: CompletionEngine::new(),
            inputbar: Inputbar::new(settings.show_inputbar),
            search: SearchCoordinator::new(),
            document: None,
            loader,
            bookmark_store,
            mode: Mode::NORMAL,
            view: ViewKind::Document,
            markers: Markers::new(),
            index: None,
            goto_mode: GotoMode::Labels,
            adjust_mode: AdjustMode::from_code(settings.adjust_open),
            viewport: Viewport::default(),
            statusbar_visible: settings.show_statusbar,
            quit: false,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn bindings(&self) -> &BindingTable<ShortcutFunction> {
        &self.bindings
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn buffer(&self) -> &BufferAccumulator {
        &self.buffer
    }

    pub fn inputbar(&self) -> &Inputbar {
        &self.inputbar
    }

    pub fn completion(&self) -> &CompletionEngine {
        &self.completion
    }

    pub fn search_state(&self) -> &SearchState {
        self.search.state()
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_running()
    }

    pub fn document(&self) -> Option<&OpenDocument> {
        self.document.as_ref()
    }

    pub fn current_page(&self) -> Option<usize> {
        self.document.as_ref().map(|document| document.page)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn index(&self) -> Option<&IndexView> {
        self.index.as_ref()
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn goto_mode(&self) -> GotoMode {
        self.goto_mode
    }

    pub fn adjust_mode(&self) -> AdjustMode {
        self.adjust_mode
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_statusbar_visible(&self) -> bool {
        self.statusbar_visible
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// 端末サイズが変わったとき
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.apply_adjust_mode();
        self.clamp_position();
    }

    /// 通知を表示してログにも残す
    pub fn notify_error(&mut self, error: &FolioError) {
        if error.is_fatal() {
            crate::error::handle_fatal_error(error, "viewer");
        }
        log::warn!("{}", error);
        self.inputbar.notify(ErrorDisplay::new(error));
    }

    /// キーイベントの入口
    ///
    /// インプットバーにフォーカスがあればそちらへ、なければルータへ渡す。
    /// 何らかの処理をしたら true。
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        if self.inputbar.is_focused() {
            return self.handle_inputbar_key(event);
        }

        let route = KeyRouter::new(&self.bindings, &self.buffer_rules).route(
            event,
            self.mode,
            &mut self.buffer,
        );

        match route {
            Route::Marker { mode, key } => {
                self.handle_marker(mode, key);
                true
            }
            Route::Shortcut { function, argument } => {
                self.run_shortcut(function, &argument);
                true
            }
            Route::Buffer {
                action,
                argument,
                buffer,
            } => {
                self.run_buffer_action(action, &argument, &buffer);
                true
            }
            Route::Pending => true,
            Route::Unhandled => false,
        }
    }

    fn handle_inputbar_key(&mut self, event: KeyEvent) -> bool {
        if let Some(binding) = self.inputbar_bindings.find_subset(event.key, event.mask) {
            let function = binding.handler;
            let argument = binding.argument.clone();
            self.run_inputbar_function(function, &argument);
            return true;
        }

        // キー入力ごとに実行する特殊コマンド（インクリメンタル検索）
        let special = self
            .inputbar
            .identifier()
            .and_then(|identifier| self.registry.special(identifier))
            .filter(|special| special.always)
            .copied();
        if let Some(special) = special {
            let mut input = self.inputbar.input().to_string();
            let direction = if event.key == KeySym::RETURN {
                SearchDirection::None
            } else {
                if let Some(c) = event.insertable_char() {
                    input.push(c);
                }
                special.direction
            };
            self.run_search_command(direction, input);
        }

        if event.key == KeySym::RETURN {
            self.activate_inputbar();
            return true;
        }

        match event.insertable_char() {
            Some(c) => {
                self.completion.end();
                self.inputbar.insert(c);
                true
            }
            None => false,
        }
    }

    fn run_inputbar_function(&mut self, function: InputbarFunction, argument: &Argument) {
        let kind = argument.kind();
        match function {
            InputbarFunction::Abort => {
                self.inputbar.clear_notification();
                self.abort_inputbar();
            }
            InputbarFunction::CommandHistory => {
                self.completion.end();
                self.inputbar.recall_history(kind == Some(ArgKind::Next));
            }
            InputbarFunction::Completion => {
                let direction = match kind {
                    Some(ArgKind::Previous) => CompletionDirection::Previous,
                    Some(ArgKind::NextGroup) => CompletionDirection::NextGroup,
                    Some(ArgKind::PreviousGroup) => CompletionDirection::PreviousGroup,
                    _ => CompletionDirection::Next,
                };
                self.complete(direction);
            }
            InputbarFunction::StringManipulation => {
                let outcome = match kind {
                    Some(ArgKind::DeleteLastWord) => self.inputbar.delete_last_word(),
                    Some(ArgKind::DeleteLastChar) => self.inputbar.delete_last_char(),
                    Some(ArgKind::DeleteToLineStart) => self.inputbar.delete_to_line_start(),
                    Some(ArgKind::NextChar) => {
                        self.inputbar.next_char();
                        return;
                    }
                    Some(ArgKind::PreviousChar) => {
                        self.inputbar.previous_char();
                        return;
                    }
                    _ => return,
                };
                self.completion.end();
                if outcome == EditOutcome::Abort {
                    self.abort_inputbar();
                }
            }
        }
    }

    /// Tab 系キーの補完
    fn complete(&mut self, direction: CompletionDirection) {
        let empty = FileBookmarks::default();
        let bookmarks = self
            .document
            .as_ref()
            .map_or(&empty, |document| &document.bookmarks);
        let context = CompletionContext {
            settings: &self.settings,
            bookmarks,
        };

        let line = self.inputbar.text().to_string();
        if let Some(completed) =
            self.completion
                .complete(&line, direction, &self.registry, &context)
        {
            self.inputbar.replace(completed);
        }
    }

    /// Return で入力行を確定する
    pub fn activate_inputbar(&mut self) {
        let line = self.inputbar.text().to_string();
        self.completion.end();

        let page_count = self.document.as_ref().map_or(0, |document| document.page_count);
        let dispatch = command::resolve(&line, &self.registry, page_count);
        if dispatch != Dispatch::Abort {
            self.inputbar.push_history(&line);
        }

        match dispatch {
            Dispatch::Abort | Dispatch::AlwaysSpecial => self.abort_inputbar(),
            Dispatch::Special { direction, input } => {
                self.run_search_command(direction, input);
                self.abort_inputbar();
            }
            Dispatch::Command { action, arguments } => {
                let arguments: Vec<&str> = arguments.iter().map(String::as_str).collect();
                match self.run_command(action, &arguments) {
                    Ok(CommandOutcome::Done) => self.abort_inputbar(),
                    Ok(CommandOutcome::KeepView) => {
                        self.completion.end();
                        self.inputbar.clear();
                    }
                    // 入力行は修正できるよう残す
                    Err(err) => self.notify_error(&err),
                }
            }
            Dispatch::Goto { .. } if self.document.is_none() => {
                self.notify_error(&DocumentError::NotOpened.into());
            }
            Dispatch::Goto { page } => {
                self.set_page(page);
                self.abort_inputbar();
            }
            Dispatch::Unknown { command } => {
                log::info!("unknown command '{}'", command);
                self.notify_error(&crate::error::InputError::CommandNotFound { command }.into());
            }
        }
    }

    /// インプットバーを閉じて通常モードへ戻る
    pub fn abort_inputbar(&mut self) {
        self.completion.end();
        self.inputbar.clear();
        if self.mode == Mode::FULLSCREEN {
            self.inputbar.set_visible(false);
        }
        self.abort();
    }

    /// バッファを消し、文書ビューと通常モードへ戻る（全画面は維持）
    pub fn abort(&mut self) {
        self.buffer.clear();
        if !self.settings.show_inputbar {
            self.inputbar.set_visible(false);
        }
        if self.mode != Mode::FULLSCREEN {
            self.mode = Mode::NORMAL;
        }
        self.view = ViewKind::Document;
    }

    /// インプットバーに文字列を入れてフォーカスする
    pub fn focus_inputbar(&mut self, text: &str) {
        self.completion.end();
        self.inputbar.focus(text);
    }

    /// `/` と `?` の実行
    fn run_search_command(&mut self, direction: SearchDirection, input: String) {
        if input.is_empty() {
            return;
        }
        self.search(direction, Some(input));
    }

    /// 検索を要求する。前回のワーカーの結果が残っていれば先に反映する
    pub fn search(&mut self, direction: SearchDirection, query: Option<String>) {
        let (engine, page) = match &self.document {
            Some(document) => (Some(document.engine.clone()), document.page),
            None => (None, 0),
        };

        match self.search.request(engine.as_ref(), page, direction, query) {
            Ok(Some(hit)) => self.apply_search_hit(hit),
            Ok(None) => {}
            Err(err) => self.notify_error(&err),
        }
    }

    /// メインループから定期的に呼ぶ。検索結果が届いていれば反映して true
    pub fn poll_search(&mut self) -> bool {
        match self.search.poll() {
            Some(hit) => {
                self.apply_search_hit(hit);
                true
            }
            None => self.search.state_mut().take_redraw(),
        }
    }

    /// 走っている検索の終了を待って結果を反映する
    pub fn wait_search(&mut self) -> Option<SearchHit> {
        let hit = self.search.wait()?;
        self.apply_search_hit(hit);
        Some(hit)
    }

    fn apply_search_hit(&mut self, hit: SearchHit) {
        if !self.set_page(hit.page) {
            return;
        }
        let first_line = self
            .search
            .state()
            .matches
            .first()
            .map(|rect| rect.line as f64);
        let view_height = f64::from(self.viewport.height);
        let (_, max_y) = self.scroll_limits();
        if let (Some(line), Some(document)) = (first_line, self.document.as_mut()) {
            if line < document.position.y || line >= document.position.y + view_height {
                document.position.y = line.min(max_y);
            }
        }
        self.update_scroll_percentage();
    }

    /// ファイルを開く。失敗したときは開いていた文書をそのまま残す
    pub fn open_document(&mut self, path: &Path, password: Option<&str>) -> Result<()> {
        if !path.is_file() {
            return Err(DocumentError::FileMissing {
                path: path.display().to_string(),
            }
            .into());
        }

        let absolute = document::absolute_path(path);
        let options = LoadOptions {
            password,
            lines_per_page: self.settings.page_height.max(1) as usize,
        };
        let engine = self.loader.load(&absolute, &options)?;
        self.close_document();

        let page_count = engine.page_count();
        let labels: Vec<String> = (0..page_count)
            .map(|page| engine.page_label(page).unwrap_or_else(|| (page + 1).to_string()))
            .collect();
        let labels_enabled = self.settings.labels
            || labels
                .iter()
                .enumerate()
                .any(|(page, label)| label.parse::<usize>().ok() != Some(page + 1));

        let key = absolute.display().to_string();
        let bookmarks = self.bookmark_store.load(&key).unwrap_or_else(|err| {
            log::warn!("could not load bookmarks for {}: {}", key, err);
            FileBookmarks::default()
        });

        let mut opened = OpenDocument {
            engine: document::share(engine),
            path: absolute,
            key,
            password: password.map(str::to_string),
            page: 0,
            page_count,
            page_offset: 0,
            scale: 100,
            rotate: 0,
            position: PagePosition::default(),
            scroll_percentage: 0,
            bookmarks,
            labels,
            labels_enabled,
        };

        self.adjust_mode = AdjustMode::from_code(self.settings.adjust_open);
        let mut start_page = 0;
        if let Some(last) = opened.bookmarks.last {
            if self.settings.save_position {
                start_page = last.page;
                opened.page_offset = last.offset;
            }
            if let (true, Some(scale)) = (self.settings.save_zoom_level, last.scale) {
                opened.scale = scale;
                self.adjust_mode = AdjustMode::None;
            }
        }
        opened.scale = self.clamp_zoom(opened.scale);

        if !labels_enabled && self.goto_mode == GotoMode::Labels {
            self.goto_mode = GotoMode::Default;
        }
        if opened.page_offset != 0 {
            self.goto_mode = GotoMode::Offset;
        }

        log::info!(
            "opened {} ({} pages)",
            opened.path.display(),
            opened.page_count
        );
        self.document = Some(opened);
        self.set_page(start_page.min(page_count.saturating_sub(1)));
        self.apply_adjust_mode();
        self.abort_inputbar();
        Ok(())
    }

    /// 文書を閉じる。最後の位置と拡大率はブックマークストアへ保存する
    pub fn close_document(&mut self) {
        self.search.reset();
        let Some(mut document) = self.document.take() else {
            return;
        };

        let mut last = document.bookmarks.last.unwrap_or_default();
        if self.settings.save_position {
            last.page = document.page;
            last.offset = document.page_offset;
        }
        if self.settings.save_zoom_level {
            last.scale = Some(document.scale);
        }
        document.bookmarks.last = Some(last);

        if let Err(err) = self.bookmark_store.save(&document.key, &document.bookmarks) {
            self.notify_error(&err);
        }

        self.markers.clear();
        self.index = None;
        self.view = ViewKind::Document;
        log::info!("closed {}", document.path.display());
    }

    /// 開き直して拡大率・回転・位置を戻す
    pub fn reload(&mut self) -> Result<()> {
        let Some(document) = &self.document else {
            return Ok(());
        };
        let path = document.path.clone();
        let password = document.password.clone();
        let (scale, rotate, page, position) = (
            document.scale,
            document.rotate,
            document.page,
            document.position,
        );

        self.open_document(&path, password.as_deref())?;

        if let Some(document) = self.document.as_mut() {
            document.scale = scale;
            document.rotate = rotate;
            if document.page_count != 0 {
                document.page = page.min(document.page_count - 1);
            }
            document.position = position;
        }
        self.clamp_position();
        Ok(())
    }

    /// 終了する（文書は閉じて状態を保存）
    pub fn quit(&mut self) {
        self.close_document();
        self.quit = true;
    }

    /// ページを移動する。範囲外なら警告して false
    pub fn set_page(&mut self, page: usize) -> bool {
        let keep_position = self.mode == Mode::FULLSCREEN;
        let Some(document) = self.document.as_mut() else {
            return false;
        };
        if page >= document.page_count {
            let error = DocumentError::PageOutOfRange { page }.into();
            self.notify_error(&error);
            return false;
        }

        document.page = page;
        if !keep_position {
            document.position = PagePosition::default();
        }
        self.view = ViewKind::Document;
        self.clamp_position();
        self.update_scroll_percentage();
        true
    }

    /// 前後のページへ（`scroll_wrap` なら両端で折り返す）
    pub fn navigate(&mut self, kind: ArgKind) {
        let Some(document) = &self.document else {
            return;
        };
        let count = document.page_count as i64;
        if count == 0 {
            return;
        }
        let current = document.page as i64;
        let wrap = self.settings.scroll_wrap;

        let target = match kind {
            ArgKind::Next if wrap => (current + 1) % count,
            ArgKind::Next => current + 1,
            ArgKind::Previous if wrap => (current + count - 1) % count,
            ArgKind::Previous => current - 1,
            _ => current,
        };
        if !(0..count).contains(&target) {
            return;
        }
        self.set_page(target as usize);
    }

    /// 現在ページの大きさ（列数・行数）
    fn page_extent(&self) -> (f64, f64) {
        let Some(document) = &self.document else {
            return (0.0, 0.0);
        };
        match document::lock(&document.engine) {
            Ok(engine) => engine
                .page_size(document.page)
                .map_or((0.0, 0.0), |size| (size.width, size.height)),
            Err(err) => {
                log::error!("{}", err);
                (0.0, 0.0)
            }
        }
    }

    /// 横・縦のスクロール上限
    pub fn scroll_limits(&self) -> (f64, f64) {
        let (width, height) = self.page_extent();
        (
            (width - f64::from(self.viewport.width)).max(0.0),
            (height - f64::from(self.viewport.height)).max(0.0),
        )
    }

    fn clamp_position(&mut self) {
        let (max_x, max_y) = self.scroll_limits();
        if let Some(document) = self.document.as_mut() {
            document.position.x = document.position.x.clamp(0.0, max_x);
            document.position.y = document.position.y.clamp(0.0, max_y);
        }
    }

    fn update_scroll_percentage(&mut self) {
        let (_, max_y) = self.scroll_limits();
        if let Some(document) = self.document.as_mut() {
            document.scroll_percentage = if max_y <= 0.0 {
                0
            } else {
                (document.position.y * 100.0 / max_y) as i64
            };
        }
    }

    /// スクロール
    pub fn scroll(&mut self, kind: ArgKind) {
        let Some(document) = &self.document else {
            return;
        };
        let (max_x, max_y) = self.scroll_limits();
        let horizontal = matches!(kind, ArgKind::Left | ArgKind::Right);
        let (value, max) = if horizontal {
            (document.position.x, max_x)
        } else {
            (document.position.y, max_y)
        };
        let old_page = document.page;
        let step = self.settings.scroll_step;
        let view = f64::from(self.viewport.height);

        match kind {
            ArgKind::Previous if value <= 0.0 => {
                self.navigate(ArgKind::Previous);
                let new_page = self.current_page().unwrap_or(old_page);
                if new_page != old_page && (!self.settings.scroll_wrap || new_page < old_page) {
                    self.scroll(ArgKind::Bottom);
                }
                return;
            }
            ArgKind::Next if value >= max => {
                self.navigate(ArgKind::Next);
                return;
            }
            _ => {}
        }

        let new_value = match kind {
            ArgKind::Left | ArgKind::Up => (value - step).max(0.0),
            ArgKind::Top => 0.0,
            ArgKind::Bottom => max,
            ArgKind::Previous | ArgKind::FullUp => (value - view).max(0.0),
            ArgKind::Next | ArgKind::FullDown => (value + view).min(max),
            ArgKind::HalfUp => (value - view / 2.0).max(0.0),
            ArgKind::HalfDown => (value + view / 2.0).min(max),
            _ => (value + step).min(max),
        };

        if let Some(document) = self.document.as_mut() {
            if horizontal {
                document.position.x = new_value;
            } else {
                document.position.y = new_value;
            }
        }
        if !horizontal {
            self.update_scroll_percentage();
        }
    }

    /// `<n>%` のスクロール
    pub fn scroll_to_percentage(&mut self, percentage: i64) {
        let percentage = percentage.clamp(0, 100);
        let (_, max_y) = self.scroll_limits();
        if let Some(document) = self.document.as_mut() {
            document.position.y = percentage as f64 * max_y / 100.0;
            document.scroll_percentage = percentage;
        }
    }

    fn clamp_zoom(&self, value: i64) -> i64 {
        value.min(self.settings.zoom_max).max(self.settings.zoom_min)
    }

    /// 拡大・縮小
    pub fn zoom(&mut self, kind: Option<ArgKind>, value: Option<i64>) {
        let (min, max, step) = (
            self.settings.zoom_min,
            self.settings.zoom_max,
            self.settings.zoom_step,
        );
        let Some(document) = self.document.as_mut() else {
            return;
        };
        self.adjust_mode = AdjustMode::None;

        document.scale = match (kind, value) {
            (Some(ArgKind::ZoomIn), _) => (document.scale + step).min(max),
            (Some(ArgKind::ZoomOut), _) => (document.scale - step).max(min),
            (Some(ArgKind::ZoomSpecific), Some(value)) => value.min(max).max(min),
            (Some(ArgKind::ZoomSpecific), None) => return,
            _ => 100,
        };
        self.search.state_mut().needs_redraw = true;
    }

    /// ページ全体または幅に合わせる
    pub fn adjust_window(&mut self, mode: AdjustMode) {
        if self.document.is_none() {
            return;
        }
        self.adjust_mode = mode;
        self.apply_adjust_mode();
    }

    fn apply_adjust_mode(&mut self) {
        let (mut width, mut height) = self.page_extent();
        let Some(document) = self.document.as_mut() else {
            return;
        };
        if document.rotate == 90 || document.rotate == 270 {
            std::mem::swap(&mut width, &mut height);
        }

        let ratio = match self.adjust_mode {
            AdjustMode::BestFit if height > 0.0 => f64::from(self.viewport.height) / height,
            AdjustMode::Width if width > 0.0 => f64::from(self.viewport.width) / width,
            _ => return,
        };
        document.scale = (ratio * 100.0) as i64;
    }

    /// 時計回りに 90 度回す
    pub fn rotate(&mut self) {
        if let Some(document) = self.document.as_mut() {
            document.rotate = (document.rotate + 90) % 360;
            self.search.state_mut().needs_redraw = true;
        }
        self.apply_adjust_mode();
    }

    /// 180 度回し、スクロール位置を反対側へ移す
    pub fn flip(&mut self) {
        let (max_x, max_y) = self.scroll_limits();
        let Some(position) = self.document.as_ref().map(|document| document.position) else {
            return;
        };
        let flipped = PagePosition {
            x: max_x - position.x,
            y: max_y - position.y,
        };
        self.rotate();
        self.rotate();
        if let Some(document) = self.document.as_mut() {
            document.position = flipped;
        }
        self.update_scroll_percentage();
    }

    /// ステータスバーの内容
    pub fn status_line(&self) -> StatusLine {
        let file = self.document.as_ref().map_or_else(
            || self.settings.default_text.clone(),
            |document| document.path.display().to_string(),
        );
        let (zoom, pages, scroll) = match &self.document {
            Some(document) => (
                format!("{}%", document.scale),
                format!("[{}/{}]", document.page + 1, document.page_count),
                document.scroll_percentage,
            ),
            None => (String::new(), String::new(), 0),
        };

        StatusLine {
            file,
            buffer: self.buffer.status_label().to_string(),
            state: format!("{} [{}] {} ({}%)", zoom, self.goto_mode.tag(), pages, scroll),
        }
    }

    /// ブックマークの変更を保存する
    fn persist_bookmarks(&mut self) -> Result<()> {
        let Some(document) = &self.document else {
            return Ok(());
        };
        self.bookmark_store.save(&document.key, &document.bookmarks)
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        if self.document.is_some() {
            self.close_document();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::MemoryBookmarkStore;
    use crate::document::TextLoader;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn viewer() -> Viewer {
        Viewer::new(
            Settings::default(),
            Box::new(TextLoader),
            Box::new(MemoryBookmarkStore::new()),
        )
        .unwrap()
    }

    fn document_with_pages(pages: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let text: Vec<String> = (0..pages).map(|page| format!("page {}", page + 1)).collect();
        write!(file, "{}", text.join("\u{0c}")).unwrap();
        file
    }

    #[test]
    fn open_and_navigate() {
        let file = document_with_pages(3);
        let mut viewer = viewer();
        viewer.open_document(file.path(), None).unwrap();
        assert_eq!(viewer.current_page(), Some(0));

        viewer.navigate(ArgKind::Next);
        viewer.navigate(ArgKind::Next);
        viewer.navigate(ArgKind::Next);
        assert_eq!(viewer.current_page(), Some(2));

        viewer.navigate(ArgKind::Previous);
        assert_eq!(viewer.current_page(), Some(1));
    }

    #[test]
    fn navigate_wraps_when_enabled() {
        let file = document_with_pages(3);
        let mut viewer = viewer();
        viewer.settings.scroll_wrap = true;
        viewer.open_document(file.path(), None).unwrap();
        viewer.navigate(ArgKind::Previous);
        assert_eq!(viewer.current_page(), Some(2));
    }

    #[test]
    fn missing_file_keeps_current_document() {
        let file = document_with_pages(2);
        let mut viewer = viewer();
        viewer.open_document(file.path(), None).unwrap();

        let result = viewer.open_document(Path::new("/no/such/file.txt"), None);
        assert!(matches!(
            result,
            Err(FolioError::Document(DocumentError::FileMissing { .. }))
        ));
        assert!(viewer.document().is_some());
    }

    #[test]
    fn out_of_range_page_warns() {
        let file = document_with_pages(2);
        let mut viewer = viewer();
        viewer.open_document(file.path(), None).unwrap();
        assert!(!viewer.set_page(5));
        assert_eq!(viewer.current_page(), Some(0));
        assert_eq!(
            viewer.inputbar().notification().map(|n| n.message.as_str()),
            Some("Could not open page")
        );
    }

    #[test]
    fn zoom_is_clamped_and_disables_adjust() {
        let file = document_with_pages(1);
        let mut viewer = viewer();
        viewer.open_document(file.path(), None).unwrap();

        viewer.zoom(Some(ArgKind::ZoomSpecific), Some(5000));
        assert_eq!(viewer.document().unwrap().scale, 400);
        assert_eq!(viewer.adjust_mode(), AdjustMode::None);
        viewer.zoom(Some(ArgKind::ZoomSpecific), Some(1));
        assert_eq!(viewer.document().unwrap().scale, 10);
        viewer.zoom(Some(ArgKind::ZoomOriginal), None);
        assert_eq!(viewer.document().unwrap().scale, 100);
    }

    #[test]
    fn status_line_format() {
        let file = document_with_pages(4);
        let mut viewer = viewer();
        viewer.open_document(file.path(), None).unwrap();
        viewer.zoom(Some(ArgKind::ZoomOriginal), None);
        viewer.set_page(2);
        assert_eq!(viewer.status_line().state, "100% [D] [3/4] (0%)");

        viewer.close_document();
        assert_eq!(viewer.status_line().state, " [D]  (0%)");
        assert_eq!(viewer.status_line().file, "[No Name]");
    }

    #[test]
    fn close_saves_last_position() {
        let file = document_with_pages(5);
        let mut viewer = viewer();
        viewer.open_document(file.path(), None).unwrap();
        viewer.set_page(3);
        viewer.zoom(Some(ArgKind::ZoomSpecific), Some(150));
        viewer.close_document();

        viewer.open_document(file.path(), None).unwrap();
        let document = viewer.document().unwrap();
        assert_eq!(document.page, 3);
        assert_eq!(document.scale, 150);
    }
}
