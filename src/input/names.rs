//! ハンドラと引数の名前表
//!
//! `map` コマンドや設定ファイルから名前で参照されるものをここに集める。

use super::key::Mode;

/// ハンドラに渡す引数の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    Next,
    Previous,
    Left,
    Right,
    Up,
    Down,
    Bottom,
    Top,
    HalfUp,
    HalfDown,
    FullUp,
    FullDown,
    Hide,
    DeleteLastWord,
    DeleteLastChar,
    DeleteLast,
    DeleteToLineStart,
    NextChar,
    PreviousChar,
    NextGroup,
    PreviousGroup,
    ZoomIn,
    ZoomOut,
    ZoomOriginal,
    ZoomSpecific,
    Forward,
    Backward,
    NoSearch,
    AdjustBestfit,
    AdjustWidth,
    AdjustNone,
    AddMarker,
    EvalMarker,
    Expand,
    Collapse,
    Select,
    GotoDefault,
    GotoLabels,
    GotoOffset,
    Normal,
    Index,
    Fullscreen,
}

const ARGUMENT_NAMES: &[(&str, ArgKind)] = &[
    ("add_marker", ArgKind::AddMarker),
    ("backward", ArgKind::Backward),
    ("bestfit", ArgKind::AdjustBestfit),
    ("bottom", ArgKind::Bottom),
    ("collapse", ArgKind::Collapse),
    ("down", ArgKind::Down),
    ("eval_marker", ArgKind::EvalMarker),
    ("expand", ArgKind::Expand),
    ("forward", ArgKind::Forward),
    ("full_down", ArgKind::FullDown),
    ("full_up", ArgKind::FullUp),
    ("half_down", ArgKind::HalfDown),
    ("half_up", ArgKind::HalfUp),
    ("in", ArgKind::ZoomIn),
    ("left", ArgKind::Left),
    ("next", ArgKind::Next),
    ("next_group", ArgKind::NextGroup),
    ("none", ArgKind::AdjustNone),
    ("original", ArgKind::ZoomOriginal),
    ("out", ArgKind::ZoomOut),
    ("previous", ArgKind::Previous),
    ("previous_group", ArgKind::PreviousGroup),
    ("right", ArgKind::Right),
    ("select", ArgKind::Select),
    ("top", ArgKind::Top),
    ("up", ArgKind::Up),
    ("width", ArgKind::AdjustWidth),
];

impl ArgKind {
    /// 引数名から引く
    pub fn from_name(name: &str) -> Option<Self> {
        ARGUMENT_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, kind)| *kind)
    }

    /// 整数設定に格納するときのコード値
    pub fn code(self) -> i64 {
        self as i64
    }

    /// コード値から復元する
    pub fn from_code(code: i64) -> Option<Self> {
        ARGUMENT_NAMES
            .iter()
            .map(|(_, kind)| *kind)
            .find(|kind| kind.code() == code)
    }

    /// 名前表に載っている名前
    pub fn name(self) -> Option<&'static str> {
        ARGUMENT_NAMES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(name, _)| *name)
    }
}

/// バインディングに保存される引数
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Argument {
    #[default]
    None,
    Kind(ArgKind),
    Number(i64),
    Text(String),
    /// インプットバーに表示する文字列。`append_filepath` なら開いているファイル名を続ける
    Prompt { text: String, append_filepath: bool },
}

impl Argument {
    /// `map` の第 3 引数を解釈する
    pub fn parse(token: &str) -> Self {
        if let Some(kind) = ArgKind::from_name(token) {
            return Argument::Kind(kind);
        }
        match token.parse::<i64>() {
            Ok(n) => Argument::Number(n),
            Err(_) => Argument::Text(token.to_string()),
        }
    }

    pub fn kind(&self) -> Option<ArgKind> {
        match self {
            Argument::Kind(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn prompt(text: &str) -> Self {
        Argument::Prompt {
            text: text.to_string(),
            append_filepath: false,
        }
    }
}

const MODE_NAMES: &[(&str, Mode)] = &[
    ("all", Mode::ALL),
    ("fullscreen", Mode::FULLSCREEN),
    ("index", Mode::INDEX),
    ("normal", Mode::NORMAL),
];

/// モード名から引く
pub fn mode_from_name(name: &str) -> Option<Mode> {
    MODE_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, mode)| *mode)
}

/// 文書ビューで使うショートカット関数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutFunction {
    Abort,
    AdjustWindow,
    ChangeBuffer,
    ChangeMode,
    FocusInputbar,
    Navigate,
    NavigateIndex,
    Paginate,
    Quit,
    Recolor,
    Reload,
    Rotate,
    Flip,
    Scroll,
    Search,
    SwitchGotoMode,
    ToggleFullscreen,
    ToggleIndex,
    ToggleInputbar,
    ToggleStatusbar,
    Zoom,
}

const SHORTCUT_NAMES: &[(&str, ShortcutFunction)] = &[
    ("abort", ShortcutFunction::Abort),
    ("adjust_window", ShortcutFunction::AdjustWindow),
    ("change_buffer", ShortcutFunction::ChangeBuffer),
    ("change_mode", ShortcutFunction::ChangeMode),
    ("flip", ShortcutFunction::Flip),
    ("focus_inputbar", ShortcutFunction::FocusInputbar),
    ("navigate", ShortcutFunction::Navigate),
    ("navigate_index", ShortcutFunction::NavigateIndex),
    ("paginate", ShortcutFunction::Paginate),
    ("quit", ShortcutFunction::Quit),
    ("recolor", ShortcutFunction::Recolor),
    ("reload", ShortcutFunction::Reload),
    ("rotate", ShortcutFunction::Rotate),
    ("scroll", ShortcutFunction::Scroll),
    ("search", ShortcutFunction::Search),
    ("switch_goto_mode", ShortcutFunction::SwitchGotoMode),
    ("toggle_fullscreen", ShortcutFunction::ToggleFullscreen),
    ("toggle_index", ShortcutFunction::ToggleIndex),
    ("toggle_inputbar", ShortcutFunction::ToggleInputbar),
    ("toggle_statusbar", ShortcutFunction::ToggleStatusbar),
    ("zoom", ShortcutFunction::Zoom),
];

impl ShortcutFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        SHORTCUT_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, function)| *function)
    }

    pub fn name(self) -> &'static str {
        SHORTCUT_NAMES
            .iter()
            .find(|(_, function)| *function == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }
}

/// インプットバーにフォーカスがある間のショートカット関数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputbarFunction {
    Abort,
    CommandHistory,
    Completion,
    StringManipulation,
}

/// バッファ規則に一致したときに実行するコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferAction {
    Goto,
    Scroll,
    Zoom,
}
