//! キー入力の内部表現
//!
//! キーコードは X11 keysym 互換の値で保持する。印字可能な ASCII は
//! コードポイントと同じ値になるため、`0x21..=0x7E` の範囲判定がそのまま使える。

use bitflags::bitflags;
use crossterm::event::{KeyCode as CrosstermKeyCode, KeyEvent as CrosstermKeyEvent, KeyModifiers};

/// X11 keysym 互換のキーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeySym(pub u32);

impl KeySym {
    pub const SPACE: KeySym = KeySym(0x0020);
    pub const APOSTROPHE: KeySym = KeySym(0x0027);
    pub const BACKSPACE: KeySym = KeySym(0xff08);
    pub const TAB: KeySym = KeySym(0xff09);
    pub const RETURN: KeySym = KeySym(0xff0d);
    pub const ESCAPE: KeySym = KeySym(0xff1b);
    pub const HOME: KeySym = KeySym(0xff50);
    pub const LEFT: KeySym = KeySym(0xff51);
    pub const UP: KeySym = KeySym(0xff52);
    pub const RIGHT: KeySym = KeySym(0xff53);
    pub const DOWN: KeySym = KeySym(0xff54);
    pub const PAGE_UP: KeySym = KeySym(0xff55);
    pub const PAGE_DOWN: KeySym = KeySym(0xff56);
    pub const END: KeySym = KeySym(0xff57);
    pub const F1: KeySym = KeySym(0xffbe);
    pub const F5: KeySym = KeySym(0xffc2);
    pub const CAPS_LOCK: KeySym = KeySym(0xffe5);
    pub const SUPER_L: KeySym = KeySym(0xffeb);
    pub const DELETE: KeySym = KeySym(0xffff);

    const UNICODE_OFFSET: u32 = 0x0100_0000;

    /// 文字からキーコードを得る
    pub fn from_char(c: char) -> Self {
        let code = c as u32;
        if (0x20..=0xff).contains(&code) {
            KeySym(code)
        } else {
            KeySym(Self::UNICODE_OFFSET | code)
        }
    }

    /// F1〜F12
    pub fn function(n: u8) -> Option<Self> {
        (1..=12)
            .contains(&n)
            .then(|| KeySym(Self::F1.0 + u32::from(n) - 1))
    }

    /// 文字として解釈できる場合はその文字を返す
    pub fn to_char(self) -> Option<char> {
        if (0x20..=0xff).contains(&self.0) {
            char::from_u32(self.0)
        } else if self.0 & 0xff00_0000 == Self::UNICODE_OFFSET {
            char::from_u32(self.0 & 0x00ff_ffff)
        } else {
            None
        }
    }

    /// バッファに積める印字可能文字か（`!` から `~` まで）
    pub fn is_printable(self) -> bool {
        (0x21..=0x7e).contains(&self.0)
    }
}

bitflags! {
    /// 修飾キーのマスク
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyMask: u32 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1 = 1 << 3;
        /// NumLock
        const MOD2 = 1 << 4;
        const MOD3 = 1 << 5;
        const MOD4 = 1 << 6;
        const MOD5 = 1 << 7;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
        const BUTTON4 = 1 << 11;
        const BUTTON5 = 1 << 12;
        /// ポインタがウィンドウ外へ出た状態
        const LEAVE_NOTIFY = 1 << 13;
    }
}

impl KeyMask {
    const NOISE: KeyMask = KeyMask::MOD2
        .union(KeyMask::BUTTON1)
        .union(KeyMask::BUTTON2)
        .union(KeyMask::BUTTON3)
        .union(KeyMask::BUTTON4)
        .union(KeyMask::BUTTON5)
        .union(KeyMask::LEAVE_NOTIFY);

    /// NumLock・マウスボタン・ポインタ離脱のビットを取り除く
    pub fn clean(self) -> Self {
        self.difference(Self::NOISE)
    }
}

bitflags! {
    /// ビューアのモード
    ///
    /// 同時に有効なのは 1 つだけ。`ALL` はバインディング側でのみ使い、
    /// どのモードにも一致する。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mode: u32 {
        const ALL = 1 << 0;
        const FULLSCREEN = 1 << 1;
        const INDEX = 1 << 2;
        const NORMAL = 1 << 3;
        const ADD_MARKER = 1 << 4;
        const EVAL_MARKER = 1 << 5;
    }
}

impl Mode {
    /// バインディングのモード指定が現在モードに適用されるか
    pub fn accepts(self, binding_mode: Mode) -> bool {
        binding_mode == Mode::ALL || self.intersects(binding_mode)
    }

    /// マーカー操作用の擬似モードか
    pub fn is_marker(self) -> bool {
        self == Mode::ADD_MARKER || self == Mode::EVAL_MARKER
    }

    /// ステータス表示用の名前
    pub fn display(self) -> &'static str {
        if self == Mode::FULLSCREEN {
            "-- FULLSCREEN --"
        } else if self == Mode::INDEX {
            "-- INDEX --"
        } else {
            ""
        }
    }
}

/// ルータに渡すキーイベント
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: KeySym,
    pub mask: KeyMask,
}

impl KeyEvent {
    pub fn new(key: KeySym, mask: KeyMask) -> Self {
        Self { key, mask }
    }

    /// 修飾なしの文字キー
    pub fn char(c: char) -> Self {
        Self::new(KeySym::from_char(c), KeyMask::empty())
    }

    /// Ctrl+文字
    pub fn ctrl(c: char) -> Self {
        Self::new(KeySym::from_char(c), KeyMask::CONTROL)
    }

    /// 修飾なしの特殊キー
    pub fn plain(key: KeySym) -> Self {
        Self::new(key, KeyMask::empty())
    }

    /// インプットバーへ挿入できる文字
    pub fn insertable_char(&self) -> Option<char> {
        if self.mask.clean().intersects(KeyMask::CONTROL | KeyMask::MOD1) {
            return None;
        }
        self.key.to_char()
    }
}

/// crossterm統合
impl From<CrosstermKeyEvent> for KeyEvent {
    fn from(event: CrosstermKeyEvent) -> Self {
        let mut mask = KeyMask::empty();
        if event.modifiers.contains(KeyModifiers::SHIFT) {
            mask |= KeyMask::SHIFT;
        }
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            mask |= KeyMask::CONTROL;
        }
        if event.modifiers.contains(KeyModifiers::ALT) {
            mask |= KeyMask::MOD1;
        }
        if event.modifiers.contains(KeyModifiers::SUPER) {
            mask |= KeyMask::MOD4;
        }

        let key = match event.code {
            CrosstermKeyCode::Char(c) => {
                // 大文字は keysym 側に Shift が反映済みなので、
                // 文字キーの Shift ビットはそのまま残しルータの例外規則に任せる
                KeySym::from_char(c)
            }
            CrosstermKeyCode::Enter => KeySym::RETURN,
            CrosstermKeyCode::Backspace => KeySym::BACKSPACE,
            CrosstermKeyCode::Delete => KeySym::DELETE,
            CrosstermKeyCode::Tab => KeySym::TAB,
            CrosstermKeyCode::BackTab => {
                mask |= KeyMask::SHIFT;
                KeySym::TAB
            }
            CrosstermKeyCode::Up => KeySym::UP,
            CrosstermKeyCode::Down => KeySym::DOWN,
            CrosstermKeyCode::Left => KeySym::LEFT,
            CrosstermKeyCode::Right => KeySym::RIGHT,
            CrosstermKeyCode::Home => KeySym::HOME,
            CrosstermKeyCode::End => KeySym::END,
            CrosstermKeyCode::PageUp => KeySym::PAGE_UP,
            CrosstermKeyCode::PageDown => KeySym::PAGE_DOWN,
            CrosstermKeyCode::Esc => KeySym::ESCAPE,
            CrosstermKeyCode::CapsLock => KeySym::CAPS_LOCK,
            CrosstermKeyCode::F(n) => KeySym::function(n).unwrap_or(KeySym(0)),
            _ => KeySym(0),
        };

        KeyEvent { key, mask }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    #[test]
    fn clean_strips_numlock_and_buttons() {
        let mask = KeyMask::CONTROL | KeyMask::MOD2 | KeyMask::BUTTON3 | KeyMask::LEAVE_NOTIFY;
        assert_eq!(mask.clean(), KeyMask::CONTROL);
    }

    #[test]
    fn printable_range_is_bang_to_tilde() {
        assert!(!KeySym::SPACE.is_printable());
        assert!(KeySym::from_char('!').is_printable());
        assert!(KeySym::from_char('~').is_printable());
        assert!(!KeySym::from_char('\u{7f}').is_printable());
        assert!(!KeySym::RETURN.is_printable());
    }

    #[test]
    fn mode_all_matches_everything() {
        assert!(Mode::INDEX.accepts(Mode::ALL));
        assert!(Mode::NORMAL.accepts(Mode::NORMAL | Mode::FULLSCREEN));
        assert!(!Mode::INDEX.accepts(Mode::NORMAL));
    }

    #[test]
    fn crossterm_back_tab_is_shift_tab() {
        let event = CrosstermKeyEvent::new_with_kind(
            CrosstermKeyCode::BackTab,
            KeyModifiers::NONE,
            KeyEventKind::Press,
        );
        let key = KeyEvent::from(event);
        assert_eq!(key, KeyEvent::new(KeySym::TAB, KeyMask::SHIFT));
    }

    #[test]
    fn non_ascii_chars_round_trip() {
        let sym = KeySym::from_char('ß');
        assert_eq!(sym.to_char(), Some('ß'));
        let sym = KeySym::from_char('あ');
        assert_eq!(sym.to_char(), Some('あ'));
        assert_eq!(KeySym::RETURN.to_char(), None);
    }
}
