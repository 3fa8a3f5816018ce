//! `map` コマンドで使うキー表記の解析
//!
//! 受け付ける形式:
//! * `a` — 1 文字そのもの
//! * `<Tab>` — 記号名
//! * `<C-x>` / `<S-Tab>` — 修飾子 (`S` か `C`) 付き

use super::key::{KeyMask, KeySym};
use crate::error::InputError;

/// 解析済みのキー表記
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub mask: KeyMask,
    pub key: KeySym,
}

const SPECIAL_KEYS: &[(&str, KeySym)] = &[
    ("BackSpace", KeySym::BACKSPACE),
    ("CapsLock", KeySym::CAPS_LOCK),
    ("Down", KeySym::DOWN),
    ("Esc", KeySym::ESCAPE),
    ("F1", KeySym(0xffbe)),
    ("F2", KeySym(0xffbf)),
    ("F3", KeySym(0xffc0)),
    ("F4", KeySym(0xffc1)),
    ("F5", KeySym(0xffc2)),
    ("F6", KeySym(0xffc3)),
    ("F7", KeySym(0xffc4)),
    ("F8", KeySym(0xffc5)),
    ("F9", KeySym(0xffc6)),
    ("F10", KeySym(0xffc7)),
    ("F11", KeySym(0xffc8)),
    ("F12", KeySym(0xffc9)),
    ("Left", KeySym::LEFT),
    ("PageDown", KeySym::PAGE_DOWN),
    ("PageUp", KeySym::PAGE_UP),
    ("Return", KeySym::RETURN),
    ("Right", KeySym::RIGHT),
    ("Space", KeySym::SPACE),
    ("Super", KeySym::SUPER_L),
    ("Tab", KeySym::TAB),
    ("Up", KeySym::UP),
];

/// 記号名からキーコードを引く
pub fn special_key(name: &str) -> Option<KeySym> {
    SPECIAL_KEYS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, key)| *key)
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn resolve_key(name: &str) -> Option<KeySym> {
    single_char(name)
        .map(KeySym::from_char)
        .or_else(|| special_key(name))
}

/// キー表記を解析する
pub fn parse_key_spec(spec: &str) -> Result<KeySpec, InputError> {
    if let Some(c) = single_char(spec) {
        return Ok(KeySpec {
            mask: KeyMask::empty(),
            key: KeySym::from_char(c),
        });
    }

    let invalid_key = || InputError::InvalidKeySpec {
        spec: spec.to_string(),
    };

    let inner = spec
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .filter(|inner| !inner.is_empty())
        .ok_or_else(invalid_key)?;

    let mut chars = inner.chars();
    let modifier = chars.next();
    let has_modifier = chars.next() == Some('-') && inner.chars().count() >= 3;

    if !has_modifier {
        let key = resolve_key(inner).ok_or_else(invalid_key)?;
        return Ok(KeySpec {
            mask: KeyMask::empty(),
            key,
        });
    }

    let mask = match modifier {
        Some('S') => KeyMask::SHIFT,
        Some('C') => KeyMask::CONTROL,
        _ => {
            return Err(InputError::InvalidModifier {
                spec: spec.to_string(),
            })
        }
    };

    // 修飾子 1 文字と '-' の後ろがキー名
    let name: String = inner.chars().skip(2).collect();
    let key = resolve_key(&name).ok_or_else(invalid_key)?;

    Ok(KeySpec { mask, key })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_character() {
        let spec = parse_key_spec("j").unwrap();
        assert_eq!(spec.key, KeySym::from_char('j'));
        assert!(spec.mask.is_empty());
    }

    #[test]
    fn parses_control_modifier() {
        let spec = parse_key_spec("<C-x>").unwrap();
        assert_eq!(spec.key, KeySym::from_char('x'));
        assert_eq!(spec.mask, KeyMask::CONTROL);
    }

    #[test]
    fn parses_shift_with_symbolic_name() {
        let spec = parse_key_spec("<S-Tab>").unwrap();
        assert_eq!(spec.key, KeySym::TAB);
        assert_eq!(spec.mask, KeyMask::SHIFT);
    }

    #[test]
    fn parses_bracketed_symbol_without_modifier() {
        assert_eq!(parse_key_spec("<Space>").unwrap().key, KeySym::SPACE);
        assert_eq!(parse_key_spec("<F12>").unwrap().key, KeySym(0xffc9));
        assert_eq!(parse_key_spec("<->").unwrap().key, KeySym::from_char('-'));
    }

    #[test]
    fn rejects_unknown_modifier() {
        assert!(matches!(
            parse_key_spec("<A-x>"),
            Err(InputError::InvalidModifier { .. })
        ));
    }

    #[test]
    fn rejects_unknown_key_name() {
        assert!(matches!(
            parse_key_spec("<C-Banana>"),
            Err(InputError::InvalidKeySpec { .. })
        ));
        assert!(matches!(
            parse_key_spec("xyz"),
            Err(InputError::InvalidKeySpec { .. })
        ));
        assert!(matches!(
            parse_key_spec("<>"),
            Err(InputError::InvalidKeySpec { .. })
        ));
    }
}
