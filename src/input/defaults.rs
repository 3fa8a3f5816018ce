//! 既定のキーバインディング

use super::binding::BindingTable;
use super::buffer::BufferRules;
use super::key::{KeyMask, KeySym, Mode};
use super::names::{ArgKind, Argument, BufferAction, InputbarFunction, ShortcutFunction};
use crate::error::InputError;

fn ch(c: char) -> KeySym {
    KeySym::from_char(c)
}

/// 文書ビューの既定バインディング
pub fn default_bindings() -> BindingTable<ShortcutFunction> {
    use ArgKind::*;
    use ShortcutFunction as F;

    let none = KeyMask::empty();
    let ctrl = KeyMask::CONTROL;
    let shift = KeyMask::SHIFT;
    let normal = Mode::NORMAL;
    let all = Mode::ALL;

    let entries: Vec<(KeyMask, KeySym, Mode, ShortcutFunction, Argument)> = vec![
        (ctrl, ch('f'), normal, F::Navigate, Argument::Kind(Next)),
        (ctrl, ch('b'), normal, F::Navigate, Argument::Kind(Previous)),
        (none, ch('J'), normal, F::Navigate, Argument::Kind(Next)),
        (none, ch('K'), normal, F::Navigate, Argument::Kind(Previous)),
        (none, KeySym::PAGE_DOWN, normal, F::Paginate, Argument::Kind(Next)),
        (none, KeySym::PAGE_UP, normal, F::Paginate, Argument::Kind(Previous)),
        (none, ch('+'), normal, F::Zoom, Argument::Kind(ZoomIn)),
        (none, ch('-'), normal, F::Zoom, Argument::Kind(ZoomOut)),
        (none, ch('='), normal, F::Zoom, Argument::Kind(ZoomOriginal)),
        (ctrl, ch('q'), all, F::Quit, Argument::None),
        (none, ch('a'), normal, F::AdjustWindow, Argument::Kind(AdjustBestfit)),
        (none, ch('s'), normal, F::AdjustWindow, Argument::Kind(AdjustWidth)),
        (none, KeySym::BACKSPACE, all, F::ChangeBuffer, Argument::Kind(DeleteLast)),
        (none, ch('m'), normal, F::ChangeMode, Argument::Kind(AddMarker)),
        (none, ch('\''), normal, F::ChangeMode, Argument::Kind(EvalMarker)),
        (none, ch(':'), normal, F::FocusInputbar, Argument::prompt(":")),
        (none, ch('o'), normal, F::FocusInputbar, Argument::prompt(":open ")),
        (
            none,
            ch('O'),
            normal,
            F::FocusInputbar,
            Argument::Prompt {
                text: ":open ".to_string(),
                append_filepath: true,
            },
        ),
        (none, ch('/'), normal, F::FocusInputbar, Argument::prompt("/")),
        (none, ch('?'), normal, F::FocusInputbar, Argument::prompt("?")),
        (none, ch('n'), normal, F::Search, Argument::Kind(Forward)),
        (none, ch('N'), normal, F::Search, Argument::Kind(Backward)),
        (none, ch('r'), normal, F::Rotate, Argument::None),
        (none, ch('R'), normal, F::Reload, Argument::None),
        (ctrl, ch('r'), normal, F::Recolor, Argument::None),
        (ctrl, ch('t'), normal, F::SwitchGotoMode, Argument::None),
        (none, KeySym::ESCAPE, all, F::Abort, Argument::None),
        (ctrl, ch('c'), all, F::Abort, Argument::None),
        (none, KeySym::TAB, normal | Mode::INDEX, F::ToggleIndex, Argument::None),
        (ctrl, ch('m'), all, F::ToggleStatusbar, Argument::None),
        (ctrl, ch('n'), all, F::ToggleInputbar, Argument::None),
        (none, KeySym::F5, all, F::ToggleFullscreen, Argument::None),
        (none, ch('h'), normal, F::Scroll, Argument::Kind(Left)),
        (none, ch('j'), normal, F::Scroll, Argument::Kind(Down)),
        (none, ch('k'), normal, F::Scroll, Argument::Kind(Up)),
        (none, ch('l'), normal, F::Scroll, Argument::Kind(Right)),
        (none, KeySym::LEFT, normal, F::Scroll, Argument::Kind(Left)),
        (none, KeySym::DOWN, normal, F::Scroll, Argument::Kind(Down)),
        (none, KeySym::UP, normal, F::Scroll, Argument::Kind(Up)),
        (none, KeySym::RIGHT, normal, F::Scroll, Argument::Kind(Right)),
        (ctrl, ch('d'), normal, F::Scroll, Argument::Kind(HalfDown)),
        (ctrl, ch('u'), normal, F::Scroll, Argument::Kind(HalfUp)),
        (none, KeySym::SPACE, normal, F::Scroll, Argument::Kind(Next)),
        (shift, KeySym::SPACE, normal, F::Scroll, Argument::Kind(Previous)),
        (none, KeySym::HOME, normal, F::Scroll, Argument::Kind(Top)),
        (none, KeySym::END, normal, F::Scroll, Argument::Kind(Bottom)),
        (none, ch('j'), Mode::INDEX, F::NavigateIndex, Argument::Kind(Down)),
        (none, ch('k'), Mode::INDEX, F::NavigateIndex, Argument::Kind(Up)),
        (none, ch('h'), Mode::INDEX, F::NavigateIndex, Argument::Kind(Collapse)),
        (none, ch('l'), Mode::INDEX, F::NavigateIndex, Argument::Kind(Expand)),
        (none, KeySym::DOWN, Mode::INDEX, F::NavigateIndex, Argument::Kind(Down)),
        (none, KeySym::UP, Mode::INDEX, F::NavigateIndex, Argument::Kind(Up)),
        (none, KeySym::LEFT, Mode::INDEX, F::NavigateIndex, Argument::Kind(Collapse)),
        (none, KeySym::RIGHT, Mode::INDEX, F::NavigateIndex, Argument::Kind(Expand)),
        (none, KeySym::RETURN, Mode::INDEX, F::NavigateIndex, Argument::Kind(Select)),
        (none, ch('j'), Mode::FULLSCREEN, F::Navigate, Argument::Kind(Next)),
        (none, ch('k'), Mode::FULLSCREEN, F::Navigate, Argument::Kind(Previous)),
        (none, KeySym::SPACE, Mode::FULLSCREEN, F::Navigate, Argument::Kind(Next)),
    ];

    let mut table = BindingTable::new();
    for (mask, key, mode, function, argument) in entries {
        table.bind(mask, key, mode, function, argument);
    }
    table
}

/// インプットバーの既定バインディング
///
/// 修飾子の包含で一致を取るため、修飾子の多いものを先に並べる
pub fn default_inputbar_bindings() -> BindingTable<InputbarFunction> {
    use ArgKind::*;
    use InputbarFunction as F;

    let none = KeyMask::empty();
    let ctrl = KeyMask::CONTROL;
    let shift = KeyMask::SHIFT;

    let entries: Vec<(KeyMask, KeySym, InputbarFunction, Argument)> = vec![
        (ctrl | shift, KeySym::TAB, F::Completion, Argument::Kind(PreviousGroup)),
        (ctrl, KeySym::TAB, F::Completion, Argument::Kind(NextGroup)),
        (shift, KeySym::TAB, F::Completion, Argument::Kind(Previous)),
        (none, KeySym::TAB, F::Completion, Argument::Kind(Next)),
        (none, KeySym::ESCAPE, F::Abort, Argument::None),
        (ctrl, ch('c'), F::Abort, Argument::None),
        (none, KeySym::UP, F::CommandHistory, Argument::Kind(Previous)),
        (none, KeySym::DOWN, F::CommandHistory, Argument::Kind(Next)),
        (ctrl, ch('k'), F::CommandHistory, Argument::Kind(Previous)),
        (ctrl, ch('j'), F::CommandHistory, Argument::Kind(Next)),
        (none, KeySym::BACKSPACE, F::StringManipulation, Argument::Kind(DeleteLastChar)),
        (ctrl, ch('h'), F::StringManipulation, Argument::Kind(DeleteLastChar)),
        (ctrl, ch('w'), F::StringManipulation, Argument::Kind(DeleteLastWord)),
        (ctrl, ch('u'), F::StringManipulation, Argument::Kind(DeleteToLineStart)),
        (ctrl, ch('f'), F::StringManipulation, Argument::Kind(NextChar)),
        (ctrl, ch('b'), F::StringManipulation, Argument::Kind(PreviousChar)),
        (none, KeySym::RIGHT, F::StringManipulation, Argument::Kind(NextChar)),
        (none, KeySym::LEFT, F::StringManipulation, Argument::Kind(PreviousChar)),
    ];

    let mut table = BindingTable::new();
    for (mask, key, function, argument) in entries {
        table.bind(mask, key, Mode::ALL, function, argument);
    }
    table
}

/// 既定のバッファ規則
pub fn default_buffer_rules() -> Result<BufferRules, InputError> {
    let mut rules = BufferRules::new();
    rules.add("^gg$", BufferAction::Goto, Argument::None)?;
    rules.add("^[0-9]+G$", BufferAction::Goto, Argument::None)?;
    rules.add("^G$", BufferAction::Goto, Argument::None)?;
    rules.add("^[0-9]+%$", BufferAction::Scroll, Argument::None)?;
    rules.add("^zI$", BufferAction::Zoom, Argument::Kind(ArgKind::ZoomIn))?;
    rules.add("^zO$", BufferAction::Zoom, Argument::Kind(ArgKind::ZoomOut))?;
    rules.add("^z0$", BufferAction::Zoom, Argument::Kind(ArgKind::ZoomOriginal))?;
    rules.add("^[0-9]+Z$", BufferAction::Zoom, Argument::Kind(ArgKind::ZoomSpecific))?;
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_unique_keys() {
        let table = default_bindings();
        let mut seen = std::collections::HashSet::new();
        for binding in table.bindings() {
            assert!(seen.insert((binding.mask, binding.key, binding.mode)));
        }
    }

    #[test]
    fn default_rules_compile() {
        let rules = default_buffer_rules().unwrap();
        assert_eq!(rules.find("gg").map(|r| r.action), Some(BufferAction::Goto));
        assert_eq!(rules.find("50%").map(|r| r.action), Some(BufferAction::Scroll));
        assert_eq!(rules.find("150Z").map(|r| r.action), Some(BufferAction::Zoom));
        assert!(rules.find("g").is_none());
    }
}
