// keybinding_integration_tests.rs - キーバインドとバッファコマンドの統合テスト

use folio::bookmarks::MemoryBookmarkStore;
use folio::document::TextLoader;
use folio::input::{
    ArgKind, Argument, BindOutcome, BindingTable, BufferAction, BufferAccumulator, BufferRules,
    KeyEvent, KeyMask, KeyRouter, KeySym, Mode, Route, ShortcutFunction,
};
use folio::settings::Settings;
use folio::Viewer;
use proptest::prelude::*;

fn viewer() -> Viewer {
    Viewer::new(
        Settings::default(),
        Box::new(TextLoader),
        Box::new(MemoryBookmarkStore::new()),
    )
    .unwrap()
}

const FUNCTIONS: &[ShortcutFunction] = &[
    ShortcutFunction::Navigate,
    ShortcutFunction::Scroll,
    ShortcutFunction::Zoom,
    ShortcutFunction::Quit,
];

proptest! {
    // 同じ (mask, key, mode) への再束縛は位置を保ったまま置き換わる
    #[test]
    fn rebinding_replaces_in_place(
        keys in proptest::collection::vec(0u8..26, 1..12),
        target in 0usize..12,
        handler in 0usize..FUNCTIONS.len(),
        number in -100i64..100,
    ) {
        let mut table = BindingTable::new();
        let mut unique = Vec::new();
        for offset in keys {
            let key = KeySym::from_char(char::from(b'a' + offset));
            if !unique.contains(&key) {
                unique.push(key);
            }
            table.bind(KeyMask::empty(), key, Mode::NORMAL, ShortcutFunction::Abort, Argument::None);
        }
        let before = table.len();
        let target = unique[target % unique.len()];
        let position = table.bindings().position(|binding| binding.key == target).unwrap();

        let outcome = table.bind(
            KeyMask::empty(),
            target,
            Mode::NORMAL,
            FUNCTIONS[handler],
            Argument::Number(number),
        );

        prop_assert_eq!(outcome, BindOutcome::Replaced);
        prop_assert_eq!(table.len(), before);
        let matching: Vec<usize> = table
            .bindings()
            .enumerate()
            .filter(|(_, binding)| binding.key == target && binding.mode == Mode::NORMAL)
            .map(|(index, _)| index)
            .collect();
        prop_assert_eq!(matching, vec![position]);

        let binding = table.bindings().nth(position).unwrap();
        prop_assert_eq!(binding.handler, FUNCTIONS[handler]);
        prop_assert_eq!(&binding.argument, &Argument::Number(number));
    }
}

#[test]
fn test_numeric_goto_rule_fires_once() {
    let bindings: BindingTable<ShortcutFunction> = BindingTable::new();
    let mut rules = BufferRules::new();
    rules.add(r"^\d+G$", BufferAction::Goto, Argument::None).unwrap();
    let router = KeyRouter::new(&bindings, &rules);
    let mut buffer = BufferAccumulator::new();

    let mut fired = Vec::new();
    for c in ['1', '2', 'G'] {
        match router.route(KeyEvent::char(c), Mode::NORMAL, &mut buffer) {
            Route::Buffer { action, buffer: contents, .. } => fired.push((action, contents)),
            Route::Pending => {}
            other => panic!("unexpected route {:?}", other),
        }
    }

    assert_eq!(fired, vec![(BufferAction::Goto, "12G".to_string())]);
    assert!(buffer.is_empty());
}

#[test]
fn test_pending_buffer_blocks_printable_bindings() {
    let mut bindings = BindingTable::new();
    bindings.bind(
        KeyMask::empty(),
        KeySym::from_char('j'),
        Mode::NORMAL,
        ShortcutFunction::Scroll,
        Argument::Kind(ArgKind::Down),
    );
    bindings.bind(
        KeyMask::CONTROL,
        KeySym::from_char('f'),
        Mode::NORMAL,
        ShortcutFunction::Navigate,
        Argument::Kind(ArgKind::Next),
    );
    let rules = BufferRules::new();
    let router = KeyRouter::new(&bindings, &rules);
    let mut buffer = BufferAccumulator::new();

    assert_eq!(
        router.route(KeyEvent::char('3'), Mode::NORMAL, &mut buffer),
        Route::Pending
    );
    // 入力途中の 'j' はバッファへ積まれる
    assert_eq!(
        router.route(KeyEvent::char('j'), Mode::NORMAL, &mut buffer),
        Route::Pending
    );
    assert_eq!(buffer.contents(), "3j");

    assert!(matches!(
        router.route(KeyEvent::ctrl('f'), Mode::NORMAL, &mut buffer),
        Route::Shortcut {
            function: ShortcutFunction::Navigate,
            ..
        }
    ));
}

#[test]
fn test_map_line_is_idempotent() {
    let mut viewer = viewer();
    viewer
        .run_config_line("map <C-x> navigate next normal")
        .unwrap();
    let size = viewer.bindings().len();

    viewer
        .run_config_line("map <C-x> navigate next normal")
        .unwrap();
    assert_eq!(viewer.bindings().len(), size);

    let binding = viewer
        .bindings()
        .bindings()
        .find(|binding| binding.key == KeySym::from_char('x') && binding.mask == KeyMask::CONTROL)
        .unwrap();
    assert_eq!(binding.handler, ShortcutFunction::Navigate);
    assert_eq!(binding.argument, Argument::Kind(ArgKind::Next));
    assert_eq!(binding.mode, Mode::NORMAL);
}

#[test]
fn test_escape_clears_pending_buffer() {
    let mut viewer = viewer();
    viewer.handle_key(KeyEvent::char('4'));
    assert_eq!(viewer.buffer().contents(), "4");

    viewer.handle_key(KeyEvent::plain(KeySym::ESCAPE));
    assert!(viewer.buffer().is_empty());
}
