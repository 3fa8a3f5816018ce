// command_integration_tests.rs - コマンドラインの統合テスト

use folio::bookmarks::{BookmarkStore, JsonBookmarkStore, MemoryBookmarkStore};
use folio::command::{resolve, CommandRegistry, Dispatch};
use folio::bookmarks::FileBookmarks;
use folio::completion::session::CompletionSession;
use folio::completion::{
    CompletionContext, CompletionDirection, CompletionEngine, CompletionGroup, CompletionProvider,
    CompletionResult,
};
use folio::document::TextLoader;
use folio::input::{KeyEvent, KeySym};
use folio::settings::Settings;
use folio::Viewer;
use proptest::prelude::*;

fn viewer_with_pages(pages: usize) -> (Viewer, tempfile::NamedTempFile) {
    let file = tempfile::NamedTempFile::new().unwrap();
    let text: Vec<String> = (0..pages).map(|page| format!("page {}", page + 1)).collect();
    std::fs::write(file.path(), text.join("\u{0c}")).unwrap();

    let mut viewer = Viewer::new(
        Settings::default(),
        Box::new(TextLoader),
        Box::new(MemoryBookmarkStore::new()),
    )
    .unwrap();
    viewer.open_document(file.path(), None).unwrap();
    (viewer, file)
}

/// 見出し付きのグループを返す補完
struct Grouped(Vec<(Option<String>, Vec<String>)>);

impl CompletionProvider for Grouped {
    fn complete(&self, _context: &CompletionContext<'_>, _partial: &str) -> CompletionResult {
        let mut result = CompletionResult::new();
        for (label, values) in &self.0 {
            let mut group = CompletionGroup::new(label.as_deref());
            for value in values {
                group.add(value.clone(), None);
            }
            result.add_group(group);
        }
        result
    }
}

fn grouped_registry(groups: &[(bool, usize)]) -> CommandRegistry {
    let groups = groups
        .iter()
        .enumerate()
        .map(|(index, (labelled, size))| {
            let label = labelled.then(|| format!("group{}", index));
            let values = (0..*size).map(|n| format!("v{}_{}", index, n)).collect();
            (label, values)
        })
        .collect();
    let mut registry = CommandRegistry::builtin();
    registry.set_provider("set", Box::new(Grouped(groups)));
    registry
}

fn execute(viewer: &mut Viewer, line: &str) {
    viewer.focus_inputbar(line);
    viewer.handle_key(KeyEvent::plain(KeySym::RETURN));
}

#[test]
fn test_numeric_goto_is_clamped() {
    let (mut viewer, _file) = viewer_with_pages(20);

    execute(&mut viewer, ":5");
    assert_eq!(viewer.current_page(), Some(4));
    execute(&mut viewer, ":999");
    assert_eq!(viewer.current_page(), Some(19));
    execute(&mut viewer, ":0");
    assert_eq!(viewer.current_page(), Some(0));
}

#[test]
fn test_resolve_goto_pages() {
    let registry = CommandRegistry::builtin();
    assert_eq!(resolve(":5", &registry, 20), Dispatch::Goto { page: 4 });
    assert_eq!(resolve(":999", &registry, 20), Dispatch::Goto { page: 19 });
    assert_eq!(resolve(":0", &registry, 20), Dispatch::Goto { page: 0 });
}

#[test]
fn test_unknown_command_keeps_line() {
    let (mut viewer, _file) = viewer_with_pages(2);
    execute(&mut viewer, ":frobnicate");

    assert!(viewer.inputbar().is_focused());
    assert_eq!(viewer.inputbar().text(), ":frobnicate");
    assert_eq!(
        viewer.inputbar().notification().map(|n| n.message.as_str()),
        Some("Unknown command.")
    );
}

#[test]
fn test_history_recall() {
    let (mut viewer, _file) = viewer_with_pages(5);
    execute(&mut viewer, ":3");
    execute(&mut viewer, ":set scroll_step 4");

    viewer.handle_key(KeyEvent::char(':'));
    viewer.handle_key(KeyEvent::plain(KeySym::UP));
    assert!(viewer.inputbar().text().starts_with(':'));
    assert!(viewer.inputbar().history().len() >= 2);
}

#[test]
fn test_tab_completes_command_name() {
    let (mut viewer, _file) = viewer_with_pages(1);
    viewer.focus_inputbar(":boo");
    viewer.handle_key(KeyEvent::plain(KeySym::TAB));

    assert_eq!(viewer.inputbar().text(), ":bookmark ");
    assert!(viewer.completion().is_active());

    viewer.handle_key(KeyEvent::plain(KeySym::ESCAPE));
    assert!(!viewer.completion().is_active());
    assert!(!viewer.inputbar().is_focused());
}

#[test]
fn test_goto_without_document_reports_it() {
    let mut viewer = Viewer::new(
        Settings::default(),
        Box::new(TextLoader),
        Box::new(MemoryBookmarkStore::new()),
    )
    .unwrap();
    execute(&mut viewer, ":5");

    assert!(viewer.inputbar().is_focused());
    assert_eq!(viewer.inputbar().text(), ":5");
    assert_eq!(
        viewer.inputbar().notification().map(|n| n.message.as_str()),
        Some("No document opened.")
    );
}

#[test]
fn test_tab_after_unique_command_completes_parameters() {
    let (mut viewer, _file) = viewer_with_pages(1);
    viewer.focus_inputbar(":exp");

    viewer.handle_key(KeyEvent::plain(KeySym::TAB));
    assert_eq!(viewer.inputbar().text(), ":export ");
    viewer.handle_key(KeyEvent::plain(KeySym::TAB));
    assert_eq!(viewer.inputbar().text(), ":export images");
    viewer.handle_key(KeyEvent::plain(KeySym::TAB));
    assert_eq!(viewer.inputbar().text(), ":export attachments");
    viewer.handle_key(KeyEvent::plain(KeySym::TAB));
    assert_eq!(viewer.inputbar().text(), ":export images");
}

#[test]
fn test_group_headers_are_never_selected() {
    let registry = grouped_registry(&[(true, 2), (false, 1), (true, 3)]);
    let settings = Settings::default();
    let bookmarks = FileBookmarks::default();
    let context = CompletionContext {
        settings: &settings,
        bookmarks: &bookmarks,
    };
    let mut engine = CompletionEngine::new();

    let mut line = ":set ".to_string();
    let mut seen = Vec::new();
    for _ in 0..6 {
        line = engine
            .complete(&line, CompletionDirection::Next, &registry, &context)
            .unwrap();
        seen.push(line.clone());

        let session = engine.session().unwrap();
        let current = session.current().unwrap();
        assert!(!session.rows()[current].is_group);
        let window = session.visible_range(3);
        assert_eq!(window.len(), 3);
        assert!(window.contains(&current));
    }

    assert_eq!(
        seen,
        vec![
            ":set v0_0", ":set v0_1", ":set v1_0", ":set v2_0", ":set v2_1", ":set v2_2"
        ]
    );
    // 一周すると先頭へ戻る
    let wrapped = engine
        .complete(&line, CompletionDirection::Next, &registry, &context)
        .unwrap();
    assert_eq!(wrapped, ":set v0_0");
}

#[test]
fn test_edited_parameter_rebuilds_session() {
    let registry = CommandRegistry::builtin();
    let settings = Settings::default();
    let bookmarks = FileBookmarks::default();
    let context = CompletionContext {
        settings: &settings,
        bookmarks: &bookmarks,
    };
    let mut engine = CompletionEngine::new();

    let first = engine
        .complete(":set zoom_", CompletionDirection::Next, &registry, &context)
        .unwrap();
    assert_eq!(first, ":set zoom_max");

    // 利用者がパラメータを書き換えた
    let rebuilt = engine
        .complete(":set scroll", CompletionDirection::Next, &registry, &context)
        .unwrap();
    assert_eq!(rebuilt, ":set scroll_step");
    let rows: Vec<&str> = engine
        .session()
        .unwrap()
        .rows()
        .iter()
        .map(|row| row.value.as_str())
        .collect();
    assert_eq!(rows, vec!["scroll_step", "scroll_wrap"]);
}

#[test]
fn test_bookmarks_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("bookmarks.json");
    let document = dir.path().join("doc.txt");
    let pages: Vec<String> = (0..8).map(|page| format!("page {}", page)).collect();
    std::fs::write(&document, pages.join("\u{0c}")).unwrap();

    {
        let mut viewer = Viewer::new(
            Settings::default(),
            Box::new(TextLoader),
            Box::new(JsonBookmarkStore::new(&store_path)),
        )
        .unwrap();
        viewer.open_document(&document, None).unwrap();
        viewer.set_page(5);
        execute(&mut viewer, ":bookmark chapter two");
        viewer.set_page(2);
    }

    let mut store = JsonBookmarkStore::new(&store_path);
    let key = std::fs::canonicalize(&document).unwrap().display().to_string();
    let saved = store.load(&key).unwrap();
    assert_eq!(saved.find("chapter two").map(|b| b.page), Some(5));
    assert_eq!(saved.last.map(|last| last.page), Some(2));

    let mut viewer = Viewer::new(
        Settings::default(),
        Box::new(TextLoader),
        Box::new(JsonBookmarkStore::new(&store_path)),
    )
    .unwrap();
    viewer.open_document(&document, None).unwrap();
    assert_eq!(viewer.current_page(), Some(2));
    execute(&mut viewer, ":open-bookmark chapter two");
    assert_eq!(viewer.current_page(), Some(5));
}

proptest! {
    // next を候補数ぶん繰り返すと元の選択へ戻る
    #[test]
    fn completion_cycle_returns_to_start(prefix in "[a-z]{0,2}", warmup in 0usize..5) {
        let registry = CommandRegistry::builtin();
        let settings = Settings::default();
        let bookmarks = FileBookmarks::default();
        let context = CompletionContext { settings: &settings, bookmarks: &bookmarks };

        let line = format!(":{}", prefix);
        if let Some(mut session) =
            CompletionSession::begin(&line, CompletionDirection::Next, &registry, &context)
        {
            for _ in 0..=warmup {
                session.advance(CompletionDirection::Next);
            }
            let start = session.current();
            let rows = session.rows().iter().filter(|row| !row.is_group).count();
            for _ in 0..rows {
                session.advance(CompletionDirection::Next);
            }
            prop_assert_eq!(session.current(), start);
        }
    }

    // 見出しを含むパラメータ補完でも巡回は見出しを飛ばし、表示範囲は選択を含む
    #[test]
    fn grouped_cycle_skips_headers(
        groups in proptest::collection::vec((any::<bool>(), 0usize..4), 1..5),
        warmup in 0usize..8,
        window in 1usize..6,
    ) {
        let registry = grouped_registry(&groups);
        let settings = Settings::default();
        let bookmarks = FileBookmarks::default();
        let context = CompletionContext { settings: &settings, bookmarks: &bookmarks };

        let session = CompletionSession::begin(":set ", CompletionDirection::Next, &registry, &context);
        let elements: usize = groups.iter().map(|(_, size)| size).sum();
        prop_assert_eq!(session.is_some(), elements > 0);

        if let Some(mut session) = session {
            for _ in 0..=warmup {
                session.advance(CompletionDirection::Next);
                let current = session.current().unwrap();
                prop_assert!(!session.rows()[current].is_group);
                let range = session.visible_range(window);
                prop_assert!(range.contains(&current));
                prop_assert_eq!(range.len(), window.min(session.rows().len()));
            }

            let start = session.current();
            for _ in 0..elements {
                session.advance(CompletionDirection::Next);
            }
            prop_assert_eq!(session.current(), start);
        }
    }
}

#[test]
fn test_engine_cycles_setting_names() {
    let registry = CommandRegistry::builtin();
    let settings = Settings::default();
    let bookmarks = FileBookmarks::default();
    let context = CompletionContext {
        settings: &settings,
        bookmarks: &bookmarks,
    };
    let mut engine = CompletionEngine::new();

    let first = engine
        .complete(":set zoom_", CompletionDirection::Next, &registry, &context)
        .unwrap();
    let second = engine
        .complete(&first, CompletionDirection::Next, &registry, &context)
        .unwrap();
    let third = engine
        .complete(&second, CompletionDirection::Next, &registry, &context)
        .unwrap();
    let back = engine
        .complete(&third, CompletionDirection::Next, &registry, &context)
        .unwrap();

    assert_eq!(first, ":set zoom_max");
    assert_ne!(first, second);
    assert_eq!(back, first);
}
