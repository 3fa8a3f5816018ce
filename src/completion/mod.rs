//! コマンドライン補完
//!
//! 候補リストの構築（プロバイダ）と、Tab による巡回（セッション）を提供する。

pub mod providers;
pub mod session;

use crate::bookmarks::FileBookmarks;
use crate::command::CommandRegistry;
use crate::settings::Settings;

pub use providers::{
    BookmarkProvider, CompletionProvider, ExportProvider, PathProvider, PrinterProvider,
    SettingProvider,
};
pub use session::{CompletionRow, CompletionSession};

/// 補完候補の 1 要素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionElement {
    pub value: String,
    pub description: Option<String>,
}

/// 見出し付きの候補グループ
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionGroup {
    pub label: Option<String>,
    pub elements: Vec<CompletionElement>,
}

impl CompletionGroup {
    pub fn new(label: Option<&str>) -> Self {
        Self {
            label: label.map(str::to_string),
            elements: Vec::new(),
        }
    }

    pub fn add(&mut self, value: impl Into<String>, description: Option<String>) {
        self.elements.push(CompletionElement {
            value: value.into(),
            description,
        });
    }
}

/// プロバイダが返す候補一式
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionResult {
    pub groups: Vec<CompletionGroup>,
}

impl CompletionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// グループ 1 つだけの結果
    pub fn single(group: CompletionGroup) -> Self {
        Self {
            groups: vec![group],
        }
    }

    pub fn add_group(&mut self, group: CompletionGroup) {
        self.groups.push(group);
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| group.elements.is_empty())
    }
}

/// 巡回方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionDirection {
    Next,
    Previous,
    NextGroup,
    PreviousGroup,
}

/// プロバイダが参照できる状態
#[derive(Debug, Clone, Copy)]
pub struct CompletionContext<'a> {
    pub settings: &'a Settings,
    pub bookmarks: &'a FileBookmarks,
}

/// 補完の状態をまたいで保持する
#[derive(Debug, Default)]
pub struct CompletionEngine {
    session: Option<CompletionSession>,
}

impl CompletionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tab 系キー 1 回分の処理
    ///
    /// 入力が前回の選択結果から変わっていればセッションを作り直す。
    /// 候補がなければ `None`（入力はそのまま）。
    pub fn complete(
        &mut self,
        line: &str,
        direction: CompletionDirection,
        registry: &CommandRegistry,
        context: &CompletionContext<'_>,
    ) -> Option<String> {
        if self.session.as_ref().is_some_and(|session| session.is_stale(line)) {
            log::debug!("completion session invalidated");
            self.session = None;
        }

        if self.session.is_none() {
            self.session = CompletionSession::begin(line, direction, registry, context);
        }

        let session = self.session.as_mut()?;
        Some(session.advance(direction))
    }

    /// セッションを破棄する
    pub fn end(&mut self) {
        self.session = None;
    }

    pub fn session(&self) -> Option<&CompletionSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_emptiness_ignores_empty_groups() {
        let mut result = CompletionResult::new();
        assert!(result.is_empty());
        result.add_group(CompletionGroup::new(Some("files")));
        assert!(result.is_empty());
        let mut group = CompletionGroup::new(None);
        group.add("a", None);
        result.add_group(group);
        assert!(!result.is_empty());
    }
}
