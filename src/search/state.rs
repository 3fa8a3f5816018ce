//! 検索結果の状態管理

use crate::document::PageRect;

/// 直近の検索結果
///
/// 次の結果で置き換えられるまで保持する。書き込みはメインループだけが行う。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// 最後に結果が得られた検索語
    pub query: Option<String>,
    /// 一致箇所
    pub matches: Vec<PageRect>,
    /// 一致箇所のあるページ
    pub page: Option<usize>,
    /// 再描画が必要か
    pub needs_redraw: bool,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 結果を置き換える
    pub fn apply(&mut self, page: usize, query: String, matches: Vec<PageRect>) {
        self.page = Some(page);
        self.query = Some(query);
        self.matches = matches;
        self.needs_redraw = true;
    }

    /// 指定ページ上の一致箇所
    pub fn matches_on(&self, page: usize) -> &[PageRect] {
        if self.page == Some(page) {
            &self.matches
        } else {
            &[]
        }
    }

    /// 再描画要求を取り出す
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// 文書を閉じたときに消去する
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
