//! マーカー（`m<c>` で記録、`'<c>` で復帰）

use crate::bookmarks::PagePosition;

/// 直前のページへ戻る特別な識別子
pub const LAST_PAGE_MARKER: char = '\'';

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub id: char,
    pub page: usize,
    pub position: PagePosition,
}

#[derive(Debug, Clone, Default)]
pub struct Markers {
    markers: Vec<Marker>,
    /// `''` で戻るページ
    last_page: usize,
}

impl Markers {
    pub fn new() -> Self {
        Self::default()
    }

    /// マーカーに使える文字か（`0` から `z` まで）
    pub fn is_valid_id(id: char) -> bool {
        ('\u{30}'..='\u{7a}').contains(&id)
    }

    /// 記録する。同じ識別子は上書き
    pub fn add(&mut self, id: char, page: usize, position: PagePosition) -> bool {
        if !Self::is_valid_id(id) {
            return false;
        }
        match self.markers.iter_mut().find(|marker| marker.id == id) {
            Some(marker) => {
                marker.page = page;
                marker.position = position;
            }
            None => self.markers.push(Marker { id, page, position }),
        }
        self.last_page = page;
        true
    }

    pub fn get(&self, id: char) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.id == id)
    }

    /// `''` 用: 直前のページを返し、現在ページと入れ替える
    pub fn swap_last(&mut self, current_page: usize) -> usize {
        std::mem::replace(&mut self.last_page, current_page)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// 文書を閉じたとき
    pub fn clear(&mut self) {
        self.markers.clear();
        self.last_page = 0;
    }
}
