//! 目次（アウトライン）ビュー
//!
//! カーソルは木の中の位置をインデックス列で表す。展開状態は位置ごとに持つ。

use std::collections::HashSet;

use crate::document::OutlineEntry;

/// 目次の 1 行（描画用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow<'a> {
    pub depth: usize,
    pub title: &'a str,
    pub page: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct IndexView {
    entries: Vec<OutlineEntry>,
    cursor: Vec<usize>,
    expanded: HashSet<Vec<usize>>,
}

impl IndexView {
    /// 目次が空なら `None`
    pub fn new(entries: Vec<OutlineEntry>) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        Some(Self {
            entries,
            cursor: vec![0],
            expanded: HashSet::new(),
        })
    }

    pub fn cursor(&self) -> &[usize] {
        &self.cursor
    }

    fn entry(&self, path: &[usize]) -> Option<&OutlineEntry> {
        let (first, rest) = path.split_first()?;
        let mut entry = self.entries.get(*first)?;
        for index in rest {
            entry = entry.children.get(*index)?;
        }
        Some(entry)
    }

    /// `path` と同じ階層の項目数
    fn sibling_count(&self, path: &[usize]) -> usize {
        match path.split_last() {
            Some((_, [])) | None => self.entries.len(),
            Some((_, parent)) => self.entry(parent).map_or(0, |entry| entry.children.len()),
        }
    }

    fn child_count(&self, path: &[usize]) -> usize {
        self.entry(path).map_or(0, |entry| entry.children.len())
    }

    pub fn is_expanded(&self, path: &[usize]) -> bool {
        self.expanded.contains(path) && self.child_count(path) > 0
    }

    pub fn selected(&self) -> Option<&OutlineEntry> {
        self.entry(&self.cursor)
    }

    /// 1 行上へ。上の項目が展開されていればその最後の子孫へ入る
    pub fn up(&mut self) {
        let mut path = self.cursor.clone();
        let Some(last) = path.last_mut() else {
            return;
        };

        if *last > 0 {
            *last -= 1;
            while self.is_expanded(&path) {
                let count = self.child_count(&path);
                path.push(count - 1);
            }
        } else if path.len() > 1 {
            path.pop();
        } else {
            return;
        }
        self.cursor = path;
    }

    /// 1 行下へ。展開中なら最初の子、なければ次の兄弟か祖先の次の兄弟
    pub fn down(&mut self) {
        if self.is_expanded(&self.cursor) {
            self.cursor.push(0);
            return;
        }

        let mut path = self.cursor.clone();
        loop {
            let count = self.sibling_count(&path);
            let Some(last) = path.last_mut() else {
                return;
            };
            if *last + 1 < count {
                *last += 1;
                self.cursor = path;
                return;
            }
            if path.len() <= 1 {
                return;
            }
            path.pop();
        }
    }

    /// 子を持つ項目を展開し、最初の子へ移る
    pub fn expand(&mut self) {
        if self.child_count(&self.cursor) == 0 {
            return;
        }
        self.expanded.insert(self.cursor.clone());
        self.cursor.push(0);
    }

    /// 展開中なら畳む。そうでなければ親へ移って親を畳む
    pub fn collapse(&mut self) {
        if self.is_expanded(&self.cursor) {
            let path = self.cursor.clone();
            self.collapse_subtree(&path);
            return;
        }
        if self.cursor.len() > 1 {
            self.cursor.pop();
            let path = self.cursor.clone();
            self.collapse_subtree(&path);
        }
    }

    fn collapse_subtree(&mut self, path: &[usize]) {
        self.expanded.retain(|expanded| !expanded.starts_with(path));
    }

    /// 表示中の行（展開されている部分だけ）
    pub fn rows(&self) -> Vec<IndexRow<'_>> {
        let mut rows = Vec::new();
        let mut path = Vec::new();
        self.collect_rows(&self.entries, &mut path, &mut rows);
        rows
    }

    fn collect_rows<'a>(
        &'a self,
        entries: &'a [OutlineEntry],
        path: &mut Vec<usize>,
        rows: &mut Vec<IndexRow<'a>>,
    ) {
        for (index, entry) in entries.iter().enumerate() {
            path.push(index);
            let expanded = self.is_expanded(path);
            rows.push(IndexRow {
                depth: path.len() - 1,
                title: &entry.title,
                page: entry.page,
                has_children: !entry.children.is_empty(),
                expanded,
                selected: *path == self.cursor,
            });
            if expanded {
                self.collect_rows(&entry.children, path, rows);
            }
            path.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, page: usize, children: Vec<OutlineEntry>) -> OutlineEntry {
        OutlineEntry {
            title: title.to_string(),
            page,
            children,
        }
    }

    fn sample() -> IndexView {
        IndexView::new(vec![
            entry("One", 0, vec![entry("One.A", 1, vec![]), entry("One.B", 2, vec![])]),
            entry("Two", 4, vec![]),
        ])
        .unwrap()
    }

    #[test]
    fn empty_outline_has_no_view() {
        assert!(IndexView::new(Vec::new()).is_none());
    }

    #[test]
    fn down_skips_collapsed_children() {
        let mut index = sample();
        index.down();
        assert_eq!(index.selected().unwrap().title, "Two");
        index.down();
        assert_eq!(index.selected().unwrap().title, "Two");
    }

    #[test]
    fn expand_enters_children_and_down_leaves_them() {
        let mut index = sample();
        index.expand();
        assert_eq!(index.selected().unwrap().title, "One.A");
        index.down();
        index.down();
        assert_eq!(index.selected().unwrap().title, "Two");
        index.up();
        assert_eq!(index.selected().unwrap().title, "One.B");
        index.up();
        index.up();
        assert_eq!(index.selected().unwrap().title, "One");
    }

    #[test]
    fn collapse_from_child_moves_to_parent() {
        let mut index = sample();
        index.expand();
        index.down();
        index.collapse();
        assert_eq!(index.cursor(), &[0]);
        assert!(!index.is_expanded(&[0]));
        assert_eq!(index.rows().len(), 2);
    }

    #[test]
    fn rows_mark_selection() {
        let mut index = sample();
        index.expand();
        let rows = index.rows();
        assert_eq!(rows.len(), 4);
        assert!(rows[1].selected);
        assert_eq!(rows[1].depth, 1);
        assert!(rows[0].expanded);
    }
}
