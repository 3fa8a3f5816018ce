//! インプットバー
//!
//! コマンドラインの文字列・カーソル・履歴と、通知メッセージを保持する。
//! 先頭の 1 文字（`:`、`/`、`?`）は識別子で、編集操作では消さない。

use crate::error::ErrorDisplay;

/// 編集操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Edited,
    /// 識別子しか残らないので入力を中止する
    Abort,
}

#[derive(Debug, Clone)]
pub struct Inputbar {
    text: String,
    /// カーソル位置（文字単位）
    cursor: usize,
    focused: bool,
    visible: bool,
    history: Vec<String>,
    history_index: usize,
    notification: Option<ErrorDisplay>,
}

impl Inputbar {
    pub fn new(visible: bool) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            focused: false,
            visible,
            history: Vec::new(),
            history_index: 0,
            notification: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    /// 先頭の識別子
    pub fn identifier(&self) -> Option<char> {
        self.text.chars().next()
    }

    /// 識別子を除いた入力
    pub fn input(&self) -> &str {
        let mut chars = self.text.chars();
        chars.next();
        chars.as_str()
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(index, _)| index)
            .unwrap_or(self.text.len())
    }

    /// 文字列を表示してフォーカスする（カーソルは末尾）
    pub fn focus(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.char_len();
        self.focused = true;
        self.visible = true;
        self.notification = None;
    }

    /// 入力を消してフォーカスを外す
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.focused = false;
    }

    /// 補完結果などで行全体を置き換える
    pub fn replace(&mut self, text: String) {
        self.text = text;
        self.cursor = self.char_len();
    }

    pub fn insert(&mut self, c: char) {
        let index = self.byte_index(self.cursor);
        self.text.insert(index, c);
        self.cursor += 1;
    }

    fn delete_range(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let from = self.byte_index(start);
        let to = self.byte_index(end);
        self.text.replace_range(from..to, "");
        self.cursor = start;
    }

    /// カーソル前の 1 文字を消す
    pub fn delete_last_char(&mut self) -> EditOutcome {
        if self.char_len() <= 1 {
            return EditOutcome::Abort;
        }
        if self.cursor > 1 {
            self.delete_range(self.cursor - 1, self.cursor);
        }
        EditOutcome::Edited
    }

    /// カーソル前の単語を消す（空白か `/` まで）
    pub fn delete_last_word(&mut self) -> EditOutcome {
        if self.cursor <= 1 {
            return EditOutcome::Edited;
        }
        let chars: Vec<char> = self.text.chars().collect();
        let mut index = self.cursor - 1;

        while index > 0 && chars[index] == ' ' {
            index -= 1;
        }
        while index > 0 && chars[index] != ' ' && chars[index] != '/' {
            index -= 1;
        }

        self.delete_range(index.max(1), self.cursor);
        EditOutcome::Edited
    }

    /// 識別子の後ろからカーソルまでを消す
    pub fn delete_to_line_start(&mut self) -> EditOutcome {
        if self.cursor > 1 {
            self.delete_range(1, self.cursor);
        }
        EditOutcome::Edited
    }

    pub fn next_char(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn previous_char(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// 履歴に追加する
    pub fn push_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// 履歴を巡回して入力行に表示する（両端で折り返す）
    pub fn recall_history(&mut self, forward: bool) {
        let length = self.history.len();
        if length == 0 {
            return;
        }
        self.history_index = if forward {
            (self.history_index + 1) % length
        } else {
            (self.history_index + length - 1) % length
        };
        let line = self.history[self.history_index].clone();
        self.focus(&line);
    }

    /// 通知を表示する
    pub fn notify(&mut self, display: ErrorDisplay) {
        self.notification = Some(display);
    }

    /// 期限切れでない通知
    pub fn notification(&self) -> Option<&ErrorDisplay> {
        self.notification
            .as_ref()
            .filter(|notification| !notification.is_expired())
    }

    pub fn clear_notification(&mut self) {
        self.notification = None;
    }
}

impl Default for Inputbar {
    fn default() -> Self {
        Self::new(true)
    }
}
