//! 複数キーのバッファコマンド
//!
//! 印字可能なキーを溜め、正規表現の規則に一致した時点で実行する。

use regex::Regex;

use super::names::{Argument, BufferAction};
use crate::error::InputError;

/// 入力途中のキー列
///
/// ステータスバーの表示はこの内容そのものなので、消去と表示の更新は常に同時に起こる
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferAccumulator {
    contents: String,
}

impl BufferAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 印字可能文字（`!`〜`~`）なら末尾に追加する
    pub fn push(&mut self, c: char) -> bool {
        if !('\u{21}'..='\u{7e}').contains(&c) {
            return false;
        }
        self.contents.push(c);
        true
    }

    /// 末尾を 1 文字消す。空になる場合は全体を消去する
    pub fn pop_or_clear(&mut self) {
        if self.contents.chars().count() <= 1 {
            self.clear();
        } else {
            self.contents.pop();
        }
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn clear(&mut self) {
        self.contents.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// ステータスバーに出す文字列
    pub fn status_label(&self) -> &str {
        &self.contents
    }
}

/// バッファ規則
#[derive(Debug, Clone)]
pub struct BufferRule {
    pub pattern: Regex,
    pub action: BufferAction,
    pub argument: Argument,
}

/// 規則の一覧（先に登録したものが優先）
#[derive(Debug, Clone, Default)]
pub struct BufferRules {
    rules: Vec<BufferRule>,
}

impl BufferRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// 規則を追加する
    pub fn add(
        &mut self,
        pattern: &str,
        action: BufferAction,
        argument: Argument,
    ) -> Result<(), InputError> {
        let pattern = Regex::new(pattern).map_err(|_| InputError::InvalidPattern {
            pattern: pattern.to_string(),
        })?;
        self.rules.push(BufferRule {
            pattern,
            action,
            argument,
        });
        Ok(())
    }

    /// 最初に一致した規則
    pub fn find(&self, buffer: &str) -> Option<&BufferRule> {
        if buffer.is_empty() {
            return None;
        }
        self.rules.iter().find(|rule| rule.pattern.is_match(buffer))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_rejects_non_printable() {
        let mut buffer = BufferAccumulator::new();
        assert!(buffer.push('1'));
        assert!(!buffer.push(' '));
        assert!(!buffer.push('\n'));
        assert!(!buffer.push('é'));
        assert_eq!(buffer.contents(), "1");
    }

    #[test]
    fn pop_or_clear_empties_last_char() {
        let mut buffer = BufferAccumulator::new();
        buffer.push('1');
        buffer.push('2');
        buffer.pop_or_clear();
        assert_eq!(buffer.contents(), "1");
        assert_eq!(buffer.status_label(), "1");
        buffer.pop_or_clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.status_label(), "");
        buffer.pop_or_clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn first_matching_rule_wins() {
        let mut rules = BufferRules::new();
        rules.add("^[0-9]+G$", BufferAction::Goto, Argument::None).unwrap();
        rules.add("^1+G$", BufferAction::Zoom, Argument::None).unwrap();

        assert_eq!(rules.find("11G").map(|r| r.action), Some(BufferAction::Goto));
        assert!(rules.find("11").is_none());
        assert!(rules.find("").is_none());
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let mut rules = BufferRules::new();
        assert!(rules.add("^(", BufferAction::Goto, Argument::None).is_err());
        assert!(rules.is_empty());
    }
}
