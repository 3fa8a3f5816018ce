//! 補完セッション
//!
//! 1 回の Tab 入力で候補リストを作り、以降の Tab で選択位置を巡回する。
//! 選択結果で書き換えた行を覚えておき、利用者が行を編集したら
//! 次の呼び出しで作り直す。

use std::ops::Range;

use super::{CompletionContext, CompletionDirection, CompletionResult};
use crate::command::{Command, CommandRegistry};

/// 補完行の先頭に必要な識別子
const COMMAND_IDENTIFIER: char = ':';

/// 表示用に平坦化した 1 行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRow {
    pub value: String,
    pub description: Option<String>,
    /// グループ見出し行（選択できない）
    pub is_group: bool,
}

/// 前回選択時の入力
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    command: String,
    parameter: Option<String>,
    length: usize,
}

#[derive(Debug)]
pub struct CompletionSession {
    rows: Vec<CompletionRow>,
    current: Option<usize>,
    /// コマンド名の補完か（false ならパラメータ補完）
    command_mode: bool,
    /// 入力されたコマンドトークン
    command: String,
    snapshot: Option<Snapshot>,
}

/// `:` を除いた入力をコマンドとパラメータに分ける
fn split_input(line: &str) -> Option<(&str, Option<&str>)> {
    let input = line.strip_prefix(COMMAND_IDENTIFIER)?;
    Some(match input.split_once(' ') {
        Some((command, parameter)) => (command, Some(parameter)),
        None => (input, None),
    })
}

/// パラメータ補完に使うコマンドを選ぶ（完全一致を優先、なければ最初の前方一致）
fn parameter_command<'r>(registry: &'r CommandRegistry, token: &str) -> Option<&'r Command> {
    registry
        .find(token)
        .or_else(|| registry.commands().find(|command| command.has_prefix(token)))
}

fn flatten(result: CompletionResult) -> Vec<CompletionRow> {
    let mut rows = Vec::new();
    for group in result.groups {
        if group.elements.is_empty() {
            continue;
        }
        if let Some(label) = group.label {
            rows.push(CompletionRow {
                value: label,
                description: None,
                is_group: true,
            });
        }
        rows.extend(group.elements.into_iter().map(|element| CompletionRow {
            value: element.value,
            description: element.description,
            is_group: false,
        }));
    }
    rows
}

impl CompletionSession {
    /// 候補を集めてセッションを開始する。候補がなければ `None`
    pub fn begin(
        line: &str,
        direction: CompletionDirection,
        registry: &CommandRegistry,
        context: &CompletionContext<'_>,
    ) -> Option<Self> {
        let (command, parameter) = split_input(line)?;

        let (rows, command_mode) = match parameter {
            None => {
                let rows: Vec<CompletionRow> = registry
                    .commands()
                    .filter(|candidate| candidate.has_prefix(command))
                    .map(|candidate| CompletionRow {
                        value: candidate.name.to_string(),
                        description: Some(candidate.description.to_string()),
                        is_group: false,
                    })
                    .collect();
                (rows, true)
            }
            Some(parameter) => {
                let target = parameter_command(registry, command)?;
                let provider = target.provider.as_ref()?;
                (flatten(provider.complete(context, parameter)), false)
            }
        };

        if rows.iter().all(|row| row.is_group) {
            log::debug!("no completion for '{}'", line);
            return None;
        }

        Some(Self {
            rows,
            current: match direction {
                CompletionDirection::Next => None,
                _ => Some(0),
            },
            command_mode,
            command: command.to_string(),
            snapshot: None,
        })
    }

    /// 前回選択後に入力が変わったか
    pub fn is_stale(&self, line: &str) -> bool {
        let Some(snapshot) = &self.snapshot else {
            return false;
        };
        let Some((command, parameter)) = split_input(line) else {
            return true;
        };

        let length = line.len() - COMMAND_IDENTIFIER.len_utf8();

        parameter != snapshot.parameter.as_deref()
            || command != snapshot.command
            || length != snapshot.length
    }

    fn step(&self, direction: CompletionDirection) -> usize {
        let count = self.rows.len();
        let forward = matches!(
            direction,
            CompletionDirection::Next | CompletionDirection::NextGroup
        );
        match (self.current, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(index), true) => (index + 1) % count,
            (Some(index), false) => (index + count - 1) % count,
        }
    }

    /// 選択位置を動かし、書き換え後の行を返す
    pub fn advance(&mut self, direction: CompletionDirection) -> String {
        let by_group = !self.command_mode
            && matches!(
                direction,
                CompletionDirection::NextGroup | CompletionDirection::PreviousGroup
            );

        let mut crossed_group = false;
        for _ in 0..self.rows.len() {
            let index = self.step(direction);
            self.current = Some(index);

            if self.rows[index].is_group {
                crossed_group |= by_group;
                continue;
            }
            if by_group && !crossed_group {
                continue;
            }
            break;
        }

        let selected = self.current.map(|index| self.rows[index].value.clone()).unwrap_or_default();
        if self.command_mode {
            // 区切りの空白は長さに含めない。次の Tab でパラメータ補完へ移る
            let separator = if self.rows.len() == 1 { " " } else { "" };
            let line = format!("{}{}{}", COMMAND_IDENTIFIER, selected, separator);
            self.snapshot = Some(Snapshot {
                length: selected.len(),
                command: selected,
                parameter: None,
            });
            line
        } else {
            let line = format!("{}{} {}", COMMAND_IDENTIFIER, self.command, selected);
            self.snapshot = Some(Snapshot {
                command: self.command.clone(),
                length: line.len() - COMMAND_IDENTIFIER.len_utf8(),
                parameter: Some(selected),
            });
            line
        }
    }

    pub fn rows(&self) -> &[CompletionRow] {
        &self.rows
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn is_command_mode(&self) -> bool {
        self.command_mode
    }

    /// 表示する行の範囲。選択位置を中央に寄せて `max_rows` 行に収める
    pub fn visible_range(&self, max_rows: usize) -> Range<usize> {
        let count = self.rows.len();
        if max_rows == 0 || count <= max_rows {
            return 0..count;
        }
        let current = self.current.unwrap_or(0);
        let start = current.saturating_sub(max_rows / 2).min(count - max_rows);
        start..start + max_rows
    }
}
