//! コマンドラインの解釈
//!
//! 確定した入力行をトークンに分け、実行すべき内容を決める。
//! 実際の処理は `Viewer` が行う。

use super::registry::{CommandAction, CommandRegistry};
use crate::search::SearchDirection;

/// 入力行の解釈結果
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// 空行。何もせずに閉じる
    Abort,
    /// キー入力ごとに処理済みの特殊コマンド。閉じるだけ
    AlwaysSpecial,
    /// 確定時に実行する特殊コマンド
    Special {
        direction: SearchDirection,
        input: String,
    },
    /// 登録コマンド
    Command {
        action: CommandAction,
        arguments: Vec<String>,
    },
    /// 数値だけの入力はページ移動（0 始まり、範囲内に丸め済み）
    Goto { page: usize },
    /// 該当なし
    Unknown { command: String },
}

/// 数値として解釈できればページ番号（0 始まり）に丸める
///
/// 全体が 10 進整数である場合だけ受け付ける。
pub fn parse_goto(token: &str, page_count: usize) -> Option<usize> {
    let value: i64 = token.parse().ok()?;
    let last = page_count.saturating_sub(1) as i64;
    Some((value.saturating_sub(1)).clamp(0, last) as usize)
}

/// 入力行を解釈する
pub fn resolve(line: &str, registry: &CommandRegistry, page_count: usize) -> Dispatch {
    let mut chars = line.chars();
    let Some(identifier) = chars.next() else {
        return Dispatch::Abort;
    };
    let input = chars.as_str();

    let tokens: Vec<&str> = input.split_whitespace().collect();
    let Some((command, arguments)) = tokens.split_first() else {
        return Dispatch::Abort;
    };

    if let Some(special) = registry.special(identifier) {
        if special.always {
            return Dispatch::AlwaysSpecial;
        }
        return Dispatch::Special {
            direction: special.direction,
            input: input.to_string(),
        };
    }

    if let Some(found) = registry.find(command) {
        return Dispatch::Command {
            action: found.action,
            arguments: arguments.iter().map(|argument| argument.to_string()).collect(),
        };
    }

    match parse_goto(command, page_count) {
        Some(page) => Dispatch::Goto { page },
        None => Dispatch::Unknown {
            command: command.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::registry::SpecialCommand;

    #[test]
    fn goto_clamps_into_document() {
        assert_eq!(parse_goto("5", 20), Some(4));
        assert_eq!(parse_goto("999", 20), Some(19));
        assert_eq!(parse_goto("0", 20), Some(0));
        assert_eq!(parse_goto("-3", 20), Some(0));
        assert_eq!(parse_goto("5x", 20), None);
        assert_eq!(parse_goto("", 20), None);
    }

    #[test]
    fn resolves_commands_with_arguments() {
        let registry = CommandRegistry::builtin();
        assert_eq!(
            resolve(":set  zoom_step   20", &registry, 1),
            Dispatch::Command {
                action: CommandAction::Set,
                arguments: vec!["zoom_step".to_string(), "20".to_string()],
            }
        );
        assert_eq!(
            resolve(":q", &registry, 1),
            Dispatch::Command {
                action: CommandAction::Quit,
                arguments: vec![],
            }
        );
    }

    #[test]
    fn empty_input_aborts() {
        let registry = CommandRegistry::builtin();
        assert_eq!(resolve("", &registry, 1), Dispatch::Abort);
        assert_eq!(resolve(":", &registry, 1), Dispatch::Abort);
        assert_eq!(resolve(":   ", &registry, 1), Dispatch::Abort);
    }

    #[test]
    fn numbers_fall_back_to_goto() {
        let registry = CommandRegistry::builtin();
        assert_eq!(resolve(":5", &registry, 20), Dispatch::Goto { page: 4 });
        assert_eq!(resolve(":999", &registry, 20), Dispatch::Goto { page: 19 });
        assert_eq!(resolve(":0", &registry, 20), Dispatch::Goto { page: 0 });
        assert_eq!(
            resolve(":frobnicate", &registry, 20),
            Dispatch::Unknown {
                command: "frobnicate".to_string()
            }
        );
    }

    #[test]
    fn specials_are_checked_first() {
        let mut registry = CommandRegistry::builtin();
        assert_eq!(resolve("/needle", &registry, 1), Dispatch::AlwaysSpecial);

        registry.register_special(SpecialCommand {
            identifier: '&',
            direction: SearchDirection::Forward,
            always: false,
        });
        assert_eq!(
            resolve("&needle here", &registry, 1),
            Dispatch::Special {
                direction: SearchDirection::Forward,
                input: "needle here".to_string(),
            }
        );
    }
}
