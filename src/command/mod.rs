//! コマンドライン
//!
//! コマンド登録・入力行の解釈・インプットバーの状態を扱う。

pub mod dispatcher;
pub mod inputbar;
pub mod registry;

pub use dispatcher::{parse_goto, resolve, Dispatch};
pub use inputbar::{EditOutcome, Inputbar};
pub use registry::{Command, CommandAction, CommandRegistry, SpecialCommand};
