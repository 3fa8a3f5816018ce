//! キーイベントルータ
//!
//! 文書ビューに届いたキーを、バインディングテーブル・バッファ規則のどちらで
//! 処理するかを決める。実際のハンドラ実行は呼び出し側（`Viewer`）が行う。

use super::binding::BindingTable;
use super::buffer::{BufferAccumulator, BufferRules};
use super::key::{KeyEvent, KeyMask, KeySym, Mode};
use super::names::{Argument, BufferAction, ShortcutFunction};

/// ルーティング結果
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// マーカー擬似モードでのキー
    Marker { mode: Mode, key: KeySym },
    /// バインディングが発火した
    Shortcut {
        function: ShortcutFunction,
        argument: Argument,
    },
    /// バッファ規則に一致した（バッファは消去済み）
    Buffer {
        action: BufferAction,
        argument: Argument,
        buffer: String,
    },
    /// バッファに積んだが規則には一致していない
    Pending,
    /// 何もしなかった
    Unhandled,
}

impl Route {
    pub fn is_handled(&self) -> bool {
        !matches!(self, Route::Unhandled | Route::Pending)
    }
}

/// ルータ本体
pub struct KeyRouter<'a> {
    bindings: &'a BindingTable<ShortcutFunction>,
    rules: &'a BufferRules,
}

impl<'a> KeyRouter<'a> {
    pub fn new(bindings: &'a BindingTable<ShortcutFunction>, rules: &'a BufferRules) -> Self {
        Self { bindings, rules }
    }

    /// イベントを振り分ける
    pub fn route(&self, event: KeyEvent, mode: Mode, buffer: &mut BufferAccumulator) -> Route {
        if mode.is_marker() {
            return Route::Marker {
                mode,
                key: event.key,
            };
        }

        let clean = event.mask.clean();
        let pending = !buffer.is_empty();

        // 入力途中のバッファがある間は Ctrl 付きか非印字キーのバインディングだけが発火する
        let fired = self.bindings.bindings().find(|binding| {
            binding.matches(event.key, clean, mode)
                && (!pending || binding.mask == KeyMask::CONTROL || !binding.key.is_printable())
        });

        if let Some(binding) = fired {
            log::debug!(
                "binding fired: {} {:?}",
                binding.handler.name(),
                binding.argument
            );
            return Route::Shortcut {
                function: binding.handler,
                argument: binding.argument.clone(),
            };
        }

        let pushed = event.key.is_printable()
            && event.key.to_char().is_some_and(|c| buffer.push(c));

        if buffer.is_empty() {
            return Route::Unhandled;
        }

        match self.rules.find(buffer.contents()) {
            Some(rule) => {
                let contents = buffer.contents().to_string();
                buffer.clear();
                log::debug!("buffer command {:?} matched '{}'", rule.action, contents);
                Route::Buffer {
                    action: rule.action,
                    argument: rule.argument.clone(),
                    buffer: contents,
                }
            }
            None if pushed => Route::Pending,
            None => Route::Unhandled,
        }
    }
}
