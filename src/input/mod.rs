//! 入力処理モジュール
//!
//! キー表現、バインディング、バッファコマンド、ルーティングを提供

pub mod binding;
pub mod buffer;
pub mod defaults;
pub mod key;
pub mod keyspec;
pub mod names;
pub mod router;

pub use binding::{BindOutcome, Binding, BindingTable};
pub use buffer::{BufferAccumulator, BufferRule, BufferRules};
pub use key::{KeyEvent, KeyMask, KeySym, Mode};
pub use keyspec::{parse_key_spec, KeySpec};
pub use names::{ArgKind, Argument, BufferAction, InputbarFunction, ShortcutFunction};
pub use router::{KeyRouter, Route};
