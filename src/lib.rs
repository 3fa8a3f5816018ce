//! folio - vim 風キーボード操作の文書ビューア
//!
//! キー入力の振り分け、コマンドライン、補完、検索を中心に構成する

// コアモジュール
pub mod error;
pub mod logging;
pub mod settings;

// データ層
pub mod bookmarks;
pub mod document;

// ロジック層
pub mod command;
pub mod completion;
pub mod input;
pub mod search;
pub mod viewer;

// 起動まわり
pub mod cli;
pub mod config;

// 表示層
pub mod frontend;

// 公開API
pub use error::{FolioError, Result};
pub use frontend::TuiApplication;
pub use viewer::Viewer;
