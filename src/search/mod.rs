//! 文書内検索
//!
//! ページ単位の検索をバックグラウンドスレッドで行い、結果をメインループへ返す。

pub mod coordinator;
pub mod state;
pub mod types;

pub use coordinator::SearchCoordinator;
pub use state::SearchState;
pub use types::{SearchDirection, SearchHit, SearchMessage};
