//! 検索関連の型定義

use crate::document::PageRect;
use crate::input::ArgKind;

/// 検索方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    Backward,
    /// 検索せず、既存の結果を再描画するだけ
    None,
}

impl SearchDirection {
    /// バインディング引数から変換
    pub fn from_kind(kind: ArgKind) -> Option<Self> {
        match kind {
            ArgKind::Forward => Some(SearchDirection::Forward),
            ArgKind::Backward => Some(SearchDirection::Backward),
            ArgKind::NoSearch => Some(SearchDirection::None),
            _ => None,
        }
    }

    /// ページ送りの符号
    pub fn step(self) -> i64 {
        match self {
            SearchDirection::Backward => -1,
            _ => 1,
        }
    }
}

/// ワーカーからメインループへの通知
#[derive(Debug, Clone, PartialEq)]
pub enum SearchMessage {
    /// 一致したページが見つかった
    Found {
        generation: u64,
        page: usize,
        query: String,
        matches: Vec<PageRect>,
    },
    /// 全ページを調べたが見つからなかった
    Exhausted { generation: u64, query: String },
}

/// 適用された検索結果（呼び出し側はこのページへ移動する）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub page: usize,
    pub match_count: usize,
}
