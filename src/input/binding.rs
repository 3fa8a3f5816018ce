//! キーバインディングテーブル
//!
//! 挿入順を保持する。同じ (mask, key, mode) への登録は既存エントリを
//! その位置のまま上書きする。

use super::key::{KeyMask, KeySym, Mode};
use super::names::Argument;

/// 1 件のバインディング
#[derive(Debug, Clone, PartialEq)]
pub struct Binding<H> {
    pub mask: KeyMask,
    pub key: KeySym,
    pub mode: Mode,
    pub handler: H,
    pub argument: Argument,
}

impl<H> Binding<H> {
    /// 文書ビューでの一致判定
    ///
    /// 印字可能キーは Shift 単独の押下でも一致する（大文字がそのまま届くため）
    pub fn matches(&self, key: KeySym, clean_mask: KeyMask, mode: Mode) -> bool {
        self.key == key
            && (clean_mask == self.mask || (key.is_printable() && clean_mask == KeyMask::SHIFT))
            && mode.accepts(self.mode)
    }

    /// インプットバーでの一致判定（マスクが押下中の修飾子に含まれていればよい）
    pub fn matches_subset(&self, key: KeySym, clean_mask: KeyMask) -> bool {
        self.key == key && clean_mask.contains(self.mask)
    }
}

/// `bind` の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Inserted,
    Replaced,
}

/// バインディングテーブル
#[derive(Debug, Clone)]
pub struct BindingTable<H> {
    entries: Vec<Binding<H>>,
}

impl<H> Default for BindingTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> BindingTable<H> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// バインディングを登録する
    pub fn bind(
        &mut self,
        mask: KeyMask,
        key: KeySym,
        mode: Mode,
        handler: H,
        argument: Argument,
    ) -> BindOutcome {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|entry| entry.mask == mask && entry.key == key && entry.mode == mode)
        {
            existing.handler = handler;
            existing.argument = argument;
            return BindOutcome::Replaced;
        }

        self.entries.push(Binding {
            mask,
            key,
            mode,
            handler,
            argument,
        });
        BindOutcome::Inserted
    }

    /// 挿入順に走査する
    pub fn bindings(&self) -> std::slice::Iter<'_, Binding<H>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// インプットバー用: 最初に一致したバインディング
    pub fn find_subset(&self, key: KeySym, mask: KeyMask) -> Option<&Binding<H>> {
        let clean = mask.clean();
        self.entries
            .iter()
            .find(|entry| entry.matches_subset(key, clean))
    }
}
