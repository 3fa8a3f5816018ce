//! バックグラウンド検索の調停
//!
//! ワーカースレッドは常に高々 1 つ。新しい要求は前のワーカーに中断を
//! 要求し、終了を待ってから（文書ロックは持たずに）次を起動する。
//! 結果はチャネル経由でメインループへ渡し、`SearchState` の更新は
//! メインループ側だけで行う。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::state::SearchState;
use super::types::{SearchDirection, SearchHit, SearchMessage};
use crate::document::{self, SharedDocument};
use crate::error::{Result, SystemError};

struct SearchWorker {
    cancel: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// ワーカーに渡す検索条件
struct SearchJob {
    generation: u64,
    query: String,
    start_page: usize,
    step: i64,
    /// 同じ検索語の続きなら 1（現在ページを飛ばす）
    first_counter: usize,
}

pub struct SearchCoordinator {
    sender: Sender<SearchMessage>,
    receiver: Receiver<SearchMessage>,
    worker: Option<SearchWorker>,
    state: SearchState,
    /// 次に使う検索語
    query: Option<String>,
    /// 直前のワーカーが調べた検索語
    scanned_query: Option<String>,
    generation: u64,
}

impl Default for SearchCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchCoordinator {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            worker: None,
            state: SearchState::new(),
            query: None,
            scanned_query: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SearchState {
        &mut self.state
    }

    /// 次の検索で使われる検索語
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// ワーカーが走っているか
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| worker.running.load(Ordering::SeqCst))
    }

    /// 検索を要求する
    ///
    /// 前のワーカーが投稿済みの結果があれば先に適用し、そのページを返す。
    /// `current_page` はその結果を反映する前の表示ページ。
    pub fn request(
        &mut self,
        document: Option<&SharedDocument>,
        current_page: usize,
        direction: SearchDirection,
        query: Option<String>,
    ) -> Result<Option<SearchHit>> {
        self.stop_worker();
        let hit = self.drain();
        let start_page = hit.map(|hit| hit.page).unwrap_or(current_page);

        if let Some(query) = query {
            self.query = Some(query);
        }

        if direction == SearchDirection::None {
            self.state.needs_redraw = true;
            return Ok(hit);
        }

        let Some(document) = document else {
            log::debug!("search requested without a document");
            return Ok(hit);
        };
        let query = match self.query.as_deref() {
            Some(query) if !query.is_empty() => query.to_string(),
            _ => {
                log::debug!("search requested without a query");
                return Ok(hit);
            }
        };

        let first_counter = usize::from(self.scanned_query.as_deref() == Some(query.as_str()));
        self.scanned_query = Some(query.clone());
        self.generation += 1;

        let job = SearchJob {
            generation: self.generation,
            query,
            start_page,
            step: direction.step(),
            first_counter,
        };
        self.spawn(document.clone(), job)?;
        Ok(hit)
    }

    fn spawn(&mut self, document: SharedDocument, job: SearchJob) -> Result<()> {
        let cancel = Arc::new(AtomicBool::new(false));
        let running = Arc::new(AtomicBool::new(true));
        let sender = self.sender.clone();

        let worker_cancel = Arc::clone(&cancel);
        let worker_running = Arc::clone(&running);
        let generation = job.generation;

        let handle = thread::Builder::new()
            .name("folio-search".to_string())
            .spawn(move || {
                if let Some(message) = scan(&document, &job, &worker_cancel) {
                    // 受信側が先に破棄されていれば結果は捨てる
                    let _ = sender.send(message);
                }
                worker_running.store(false, Ordering::SeqCst);
            })
            .map_err(|err| SystemError::Worker {
                message: err.to_string(),
            })?;

        log::debug!("search worker {} started", generation);
        self.worker = Some(SearchWorker {
            cancel,
            running,
            handle,
        });
        Ok(())
    }

    /// 走っているワーカーに中断を要求し、終了を待つ
    fn stop_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.cancel.store(true, Ordering::SeqCst);
            Self::join(worker);
        }
    }

    fn join(worker: SearchWorker) {
        if worker.handle.join().is_err() {
            log::error!("search worker panicked");
        }
        worker.running.store(false, Ordering::SeqCst);
    }

    /// 届いている結果を適用する
    fn drain(&mut self) -> Option<SearchHit> {
        let mut hit = None;
        while let Ok(message) = self.receiver.try_recv() {
            match message {
                SearchMessage::Found {
                    generation,
                    page,
                    query,
                    matches,
                } => {
                    if generation != self.generation {
                        log::debug!("discarding result of search worker {}", generation);
                        continue;
                    }
                    log::info!("'{}' found on page {}", query, page + 1);
                    hit = Some(SearchHit {
                        page,
                        match_count: matches.len(),
                    });
                    self.state.apply(page, query, matches);
                }
                SearchMessage::Exhausted { generation, query } => {
                    log::info!("'{}' not found (worker {})", query, generation);
                }
            }
        }
        hit
    }

    /// メインループから毎回呼ぶ。終了したワーカーを回収し、結果を適用する
    pub fn poll(&mut self) -> Option<SearchHit> {
        if self
            .worker
            .as_ref()
            .is_some_and(|worker| !worker.running.load(Ordering::SeqCst))
        {
            if let Some(worker) = self.worker.take() {
                Self::join(worker);
            }
        }
        self.drain()
    }

    /// ワーカーの終了を待ってから結果を適用する
    pub fn wait(&mut self) -> Option<SearchHit> {
        if let Some(worker) = self.worker.take() {
            Self::join(worker);
        }
        self.drain()
    }

    /// 検索を中断する（結果は適用しない）
    pub fn cancel(&mut self) {
        self.stop_worker();
        while self.receiver.try_recv().is_ok() {}
    }

    /// 文書を閉じたとき
    pub fn reset(&mut self) {
        self.cancel();
        self.state.reset();
        self.scanned_query = None;
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

/// ワーカー本体。中断されたときは何も返さない
fn scan(document: &SharedDocument, job: &SearchJob, cancel: &AtomicBool) -> Option<SearchMessage> {
    let page_count = match document::lock(document) {
        Ok(engine) => engine.page_count(),
        Err(err) => {
            log::error!("search aborted: {}", err);
            return None;
        }
    };

    let exhausted = SearchMessage::Exhausted {
        generation: job.generation,
        query: job.query.clone(),
    };
    if page_count == 0 {
        return Some(exhausted);
    }

    let count = page_count as i64;
    for counter in job.first_counter..=page_count {
        if cancel.load(Ordering::SeqCst) {
            log::debug!("search worker {} cancelled", job.generation);
            return None;
        }

        let page = (job.start_page as i64 + counter as i64 * job.step).rem_euclid(count) as usize;

        // ロックはページ 1 枚分だけ保持する
        let matches = match document::lock(document) {
            Ok(engine) => engine.find_text(page, &job.query),
            Err(err) => {
                log::error!("search aborted: {}", err);
                return None;
            }
        };

        if !matches.is_empty() {
            return Some(SearchMessage::Found {
                generation: job.generation,
                page,
                query: job.query.clone(),
                matches,
            });
        }
    }

    Some(exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{share, TextDocument};
    use std::path::Path;

    fn pages(texts: &[&str]) -> SharedDocument {
        let raw = texts.join("\u{0c}");
        share(Box::new(TextDocument::from_text(Path::new("/tmp/search.txt"), raw, 100)))
    }

    #[test]
    fn finds_match_behind_current_page() {
        let mut texts = vec!["nothing here"; 10];
        texts[0] = "the needle";
        let document = pages(&texts);
        let mut search = SearchCoordinator::new();

        search
            .request(Some(&document), 6, SearchDirection::Forward, Some("needle".to_string()))
            .unwrap();
        let hit = search.wait().unwrap();

        assert_eq!(hit.page, 0);
        assert_eq!(search.state().page, Some(0));
        assert_eq!(search.state().query.as_deref(), Some("needle"));
        assert!(!search.is_running());
    }

    #[test]
    fn repeated_query_resumes_from_next_page() {
        let document = pages(&["x", "x", "y", "x"]);
        let mut search = SearchCoordinator::new();

        search
            .request(Some(&document), 0, SearchDirection::Forward, Some("x".to_string()))
            .unwrap();
        assert_eq!(search.wait().unwrap().page, 0);

        search.request(Some(&document), 0, SearchDirection::Forward, None).unwrap();
        assert_eq!(search.wait().unwrap().page, 1);

        search.request(Some(&document), 1, SearchDirection::Forward, None).unwrap();
        assert_eq!(search.wait().unwrap().page, 3);

        search.request(Some(&document), 3, SearchDirection::Backward, None).unwrap();
        assert_eq!(search.wait().unwrap().page, 1);
    }

    #[test]
    fn exhausted_search_keeps_state() {
        let document = pages(&["a", "b"]);
        let mut search = SearchCoordinator::new();
        search
            .request(Some(&document), 0, SearchDirection::Forward, Some("a".to_string()))
            .unwrap();
        search.wait();

        search
            .request(Some(&document), 0, SearchDirection::Forward, Some("zzz".to_string()))
            .unwrap();
        assert!(search.wait().is_none());
        assert_eq!(search.state().query.as_deref(), Some("a"));
        assert_eq!(search.state().page, Some(0));
    }

    #[test]
    fn no_search_only_marks_redraw() {
        let document = pages(&["a"]);
        let mut search = SearchCoordinator::new();
        search
            .request(Some(&document), 0, SearchDirection::None, Some("a".to_string()))
            .unwrap();
        assert!(!search.is_running());
        assert!(search.state_mut().take_redraw());
        assert!(search.state().query.is_none());
    }

    #[test]
    fn missing_document_or_query_is_ignored() {
        let mut search = SearchCoordinator::new();
        assert!(search
            .request(None, 0, SearchDirection::Forward, Some("a".to_string()))
            .unwrap()
            .is_none());
        let document = pages(&["a"]);
        let mut search = SearchCoordinator::new();
        search
            .request(Some(&document), 0, SearchDirection::Forward, Some(String::new()))
            .unwrap();
        assert!(!search.is_running());
        assert!(search.wait().is_none());
    }
}
