//! Paginated tables and the per-user answer history.

use std::sync::Arc;

use shared::domain::{Answer, UserId};
use tokio::{
    sync::{broadcast::error::RecvError, Mutex},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    entity::Listable,
    error::Failure,
    events::{NotificationKind, Notifier, SyncEvent},
    paginate::Paginator,
    source::RemoteDataSource,
    sync::LoadState,
};

struct CollectionState<E> {
    paginator: Paginator,
    items: Vec<E>,
    load: LoadState,
    request_seq: u64,
}

/// The page currently rendered for a table. The source does the slicing;
/// this view only keeps what the last fetch for the current page returned.
pub struct CollectionView<E: Listable> {
    source: Arc<dyn RemoteDataSource>,
    notifier: Notifier,
    inner: Mutex<CollectionState<E>>,
}

impl<E: Listable> CollectionView<E> {
    pub fn new(source: Arc<dyn RemoteDataSource>, page_size: u32, notifier: Notifier) -> Self {
        Self {
            source,
            notifier,
            inner: Mutex::new(CollectionState {
                paginator: Paginator::new(page_size),
                items: Vec::new(),
                load: LoadState::Idle,
                request_seq: 0,
            }),
        }
    }

    /// Fetches the current page. If the total shrank below the current page,
    /// moves to the last page and fetches once more.
    pub async fn refresh(&self) -> LoadState {
        match self.fetch_current().await {
            (_, true) => self.fetch_current().await.0,
            (state, false) => state,
        }
    }

    /// Returns the load state and whether the page index was clamped.
    async fn fetch_current(&self) -> (LoadState, bool) {
        let (seq, page, limit) = {
            let mut guard = self.inner.lock().await;
            guard.request_seq += 1;
            guard.load = LoadState::Loading;
            (
                guard.request_seq,
                guard.paginator.page_index(),
                guard.paginator.page_size(),
            )
        };

        let result = E::fetch_page(self.source.as_ref(), page, limit).await;

        let mut guard = self.inner.lock().await;
        if guard.request_seq != seq {
            debug!("collection: dropping stale page kind={} page={page}", E::KIND);
            return (guard.load.clone(), false);
        }

        match result {
            Ok(fetched) => {
                let moved = guard.paginator.set_total_count(fetched.total_count);
                // A clamped index means these items belong to a page past the end.
                guard.items = if moved { Vec::new() } else { fetched.items };
                guard.load = LoadState::Ready;
                let total_pages = guard.paginator.total_pages();
                let page = guard.paginator.page_index();
                drop(guard);
                self.notifier.publish(SyncEvent::PageChanged {
                    kind: E::KIND,
                    page,
                    total_pages,
                });
                (LoadState::Ready, moved)
            }
            Err(err) => {
                guard.items.clear();
                guard.load = LoadState::Failed(Failure::from(&err));
                drop(guard);
                self.notifier.notify(
                    NotificationKind::FetchFailure,
                    format!("failed to load {} page {page}: {err}", E::KIND),
                );
                (LoadState::Failed(Failure::from(&err)), false)
            }
        }
    }

    /// Moves to `page` and re-fetches. Out-of-range pages are ignored.
    pub async fn set_page(&self, page: u32) -> bool {
        {
            let mut guard = self.inner.lock().await;
            if !guard.paginator.set_page(page) {
                return false;
            }
        }
        self.refresh().await;
        true
    }

    pub async fn next_page(&self) -> bool {
        let target = self.paginator().await.page_index().saturating_add(1);
        self.set_page(target).await
    }

    pub async fn previous_page(&self) -> bool {
        let target = self.paginator().await.page_index().saturating_sub(1);
        self.set_page(target).await
    }

    /// Re-fetches the current page when an entity of this kind was committed.
    pub async fn handle_event(&self, event: &SyncEvent) -> bool {
        match event {
            SyncEvent::Committed { kind, entity_id } if *kind == E::KIND => {
                debug!("collection: refreshing after commit kind={kind} id={entity_id}");
                self.refresh().await;
                true
            }
            _ => false,
        }
    }

    /// Keeps the table in step with commits published on the shared notifier.
    /// The task ends once the view is dropped or the notifier closes.
    pub fn refresh_on_commit(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.notifier.subscribe();
        let view = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("collection: missed {skipped} events kind={}", E::KIND);
                        let Some(live) = view.upgrade() else { break };
                        live.refresh().await;
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let Some(live) = view.upgrade() else { break };
                live.handle_event(&event).await;
            }
        })
    }

    pub async fn paginator(&self) -> Paginator {
        self.inner.lock().await.paginator
    }

    pub async fn items(&self) -> Vec<E> {
        self.inner.lock().await.items.clone()
    }

    pub async fn load_state(&self) -> LoadState {
        self.inner.lock().await.load.clone()
    }
}

struct AnswerState {
    user_id: Option<UserId>,
    answers: Vec<Answer>,
    load: LoadState,
}

/// Answers submitted by the user open in the detail view.
pub struct AnswerHistory {
    source: Arc<dyn RemoteDataSource>,
    notifier: Notifier,
    inner: Mutex<AnswerState>,
}

impl AnswerHistory {
    pub fn new(source: Arc<dyn RemoteDataSource>, notifier: Notifier) -> Self {
        Self {
            source,
            notifier,
            inner: Mutex::new(AnswerState {
                user_id: None,
                answers: Vec::new(),
                load: LoadState::Idle,
            }),
        }
    }

    /// Loads answers for `user_id`. `None` clears the list without a request.
    pub async fn load(&self, user_id: Option<&UserId>) -> LoadState {
        {
            let mut guard = self.inner.lock().await;
            guard.user_id = user_id.cloned();
            guard.answers.clear();
            guard.load = if user_id.is_some() {
                LoadState::Loading
            } else {
                LoadState::Idle
            };
        }
        let Some(user_id) = user_id else {
            return LoadState::Idle;
        };

        let result = self.source.fetch_answers(user_id).await;

        let mut guard = self.inner.lock().await;
        if guard.user_id.as_ref() != Some(user_id) {
            debug!("answers: dropping stale answers user={user_id}");
            return guard.load.clone();
        }

        match result {
            Ok(answers) => {
                guard.answers = answers;
                guard.load = LoadState::Ready;
                LoadState::Ready
            }
            Err(err) => {
                guard.load = LoadState::Failed(Failure::from(&err));
                drop(guard);
                self.notifier.notify(
                    NotificationKind::FetchFailure,
                    format!("failed to load answers for user {user_id}: {err}"),
                );
                LoadState::Failed(Failure::from(&err))
            }
        }
    }

    pub async fn answers(&self) -> Vec<Answer> {
        self.inner.lock().await.answers.clone()
    }

    pub async fn load_state(&self) -> LoadState {
        self.inner.lock().await.load.clone()
    }
}

#[cfg(test)]
#[path = "tests/collection_tests.rs"]
mod tests;
