//! Selection, edit-buffer and commit state for one open detail view.

use std::sync::Arc;

use shared::domain::{Profile, Question};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    entity::{EditableEntity, QuestionField},
    error::{DataSourceError, Failure, ValidationError},
    events::{NotificationKind, Notifier, SyncEvent},
    image_url::ImageResolver,
    source::RemoteDataSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Viewing,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(Failure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    NoSelection,
    NotEditing,
    AlreadyCommitting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome<E> {
    /// The server accepted the patch and its copy is now the snapshot.
    Committed(E),
    /// The request failed; the buffer is untouched and still editable.
    Failed(Failure),
    /// Refused before any request was made.
    Rejected(ValidationError),
    /// The selection changed while the request was in flight.
    Discarded,
    Ignored(IgnoredReason),
}

impl<E> CommitOutcome<E> {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed(_))
    }
}

struct Selection<E: EditableEntity> {
    snapshot: E,
    buffer: E::Buffer,
    mode: Mode,
    committing: bool,
}

struct SyncState<E: EditableEntity> {
    selection: Option<Selection<E>>,
    /// Bumped on every selection change; in-flight commits compare against it.
    generation: u64,
}

pub struct Synchronizer<E: EditableEntity> {
    source: Arc<dyn RemoteDataSource>,
    images: ImageResolver,
    notifier: Notifier,
    inner: Mutex<SyncState<E>>,
}

impl<E: EditableEntity> Synchronizer<E> {
    pub fn new(
        source: Arc<dyn RemoteDataSource>,
        images: ImageResolver,
        notifier: Notifier,
    ) -> Self {
        Self {
            source,
            images,
            notifier,
            inner: Mutex::new(SyncState {
                selection: None,
                generation: 0,
            }),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SyncEvent> {
        self.notifier.subscribe()
    }

    /// Replaces the selection and re-derives the buffer. `None` clears it.
    pub async fn select(&self, entity: Option<E>) {
        let mut guard = self.inner.lock().await;
        guard.generation += 1;
        guard.selection = entity.map(|snapshot| Selection {
            buffer: snapshot.derive_buffer(&self.images),
            snapshot,
            mode: Mode::Viewing,
            committing: false,
        });
    }

    /// Fetches the entity and selects it. On failure the current selection
    /// is cleared so a stale entity is never shown under the new id.
    pub async fn open(&self, id: &E::Id) -> LoadState {
        let generation = {
            let mut guard = self.inner.lock().await;
            guard.generation += 1;
            guard.generation
        };

        let fetched = E::fetch(self.source.as_ref(), id).await;
        self.finish_load(generation, fetched, &id.to_string()).await
    }

    async fn finish_load(
        &self,
        generation: u64,
        fetched: Result<E, DataSourceError>,
        label: &str,
    ) -> LoadState {
        let mut guard = self.inner.lock().await;
        if guard.generation != generation {
            debug!("sync: dropping stale load kind={} id={label}", E::KIND);
            return LoadState::Idle;
        }

        match fetched {
            Ok(snapshot) => {
                guard.selection = Some(Selection {
                    buffer: snapshot.derive_buffer(&self.images),
                    snapshot,
                    mode: Mode::Viewing,
                    committing: false,
                });
                LoadState::Ready
            }
            Err(err) => {
                guard.selection = None;
                drop(guard);
                self.notifier.notify(
                    NotificationKind::FetchFailure,
                    format!("failed to load {} {label}: {err}", E::KIND),
                );
                LoadState::Failed(Failure::from(&err))
            }
        }
    }

    pub async fn begin_edit(&self) -> bool {
        let mut guard = self.inner.lock().await;
        match guard.selection.as_mut() {
            Some(selection) if selection.mode == Mode::Viewing => {
                selection.mode = Mode::Editing;
                true
            }
            _ => false,
        }
    }

    /// Writes one field into the buffer. Only applies while editing.
    pub async fn update_field(&self, field: E::Field) -> bool {
        let mut guard = self.inner.lock().await;
        match guard.selection.as_mut() {
            Some(selection) if selection.mode == Mode::Editing => {
                E::apply_field(&mut selection.buffer, field);
                true
            }
            _ => false,
        }
    }

    /// Re-derives the buffer from the snapshot. Refused while a commit is in flight.
    pub async fn cancel_edit(&self) -> bool {
        let mut guard = self.inner.lock().await;
        let Some(selection) = guard.selection.as_mut() else {
            return false;
        };
        if selection.committing {
            return false;
        }
        selection.buffer = selection.snapshot.derive_buffer(&self.images);
        selection.mode = Mode::Viewing;
        true
    }

    pub async fn commit_edit(&self) -> CommitOutcome<E> {
        let (generation, id, patch) = {
            let mut guard = self.inner.lock().await;
            let generation = guard.generation;
            let Some(selection) = guard.selection.as_mut() else {
                return CommitOutcome::Ignored(IgnoredReason::NoSelection);
            };
            if selection.mode != Mode::Editing {
                return CommitOutcome::Ignored(IgnoredReason::NotEditing);
            }
            if selection.committing {
                return CommitOutcome::Ignored(IgnoredReason::AlreadyCommitting);
            }

            let patch = match E::build_patch(&selection.buffer) {
                Ok(patch) => patch,
                Err(err) => {
                    drop(guard);
                    self.notifier
                        .notify(NotificationKind::Validation, err.to_string());
                    return CommitOutcome::Rejected(err);
                }
            };

            selection.committing = true;
            (generation, selection.snapshot.id(), patch)
        };

        let result = E::submit(self.source.as_ref(), &id, patch).await;

        let mut guard = self.inner.lock().await;
        if guard.generation != generation {
            debug!(
                "sync: discarding commit for stale selection kind={} id={id}",
                E::KIND
            );
            return CommitOutcome::Discarded;
        }
        let Some(selection) = guard.selection.as_mut() else {
            return CommitOutcome::Discarded;
        };
        selection.committing = false;

        match result {
            Ok(updated) => {
                selection.buffer = updated.derive_buffer(&self.images);
                selection.snapshot = updated.clone();
                selection.mode = Mode::Viewing;
                drop(guard);
                info!("sync: committed kind={} id={id}", E::KIND);
                self.notifier.publish(SyncEvent::Committed {
                    kind: E::KIND,
                    entity_id: id.to_string(),
                });
                CommitOutcome::Committed(updated)
            }
            Err(err) => {
                drop(guard);
                warn!("sync: commit failed kind={} id={id} err={err}", E::KIND);
                self.notifier.notify(
                    NotificationKind::MutationFailure,
                    format!("failed to save {} {id}: {err}", E::KIND),
                );
                CommitOutcome::Failed(Failure::from(&err))
            }
        }
    }

    pub async fn snapshot(&self) -> Option<E> {
        let guard = self.inner.lock().await;
        guard.selection.as_ref().map(|s| s.snapshot.clone())
    }

    pub async fn buffer(&self) -> Option<E::Buffer> {
        let guard = self.inner.lock().await;
        guard.selection.as_ref().map(|s| s.buffer.clone())
    }

    /// `None` when nothing is selected.
    pub async fn mode(&self) -> Option<Mode> {
        let guard = self.inner.lock().await;
        guard.selection.as_ref().map(|s| s.mode)
    }

    pub async fn is_committing(&self) -> bool {
        let guard = self.inner.lock().await;
        guard.selection.as_ref().is_some_and(|s| s.committing)
    }
}

impl Synchronizer<Question> {
    pub async fn add_option(&self) -> bool {
        self.update_field(QuestionField::AddOption).await
    }

    pub async fn remove_option(&self, index: usize) -> bool {
        self.update_field(QuestionField::RemoveOption(index)).await
    }

    pub async fn set_option(&self, index: usize, value: impl Into<String>) -> bool {
        self.update_field(QuestionField::SetOption(index, value.into())).await
    }
}

impl Synchronizer<Profile> {
    /// Loads the signed-in administrator's profile into the view.
    pub async fn load_own(&self) -> LoadState {
        let generation = {
            let mut guard = self.inner.lock().await;
            guard.generation += 1;
            guard.generation
        };

        let fetched = self.source.fetch_profile().await;
        self.finish_load(generation, fetched, "self").await
    }
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
