//! Draft state for the "add question" flow.

use std::sync::Arc;

use shared::domain::Question;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    entity::{QuestionBuffer, QuestionField},
    error::Failure,
    events::{NotificationKind, Notifier, SyncEvent},
    source::RemoteDataSource,
    sync::{CommitOutcome, IgnoredReason},
};

struct ComposerState {
    draft: QuestionBuffer,
    submitting: bool,
}

pub struct QuestionComposer {
    source: Arc<dyn RemoteDataSource>,
    notifier: Notifier,
    inner: Mutex<ComposerState>,
}

impl QuestionComposer {
    pub fn new(source: Arc<dyn RemoteDataSource>, notifier: Notifier) -> Self {
        Self {
            source,
            notifier,
            inner: Mutex::new(ComposerState {
                draft: QuestionBuffer::default(),
                submitting: false,
            }),
        }
    }

    pub async fn edit(&self, field: QuestionField) {
        self.inner.lock().await.draft.apply(field);
    }

    pub async fn set_text(&self, text: impl Into<String>) {
        self.edit(QuestionField::Text(text.into())).await;
    }

    pub async fn add_option(&self) {
        self.edit(QuestionField::AddOption).await;
    }

    pub async fn remove_option(&self, index: usize) {
        self.edit(QuestionField::RemoveOption(index)).await;
    }

    pub async fn set_option(&self, index: usize, value: impl Into<String>) {
        self.edit(QuestionField::SetOption(index, value.into())).await;
    }

    pub async fn draft(&self) -> QuestionBuffer {
        self.inner.lock().await.draft.clone()
    }

    pub async fn is_submitting(&self) -> bool {
        self.inner.lock().await.submitting
    }

    /// Creates the question. The draft resets on success and is kept on failure.
    pub async fn submit(&self) -> CommitOutcome<Question> {
        let payload = {
            let mut guard = self.inner.lock().await;
            if guard.submitting {
                return CommitOutcome::Ignored(IgnoredReason::AlreadyCommitting);
            }
            match guard.draft.payload() {
                Ok(payload) => {
                    guard.submitting = true;
                    payload
                }
                Err(err) => {
                    drop(guard);
                    self.notifier
                        .notify(NotificationKind::Validation, err.to_string());
                    return CommitOutcome::Rejected(err);
                }
            }
        };

        let result = self.source.create_question(payload).await;

        let mut guard = self.inner.lock().await;
        guard.submitting = false;
        match result {
            Ok(created) => {
                guard.draft = QuestionBuffer::default();
                drop(guard);
                info!("composer: created question id={}", created.id);
                self.notifier.publish(SyncEvent::Committed {
                    kind: "question",
                    entity_id: created.id.to_string(),
                });
                CommitOutcome::Committed(created)
            }
            Err(err) => {
                drop(guard);
                warn!("composer: create failed err={err}");
                self.notifier.notify(
                    NotificationKind::MutationFailure,
                    format!("failed to create question: {err}"),
                );
                CommitOutcome::Failed(Failure::from(&err))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/composer_tests.rs"]
mod tests;
