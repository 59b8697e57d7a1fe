//! Shared fixtures for synchronizer tests.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex as StdMutex,
};

use async_trait::async_trait;
use shared::{
    domain::{Answer, Profile, Question, QuestionId, User, UserId},
    protocol::{CollectionPage, ProfileUpdate, QuestionPayload, UserUpdate},
};
use tokio::sync::oneshot;

use crate::{
    error::DataSourceError,
    memory::InMemoryDataSource,
    source::{RemoteDataSource, SourceResult},
};

pub(crate) fn user(id: &str, first_name: &str) -> User {
    User {
        id: UserId::from(id),
        first_name: Some(first_name.to_string()),
        last_name: Some("Lovelace".to_string()),
        email: format!("{id}@example.com"),
        age: Some(30),
        gender: Some("female".to_string()),
        is_notification: false,
        image: Some(format!("/images/{id}.png")),
        role: Some("user".to_string()),
        created_at: Some("2024-05-01T10:00:00Z".parse().expect("timestamp")),
    }
}

pub(crate) fn question(id: &str, text: &str, options: &[&str]) -> Question {
    Question {
        id: QuestionId::from(id),
        question: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        created_at: None,
    }
}

pub(crate) fn profile() -> Profile {
    Profile {
        id: UserId::from("admin"),
        first_name: Some("Root".to_string()),
        email: "admin@example.com".to_string(),
        phone: None,
        image: None,
    }
}

struct HeldMutation {
    started: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

/// In-memory backend with switchable failures and a gate that can hold the
/// next mutation in flight.
pub(crate) struct FakeSource {
    inner: InMemoryDataSource,
    fail_fetches: AtomicBool,
    fail_mutations: AtomicBool,
    expired_token: AtomicBool,
    held: StdMutex<Option<HeldMutation>>,
    pub(crate) question_payloads: StdMutex<Vec<QuestionPayload>>,
    pub(crate) user_patches: StdMutex<Vec<UserUpdate>>,
}

impl FakeSource {
    pub(crate) fn new(users: Vec<User>, questions: Vec<Question>) -> Self {
        Self {
            inner: InMemoryDataSource::new(users, questions).with_profile(profile()),
            fail_fetches: AtomicBool::new(false),
            fail_mutations: AtomicBool::new(false),
            expired_token: AtomicBool::new(false),
            held: StdMutex::new(None),
            question_payloads: StdMutex::new(Vec::new()),
            user_patches: StdMutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_answers(mut self, user_id: &str, answers: Vec<Answer>) -> Self {
        self.inner = self.inner.with_answers(UserId::from(user_id), answers);
        self
    }

    pub(crate) fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    /// Every later request answers 401 as if the bearer token expired.
    pub(crate) fn expire_token(&self) {
        self.expired_token.store(true, Ordering::SeqCst);
    }

    fn check_token(&self) -> SourceResult<()> {
        if self.expired_token.load(Ordering::SeqCst) {
            return Err(DataSourceError::Unauthorized {
                status: 401,
                message: "jwt expired".into(),
            });
        }
        Ok(())
    }

    /// Returns (started, release): `started` fires once the next mutation
    /// reaches the source; it then waits until `release` is sent.
    pub(crate) fn hold_next_mutation(&self) -> (oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        *self.held.lock().expect("held lock") = Some(HeldMutation {
            started: started_tx,
            release: release_rx,
        });
        (started_rx, release_tx)
    }

    async fn before_mutation(&self) -> SourceResult<()> {
        let held = self.held.lock().expect("held lock").take();
        if let Some(held) = held {
            let _ = held.started.send(());
            let _ = held.release.await;
        }
        self.check_token()?;
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(DataSourceError::Status {
                status: 500,
                message: "mutation rejected".into(),
            });
        }
        Ok(())
    }

    fn before_fetch(&self) -> SourceResult<()> {
        self.check_token()?;
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(DataSourceError::Status {
                status: 503,
                message: "backend unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteDataSource for FakeSource {
    async fn fetch_users(&self, page: u32, limit: u32) -> SourceResult<CollectionPage<User>> {
        self.before_fetch()?;
        self.inner.fetch_users(page, limit).await
    }

    async fn fetch_user(&self, id: &UserId) -> SourceResult<User> {
        self.before_fetch()?;
        self.inner.fetch_user(id).await
    }

    async fn update_user(&self, id: &UserId, patch: UserUpdate) -> SourceResult<User> {
        self.user_patches
            .lock()
            .expect("patches lock")
            .push(patch.clone());
        self.before_mutation().await?;
        self.inner.update_user(id, patch).await
    }

    async fn fetch_answers(&self, user_id: &UserId) -> SourceResult<Vec<Answer>> {
        self.before_fetch()?;
        self.inner.fetch_answers(user_id).await
    }

    async fn fetch_questions(
        &self,
        page: u32,
        limit: u32,
    ) -> SourceResult<CollectionPage<Question>> {
        self.before_fetch()?;
        self.inner.fetch_questions(page, limit).await
    }

    async fn fetch_question(&self, id: &QuestionId) -> SourceResult<Question> {
        self.before_fetch()?;
        self.inner.fetch_question(id).await
    }

    async fn update_question(
        &self,
        id: &QuestionId,
        payload: QuestionPayload,
    ) -> SourceResult<Question> {
        self.question_payloads
            .lock()
            .expect("payloads lock")
            .push(payload.clone());
        self.before_mutation().await?;
        self.inner.update_question(id, payload).await
    }

    async fn create_question(&self, payload: QuestionPayload) -> SourceResult<Question> {
        self.question_payloads
            .lock()
            .expect("payloads lock")
            .push(payload.clone());
        self.before_mutation().await?;
        self.inner.create_question(payload).await
    }

    async fn fetch_profile(&self) -> SourceResult<Profile> {
        self.before_fetch()?;
        self.inner.fetch_profile().await
    }

    async fn update_profile(&self, patch: ProfileUpdate) -> SourceResult<Profile> {
        self.before_mutation().await?;
        self.inner.update_profile(patch).await
    }
}
