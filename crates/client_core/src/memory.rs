//! A [`RemoteDataSource`] backed by in-process collections, for demos and
//! offline runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::{Answer, Profile, Question, QuestionId, User, UserId},
    protocol::{CollectionPage, ProfileUpdate, QuestionPayload, UserUpdate},
};
use tokio::sync::Mutex;

use crate::{
    error::DataSourceError,
    paginate,
    source::{RemoteDataSource, SourceResult},
};

#[derive(Default)]
struct MemoryStore {
    users: Vec<User>,
    questions: Vec<Question>,
    answers: HashMap<UserId, Vec<Answer>>,
    profile: Option<Profile>,
    next_question: u64,
}

#[derive(Default)]
pub struct InMemoryDataSource {
    store: Mutex<MemoryStore>,
}

impl InMemoryDataSource {
    pub fn new(users: Vec<User>, questions: Vec<Question>) -> Self {
        Self {
            store: Mutex::new(MemoryStore {
                users,
                questions,
                ..MemoryStore::default()
            }),
        }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.store.get_mut().profile = Some(profile);
        self
    }

    pub fn with_answers(mut self, user_id: UserId, answers: Vec<Answer>) -> Self {
        self.store.get_mut().answers.insert(user_id, answers);
        self
    }
}

fn page_of<T: Clone>(items: &[T], page: u32, limit: u32) -> CollectionPage<T> {
    CollectionPage {
        items: paginate::slice(items, page, limit).to_vec(),
        total_count: items.len() as u64,
    }
}

fn uploaded_path(upload: &shared::protocol::ImageUpload) -> String {
    format!("/images/{}", upload.filename)
}

#[async_trait]
impl RemoteDataSource for InMemoryDataSource {
    async fn fetch_users(&self, page: u32, limit: u32) -> SourceResult<CollectionPage<User>> {
        let store = self.store.lock().await;
        Ok(page_of(&store.users, page, limit))
    }

    async fn fetch_user(&self, id: &UserId) -> SourceResult<User> {
        let store = self.store.lock().await;
        store
            .users
            .iter()
            .find(|user| &user.id == id)
            .cloned()
            .ok_or_else(|| DataSourceError::NotFound(format!("user {id}")))
    }

    async fn update_user(&self, id: &UserId, patch: UserUpdate) -> SourceResult<User> {
        let mut store = self.store.lock().await;
        let user = store
            .users
            .iter_mut()
            .find(|user| &user.id == id)
            .ok_or_else(|| DataSourceError::NotFound(format!("user {id}")))?;

        user.first_name = Some(patch.first_name);
        user.last_name = Some(patch.last_name);
        user.age = patch.age.trim().parse().ok();
        user.gender = Some(patch.gender).filter(|gender| !gender.is_empty());
        user.is_notification = patch.is_notification;
        if let Some(upload) = &patch.image {
            user.image = Some(uploaded_path(upload));
        }
        Ok(user.clone())
    }

    async fn fetch_answers(&self, user_id: &UserId) -> SourceResult<Vec<Answer>> {
        let store = self.store.lock().await;
        Ok(store.answers.get(user_id).cloned().unwrap_or_default())
    }

    async fn fetch_questions(
        &self,
        page: u32,
        limit: u32,
    ) -> SourceResult<CollectionPage<Question>> {
        let store = self.store.lock().await;
        Ok(page_of(&store.questions, page, limit))
    }

    async fn fetch_question(&self, id: &QuestionId) -> SourceResult<Question> {
        let store = self.store.lock().await;
        store
            .questions
            .iter()
            .find(|question| &question.id == id)
            .cloned()
            .ok_or_else(|| DataSourceError::NotFound(format!("question {id}")))
    }

    async fn update_question(
        &self,
        id: &QuestionId,
        payload: QuestionPayload,
    ) -> SourceResult<Question> {
        let mut store = self.store.lock().await;
        let question = store
            .questions
            .iter_mut()
            .find(|question| &question.id == id)
            .ok_or_else(|| DataSourceError::NotFound(format!("question {id}")))?;
        question.question = payload.question;
        question.options = payload.options;
        Ok(question.clone())
    }

    async fn create_question(&self, payload: QuestionPayload) -> SourceResult<Question> {
        let mut store = self.store.lock().await;
        store.next_question += 1;
        let question = Question {
            id: QuestionId(format!("mem-q-{}", store.next_question)),
            question: payload.question,
            options: payload.options,
            created_at: Some(Utc::now()),
        };
        store.questions.push(question.clone());
        Ok(question)
    }

    async fn fetch_profile(&self) -> SourceResult<Profile> {
        let store = self.store.lock().await;
        store
            .profile
            .clone()
            .ok_or_else(|| DataSourceError::NotFound("profile".into()))
    }

    async fn update_profile(&self, patch: ProfileUpdate) -> SourceResult<Profile> {
        let mut store = self.store.lock().await;
        let profile = store
            .profile
            .as_mut()
            .ok_or_else(|| DataSourceError::NotFound("profile".into()))?;
        profile.first_name = Some(patch.first_name);
        profile.phone = Some(patch.phone).filter(|phone| !phone.is_empty());
        if let Some(upload) = &patch.image {
            profile.image = Some(uploaded_path(upload));
        }
        Ok(profile.clone())
    }
}
