use async_trait::async_trait;
use shared::{
    domain::{Answer, Profile, Question, QuestionId, User, UserId},
    protocol::{CollectionPage, ProfileUpdate, QuestionPayload, UserUpdate},
};

use crate::error::DataSourceError;

pub type SourceResult<T> = std::result::Result<T, DataSourceError>;

/// The remote backend as seen by the dashboard. Collections are paginated by
/// the source; callers never re-slice what they receive.
#[async_trait]
pub trait RemoteDataSource: Send + Sync {
    async fn fetch_users(&self, page: u32, limit: u32) -> SourceResult<CollectionPage<User>>;
    async fn fetch_user(&self, id: &UserId) -> SourceResult<User>;
    async fn update_user(&self, id: &UserId, patch: UserUpdate) -> SourceResult<User>;
    async fn fetch_answers(&self, user_id: &UserId) -> SourceResult<Vec<Answer>>;
    async fn fetch_questions(&self, page: u32, limit: u32)
        -> SourceResult<CollectionPage<Question>>;
    async fn fetch_question(&self, id: &QuestionId) -> SourceResult<Question>;
    async fn update_question(
        &self,
        id: &QuestionId,
        payload: QuestionPayload,
    ) -> SourceResult<Question>;
    async fn create_question(&self, payload: QuestionPayload) -> SourceResult<Question>;
    async fn fetch_profile(&self) -> SourceResult<Profile>;
    async fn update_profile(&self, patch: ProfileUpdate) -> SourceResult<Profile>;
}

/// Supplies the bearer token attached to every request.
pub trait CredentialProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

pub struct StaticCredential(Option<String>);

impl StaticCredential {
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|token| !token.trim().is_empty()))
    }
}

impl CredentialProvider for StaticCredential {
    fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}
