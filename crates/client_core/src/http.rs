use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Answer, Profile, Question, QuestionId, User, UserId},
    error::ApiError,
    protocol::{
        CollectionPage, Envelope, ImageUpload, ListPayload, ProfileUpdate, QuestionPayload,
        UserUpdate,
    },
};
use tracing::debug;

use crate::{
    config::{normalize_api_url, ClientSettings},
    error::DataSourceError,
    source::{CredentialProvider, RemoteDataSource, SourceResult},
};

/// [`RemoteDataSource`] over the dashboard's REST backend.
pub struct HttpDataSource {
    http: Client,
    api_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

#[derive(Debug, serde::Serialize)]
struct PageQuery {
    page: u32,
    limit: u32,
}

impl HttpDataSource {
    pub fn new(
        settings: &ClientSettings,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, DataSourceError> {
        let api_url = normalize_api_url(&settings.api_url)?;
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http,
            api_url,
            credentials,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> SourceResult<T> {
        let token = self
            .credentials
            .access_token()
            .ok_or(DataSourceError::MissingCredential)?;

        let response = request.bearer_auth(token).send().await?;
        let status = response.status().as_u16();
        let url = response.url().path().to_string();
        let body = response.text().await?;
        debug!("http: status={status} path={url} bytes={}", body.len());

        if !(200..300).contains(&status) {
            return Err(DataSourceError::from_api_error(
                status,
                ApiError::from_response(status, &body),
            ));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|err| DataSourceError::Decode(format!("{url}: {err}")))?;
        if !envelope.success {
            return Err(DataSourceError::Status {
                status,
                message: envelope.message,
            });
        }
        Ok(envelope.data)
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        page: u32,
        limit: u32,
    ) -> SourceResult<CollectionPage<T>> {
        let payload: ListPayload<T> = self
            .execute(
                self.http.get(format!("{}{path}", self.api_url))
                    .query(&PageQuery { page, limit }),
            )
            .await?;
        Ok(CollectionPage::from_list(payload))
    }
}

fn attach_image(form: Form, image: Option<ImageUpload>) -> SourceResult<Form> {
    let Some(image) = image else {
        return Ok(form);
    };
    let mut part = Part::bytes(image.bytes).file_name(image.filename);
    if let Some(mime_type) = image.mime_type {
        part = part.mime_str(&mime_type)?;
    }
    Ok(form.part("image", part))
}

fn user_form(patch: UserUpdate) -> SourceResult<Form> {
    let form = Form::new()
        .text("firstName", patch.first_name)
        .text("lastName", patch.last_name)
        .text("age", patch.age)
        .text("gender", patch.gender)
        .text("isNotification", patch.is_notification.to_string());
    attach_image(form, patch.image)
}

fn profile_form(patch: ProfileUpdate) -> SourceResult<Form> {
    let form = Form::new()
        .text("firstName", patch.first_name)
        .text("phone", patch.phone);
    attach_image(form, patch.image)
}

#[async_trait]
impl RemoteDataSource for HttpDataSource {
    async fn fetch_users(&self, page: u32, limit: u32) -> SourceResult<CollectionPage<User>> {
        self.fetch_list("/user/get-all-users", page, limit).await
    }

    async fn fetch_user(&self, id: &UserId) -> SourceResult<User> {
        self.execute(
            self.http.get(format!("{}/user/get-single-user/{id}", self.api_url)),
        )
        .await
    }

    async fn update_user(&self, id: &UserId, patch: UserUpdate) -> SourceResult<User> {
        let form = user_form(patch)?;
        self.execute(
            self.http
                .patch(format!("{}/user/update-user-data/{id}", self.api_url))
                .multipart(form),
        )
        .await
    }

    async fn fetch_answers(&self, user_id: &UserId) -> SourceResult<Vec<Answer>> {
        let payload: ListPayload<Answer> = self
            .execute(
                self.http.get(format!("{}/ans/get-ans-by-user/{user_id}", self.api_url)),
            )
            .await?;
        Ok(payload.result)
    }

    async fn fetch_questions(
        &self,
        page: u32,
        limit: u32,
    ) -> SourceResult<CollectionPage<Question>> {
        self.fetch_list("/quesntion/get-all-question", page, limit).await
    }

    async fn fetch_question(&self, id: &QuestionId) -> SourceResult<Question> {
        self.execute(
            self.http.get(format!("{}/quesntion/get-single-question/{id}", self.api_url)),
        )
        .await
    }

    async fn update_question(
        &self,
        id: &QuestionId,
        payload: QuestionPayload,
    ) -> SourceResult<Question> {
        self.execute(
            self.http
                .patch(format!("{}/quesntion/update-question/{id}", self.api_url))
                .json(&payload),
        )
        .await
    }

    async fn create_question(&self, payload: QuestionPayload) -> SourceResult<Question> {
        self.execute(
            self.http
                .post(format!("{}/quesntion/create-question", self.api_url))
                .json(&payload),
        )
        .await
    }

    async fn fetch_profile(&self) -> SourceResult<Profile> {
        self.execute(self.http.get(format!("{}/user/profile", self.api_url))).await
    }

    async fn update_profile(&self, patch: ProfileUpdate) -> SourceResult<Profile> {
        let form = profile_form(patch)?;
        self.execute(
            self.http
                .patch(format!("{}/user/update-profile", self.api_url))
                .multipart(form),
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
