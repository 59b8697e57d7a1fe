//! Entity kinds that can be selected, edited and committed, and the typed
//! edit buffers derived from them.

use std::fmt;

use async_trait::async_trait;
use shared::{
    domain::{Gender, Profile, Question, QuestionId, User, UserId},
    protocol::{CollectionPage, ImageUpload, ProfileUpdate, QuestionPayload, UserUpdate},
};

use crate::{
    error::ValidationError,
    image_url::ImageResolver,
    options::OptionList,
    source::{RemoteDataSource, SourceResult},
};

#[async_trait]
pub trait EditableEntity: Clone + Send + Sync + 'static {
    type Id: Clone + PartialEq + fmt::Display + Send + Sync;
    type Buffer: Clone + PartialEq + fmt::Debug + Send + Sync;
    /// The editable subset. Non-editable attributes have no variant.
    type Field: Send;
    type Patch: Send;

    const KIND: &'static str;

    fn id(&self) -> Self::Id;
    fn derive_buffer(&self, images: &ImageResolver) -> Self::Buffer;
    fn apply_field(buffer: &mut Self::Buffer, field: Self::Field);
    fn build_patch(buffer: &Self::Buffer) -> Result<Self::Patch, ValidationError>;

    async fn fetch(source: &dyn RemoteDataSource, id: &Self::Id) -> SourceResult<Self>;
    async fn submit(
        source: &dyn RemoteDataSource,
        id: &Self::Id,
        patch: Self::Patch,
    ) -> SourceResult<Self>;
}

/// Entities that appear in a paginated table.
#[async_trait]
pub trait Listable: Clone + Send + Sync + 'static {
    const KIND: &'static str;

    async fn fetch_page(
        source: &dyn RemoteDataSource,
        page: u32,
        limit: u32,
    ) -> SourceResult<CollectionPage<Self>>;
}

/// What the avatar slot shows for a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePreview {
    None,
    Remote(String),
    /// A file picked locally and not yet uploaded.
    Pending { filename: String },
}

impl ImagePreview {
    fn from_remote(images: &ImageResolver, path: Option<&str>) -> Self {
        images
            .preview(path)
            .map(ImagePreview::Remote)
            .unwrap_or(ImagePreview::None)
    }

    fn pending(upload: &ImageUpload) -> Self {
        ImagePreview::Pending {
            filename: upload.filename.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBuffer {
    pub first_name: String,
    pub last_name: String,
    /// Kept as typed text; parsed at commit time.
    pub age: String,
    /// The server's value, copied verbatim so unrecognised values survive a commit.
    pub gender: String,
    pub is_notification: bool,
    pub image: Option<ImageUpload>,
    pub preview: ImagePreview,
}

#[derive(Debug, Clone)]
pub enum UserField {
    FirstName(String),
    LastName(String),
    Age(String),
    /// `None` clears the field.
    Gender(Option<Gender>),
    Notifications(bool),
    Image(ImageUpload),
}

#[async_trait]
impl EditableEntity for User {
    type Id = UserId;
    type Buffer = UserBuffer;
    type Field = UserField;
    type Patch = UserUpdate;

    const KIND: &'static str = "user";

    fn id(&self) -> UserId {
        self.id.clone()
    }

    fn derive_buffer(&self, images: &ImageResolver) -> UserBuffer {
        UserBuffer {
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            age: self.age.map(|age| age.to_string()).unwrap_or_default(),
            gender: self.gender.clone().unwrap_or_default(),
            is_notification: self.is_notification,
            image: None,
            preview: ImagePreview::from_remote(images, self.image.as_deref()),
        }
    }

    fn apply_field(buffer: &mut UserBuffer, field: UserField) {
        match field {
            UserField::FirstName(value) => buffer.first_name = value,
            UserField::LastName(value) => buffer.last_name = value,
            UserField::Age(value) => buffer.age = value,
            UserField::Gender(value) => {
                buffer.gender = value.map(Gender::as_str).unwrap_or_default().to_string();
            }
            UserField::Notifications(value) => buffer.is_notification = value,
            UserField::Image(upload) => {
                buffer.preview = ImagePreview::pending(&upload);
                buffer.image = Some(upload);
            }
        }
    }

    fn build_patch(buffer: &UserBuffer) -> Result<UserUpdate, ValidationError> {
        let age = buffer.age.trim();
        if !age.is_empty() && age.parse::<u32>().is_err() {
            return Err(ValidationError::InvalidNumber {
                field: "age",
                value: buffer.age.clone(),
            });
        }

        Ok(UserUpdate {
            first_name: buffer.first_name.clone(),
            last_name: buffer.last_name.clone(),
            age: age.to_string(),
            gender: buffer.gender.clone(),
            is_notification: buffer.is_notification,
            image: buffer.image.clone(),
        })
    }

    async fn fetch(source: &dyn RemoteDataSource, id: &UserId) -> SourceResult<User> {
        source.fetch_user(id).await
    }

    async fn submit(
        source: &dyn RemoteDataSource,
        id: &UserId,
        patch: UserUpdate,
    ) -> SourceResult<User> {
        source.update_user(id, patch).await
    }
}

#[async_trait]
impl Listable for User {
    const KIND: &'static str = "user";

    async fn fetch_page(
        source: &dyn RemoteDataSource,
        page: u32,
        limit: u32,
    ) -> SourceResult<CollectionPage<User>> {
        source.fetch_users(page, limit).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionBuffer {
    pub text: String,
    pub options: OptionList,
}

#[derive(Debug, Clone)]
pub enum QuestionField {
    Text(String),
    AddOption,
    RemoveOption(usize),
    SetOption(usize, String),
}

impl QuestionBuffer {
    pub fn apply(&mut self, field: QuestionField) {
        match field {
            QuestionField::Text(value) => self.text = value,
            QuestionField::AddOption => self.options.add(),
            QuestionField::RemoveOption(index) => {
                self.options.remove(index);
            }
            QuestionField::SetOption(index, value) => {
                self.options.set(index, value);
            }
        }
    }

    /// Payload for create and update. Blank options never leave the client.
    pub fn payload(&self) -> Result<QuestionPayload, ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyField("question"));
        }
        Ok(QuestionPayload {
            question: self.text.clone(),
            options: self.options.submission(),
        })
    }
}

#[async_trait]
impl EditableEntity for Question {
    type Id = QuestionId;
    type Buffer = QuestionBuffer;
    type Field = QuestionField;
    type Patch = QuestionPayload;

    const KIND: &'static str = "question";

    fn id(&self) -> QuestionId {
        self.id.clone()
    }

    fn derive_buffer(&self, _images: &ImageResolver) -> QuestionBuffer {
        QuestionBuffer {
            text: self.question.clone(),
            options: OptionList::from_options(self.options.iter().cloned()),
        }
    }

    fn apply_field(buffer: &mut QuestionBuffer, field: QuestionField) {
        buffer.apply(field);
    }

    fn build_patch(buffer: &QuestionBuffer) -> Result<QuestionPayload, ValidationError> {
        buffer.payload()
    }

    async fn fetch(source: &dyn RemoteDataSource, id: &QuestionId) -> SourceResult<Question> {
        source.fetch_question(id).await
    }

    async fn submit(
        source: &dyn RemoteDataSource,
        id: &QuestionId,
        patch: QuestionPayload,
    ) -> SourceResult<Question> {
        source.update_question(id, patch).await
    }
}

#[async_trait]
impl Listable for Question {
    const KIND: &'static str = "question";

    async fn fetch_page(
        source: &dyn RemoteDataSource,
        page: u32,
        limit: u32,
    ) -> SourceResult<CollectionPage<Question>> {
        source.fetch_questions(page, limit).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileBuffer {
    pub first_name: String,
    pub phone: String,
    pub image: Option<ImageUpload>,
    pub preview: ImagePreview,
}

#[derive(Debug, Clone)]
pub enum ProfileField {
    FirstName(String),
    Phone(String),
    Image(ImageUpload),
}

#[async_trait]
impl EditableEntity for Profile {
    type Id = UserId;
    type Buffer = ProfileBuffer;
    type Field = ProfileField;
    type Patch = ProfileUpdate;

    const KIND: &'static str = "profile";

    fn id(&self) -> UserId {
        self.id.clone()
    }

    fn derive_buffer(&self, images: &ImageResolver) -> ProfileBuffer {
        ProfileBuffer {
            first_name: self.first_name.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            image: None,
            preview: ImagePreview::from_remote(images, self.image.as_deref()),
        }
    }

    fn apply_field(buffer: &mut ProfileBuffer, field: ProfileField) {
        match field {
            ProfileField::FirstName(value) => buffer.first_name = value,
            ProfileField::Phone(value) => buffer.phone = value,
            ProfileField::Image(upload) => {
                buffer.preview = ImagePreview::pending(&upload);
                buffer.image = Some(upload);
            }
        }
    }

    fn build_patch(buffer: &ProfileBuffer) -> Result<ProfileUpdate, ValidationError> {
        if buffer.first_name.trim().is_empty() {
            return Err(ValidationError::EmptyField("firstName"));
        }
        Ok(ProfileUpdate {
            first_name: buffer.first_name.clone(),
            phone: buffer.phone.clone(),
            image: buffer.image.clone(),
        })
    }

    /// The profile endpoint is keyed by the bearer token, not by id.
    async fn fetch(source: &dyn RemoteDataSource, _id: &UserId) -> SourceResult<Profile> {
        source.fetch_profile().await
    }

    async fn submit(
        source: &dyn RemoteDataSource,
        _id: &UserId,
        patch: ProfileUpdate,
    ) -> SourceResult<Profile> {
        source.update_profile(patch).await
    }
}

#[cfg(test)]
#[path = "tests/entity_tests.rs"]
mod tests;
