//! Client-side state for the admin dashboard: typed edit buffers over
//! server-owned users and questions, paginated tables, and the HTTP source
//! that talks to the backend.

pub mod collection;
pub mod composer;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod http;
pub mod image_url;
pub mod memory;
pub mod options;
pub mod paginate;
pub mod source;
pub mod sync;

pub use collection::{AnswerHistory, CollectionView};
pub use composer::QuestionComposer;
pub use config::{load_settings, ClientSettings};
pub use entity::{
    EditableEntity, ImagePreview, Listable, ProfileBuffer, ProfileField, QuestionBuffer,
    QuestionField, UserBuffer, UserField,
};
pub use error::{DataSourceError, Failure, SettingsError, ValidationError};
pub use events::{Notification, NotificationKind, Notifier, SyncEvent};
pub use http::HttpDataSource;
pub use image_url::ImageResolver;
pub use memory::InMemoryDataSource;
pub use options::OptionList;
pub use paginate::Paginator;
pub use source::{CredentialProvider, RemoteDataSource, StaticCredential};
pub use sync::{CommitOutcome, IgnoredReason, LoadState, Mode, Synchronizer};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
