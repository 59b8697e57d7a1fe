use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(QuestionId);
id_newtype!(AnswerId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default)]
    pub is_notification: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn display_name(&self) -> &str {
        match self.first_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Unknown User",
        }
    }

    /// `YYYY-MM-DD` join date, empty when the server omitted it.
    pub fn join_date(&self) -> String {
        self.created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: QuestionId,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AnswerRecord", into = "AnswerRecord")]
pub struct Answer {
    pub id: Option<AnswerId>,
    pub question_text: String,
    pub answer_text: String,
    pub created_at: DateTime<Utc>,
}

impl Answer {
    /// Shown when the answered question was deleted or not populated.
    pub const MISSING_QUESTION: &'static str = "N/A";
}

/// Answer as stored by the backend: `questionId` is populated with the
/// question document, or left as a bare id once the question is gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerRecord {
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<AnswerId>,
    #[serde(default, rename = "questionId", skip_serializing_if = "Option::is_none")]
    question: Option<QuestionRef>,
    #[serde(default)]
    ans: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum QuestionRef {
    Populated {
        #[serde(default)]
        question: Option<String>,
    },
    Id(String),
}

impl From<AnswerRecord> for Answer {
    fn from(record: AnswerRecord) -> Self {
        let question_text = match record.question {
            Some(QuestionRef::Populated {
                question: Some(text),
            }) if !text.trim().is_empty() => text,
            _ => Answer::MISSING_QUESTION.to_string(),
        };
        Self {
            id: record.id,
            question_text,
            answer_text: record.ans,
            created_at: record.created_at,
        }
    }
}

impl From<Answer> for AnswerRecord {
    fn from(answer: Answer) -> Self {
        Self {
            id: answer.id,
            question: Some(QuestionRef::Populated {
                question: Some(answer.question_text),
            }),
            ans: answer.answer_text,
            created_at: answer.created_at,
        }
    }
}

/// The signed-in administrator's own account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Profile {
    pub const FALLBACK_NAME: &'static str = "Admin";
    /// Avatar shown when the profile has no uploaded image.
    pub const FALLBACK_IMAGE: &'static str = "/skin.png";

    pub fn display_name(&self) -> &str {
        match self.first_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => Self::FALLBACK_NAME,
        }
    }

    /// Stored image path, or the stock avatar when none was uploaded.
    pub fn image_path(&self) -> &str {
        match self.image.as_deref() {
            Some(path) if !path.is_empty() => path,
            _ => Self::FALLBACK_IMAGE,
        }
    }
}
