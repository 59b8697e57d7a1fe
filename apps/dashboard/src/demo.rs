//! Sample data for `--demo` runs.

use client_core::InMemoryDataSource;
use shared::domain::{Answer, Profile, Question, QuestionId, User, UserId};

const FIRST_NAMES: [&str; 6] = ["Ada", "Grace", "Linus", "Barbara", "Ken", "Radia"];

fn sample_users() -> Vec<User> {
    (1..=23)
        .map(|n| {
            let first_name = FIRST_NAMES[(n - 1) % FIRST_NAMES.len()];
            User {
                id: UserId(format!("demo-u-{n}")),
                first_name: Some(first_name.to_string()),
                last_name: Some(format!("Sample{n}")),
                email: format!("{}{n}@example.com", first_name.to_ascii_lowercase()),
                age: Some(20 + (n as u32 % 30)),
                gender: Some(if n % 2 == 0 { "female" } else { "male" }.to_string()),
                is_notification: n % 3 == 0,
                image: (n % 4 != 0).then(|| format!("/images/avatar-{n}.png")),
                role: Some("user".to_string()),
                created_at: "2024-05-01T10:00:00Z".parse().ok(),
            }
        })
        .collect()
}

fn sample_questions() -> Vec<Question> {
    vec![
        Question {
            id: QuestionId::from("demo-q-1"),
            question: "What is your skin type?".to_string(),
            options: vec!["Oily".into(), "Dry".into(), "Combination".into()],
            created_at: None,
        },
        Question {
            id: QuestionId::from("demo-q-2"),
            question: "How often do you use sunscreen?".to_string(),
            options: vec!["Daily".into(), "Sometimes".into(), "Never".into()],
            created_at: None,
        },
    ]
}

pub fn sample_source() -> InMemoryDataSource {
    InMemoryDataSource::new(sample_users(), sample_questions())
        .with_profile(Profile {
            id: UserId::from("demo-admin"),
            first_name: Some("Admin".to_string()),
            email: "admin@example.com".to_string(),
            phone: Some("+1 555 0100".to_string()),
            image: None,
        })
        .with_answers(
            UserId::from("demo-u-1"),
            vec![
                Answer {
                    id: None,
                    question_text: "What is your skin type?".to_string(),
                    answer_text: "Combination".to_string(),
                    created_at: "2024-05-02T09:30:00Z".parse().unwrap_or_default(),
                },
                Answer {
                    id: None,
                    question_text: "How often do you use sunscreen?".to_string(),
                    answer_text: "Daily".to_string(),
                    created_at: "2024-05-02T09:30:00Z".parse().unwrap_or_default(),
                },
            ],
        )
}
