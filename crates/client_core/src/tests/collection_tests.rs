use std::{sync::Arc, time::Duration};

use shared::domain::{Question, User};
use tokio::time::timeout;

use super::*;
use crate::{
    entity::UserField,
    image_url::ImageResolver,
    sync::{CommitOutcome, Synchronizer},
    test_support::{question, user, FakeSource},
};

fn many_users(count: usize) -> Vec<User> {
    (1..=count)
        .map(|n| user(&format!("u-{n}"), &format!("User {n}")))
        .collect()
}

fn sample_answer(question_text: &str) -> Answer {
    Answer {
        id: None,
        question_text: question_text.to_string(),
        answer_text: "Oily".to_string(),
        created_at: "2024-05-02T09:30:00Z".parse().expect("timestamp"),
    }
}

#[tokio::test]
async fn pages_through_ninety_five_users() {
    let source = Arc::new(FakeSource::new(many_users(95), Vec::new()));
    let view: CollectionView<User> = CollectionView::new(source, 10, Notifier::new());

    assert_eq!(view.refresh().await, LoadState::Ready);
    let paginator = view.paginator().await;
    assert_eq!(paginator.total_pages(), 10);
    assert_eq!(view.items().await.len(), 10);

    assert!(!view.set_page(0).await);
    assert!(!view.set_page(11).await);
    assert_eq!(view.paginator().await.page_index(), 1);

    assert!(view.set_page(10).await);
    let ids: Vec<String> = view
        .items()
        .await
        .into_iter()
        .map(|u| u.id.to_string())
        .collect();
    assert_eq!(ids, vec!["u-91", "u-92", "u-93", "u-94", "u-95"]);
    assert!(!view.next_page().await);
    assert!(view.previous_page().await);
    assert_eq!(view.paginator().await.page_index(), 9);
}

#[tokio::test]
async fn empty_collection_stays_on_page_one() {
    let source = Arc::new(FakeSource::new(Vec::new(), Vec::new()));
    let view: CollectionView<Question> = CollectionView::new(source, 10, Notifier::new());

    assert_eq!(view.refresh().await, LoadState::Ready);
    let paginator = view.paginator().await;
    assert_eq!(paginator.total_pages(), 1);
    assert!(!paginator.has_previous());
    assert!(!paginator.has_next());
    assert!(!view.previous_page().await);
}

#[tokio::test]
async fn fetch_failure_shows_empty_page_and_notifies() {
    let source = Arc::new(FakeSource::new(many_users(3), Vec::new()));
    let notifier = Notifier::new();
    let mut events = notifier.subscribe();
    let view: CollectionView<User> = CollectionView::new(source.clone(), 10, notifier);
    view.refresh().await;
    assert_eq!(view.items().await.len(), 3);
    // Drain the page event from the successful load.
    assert!(matches!(
        events.recv().await.expect("event"),
        SyncEvent::PageChanged { page: 1, .. }
    ));

    source.fail_fetches(true);
    let state = view.refresh().await;
    assert!(matches!(state, LoadState::Failed(_)), "{state:?}");
    assert!(view.items().await.is_empty());
    assert!(matches!(
        events.recv().await.expect("event"),
        SyncEvent::Notification(crate::events::Notification {
            kind: NotificationKind::FetchFailure,
            ..
        })
    ));

    source.fail_fetches(false);
    assert_eq!(view.refresh().await, LoadState::Ready);
    assert_eq!(view.items().await.len(), 3);
}

#[tokio::test]
async fn questions_page_uses_source_slicing() {
    let questions = (1..=12)
        .map(|n| question(&format!("q-{n}"), &format!("Question {n}"), &["a", "b"]))
        .collect();
    let source = Arc::new(FakeSource::new(Vec::new(), questions));
    let view: CollectionView<Question> = CollectionView::new(source, 5, Notifier::new());

    view.refresh().await;
    assert_eq!(view.paginator().await.total_pages(), 3);
    assert!(view.set_page(3).await);
    assert_eq!(view.items().await.len(), 2);
}

#[tokio::test]
async fn commits_of_other_kinds_leave_the_table_alone() {
    let source = Arc::new(FakeSource::new(many_users(3), Vec::new()));
    let view: CollectionView<User> = CollectionView::new(source, 10, Notifier::new());
    view.refresh().await;

    let question_commit = SyncEvent::Committed {
        kind: "question",
        entity_id: "q-1".into(),
    };
    assert!(!view.handle_event(&question_commit).await);

    let user_commit = SyncEvent::Committed {
        kind: "user",
        entity_id: "u-2".into(),
    };
    assert!(view.handle_event(&user_commit).await);
    assert_eq!(view.load_state().await, LoadState::Ready);
}

#[tokio::test]
async fn committed_user_shows_up_in_the_open_table() {
    let source = Arc::new(FakeSource::new(many_users(3), Vec::new()));
    let notifier = Notifier::new();
    let view = Arc::new(CollectionView::<User>::new(source.clone(), 10, notifier.clone()));
    view.refresh().await;
    let watcher = view.refresh_on_commit();
    let mut events = notifier.subscribe();

    let sync: Synchronizer<User> =
        Synchronizer::new(source, ImageResolver::new("http://api.local"), notifier);
    assert_eq!(sync.open(&UserId::from("u-2")).await, LoadState::Ready);
    sync.begin_edit().await;
    sync.update_field(UserField::FirstName("Renamed".into())).await;
    assert!(matches!(sync.commit_edit().await, CommitOutcome::Committed(_)));

    timeout(Duration::from_secs(2), async {
        loop {
            if let Ok(SyncEvent::PageChanged { kind: "user", .. }) = events.recv().await {
                break;
            }
        }
    })
    .await
    .expect("table refreshed");

    let items = view.items().await;
    assert_eq!(items[1].first_name.as_deref(), Some("Renamed"));
    watcher.abort();
}

#[tokio::test]
async fn answers_load_for_selected_user() {
    let source = Arc::new(
        FakeSource::new(many_users(1), Vec::new())
            .with_answers("u-1", vec![sample_answer("Skin type?")]),
    );
    let history = AnswerHistory::new(source, Notifier::new());

    assert_eq!(history.load(Some(&UserId::from("u-1"))).await, LoadState::Ready);
    let answers = history.answers().await;
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].question_text, "Skin type?");

    assert_eq!(history.load(None).await, LoadState::Idle);
    assert!(history.answers().await.is_empty());
}

#[tokio::test]
async fn answers_failure_leaves_empty_list() {
    let source = Arc::new(
        FakeSource::new(many_users(1), Vec::new())
            .with_answers("u-1", vec![sample_answer("Skin type?")]),
    );
    source.fail_fetches(true);
    let history = AnswerHistory::new(source, Notifier::new());

    let state = history.load(Some(&UserId::from("u-1"))).await;
    assert!(matches!(state, LoadState::Failed(_)), "{state:?}");
    assert!(history.answers().await.is_empty());
    assert_eq!(history.load_state().await, state);
}
