mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use common::{anchor, sample_quiz, session_with, MockQuizApi, QUIZ_ID, TICK};
use quiz_attempt::infrastructure::{ManualClock, MemoryStore};
use quiz_attempt::{AttemptStatus, CountdownState, SelectionType};
use tokio_test::assert_ok;

/// 推进暂停的 tokio 时钟，让后台倒计时任务跑几轮
async fn settle() {
    for _ in 0..15 {
        tokio::time::advance(TICK).await;
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_expiry_at_deadline_submits_exactly_once() {
    let api = Arc::new(MockQuizApi::new(sample_quiz(1)));
    let clock = ManualClock::new(anchor() + ChronoDuration::seconds(60));
    let session = session_with(api.clone(), MemoryStore::new(), clock.clone());

    assert_ok!(session.begin_attempt(Some(QUIZ_ID)).await);
    settle().await;

    assert_eq!(api.submission_count(), 1);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.status, AttemptStatus::Submitted);
    assert_eq!(snapshot.completed.map(|c| c.quiz_id), Some(QUIZ_ID));

    clock.advance(ChronoDuration::seconds(30));
    settle().await;
    assert_eq!(api.submission_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_remaining_follows_anchor_and_auto_submits() {
    let api = Arc::new(MockQuizApi::new(sample_quiz(1)));
    let clock = ManualClock::new(anchor() + ChronoDuration::seconds(10));
    let session = session_with(api.clone(), MemoryStore::new(), clock.clone());

    assert_ok!(session.begin_attempt(Some(QUIZ_ID)).await);
    assert_ok!(session.select_answer(1, 12, SelectionType::Single));

    let mut remaining = session.subscribe_remaining();
    assert_eq!(*remaining.borrow_and_update(), Some(50));
    assert_eq!(session.snapshot().countdown, CountdownState::Running);

    // 时钟不动时不会重复通知
    let unchanged = tokio::time::timeout(Duration::from_millis(80), remaining.changed()).await;
    assert!(unchanged.is_err());

    clock.advance(ChronoDuration::seconds(20));
    assert_ok!(assert_ok!(
        tokio::time::timeout(Duration::from_secs(1), remaining.changed()).await
    ));
    assert_eq!(*remaining.borrow_and_update(), Some(30));
    assert_eq!(api.submission_count(), 0);

    clock.set(anchor() + ChronoDuration::seconds(60));
    settle().await;

    assert_eq!(api.submission_count(), 1);
    let (_, payload) = api.last_submission().unwrap();
    assert_eq!(payload.answers.len(), 1);
    assert_eq!(payload.answers[0].selected_choices, vec![12]);
    assert_eq!(session.snapshot().remaining_seconds, None);
}

#[tokio::test(start_paused = true)]
async fn test_untimed_quiz_never_auto_submits() {
    let api = Arc::new(MockQuizApi::new(sample_quiz(0)));
    let clock = ManualClock::new(anchor());
    let session = session_with(api.clone(), MemoryStore::new(), clock.clone());

    assert_ok!(session.begin_attempt(Some(QUIZ_ID)).await);
    clock.advance(ChronoDuration::hours(10));
    settle().await;

    let snapshot = session.snapshot();
    assert_eq!(api.submission_count(), 0);
    assert_eq!(snapshot.remaining_seconds, None);
    assert_eq!(snapshot.countdown, CountdownState::Idle);
    assert_eq!(snapshot.status, AttemptStatus::InProgress);
}

#[tokio::test(start_paused = true)]
async fn test_replaced_attempt_does_not_auto_submit() {
    let api = Arc::new(MockQuizApi::new(sample_quiz(1)));
    let clock = ManualClock::new(anchor() + ChronoDuration::seconds(30));
    let session = session_with(api.clone(), MemoryStore::new(), clock.clone());

    assert_ok!(session.begin_attempt(Some(QUIZ_ID)).await);
    assert_eq!(session.snapshot().remaining_seconds, Some(30));

    assert_ok!(session.begin_attempt(None).await);
    clock.advance(ChronoDuration::minutes(5));
    settle().await;

    assert_eq!(api.submission_count(), 0);
    assert_eq!(session.snapshot().remaining_seconds, None);
}

#[tokio::test(start_paused = true)]
async fn test_stop_timer_is_idempotent() {
    let api = Arc::new(MockQuizApi::new(sample_quiz(2)));
    let clock = ManualClock::new(anchor());
    let session = session_with(api.clone(), MemoryStore::new(), clock.clone());

    assert_ok!(session.begin_attempt(Some(QUIZ_ID)).await);
    assert_eq!(session.snapshot().remaining_seconds, Some(120));

    session.stop_timer();
    session.stop_timer();
    assert_eq!(session.snapshot().countdown, CountdownState::Idle);

    clock.advance(ChronoDuration::minutes(3));
    settle().await;
    assert_eq!(api.submission_count(), 0);
    assert_eq!(session.snapshot().status, AttemptStatus::InProgress);
}

#[tokio::test(start_paused = true)]
async fn test_failed_auto_submit_keeps_state() {
    let api = Arc::new(MockQuizApi::new(sample_quiz(1)));
    api.fail_submit
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let clock = ManualClock::new(anchor() + ChronoDuration::minutes(2));
    let session = session_with(api.clone(), MemoryStore::new(), clock);

    assert_ok!(session.begin_attempt(Some(QUIZ_ID)).await);
    settle().await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.countdown, CountdownState::Expired);
    assert_eq!(snapshot.status, AttemptStatus::InProgress);
    assert_eq!(snapshot.remaining_seconds, Some(0));
    assert_eq!(snapshot.error.as_deref(), Some("Submissions are closed."));

    // 手动重试
    api.fail_submit
        .store(false, std::sync::atomic::Ordering::SeqCst);
    assert_ok!(session.submit().await);
    assert_eq!(api.submission_count(), 1);
}
