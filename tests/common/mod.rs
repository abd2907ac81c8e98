#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use quiz_attempt::error::AppResult;
use quiz_attempt::infrastructure::{ManualClock, MemoryStore};
use quiz_attempt::models::{
    Choice, Question, Quiz, QuizSettings, SelectionType, StartAttempt, SubmissionPayload,
};
use quiz_attempt::{AppError, QuizApi, QuizSession};

pub const QUIZ_ID: u64 = 42;
pub const SUBMISSION_ID: u64 = 9001;
pub const TICK: Duration = Duration::from_millis(10);

/// 服务端开始时间
pub fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
}

fn question(id: u64, selection_type: SelectionType, choices: &[u64]) -> Question {
    Question {
        id,
        selection_type,
        text: format!("Question {}", id),
        image: None,
        points: Some(1.0),
        choices: choices
            .iter()
            .map(|c| Choice {
                id: *c,
                text: format!("Choice {}", c),
                image: None,
            })
            .collect(),
    }
}

/// 三道题：单选 1、 多选 2、单选 3
pub fn sample_quiz(timer_minutes: u32) -> Quiz {
    Quiz {
        id: QUIZ_ID,
        title: "Algebra basics".to_string(),
        description: Some("Unit 2".to_string()),
        grade: Some("2".to_string()),
        center_times: Vec::new(),
        settings: QuizSettings {
            timer_minutes,
            ..QuizSettings::default()
        },
        questions: vec![
            question(1, SelectionType::Single, &[11, 12, 13]),
            question(2, SelectionType::Multiple, &[21, 22, 23]),
            question(3, SelectionType::Single, &[31, 32]),
        ],
        submission_status: None,
    }
}

/// 可控的假 API
pub struct MockQuizApi {
    pub quiz: Quiz,
    pub start_time: DateTime<Utc>,
    pub fail_start: AtomicBool,
    pub fail_fetch: AtomicBool,
    pub fail_submit: AtomicBool,
    pub submit_delay: Mutex<Option<Duration>>,
    pub start_calls: AtomicUsize,
    pub submissions: Mutex<Vec<(u64, SubmissionPayload)>>,
}

impl MockQuizApi {
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            start_time: anchor(),
            fail_start: AtomicBool::new(false),
            fail_fetch: AtomicBool::new(false),
            fail_submit: AtomicBool::new(false),
            submit_delay: Mutex::new(None),
            start_calls: AtomicUsize::new(0),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn last_submission(&self) -> Option<(u64, SubmissionPayload)> {
        self.submissions.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl QuizApi for MockQuizApi {
    async fn start_attempt(&self, quiz_id: u64) -> AppResult<StartAttempt> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(AppError::api_request_failed(
                format!("quizzes/{}/start/", quiz_id),
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            ));
        }
        Ok(StartAttempt {
            submission_id: SUBMISSION_ID,
            start_time: self.start_time,
        })
    }

    async fn fetch_quiz(&self, quiz_id: u64) -> AppResult<Quiz> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AppError::bad_response(
                format!("quizzes/{}/", quiz_id),
                404,
                r#"{"detail": "Not found."}"#,
            ));
        }
        Ok(self.quiz.clone())
    }

    async fn submit_answers(&self, quiz_id: u64, payload: &SubmissionPayload) -> AppResult<()> {
        let delay = *self.submit_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(AppError::bad_response(
                format!("quizzes/{}/submissions/create/", quiz_id),
                400,
                r#"{"detail": "Submissions are closed."}"#,
            ));
        }
        self.submissions
            .lock()
            .unwrap()
            .push((quiz_id, payload.clone()));
        Ok(())
    }
}

pub fn session_with(api: Arc<MockQuizApi>, store: MemoryStore, clock: ManualClock) -> QuizSession {
    QuizSession::new(api, Arc::new(store), Arc::new(clock), TICK)
}
