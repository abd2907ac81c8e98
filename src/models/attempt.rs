//! 答题相关的传输结构与本地持久化结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `POST /quizzes/{id}/start/` 的返回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartAttempt {
    pub submission_id: u64,
    pub start_time: DateTime<Utc>,
}

/// 一个已选答案（题目 ID + 选项 ID）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedAnswer {
    #[serde(rename = "questionID")]
    pub question_id: u64,
    #[serde(rename = "answerID")]
    pub answer_id: u64,
}

impl SelectedAnswer {
    pub fn new(question_id: u64, answer_id: u64) -> Self {
        Self {
            question_id,
            answer_id,
        }
    }
}

/// 本地保存的答题进度，键为 `quiz-{quizId}-state`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedProgress {
    pub current_question_index: usize,
    pub selected_answers: Vec<SelectedAnswer>,
}

/// 单题提交结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub question_id: u64,
    pub selected_choices: Vec<u64>,
}

/// `POST /quizzes/{id}/submissions/create/` 的请求体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub answers: Vec<AnswerPayload>,
}

impl SubmissionPayload {
    /// 按题目分组，保持题目首次出现的顺序
    pub fn from_answers(answers: &[SelectedAnswer]) -> Self {
        let mut grouped: Vec<AnswerPayload> = Vec::new();
        for answer in answers {
            match grouped.iter_mut().find(|a| a.question_id == answer.question_id) {
                Some(entry) => entry.selected_choices.push(answer.answer_id),
                None => grouped.push(AnswerPayload {
                    question_id: answer.question_id,
                    selected_choices: vec![answer.answer_id],
                }),
            }
        }
        Self { answers: grouped }
    }
}

/// 提交完成标记，供调用方跳转结果页
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionCompleted {
    pub quiz_id: u64,
    pub submission_id: u64,
}
