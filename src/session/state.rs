//! 答题状态
//!
//! 纯数据 + 纯逻辑：导航、选答案、恢复进度，不做 IO

use chrono::{DateTime, Utc};

use crate::models::{PersistedProgress, Question, Quiz, SelectedAnswer, SelectionType, StartAttempt};

/// 答题整体状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    NotStarted,
    InProgress,
    Submitted,
}

/// 导航方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
    To(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttemptState {
    pub quiz: Option<Quiz>,
    pub submission_id: Option<u64>,
    pub start_time: Option<DateTime<Utc>>,
    pub current_question_index: usize,
    pub selected_answers: Vec<SelectedAnswer>,
}

impl AttemptState {
    pub fn new(quiz: Quiz, start: StartAttempt) -> Self {
        Self {
            quiz: Some(quiz),
            submission_id: Some(start.submission_id),
            start_time: Some(start.start_time),
            current_question_index: 0,
            selected_answers: Vec::new(),
        }
    }

    pub fn quiz_id(&self) -> Option<u64> {
        self.quiz.as_ref().map(|q| q.id)
    }

    pub fn question_count(&self) -> usize {
        self.quiz.as_ref().map_or(0, |q| q.questions.len())
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz
            .as_ref()
            .and_then(|q| q.questions.get(self.current_question_index))
    }

    /// 移动题目指针，结果始终落在 `[0, question_count - 1]`
    pub fn navigate(&mut self, navigation: Navigation) -> usize {
        let last = self.question_count().saturating_sub(1);
        let target = match navigation {
            Navigation::Next => self.current_question_index.saturating_add(1),
            Navigation::Previous => self.current_question_index.saturating_sub(1),
            Navigation::To(index) => index,
        };
        self.current_question_index = target.min(last);
        self.current_question_index
    }

    /// 单选替换，多选切换
    pub fn select_answer(&mut self, question_id: u64, choice_id: u64, selection_type: SelectionType) {
        let answer = SelectedAnswer::new(question_id, choice_id);
        match selection_type {
            SelectionType::Single => {
                self.selected_answers.retain(|a| a.question_id != question_id);
                self.selected_answers.push(answer);
            }
            SelectionType::Multiple => {
                if let Some(pos) = self.selected_answers.iter().position(|a| *a == answer) {
                    self.selected_answers.remove(pos);
                } else {
                    self.selected_answers.push(answer);
                }
            }
        }
    }

    pub fn is_selected(&self, question_id: u64, choice_id: u64) -> bool {
        self.selected_answers
            .contains(&SelectedAnswer::new(question_id, choice_id))
    }

    /// 已作答的题目数（按题目去重）
    pub fn answered_count(&self) -> usize {
        let mut ids: Vec<u64> = self.selected_answers.iter().map(|a| a.question_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    pub fn progress(&self) -> PersistedProgress {
        PersistedProgress {
            current_question_index: self.current_question_index,
            selected_answers: self.selected_answers.clone(),
        }
    }

    /// 用本地保存的进度恢复状态
    ///
    /// 指针越界时夹回范围内；不属于当前测验的答案丢弃；
    /// 重复答案去重，单选题只保留最后一个
    pub fn restore(&mut self, progress: PersistedProgress) {
        let Some(quiz) = self.quiz.as_ref() else {
            return;
        };

        let mut answers: Vec<SelectedAnswer> = Vec::with_capacity(progress.selected_answers.len());
        for answer in progress.selected_answers {
            let Some(question) = quiz.question(answer.question_id) else {
                continue;
            };
            if !question.has_choice(answer.answer_id) {
                continue;
            }
            match question.selection_type {
                SelectionType::Single => {
                    answers.retain(|a| a.question_id != answer.question_id);
                    answers.push(answer);
                }
                SelectionType::Multiple => {
                    if !answers.contains(&answer) {
                        answers.push(answer);
                    }
                }
            }
        }

        self.selected_answers = answers;
        self.current_question_index = progress
            .current_question_index
            .min(self.question_count().saturating_sub(1));
    }
}
