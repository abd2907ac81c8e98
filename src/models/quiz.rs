//! 测验内容（`GET /quizzes/{id}/` 的返回结构）

use serde::{Deserialize, Serialize};

/// 题目的选择方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    /// 单选
    Single,
    /// 多选
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: u64,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub selection_type: SelectionType,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Question {
    pub fn has_choice(&self, choice_id: u64) -> bool {
        self.choices.iter().any(|c| c.id == choice_id)
    }
}

/// 测验设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizSettings {
    /// 限时（分钟），0 表示不限时
    #[serde(default)]
    pub timer_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers_visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_order: Option<String>,
}

impl QuizSettings {
    /// 倒计时总秒数
    pub fn timer_budget_seconds(&self) -> u64 {
        u64::from(self.timer_minutes) * 60
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default)]
    pub center_times: Vec<serde_json::Value>,
    #[serde(default)]
    pub settings: QuizSettings,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_status: Option<String>,
}

impl Quiz {
    pub fn question(&self, question_id: u64) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn is_timed(&self) -> bool {
        self.settings.timer_budget_seconds() > 0
    }
}
