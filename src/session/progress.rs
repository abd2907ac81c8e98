//! 答题进度持久化
//!
//! 只保存 `{currentQuestionIndex, selectedAnswers}`，
//! submission_id / start_time 每次都从服务端重新获取

use std::sync::Arc;

use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::KeyValueStore;
use crate::models::PersistedProgress;

/// 进度在键值存储中的键
pub fn storage_key(quiz_id: u64) -> String {
    format!("quiz-{}-state", quiz_id)
}

#[derive(Clone)]
pub struct ProgressStore {
    store: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 读取进度；不存在、读取失败或内容损坏都视为没有进度
    pub fn load(&self, quiz_id: u64) -> Option<PersistedProgress> {
        let key = storage_key(quiz_id);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!("读取进度失败 ({}): {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(progress) => Some(progress),
            Err(e) => {
                debug!("丢弃损坏的进度 ({}): {}", key, e);
                None
            }
        }
    }

    pub fn save(&self, quiz_id: u64, progress: &PersistedProgress) -> AppResult<()> {
        let raw = serde_json::to_string(progress)?;
        self.store.set(&storage_key(quiz_id), &raw)
    }

    pub fn clear(&self, quiz_id: u64) -> AppResult<()> {
        self.store.remove(&storage_key(quiz_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;
    use crate::models::SelectedAnswer;

    #[test]
    fn test_save_load_clear() {
        let memory = MemoryStore::new();
        let progress_store = ProgressStore::new(Arc::new(memory.clone()));
        let progress = PersistedProgress {
            current_question_index: 1,
            selected_answers: vec![SelectedAnswer::new(3, 30)],
        };

        progress_store.save(8, &progress).unwrap();
        assert!(memory.get("quiz-8-state").unwrap().is_some());
        assert_eq!(progress_store.load(8), Some(progress));
        assert_eq!(progress_store.load(9), None);

        progress_store.clear(8).unwrap();
        assert_eq!(progress_store.load(8), None);
    }

    #[test]
    fn test_corrupt_progress_is_ignored() {
        let memory = MemoryStore::new();
        memory.set("quiz-4-state", "{not json").unwrap();
        memory.set("quiz-5-state", r#"{"currentQuestionIndex": "x"}"#).unwrap();

        let progress_store = ProgressStore::new(Arc::new(memory));
        assert_eq!(progress_store.load(4), None);
        assert_eq!(progress_store.load(5), None);
    }
}
