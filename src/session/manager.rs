//! 答题会话 - 流程层
//!
//! 核心职责：管理"一次答题"的完整生命周期
//!
//! 流程顺序：
//! 1. begin_attempt → 开始答题 → 获取测验 → 恢复本地进度 → 启动倒计时
//! 2. navigate / select_answer → 每次变更立即写入本地进度
//! 3. submit（手动或倒计时结束自动触发）→ 清理进度 → 记录完成标记

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::clients::{QuizApi, QuizClient};
use crate::config::Config;
use crate::error::{AppError, AppResult, SessionError};
use crate::infrastructure::{Clock, FileStore, KeyValueStore, SystemClock};
use crate::models::{
    Question, Quiz, SelectedAnswer, SelectionType, SubmissionCompleted, SubmissionPayload,
};
use crate::session::countdown::{spawn_countdown, Countdown, CountdownHandle, CountdownState};
use crate::session::progress::ProgressStore;
use crate::session::state::{AttemptState, AttemptStatus, Navigation};
use crate::utils::time_fmt::format_remaining;

/// 渲染用的会话快照
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub quiz: Option<Quiz>,
    pub submission_id: Option<u64>,
    pub start_time: Option<DateTime<Utc>>,
    pub current_question_index: usize,
    pub selected_answers: Vec<SelectedAnswer>,
    pub status: AttemptStatus,
    pub countdown: CountdownState,
    pub remaining_seconds: Option<u64>,
    pub loading: bool,
    pub submitting: bool,
    pub error: Option<String>,
    pub completed: Option<SubmissionCompleted>,
}

#[derive(Debug, Default)]
struct Shared {
    state: AttemptState,
    countdown: Option<CountdownState>,
    loading: bool,
    submitting: bool,
    error: Option<String>,
    completed: Option<SubmissionCompleted>,
    /// 每次开始/重置答题加一，倒计时任务据此判断自己是否已过期
    generation: u64,
}

impl Shared {
    /// 重置内存状态，返回新的 generation
    fn reset(&mut self) -> u64 {
        self.state = AttemptState::default();
        self.countdown = None;
        self.loading = false;
        self.submitting = false;
        self.generation += 1;
        self.generation
    }
}

struct SessionInner {
    api: Arc<dyn QuizApi>,
    progress: ProgressStore,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    shared: Mutex<Shared>,
    timer: Mutex<Option<CountdownHandle>>,
    remaining_tx: watch::Sender<Option<u64>>,
}

impl SessionInner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_remaining(&self, remaining: Option<u64>) {
        self.remaining_tx.send_if_modified(|current| {
            if *current == remaining {
                false
            } else {
                *current = remaining;
                true
            }
        });
    }
}

/// 一次答题的会话对象
///
/// 由答题视图创建并持有，clone 后共享同一份状态
#[derive(Clone)]
pub struct QuizSession {
    inner: Arc<SessionInner>,
}

impl QuizSession {
    pub fn new(
        api: Arc<dyn QuizApi>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
    ) -> Self {
        let (remaining_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(SessionInner {
                api,
                progress: ProgressStore::new(store),
                clock,
                tick_interval,
                shared: Mutex::new(Shared::default()),
                timer: Mutex::new(None),
                remaining_tx,
            }),
        }
    }

    /// 使用 HTTP 客户端、文件存储和系统时钟创建会话
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(QuizClient::new(config)),
            Arc::new(FileStore::new(&config.state_dir)),
            Arc::new(SystemClock),
            Duration::from_millis(config.tick_interval_ms),
        )
    }

    // ========== 生命周期 ==========

    /// 开始（或恢复）答题；`None` 表示清空会话
    ///
    /// 失败时记录错误并清空所选测验，不会留下半初始化的会话
    pub async fn begin_attempt(&self, quiz_id: Option<u64>) -> AppResult<()> {
        self.stop_timer();

        let generation = {
            let mut shared = self.inner.lock();
            let generation = shared.reset();
            shared.error = None;
            shared.completed = None;
            shared.loading = quiz_id.is_some();
            generation
        };
        self.inner.publish_remaining(None);

        let Some(quiz_id) = quiz_id else {
            debug!("会话已清空");
            return Ok(());
        };

        info!("[测验 {}] 🚀 开始答题...", quiz_id);

        let loaded = async {
            let start = self.inner.api.start_attempt(quiz_id).await?;
            let quiz = self.inner.api.fetch_quiz(quiz_id).await?;
            Ok::<_, AppError>((start, quiz))
        }
        .await;

        let mut shared = self.inner.lock();
        if shared.generation != generation {
            debug!("[测验 {}] 已被新的答题取代，忽略加载结果", quiz_id);
            return Ok(());
        }

        let (start, quiz) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                error!("[测验 {}] ❌ 开始答题失败: {}", quiz_id, e);
                shared.reset();
                shared.error = Some(e.user_message());
                return Err(e);
            }
        };

        let countdown = Countdown::new(start.start_time, quiz.settings.timer_budget_seconds());
        let question_count = quiz.questions.len();
        let mut state = AttemptState::new(quiz, start);
        if let Some(progress) = self.inner.progress.load(quiz_id) {
            state.restore(progress);
            info!(
                "[测验 {}] ✓ 已恢复进度: 第 {} 题, 已选 {} 个答案",
                quiz_id,
                state.current_question_index + 1,
                state.selected_answers.len()
            );
        }

        info!(
            "[测验 {}] ✓ 答题已开始 (submission #{}, {} 题)",
            quiz_id,
            state.submission_id.unwrap_or_default(),
            question_count
        );

        shared.state = state;
        shared.loading = false;
        shared.countdown = Some(if countdown.is_some() {
            CountdownState::Running
        } else {
            CountdownState::Idle
        });
        drop(shared);

        if let Some(countdown) = countdown {
            self.start_timer(countdown, generation);
        }

        Ok(())
    }

    /// 停止倒计时，可重复调用
    pub fn stop_timer(&self) {
        let handle = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.stop();
            let mut shared = self.inner.lock();
            if shared.countdown == Some(CountdownState::Running) {
                shared.countdown = Some(CountdownState::Idle);
            }
        }
    }

    /// 离开答题视图：停止倒计时并清空内存，本地进度保留以便之后恢复
    pub fn teardown(&self) {
        self.stop_timer();
        self.inner.lock().reset();
        self.inner.publish_remaining(None);
    }

    /// 放弃答题：同 teardown，并删除本地进度
    pub fn abandon(&self) {
        let quiz_id = self.inner.lock().state.quiz_id();
        self.teardown();
        if let Some(quiz_id) = quiz_id {
            info!("[测验 {}] 已放弃答题", quiz_id);
            if let Err(e) = self.inner.progress.clear(quiz_id) {
                warn!("[测验 {}] ⚠️ 删除本地进度失败: {}", quiz_id, e);
            }
        }
    }

    // ========== 答题操作 ==========

    /// 切换题目，新位置立即保存
    pub fn navigate(&self, navigation: Navigation) -> AppResult<usize> {
        let mut shared = self.inner.lock();
        let quiz_id = shared
            .state
            .quiz_id()
            .ok_or(SessionError::NoActiveAttempt)?;
        let index = shared.state.navigate(navigation);
        self.persist(quiz_id, &shared.state);
        Ok(index)
    }

    /// 选择答案：单选替换，多选切换；变更立即保存
    pub fn select_answer(
        &self,
        question_id: u64,
        choice_id: u64,
        selection_type: SelectionType,
    ) -> AppResult<()> {
        let mut shared = self.inner.lock();
        let quiz = shared
            .state
            .quiz
            .as_ref()
            .ok_or(SessionError::NoActiveAttempt)?;
        let quiz_id = quiz.id;
        let question = quiz
            .question(question_id)
            .ok_or(SessionError::QuestionNotFound { question_id })?;
        if !question.has_choice(choice_id) {
            return Err(SessionError::ChoiceNotFound {
                question_id,
                choice_id,
            }
            .into());
        }
        if question.selection_type != selection_type {
            warn!(
                "⚠️ 题目 {} 的选择方式为 {:?}，拒绝按 {:?} 作答",
                question_id, question.selection_type, selection_type
            );
            return Err(SessionError::SelectionTypeMismatch {
                question_id,
                expected: question.selection_type,
                actual: selection_type,
            }
            .into());
        }

        shared
            .state
            .select_answer(question_id, choice_id, selection_type);
        self.persist(quiz_id, &shared.state);
        Ok(())
    }

    /// 提交答案
    ///
    /// 成功：停止倒计时、删除本地进度、清空内存并记录完成标记；
    /// 失败：记录错误，保留当前答案以便重试。
    /// 并发的两次调用不会合并，两次请求都会发出
    pub async fn submit(&self) -> AppResult<SubmissionCompleted> {
        let (generation, completed, payload) = {
            let mut shared = self.inner.lock();
            let (Some(quiz_id), Some(submission_id)) =
                (shared.state.quiz_id(), shared.state.submission_id)
            else {
                return Err(SessionError::NoActiveAttempt.into());
            };
            shared.submitting = true;
            shared.error = None;
            let payload = SubmissionPayload::from_answers(&shared.state.selected_answers);
            (
                shared.generation,
                SubmissionCompleted {
                    quiz_id,
                    submission_id,
                },
                payload,
            )
        };

        info!(
            "[测验 {}] 📤 正在提交 {} 道题的答案...",
            completed.quiz_id,
            payload.answers.len()
        );

        match self
            .inner
            .api
            .submit_answers(completed.quiz_id, &payload)
            .await
        {
            Ok(()) => {
                info!("[测验 {}] ✓ 提交成功", completed.quiz_id);
                let is_current = self.inner.lock().generation == generation;
                if is_current {
                    self.stop_timer();
                    let mut shared = self.inner.lock();
                    shared.reset();
                    shared.completed = Some(completed);
                    drop(shared);
                    self.inner.publish_remaining(None);
                }
                if let Err(e) = self.inner.progress.clear(completed.quiz_id) {
                    warn!("[测验 {}] ⚠️ 删除本地进度失败: {}", completed.quiz_id, e);
                }
                Ok(completed)
            }
            Err(e) => {
                error!("[测验 {}] ❌ 提交失败: {}", completed.quiz_id, e);
                let mut shared = self.inner.lock();
                if shared.generation == generation {
                    shared.submitting = false;
                    shared.error = Some(e.user_message());
                }
                Err(e)
            }
        }
    }

    // ========== 读取 ==========

    pub fn snapshot(&self) -> SessionSnapshot {
        let remaining_seconds = *self.inner.remaining_tx.borrow();
        let shared = self.inner.lock();
        let status = if shared.state.submission_id.is_some() {
            AttemptStatus::InProgress
        } else if shared.completed.is_some() {
            AttemptStatus::Submitted
        } else {
            AttemptStatus::NotStarted
        };

        SessionSnapshot {
            quiz: shared.state.quiz.clone(),
            submission_id: shared.state.submission_id,
            start_time: shared.state.start_time,
            current_question_index: shared.state.current_question_index,
            selected_answers: shared.state.selected_answers.clone(),
            status,
            countdown: shared.countdown.unwrap_or(CountdownState::Idle),
            remaining_seconds,
            loading: shared.loading,
            submitting: shared.submitting,
            error: shared.error.clone(),
            completed: shared.completed,
        }
    }

    /// 订阅剩余秒数，只有数值变化时才会通知
    pub fn subscribe_remaining(&self) -> watch::Receiver<Option<u64>> {
        self.inner.remaining_tx.subscribe()
    }

    /// 取走提交完成标记
    pub fn take_completed(&self) -> Option<SubmissionCompleted> {
        self.inner.lock().completed.take()
    }

    pub fn current_question(&self) -> Option<Question> {
        self.inner.lock().state.current_question().cloned()
    }

    pub fn is_selected(&self, question_id: u64, choice_id: u64) -> bool {
        self.inner.lock().state.is_selected(question_id, choice_id)
    }

    pub fn answered_count(&self) -> usize {
        self.inner.lock().state.answered_count()
    }

    // ========== 内部 ==========

    fn persist(&self, quiz_id: u64, state: &AttemptState) {
        if let Err(e) = self.inner.progress.save(quiz_id, &state.progress()) {
            warn!("[测验 {}] ⚠️ 保存本地进度失败: {}", quiz_id, e);
        }
    }

    fn start_timer(&self, countdown: Countdown, generation: u64) {
        let initial = countdown.remaining_at(self.inner.clock.now());
        info!(
            "⏱️ 倒计时开始: 剩余 {} (共 {} 秒)",
            format_remaining(initial),
            countdown.budget_seconds
        );
        self.inner.publish_remaining(Some(initial));

        let tick_session: Weak<SessionInner> = Arc::downgrade(&self.inner);
        let expire_session: Weak<SessionInner> = Arc::downgrade(&self.inner);

        let handle = spawn_countdown(
            countdown,
            self.inner.clock.clone(),
            self.inner.tick_interval,
            move |remaining| {
                let Some(inner) = tick_session.upgrade() else {
                    return;
                };
                if inner.lock().generation != generation {
                    return;
                }
                inner.publish_remaining(Some(remaining));
            },
            move || async move {
                let Some(inner) = expire_session.upgrade() else {
                    return;
                };
                {
                    let mut shared = inner.lock();
                    if shared.generation != generation {
                        debug!("倒计时所属的答题已结束，跳过自动提交");
                        return;
                    }
                    shared.countdown = Some(CountdownState::Expired);
                }
                let session = QuizSession { inner };
                warn!("⏰ 时间到，自动提交");
                if let Err(e) = session.submit().await {
                    error!("❌ 自动提交失败: {}", e);
                }
            },
        );

        let mut slot = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.inner.lock().generation != generation {
            handle.stop();
            return;
        }
        *slot = Some(handle);
    }
}
