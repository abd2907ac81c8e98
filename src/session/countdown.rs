//! 倒计时
//!
//! 剩余时间每次都由服务端开始时间重新计算，不做逐秒递减，
//! 这样页面刷新或任务被挂起后截止时间也不会漂移

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::infrastructure::Clock;

/// 倒计时状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Idle,
    Running,
    Expired,
}

/// 锚定在服务端开始时间上的倒计时
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub start_time: DateTime<Utc>,
    pub budget_seconds: u64,
}

impl Countdown {
    /// 不限时（budget 为 0）时返回 None
    pub fn new(start_time: DateTime<Utc>, budget_seconds: u64) -> Option<Self> {
        (budget_seconds > 0).then_some(Self {
            start_time,
            budget_seconds,
        })
    }

    /// `max(0, budget - 已过秒数)`；本地时钟早于开始时间时按 0 秒计
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = (now - self.start_time).num_seconds().max(0) as u64;
        self.budget_seconds.saturating_sub(elapsed)
    }

    /// 超出时间范围时为 None
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        let budget = chrono::Duration::from_std(Duration::from_secs(self.budget_seconds)).ok()?;
        self.start_time.checked_add_signed(budget)
    }
}

/// 运行中的倒计时任务
///
/// drop 时自动停止，避免遗留的计时器继续触发自动提交
#[derive(Debug)]
pub struct CountdownHandle {
    active: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    /// 可重复调用
    pub fn stop(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            debug!("倒计时已停止");
        }
        self.task.abort();
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 启动倒计时任务
///
/// - `on_tick`：每次刷新都会带着重新计算的剩余秒数调用
/// - `on_expire`：剩余归零时只调用一次，在独立任务里、让出一次调度后执行，
///   因此它可以安全地停止本倒计时
pub fn spawn_countdown<T, E, Fut>(
    countdown: Countdown,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    on_tick: T,
    on_expire: E,
) -> CountdownHandle
where
    T: Fn(u64) + Send + 'static,
    E: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let active = Arc::new(AtomicBool::new(true));
    let flag = active.clone();

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if !flag.load(Ordering::Acquire) {
                return;
            }

            let remaining = countdown.remaining_at(clock.now());
            on_tick(remaining);

            if remaining == 0 {
                if flag.swap(false, Ordering::AcqRel) {
                    match countdown.deadline() {
                        Some(deadline) => info!("⏰ 倒计时结束 (截止时间 {})", deadline),
                        None => info!("⏰ 倒计时结束"),
                    }
                    tokio::spawn(async move {
                        tokio::task::yield_now().await;
                        on_expire().await;
                    });
                }
                return;
            }
        }
    });

    CountdownHandle { active, task }
}
