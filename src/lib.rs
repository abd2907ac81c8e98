//! # Quiz Attempt
//!
//! EduTrack 学生端答题会话：选答案、切题、倒计时、本地进度与提交
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有底层资源，只暴露能力
//! - `KeyValueStore` - 键值存储（内存 / 文件）
//! - `Clock` - 时钟（系统 / 手动）
//!
//! ### ② 客户端层（Clients）
//! - `clients/` - 与 EduTrack API 的交互
//! - `QuizApi` - 开始答题、获取测验、提交答案
//!
//! ### ③ 会话层（Session）
//! - `AttemptState` - 纯状态：导航、选答案、恢复进度
//! - `Countdown` - 以服务端开始时间为锚点的倒计时
//! - `ProgressStore` - 按测验保存答题进度
//! - `QuizSession` - 编排完整流程（begin → 答题 → submit）
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod session;
pub mod utils;

// 重新导出常用类型
pub use clients::{QuizApi, QuizClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{Clock, FileStore, KeyValueStore, MemoryStore, SystemClock};
pub use models::{Question, Quiz, SelectionType, SubmissionCompleted};
pub use session::{AttemptStatus, CountdownState, Navigation, QuizSession, SessionSnapshot};
