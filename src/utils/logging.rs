//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::session::SessionSnapshot;
use crate::utils::time_fmt::format_remaining;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 verbose 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
pub fn log_startup(api_base_url: &str, quiz_id: u64) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 测验答题状态");
    info!("🌐 API: {}", api_base_url);
    info!("📝 测验: {}", quiz_id);
    info!("{}", "=".repeat(60));
}

/// 打印会话概况
pub fn log_session_summary(snapshot: &SessionSnapshot) {
    let Some(quiz) = snapshot.quiz.as_ref() else {
        info!("当前没有进行中的测验");
        return;
    };

    info!("\n{}", "─".repeat(60));
    info!("📘 {}", truncate_text(&quiz.title, 40));
    info!(
        "📄 当前第 {}/{} 题",
        snapshot.current_question_index + 1,
        quiz.questions.len()
    );
    info!("✅ 已选答案: {}", snapshot.selected_answers.len());
    match snapshot.remaining_seconds {
        Some(remaining) => info!("⏱️ 剩余时间: {}", format_remaining(remaining)),
        None => info!("⏱️ 不限时"),
    }
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
