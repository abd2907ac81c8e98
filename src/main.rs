use anyhow::Result;
use quiz_attempt::utils::logging;
use quiz_attempt::{Config, QuizSession};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = match std::env::var("QUIZ_CONFIG") {
        Ok(path) => Config::from_toml_file(path)?,
        Err(_) => Config::from_env(),
    };
    config.validate()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let quiz_id = config.require_quiz_id()?;
    logging::log_startup(&config.api_base_url, quiz_id);

    // 开始或恢复答题，只查看状态，不提交
    let session = QuizSession::from_config(&config);
    session.begin_attempt(Some(quiz_id)).await?;

    logging::log_session_summary(&session.snapshot());

    session.teardown();

    Ok(())
}
