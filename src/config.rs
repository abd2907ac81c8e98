use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// EduTrack API 根地址
    pub api_base_url: String,
    /// Bearer token
    pub auth_token: String,
    /// 本地答题进度存放目录
    pub state_dir: String,
    /// 倒计时刷新间隔（毫秒）
    pub tick_interval_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 要进入的测验 ID（仅命令行使用）
    pub quiz_id: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            auth_token: String::new(),
            state_dir: ".quiz_state".to_string(),
            tick_interval_ms: 1000,
            verbose_logging: false,
            quiz_id: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("EDUTRACK_API_BASE_URL").unwrap_or(default.api_base_url),
            auth_token: std::env::var("EDUTRACK_TOKEN").unwrap_or(default.auth_token),
            state_dir: std::env::var("STATE_DIR").unwrap_or(default.state_dir),
            tick_interval_ms: std::env::var("TICK_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.tick_interval_ms),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            quiz_id: std::env::var("QUIZ_ID").ok().and_then(|v| v.parse().ok()).or(default.quiz_id),
        }
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| AppError::config_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置取值
    pub fn validate(&self) -> AppResult<()> {
        if self.tick_interval_ms == 0 {
            return Err(AppError::Config(ConfigError::InvalidValue {
                key: "tick_interval_ms".to_string(),
                value: "0".to_string(),
            }));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(AppError::Config(ConfigError::InvalidValue {
                key: "api_base_url".to_string(),
                value: self.api_base_url.clone(),
            }));
        }
        Ok(())
    }

    /// 需要 quiz_id 的场景使用
    pub fn require_quiz_id(&self) -> AppResult<u64> {
        self.quiz_id.ok_or_else(|| {
            AppError::Config(ConfigError::Missing {
                key: "QUIZ_ID".to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_partial_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            api_base_url = "https://edusite.example/api"
            auth_token = "abc"
            quiz_id = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://edusite.example/api");
        assert_eq!(config.auth_token, "abc");
        assert_eq!(config.quiz_id, Some(12));
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.state_dir, ".quiz_state");
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let result = Config::from_toml_str("tick_interval_ms = 0");
        assert!(matches!(result, Err(AppError::Config(ConfigError::InvalidValue { .. }))));
    }

    #[test]
    fn test_require_quiz_id() {
        let config = Config::default();
        assert!(config.require_quiz_id().is_err());
    }
}
