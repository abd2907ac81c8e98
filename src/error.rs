use serde_json::Value;
use thiserror::Error;

use crate::models::SelectionType;

/// 无法从服务端或网络错误中得到提示时使用的兜底文案
pub const GENERIC_ERROR_MESSAGE: &str = "发生未知错误，请稍后重试";

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 本地存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 答题会话错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败（未拿到响应）
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回非 2xx 响应
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// JSON 解析失败
    #[error("JSON解析失败: {source}")]
    JsonParseFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 本地存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("读取失败 ({key}): {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入失败 ({key}): {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("删除失败 ({key}): {source}")]
    DeleteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// 内存存储的锁被污染
    #[error("存储锁不可用")]
    Poisoned,
}

/// 答题会话错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// 当前没有进行中的测验
    #[error("当前没有进行中的测验")]
    NoActiveAttempt,
    /// 题目不属于当前测验
    #[error("题目 {question_id} 不属于当前测验")]
    QuestionNotFound { question_id: u64 },
    /// 选项不属于该题目
    #[error("选项 {choice_id} 不属于题目 {question_id}")]
    ChoiceNotFound { question_id: u64, choice_id: u64 },
    /// 传入的选择方式与题目不一致
    #[error("题目 {question_id} 为{expected:?}选择题，不能按{actual:?}作答")]
    SelectionTypeMismatch {
        question_id: u64,
        expected: SelectionType,
        actual: SelectionType,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少必需配置
    #[error("缺少配置项 {key}")]
    Missing { key: String },
    /// 配置值不合法
    #[error("配置项 {key} 的值 '{value}' 不合法")]
    InvalidValue { key: String, value: String },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败: {source}")]
    TomlParseFailed {
        #[source]
        source: toml::de::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::TomlParseFailed { source: err })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 根据响应状态码和响应体创建错误
    pub fn bad_response(endpoint: impl Into<String>, status: u16, body: &str) -> Self {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.into(),
            status,
            message: extract_server_message(body),
        })
    }

    /// 创建配置文件读取错误
    pub fn config_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Config(ConfigError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 面向用户的错误文案
    ///
    /// 优先使用服务端返回的提示，其次是网络层错误信息，最后是兜底文案
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(ApiError::BadResponse {
                message: Some(message),
                ..
            }) => message.clone(),
            AppError::Api(ApiError::BadResponse { status, .. }) => {
                format!("请求失败，状态码 {}", status)
            }
            AppError::Api(ApiError::RequestFailed { source, .. }) => {
                let text = source.to_string();
                if text.trim().is_empty() {
                    GENERIC_ERROR_MESSAGE.to_string()
                } else {
                    text
                }
            }
            AppError::Session(e) => e.to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// 从响应体中提取服务端提示
///
/// 支持 `{"detail": ..}` / `{"message": ..}` / `{"error": ..}`，
/// 以及字段校验错误 `{"answers": ["..."]}`
pub fn extract_server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    first_message(&value)
}

fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => items.iter().find_map(first_message),
        Value::Object(map) => ["detail", "message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(first_message))
            .or_else(|| map.values().find_map(first_message)),
        _ => None,
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
