//! EduTrack 测验 API 客户端
//!
//! 封装开始答题、获取测验内容、提交答案三个接口

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Quiz, StartAttempt, SubmissionPayload};

/// 会话层依赖的远程能力
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// 开始答题；已开始的答题返回原有的 submission_id / start_time
    async fn start_attempt(&self, quiz_id: u64) -> AppResult<StartAttempt>;

    /// 获取测验完整内容
    async fn fetch_quiz(&self, quiz_id: u64) -> AppResult<Quiz>;

    /// 提交答案
    async fn submit_answers(&self, quiz_id: u64, payload: &SubmissionPayload) -> AppResult<()>;
}

/// 基于 reqwest 的 API 客户端
#[derive(Clone)]
pub struct QuizClient {
    client: Client,
    base_url: String,
    token: String,
}

impl QuizClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.api_base_url, &config.auth_token)
    }

    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// 附加鉴权头并发送，非 2xx 响应转换为 `ApiError::BadResponse`
    async fn send(&self, request: RequestBuilder, endpoint: &str) -> AppResult<String> {
        let request = if self.token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.token)
        };

        let response = request
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        if !status.is_success() {
            warn!("⚠️ 接口 {} 返回 {}: {}", endpoint, status, body);
            return Err(AppError::bad_response(endpoint, status.as_u16(), &body));
        }

        debug!("接口 {} 返回: {}", endpoint, body);
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> AppResult<T> {
        let body = self.send(self.client.get(self.url(endpoint)), endpoint).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl QuizApi for QuizClient {
    async fn start_attempt(&self, quiz_id: u64) -> AppResult<StartAttempt> {
        let endpoint = format!("quizzes/{}/start/", quiz_id);
        let body = self
            .send(self.client.post(self.url(&endpoint)), &endpoint)
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_quiz(&self, quiz_id: u64) -> AppResult<Quiz> {
        self.get_json(&format!("quizzes/{}/", quiz_id)).await
    }

    async fn submit_answers(&self, quiz_id: u64, payload: &SubmissionPayload) -> AppResult<()> {
        let endpoint = format!("quizzes/{}/submissions/create/", quiz_id);
        debug!(
            "提交答案 Payload: {}",
            serde_json::to_string(payload).unwrap_or_default()
        );
        self.send(self.client.post(self.url(&endpoint)).json(payload), &endpoint)
            .await?;
        Ok(())
    }
}
