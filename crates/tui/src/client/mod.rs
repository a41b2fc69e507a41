use api_types::{
    auth::{LoginRequest, LoginResponse, MessageResponse, StatusResponse},
    fail::{FailNew, FailUpdate, FailView},
    user::UserView,
};
use reqwest::Url;

use serde::Deserialize;

use crate::error::{AppError, Result};

#[derive(Debug)]
pub enum ClientError {
    Unauthorized,
    NotFound,
    Validation(String),
    Server(String),
    Transport(reqwest::Error),
}

/// Error bodies come in two shapes: `{error}` from most routes and
/// `{message, errors}` from field validation.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Terminal(format!("invalid base_url: {err}")))?;
        // The cookie store carries the session cookie between calls, the
        // way a browser would.
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { base_url, http })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))
    }

    async fn error_for(res: reqwest::Response) -> ClientError {
        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|err| err.error.or(err.message))
            .unwrap_or_else(|| "unknown error".to_string());

        match status.as_u16() {
            400 => ClientError::Validation(body),
            401 => ClientError::Unauthorized,
            404 => ClientError::NotFound,
            _ => ClientError::Server(body),
        }
    }

    pub async fn login(&self, email: &str) -> std::result::Result<LoginResponse, ClientError> {
        let endpoint = self.endpoint("auth/login")?;

        let res = self
            .http
            .post(endpoint)
            .json(&LoginRequest {
                email: Some(email.to_string()),
            })
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res
                .json::<LoginResponse>()
                .await
                .map_err(ClientError::Transport);
        }
        Err(Self::error_for(res).await)
    }

    pub async fn logout(&self) -> std::result::Result<MessageResponse, ClientError> {
        let endpoint = self.endpoint("auth/logout")?;

        let res = self
            .http
            .post(endpoint)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res
                .json::<MessageResponse>()
                .await
                .map_err(ClientError::Transport);
        }
        Err(Self::error_for(res).await)
    }

    pub async fn status(&self) -> std::result::Result<StatusResponse, ClientError> {
        let endpoint = self.endpoint("auth/status")?;

        let res = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res
                .json::<StatusResponse>()
                .await
                .map_err(ClientError::Transport);
        }
        Err(Self::error_for(res).await)
    }

    pub async fn users(&self) -> std::result::Result<Vec<UserView>, ClientError> {
        let endpoint = self.endpoint("api/users")?;

        let res = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res
                .json::<Vec<UserView>>()
                .await
                .map_err(ClientError::Transport);
        }
        Err(Self::error_for(res).await)
    }

    /// List posts, optionally restricted to one creator.
    pub async fn fails(
        &self,
        created_by: Option<i32>,
    ) -> std::result::Result<Vec<FailView>, ClientError> {
        let endpoint = match created_by {
            Some(user_id) => self.endpoint(&format!("api/entities/user/{user_id}"))?,
            None => self.endpoint("api/entities")?,
        };

        let res = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res
                .json::<Vec<FailView>>()
                .await
                .map_err(ClientError::Transport);
        }
        Err(Self::error_for(res).await)
    }

    pub async fn fail_new(&self, payload: FailNew) -> std::result::Result<FailView, ClientError> {
        let endpoint = self.endpoint("api/entities")?;

        let res = self
            .http
            .post(endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res.json::<FailView>().await.map_err(ClientError::Transport);
        }
        Err(Self::error_for(res).await)
    }

    pub async fn fail_update(
        &self,
        id: i32,
        payload: FailUpdate,
    ) -> std::result::Result<FailView, ClientError> {
        let endpoint = self.endpoint(&format!("api/entities/{id}"))?;

        let res = self
            .http
            .put(endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res.json::<FailView>().await.map_err(ClientError::Transport);
        }
        Err(Self::error_for(res).await)
    }

    pub async fn fail_delete(&self, id: i32) -> std::result::Result<(), ClientError> {
        let endpoint = self.endpoint(&format!("api/entities/{id}"))?;

        let res = self
            .http
            .delete(endpoint)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return Ok(());
        }
        Err(Self::error_for(res).await)
    }
}
