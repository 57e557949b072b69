use async_trait::async_trait;
use huddle_chats::{
    AuthResponse, Channel, ChannelEnvelope, CreateChannelRequest, ErrorBody, LoginRequest,
    MarkReadResponse, MembershipRequest, Message, ReadReceipt, RegisterRequest, User,
};
use huddle_config::ApiConfig;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::ChatApi;

/// HTTP client for the chat backend
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach the bearer credential sent with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ApiResult<AuthResponse> {
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(self.client.post(self.url("/auth/register")).json(&body), "/auth/register")
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(self.client.post(self.url("/auth/login")).json(&body), "/auth/login")
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn dispatch(&self, request: RequestBuilder, path: &str) -> ApiResult<String> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            warn!(path, "request rejected as unauthenticated");
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message)
                .or_else(|| (!body.trim().is_empty()).then(|| body.clone()))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            warn!(path, %status, %message, "request failed");
            return Err(ApiError::Status {
                status,
                path: path.to_string(),
                message,
            });
        }

        debug!(path, %status, bytes = body.len(), "request completed");
        Ok(body)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> ApiResult<T> {
        let body = self.dispatch(request, path).await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl ChatApi for ApiClient {
    async fn profile(&self) -> ApiResult<User> {
        self.send(self.client.get(self.url("/auth/profile")), "/auth/profile")
            .await
    }

    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.send(self.client.get(self.url("/auth/users")), "/auth/users")
            .await
    }

    async fn list_channels(&self) -> ApiResult<Vec<Channel>> {
        self.send(self.client.get(self.url("/channels")), "/channels")
            .await
    }

    async fn get_channel(&self, channel_id: &str) -> ApiResult<Channel> {
        let path = format!("/channels/{channel_id}");
        self.send(self.client.get(self.url(&path)), &path).await
    }

    async fn create_channel(&self, request: &CreateChannelRequest) -> ApiResult<Channel> {
        let envelope: ChannelEnvelope = self
            .send(self.client.post(self.url("/channels")).json(request), "/channels")
            .await?;
        Ok(envelope.channel)
    }

    async fn invite_user(&self, channel_id: &str, user_id: &str) -> ApiResult<Channel> {
        let body = MembershipRequest {
            channel_id: channel_id.to_string(),
            user_id: user_id.to_string(),
        };
        let envelope: ChannelEnvelope = self
            .send(
                self.client.post(self.url("/channels/invite")).json(&body),
                "/channels/invite",
            )
            .await?;
        Ok(envelope.channel)
    }

    async fn remove_user(&self, channel_id: &str, user_id: &str) -> ApiResult<Channel> {
        let body = MembershipRequest {
            channel_id: channel_id.to_string(),
            user_id: user_id.to_string(),
        };
        let envelope: ChannelEnvelope = self
            .send(
                self.client.post(self.url("/channels/remove")).json(&body),
                "/channels/remove",
            )
            .await?;
        Ok(envelope.channel)
    }

    async fn delete_channel(&self, channel_id: &str) -> ApiResult<()> {
        let path = format!("/channels/{channel_id}");
        self.dispatch(self.client.delete(self.url(&path)), &path)
            .await?;
        Ok(())
    }

    async fn fetch_messages(&self, channel_id: &str) -> ApiResult<Vec<Message>> {
        let path = format!("/messages/{channel_id}");
        self.send(self.client.get(self.url(&path)), &path).await
    }

    async fn fetch_history(&self, channel_id: &str, skip: usize) -> ApiResult<Vec<Message>> {
        let path = format!("/messages/{channel_id}/history/{skip}");
        self.send(self.client.get(self.url(&path)), &path).await
    }

    async fn mark_read(&self, message_id: &str) -> ApiResult<Vec<ReadReceipt>> {
        let path = format!("/messages/{message_id}/read");
        let response: MarkReadResponse = self.send(self.client.post(self.url(&path)), &path).await?;
        Ok(response.data.read_by)
    }
}
