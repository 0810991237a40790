use crate::error::ApiError;
use marquee_common::api::{
    AuthResponse, ErrorMessage, LoginRequest, MessageResponse, ProfileUpdate, RegisterRequest,
    WatchlistResponse,
};
use marquee_common::domain::{Identity, ItemId};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

async fn handle_response_error(res: Response) -> Result<Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let detail = res
        .json::<ErrorMessage>()
        .await
        .ok()
        .and_then(|x| x.reason());
    debug!(%status, ?detail, "request failed");

    Err(match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(detail),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::BadRequest(detail),
        StatusCode::FORBIDDEN => ApiError::Forbidden(detail),
        StatusCode::NOT_FOUND => ApiError::NotFound(detail),
        StatusCode::SERVICE_UNAVAILABLE => ApiError::Unavailable(detail),
        _ => ApiError::Status {
            status: status.as_u16(),
            detail,
        },
    })
}

/// Reads the body into `T`. A body that does not match is a decode error, never a partial value.
pub(crate) async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ApiError> {
    let res = handle_response_error(res).await?;
    let body = res.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Client for the unauthenticated part of the backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    address: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(address: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            address: address.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.address)
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn authed(&self, token: impl Into<String>) -> AuthClient {
        AuthClient {
            api: self.clone(),
            token: token.into(),
        }
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let res = self.client.post(self.url("/auth/login")).json(req).send().await?;
        decode(res).await
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(req)
            .send()
            .await?;
        decode(res).await
    }
}

/// Client for the endpoints that need a bearer token.
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
    token: String,
}

impl AuthClient {
    pub fn token(&self) -> &str {
        &self.token
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.api
            .client
            .request(method, self.api.url(path))
            .bearer_auth(&self.token)
    }

    pub async fn profile(&self) -> Result<Identity, ApiError> {
        let res = self.request(reqwest::Method::GET, "/auth/me").send().await?;
        decode(res).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Identity, ApiError> {
        let res = self
            .request(reqwest::Method::PUT, "/auth/profile")
            .json(update)
            .send()
            .await?;
        decode(res).await
    }

    pub async fn logout(&self) -> Result<MessageResponse, ApiError> {
        let res = self.request(reqwest::Method::POST, "/auth/logout").send().await?;
        decode(res).await
    }

    pub async fn watchlist(&self) -> Result<WatchlistResponse, ApiError> {
        let res = self.request(reqwest::Method::GET, "/watchlist").send().await?;
        decode(res).await
    }

    pub async fn add_to_watchlist(&self, id: ItemId) -> Result<MessageResponse, ApiError> {
        let res = self
            .request(reqwest::Method::POST, &format!("/watchlist/{id}"))
            .send()
            .await?;
        decode(res).await
    }

    pub async fn remove_from_watchlist(&self, id: ItemId) -> Result<MessageResponse, ApiError> {
        let res = self
            .request(reqwest::Method::DELETE, &format!("/watchlist/{id}"))
            .send()
            .await?;
        decode(res).await
    }
}
