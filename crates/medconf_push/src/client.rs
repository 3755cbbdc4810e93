//! Backend client for device token registration.
//!
//! Three endpoints are used:
//!
//! - `POST /users/fcm-token` with `{ "token" }`: idempotent upsert for the signed-in user
//! - `DELETE /users/fcm-token` with `{ "token" }`: removal on logout
//! - `POST /verify-fcm-token` with `{ "fcmToken" }`: diagnostic round trip
//!   returning `{ success, message }`

use async_trait::async_trait;
use medconf_common::{bearer, create_client, join_url, DeviceToken, SessionCredential};
use medconf_config::ApiConfig;
use reqwest::{header, Client, RequestBuilder, Response};
use tracing::debug;

use crate::error::PushError;
use crate::models::{TokenRequest, VerificationResult, VerifyTokenRequest};

pub const REGISTER_TOKEN_PATH: &str = "/users/fcm-token";
pub const VERIFY_TOKEN_PATH: &str = "/verify-fcm-token";

/// Server side of the device token lifecycle.
#[async_trait]
pub trait TokenApi: Send + Sync {
    async fn register_token(
        &self,
        credential: &SessionCredential,
        token: &DeviceToken,
    ) -> Result<(), PushError>;

    async fn delete_token(
        &self,
        credential: &SessionCredential,
        token: &DeviceToken,
    ) -> Result<(), PushError>;

    async fn verify_token(
        &self,
        credential: Option<&SessionCredential>,
        token: &DeviceToken,
    ) -> Result<VerificationResult, PushError>;
}

/// [`TokenApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTokenApi {
    client: Client,
    base_url: String,
}

impl HttpTokenApi {
    /// Builds a client with the configured request timeout.
    pub fn new(config: &ApiConfig) -> Result<Self, PushError> {
        if config.base_url.trim().is_empty() {
            return Err(PushError::Config("api.base_url is empty".to_string()));
        }
        let client = create_client(config.request_timeout_secs, true)?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn authorized(
        builder: RequestBuilder,
        credential: Option<&SessionCredential>,
    ) -> RequestBuilder {
        match credential {
            Some(credential) => builder.header(header::AUTHORIZATION, bearer(credential.as_str())),
            None => builder,
        }
    }

    async fn ensure_success(response: Response) -> Result<Response, PushError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(PushError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl TokenApi for HttpTokenApi {
    async fn register_token(
        &self,
        credential: &SessionCredential,
        token: &DeviceToken,
    ) -> Result<(), PushError> {
        let url = self.url(REGISTER_TOKEN_PATH);
        debug!("POST {} for token {}", url, token);

        let request =
            Self::authorized(self.client.post(&url), Some(credential)).json(&TokenRequest {
                token: token.as_str().to_string(),
            });
        Self::ensure_success(request.send().await?).await?;
        Ok(())
    }

    async fn delete_token(
        &self,
        credential: &SessionCredential,
        token: &DeviceToken,
    ) -> Result<(), PushError> {
        let url = self.url(REGISTER_TOKEN_PATH);
        debug!("DELETE {} for token {}", url, token);

        let request =
            Self::authorized(self.client.delete(&url), Some(credential)).json(&TokenRequest {
                token: token.as_str().to_string(),
            });
        Self::ensure_success(request.send().await?).await?;
        Ok(())
    }

    async fn verify_token(
        &self,
        credential: Option<&SessionCredential>,
        token: &DeviceToken,
    ) -> Result<VerificationResult, PushError> {
        let url = self.url(VERIFY_TOKEN_PATH);
        debug!("POST {} for token {}", url, token);

        let request =
            Self::authorized(self.client.post(&url), credential).json(&VerifyTokenRequest {
                fcm_token: token.as_str().to_string(),
            });
        let response = Self::ensure_success(request.send().await?).await?;
        Ok(response.json::<VerificationResult>().await?)
    }
}
