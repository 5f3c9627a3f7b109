//! [`Gateway`] over the tradelink HTTP API.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use tradelink_types::api::{
    AuthSession, ErrorResponse, ProfileAttributes, SignInRequest, SignUpRequest,
    VerificationRequest, VerificationResponse, VerificationStatusResponse,
};
use tradelink_types::models::User;

use crate::error::ClientError;
use crate::gateway::Gateway;

pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// Bearer token of the current session, if signed in.
    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token().ok_or(ClientError::Unauthorized)?;
        Ok(req.bearer_auth(token))
    }

    async fn start_session(&self, req: RequestBuilder) -> Result<AuthSession, ClientError> {
        let session: AuthSession = read_json(req.send().await?).await?;
        self.set_token(Some(session.token.clone()));
        debug!("Session started for {}", session.user_id);
        Ok(session)
    }
}

/// Turn a non-success status into the matching [`ClientError`], using the
/// server's `{error, message}` body when there is one.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => status.to_string(),
    };
    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST => ClientError::Validation(message),
        _ => ClientError::Backend(message),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    check(response)
        .await?
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_user_by_id(&self, id: Uuid) -> Result<Option<User>, ClientError> {
        let req = self.authed(self.client.get(self.url(&format!("/users/{}", id))))?;
        match read_json(req.send().await?).await {
            Ok(user) => Ok(Some(user)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        let req = self.authed(self.client.get(self.url("/users")))?;
        read_json(req.send().await?).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: ProfileAttributes,
    ) -> Result<AuthSession, ClientError> {
        let body = SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            profile,
        };
        self.start_session(self.client.post(self.url("/auth/signup")).json(&body))
            .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        let body = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.start_session(self.client.post(self.url("/auth/signin")).json(&body))
            .await
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        if self.token().is_none() {
            return Ok(());
        }
        let req = self.authed(self.client.post(self.url("/auth/signout")))?;
        let result = check(req.send().await?).await;
        // Dropped even when the server call failed.
        self.set_token(None);
        result.map(|_| ())
    }

    async fn invoke_verification(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResponse, ClientError> {
        let req = self.authed(self.client.post(self.url("/verification")).json(request))?;
        read_json(req.send().await?).await
    }

    async fn fetch_verification_status(
        &self,
        user_id: Uuid,
    ) -> Result<VerificationStatusResponse, ClientError> {
        let req = self.authed(self.client.get(self.url(&format!("/verification/{}", user_id))))?;
        read_json(req.send().await?).await
    }
}
