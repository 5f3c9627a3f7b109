use async_trait::async_trait;
use uuid::Uuid;

use tradelink_types::api::{
    AuthSession, ProfileAttributes, VerificationRequest, VerificationResponse,
    VerificationStatusResponse,
};
use tradelink_types::models::User;

use crate::error::ClientError;

/// Data-access boundary between the client and the backend.
///
/// Implementations hold the auth session themselves: a successful
/// `sign_up`/`sign_in` authorizes later calls, `sign_out` drops it.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// `Ok(None)` when no profile row exists (yet) for this id.
    async fn fetch_user_by_id(&self, id: Uuid) -> Result<Option<User>, ClientError>;

    async fn list_users(&self) -> Result<Vec<User>, ClientError>;

    /// Create credentials and the profile row. The profile may not be
    /// readable immediately after this returns.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: ProfileAttributes,
    ) -> Result<AuthSession, ClientError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ClientError>;

    async fn sign_out(&self) -> Result<(), ClientError>;

    async fn invoke_verification(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResponse, ClientError>;

    async fn fetch_verification_status(
        &self,
        user_id: Uuid,
    ) -> Result<VerificationStatusResponse, ClientError>;
}
