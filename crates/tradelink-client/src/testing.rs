//! In-memory [`Gateway`] for flow tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use tradelink_types::api::{
    AuthSession, ProfileAttributes, VerificationRequest, VerificationResponse,
    VerificationStatusResponse,
};
use tradelink_types::models::{AccountStatus, User, VerificationData, VerificationStatus};

use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::session::synthesized_profile;

#[derive(Default)]
pub struct MockGateway {
    users: Mutex<HashMap<Uuid, User>>,
    credentials: Mutex<HashMap<String, (Uuid, String)>>,
    verification_requests: Mutex<Vec<VerificationRequest>>,
    verification_failure: Mutex<Option<String>>,
    hidden_fetches: AtomicU32,
    fetches: AtomicUsize,
    calls: AtomicUsize,
}

impl MockGateway {
    /// Create an account directly, without counting as a gateway call.
    pub fn register(&self, email: &str, password: &str, profile: ProfileAttributes) -> Uuid {
        let id = Uuid::new_v4();
        self.insert_account(id, email, password, profile);
        id
    }

    fn insert_account(&self, id: Uuid, email: &str, password: &str, profile: ProfileAttributes) {
        let user = synthesized_profile(id, email, profile);
        self.users.lock().unwrap().insert(id, user);
        self.credentials
            .lock()
            .unwrap()
            .insert(email.to_lowercase(), (id, password.to_string()));
    }

    /// The next `n` profile fetches see no row.
    pub fn profile_delay(&self, n: u32) {
        self.hidden_fetches.store(n, Ordering::SeqCst);
    }

    pub fn set_account_status(&self, id: Uuid, status: AccountStatus) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.account_status = Some(status);
        }
    }

    /// Make every verification submission come back unsuccessful.
    pub fn fail_verification(&self, reason: &str) {
        *self.verification_failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn verification_requests(&self) -> Vec<VerificationRequest> {
        self.verification_requests.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn session_for(id: Uuid, email: &str) -> AuthSession {
        AuthSession {
            user_id: id,
            email: email.to_string(),
            token: format!("mock-token-{}", id),
        }
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn fetch_user_by_id(&self, id: Uuid) -> Result<Option<User>, ClientError> {
        self.count();
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let hidden = self
            .hidden_fetches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if hidden {
            return Ok(None);
        }
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.count();
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: ProfileAttributes,
    ) -> Result<AuthSession, ClientError> {
        self.count();
        let email = email.to_lowercase();
        if self.credentials.lock().unwrap().contains_key(&email) {
            return Err(ClientError::Backend("An account with this email already exists".into()));
        }
        let id = Uuid::new_v4();
        self.insert_account(id, &email, password, profile);
        Ok(Self::session_for(id, &email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        self.count();
        let email = email.to_lowercase();
        match self.credentials.lock().unwrap().get(&email) {
            Some((id, stored)) if stored == password => Ok(Self::session_for(*id, &email)),
            _ => Err(ClientError::Unauthorized),
        }
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        self.count();
        Ok(())
    }

    async fn invoke_verification(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResponse, ClientError> {
        self.count();
        self.verification_requests.lock().unwrap().push(request.clone());

        if let Some(reason) = self.verification_failure.lock().unwrap().clone() {
            return Ok(VerificationResponse {
                success: false,
                error: Some(reason),
                ..Default::default()
            });
        }

        let session_id = format!("idv_session_{}", Uuid::new_v4());
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&request.user_id)
            .ok_or_else(|| ClientError::NotFound(format!("profile {}", request.user_id)))?;
        user.verification_status = Some(VerificationStatus::Pending);
        user.verified = Some(false);
        user.verification_data = Some(VerificationData {
            session_id: Some(session_id.clone()),
            document_type: Some(request.document_type.as_str().to_string()),
            ..Default::default()
        });

        Ok(VerificationResponse {
            success: true,
            message: Some("Verification session created".into()),
            session_id: Some(session_id),
            status: Some(VerificationStatus::Pending),
            error: None,
        })
    }

    async fn fetch_verification_status(
        &self,
        user_id: Uuid,
    ) -> Result<VerificationStatusResponse, ClientError> {
        self.count();
        let users = self.users.lock().unwrap();
        let user = users
            .get(&user_id)
            .ok_or_else(|| ClientError::NotFound(format!("profile {}", user_id)))?;
        Ok(VerificationStatusResponse {
            status: user.verification_status,
            verified: user.verified.unwrap_or(false),
            data: user.verification_data.clone(),
        })
    }
}
