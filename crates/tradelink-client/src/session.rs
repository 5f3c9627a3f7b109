//! Auth session flows: sign-up, sign-in, sign-out and the auth-state
//! subscription that keeps the store's current user in step with the session.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use tradelink_core::Store;
use tradelink_core::action::Action;
use tradelink_core::state::View;
use tradelink_types::api::{AuthSession, ProfileAttributes};
use tradelink_types::events::AuthEvent;
use tradelink_types::models::{MembershipType, User, UserType};

use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::http::HttpGateway;

/// Credits a tradesperson starts with, mirrored from the server default for
/// the fallback profile.
const SIGNUP_CREDITS: f64 = 50.0;

/// How a fresh sign-up waits for its profile row to become readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadBackPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ReadBackPolicy {
    fn default() -> Self {
        Self {
            attempts: 4,
            interval: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub profile_read_back: ReadBackPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            profile_read_back: ReadBackPolicy::default(),
        }
    }
}

pub struct Session<G: Gateway> {
    gateway: G,
    store: Store,
    read_back: ReadBackPolicy,
    current: Mutex<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Session<HttpGateway> {
    pub fn connect(config: ClientConfig, store: Store) -> Result<Self, ClientError> {
        let gateway = HttpGateway::new(config.base_url)?;
        Ok(Self::new(gateway, store, config.profile_read_back))
    }
}

impl<G: Gateway> Session<G> {
    pub fn new(gateway: G, store: Store, read_back: ReadBackPolicy) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            gateway,
            store,
            read_back,
            current: Mutex::new(None),
            events,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The active session, if signed in.
    pub fn current(&self) -> Option<AuthSession> {
        self.current.lock().ok().and_then(|s| s.clone())
    }

    fn set_current(&self, session: Option<AuthSession>) {
        if let Ok(mut slot) = self.current.lock() {
            *slot = session;
        }
    }

    /// Subscribe to session changes.
    pub fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: AuthEvent) {
        debug!("Auth event {:?}", event);
        let _ = self.events.send(event);
    }

    /// Resolve an auth event into the store: signed-in and updated sessions
    /// load the profile and set it as current, signing out clears it.
    pub async fn handle_auth_event(&self, event: &AuthEvent) -> Result<(), ClientError> {
        match event.user_id() {
            Some(user_id) => {
                let user = self.fetch_profile(user_id).await?;
                self.store.dispatch(Action::SetUser(Some(user)));
            }
            None => self.store.dispatch(Action::SetUser(None)),
        }
        Ok(())
    }

    /// Sign up and make the new account current.
    ///
    /// The profile is read back by polling per the [`ReadBackPolicy`]. If it
    /// never shows up, a profile is synthesized from the sign-up attributes
    /// so the UI still has a current user.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: ProfileAttributes,
    ) -> Result<User, ClientError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation("email and password are required".into()));
        }
        if profile.name.trim().is_empty() {
            return Err(ClientError::Validation("name is required".into()));
        }
        if profile.user_type == UserType::Tradesperson && profile.trades.is_empty() {
            return Err(ClientError::Validation("Please select at least one trade".into()));
        }

        let session = self.gateway.sign_up(email, password, profile.clone()).await?;
        let user_id = session.user_id;
        let email = session.email.clone();
        self.set_current(Some(session));

        let user = match self.read_back(user_id).await {
            Some(user) => user,
            None => {
                warn!("Profile for {} not readable yet, using sign-up attributes", user_id);
                synthesized_profile(user_id, &email, profile)
            }
        };

        self.store.dispatch(Action::AddUser(user.clone()));
        self.store.dispatch(Action::SetUser(Some(user.clone())));
        self.store.dispatch(Action::HideAuthModal);
        self.emit(AuthEvent::SignedIn { user_id });
        info!("Signed up {}", user_id);
        Ok(user)
    }

    async fn read_back(&self, user_id: Uuid) -> Option<User> {
        for attempt in 1..=self.read_back.attempts {
            match self.gateway.fetch_user_by_id(user_id).await {
                Ok(Some(user)) => return Some(user),
                Ok(None) => debug!("Profile {} not there yet (attempt {})", user_id, attempt),
                Err(e) => warn!("Profile read-back failed (attempt {}): {}", attempt, e),
            }
            if attempt < self.read_back.attempts {
                tokio::time::sleep(self.read_back.interval).await;
            }
        }
        None
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, ClientError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation("email and password are required".into()));
        }

        let session = self.gateway.sign_in(email, password).await?;
        let user_id = session.user_id;
        self.set_current(Some(session));

        let user = match self.fetch_profile(user_id).await {
            Ok(user) => user,
            Err(e) => {
                self.set_current(None);
                return Err(e);
            }
        };

        self.store.dispatch(Action::SetUser(Some(user.clone())));
        self.store.dispatch(Action::SetView(View::Home));
        self.store.dispatch(Action::HideAuthModal);
        self.emit(AuthEvent::SignedIn { user_id });
        Ok(user)
    }

    pub async fn sign_out(&self) -> Result<(), ClientError> {
        self.gateway.sign_out().await?;
        self.set_current(None);
        self.store.dispatch(Action::SetUser(None));
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    /// Replace the store's user collection with the backend's. Returns how
    /// many users were received.
    pub async fn load_users(&self) -> Result<usize, ClientError> {
        let users = self.gateway.list_users().await?;
        let count = users.len();
        self.store.dispatch(Action::LoadUsers(users));
        Ok(count)
    }

    /// Reload a profile after a server-side change and announce it.
    pub async fn refresh_user(&self, user_id: Uuid) -> Result<User, ClientError> {
        let user = self.fetch_profile(user_id).await?;
        self.store.dispatch(Action::SetUser(Some(user.clone())));
        self.emit(AuthEvent::UserUpdated { user_id });
        Ok(user)
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<User, ClientError> {
        self.gateway
            .fetch_user_by_id(user_id)
            .await?
            .ok_or_else(|| ClientError::NotFound(format!("profile {}", user_id)))
    }
}

impl<G: Gateway + 'static> Session<G> {
    /// Apply every auth event to the store until the session is dropped.
    pub fn watch_auth_events(self: Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.on_auth_state_change();
        let session = Arc::downgrade(&self);
        tokio::spawn(async move {
            loop {
                let event = match rx.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Auth watcher lagged by {} events", n);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Some(session) = session.upgrade() else { break };
                if let Err(e) = session.handle_auth_event(&event).await {
                    warn!("Failed to apply auth event {:?}: {}", event, e);
                }
            }
        })
    }
}

pub(crate) fn synthesized_profile(user_id: Uuid, email: &str, profile: ProfileAttributes) -> User {
    let mut user = User::new(user_id, profile.name, email, profile.user_type);
    user.location = profile.location;
    user.trades = profile.trades;
    user.working_area = profile.working_area;
    user.rating = Some(0.0);
    user.reviews = Some(0);
    user.verified = Some(false);
    user.credits = Some(match profile.user_type {
        UserType::Tradesperson => SIGNUP_CREDITS,
        UserType::Homeowner => 0.0,
    });
    user.membership_type = Some(MembershipType::None);
    user
}
