use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tradelink_types::models::{
    Conversation, JobLead, QuoteRequest, Review, User, UserType,
};

/// Screen selected by the view-dispatch layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    Home,
    Profile,
    SubmitProject,
    JobLeads,
    BrowseExperts,
    Membership,
    QuoteRequests,
    Boost,
    PrivacyPolicy,
    ProfileMockup,
    TermsOfUse,
    CookiePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

/// The single root value. Every entity collection lives here.
///
/// `current_user` is a denormalized copy of one entry in `users`; actions that
/// mutate a user's credits, membership or account status update both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub current_user: Option<User>,
    pub current_view: View,
    pub service_filter: Option<String>,
    pub users: Vec<User>,
    pub job_leads: Vec<JobLead>,
    pub quote_requests: Vec<QuoteRequest>,
    pub reviews: Vec<Review>,
    pub conversations: Vec<Conversation>,
    pub show_auth_modal: bool,
    pub auth_mode: AuthMode,
    pub user_type: UserType,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current_user: None,
            current_view: View::Home,
            service_filter: None,
            users: Vec::new(),
            job_leads: Vec::new(),
            quote_requests: Vec::new(),
            reviews: Vec::new(),
            conversations: Vec::new(),
            show_auth_modal: false,
            auth_mode: AuthMode::Login,
            user_type: UserType::Homeowner,
        }
    }
}

impl AppState {
    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn lead(&self, id: Uuid) -> Option<&JobLead> {
        self.job_leads.iter().find(|l| l.id == id)
    }

    pub fn conversation(&self, id: Uuid) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn is_current_user(&self, id: Uuid) -> bool {
        self.current_user.as_ref().is_some_and(|u| u.id == id)
    }

    /// Apply `f` to the user in `users` and, when it is the same account, to
    /// `current_user` as well.
    pub(crate) fn update_user(&mut self, id: Uuid, mut f: impl FnMut(&mut User)) {
        for user in self.users.iter_mut().filter(|u| u.id == id) {
            f(user);
        }
        if let Some(current) = self.current_user.as_mut().filter(|u| u.id == id) {
            f(current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_wire_names() {
        assert_eq!(serde_json::to_string(&View::SubmitProject).unwrap(), "\"submit-project\"");
        let view: View = serde_json::from_str("\"job-leads\"").unwrap();
        assert_eq!(view, View::JobLeads);
    }

    #[test]
    fn update_user_touches_both_copies() {
        let id = Uuid::new_v4();
        let user = User::new(id, "Maya", "maya@example.com", UserType::Tradesperson);
        let mut state = AppState {
            current_user: Some(user.clone()),
            users: vec![user],
            ..AppState::default()
        };

        state.update_user(id, |u| u.credits = Some(12.0));

        assert_eq!(state.users[0].credits, Some(12.0));
        assert_eq!(state.current_user.unwrap().credits, Some(12.0));
    }
}
