use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tradelink_types::models::{
    Interest, JobLead, QuoteRequest, QuoteResponse, Review, User, UserType,
};

use crate::pricing::BoostPlan;
use crate::state::{AuthMode, View};

/// Everything the UI layer can ask the reducer to do.
///
/// Actions carry already-resolved data; network calls happen before dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetView(View),
    SetViewWithFilter {
        view: View,
        #[serde(default)]
        filter: Option<String>,
    },
    SetUser(Option<User>),
    ShowAuthModal {
        mode: AuthMode,
        user_type: UserType,
    },
    HideAuthModal,

    AddJobLead(JobLead),
    /// Replace the whole lead collection.
    UpdateJobLeads(Vec<JobLead>),
    AddQuoteRequest(QuoteRequest),
    RespondToQuote {
        quote_id: Uuid,
        response: QuoteResponse,
    },
    AcceptQuoteResponse {
        quote_id: Uuid,
        response_id: Uuid,
    },

    PurchaseLead {
        lead_id: Uuid,
        user_id: Uuid,
    },
    ExpressInterest {
        lead_id: Uuid,
        interest: Interest,
    },
    AcceptInterest {
        lead_id: Uuid,
        interest_id: Uuid,
    },
    HireTradesperson {
        job_id: Uuid,
        tradesperson_id: Uuid,
    },
    DismissJob {
        job_id: Uuid,
        user_id: Uuid,
    },

    AddUser(User),
    /// Replace the user collection with what the backend returned.
    LoadUsers(Vec<User>),
    /// Acknowledges a write-through to the backend; state is unchanged.
    SyncUser(User),
    ParkAccount(Uuid),
    ReactivateAccount(Uuid),
    DeleteAccount(Uuid),
    UpgradeMembership {
        user_id: Uuid,
        plan: BoostPlan,
    },

    AddReview(Review),

    CreateConversation {
        job_id: Uuid,
        homeowner_id: Uuid,
        tradesperson_id: Uuid,
    },
    SendMessage {
        job_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: String,
    },
    MarkMessagesRead {
        conversation_id: Uuid,
        user_id: Uuid,
    },

    /// Any action type this build does not know about.
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Wire name of the action, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetView(_) => "SET_VIEW",
            Self::SetViewWithFilter { .. } => "SET_VIEW_WITH_FILTER",
            Self::SetUser(_) => "SET_USER",
            Self::ShowAuthModal { .. } => "SHOW_AUTH_MODAL",
            Self::HideAuthModal => "HIDE_AUTH_MODAL",
            Self::AddJobLead(_) => "ADD_JOB_LEAD",
            Self::UpdateJobLeads(_) => "UPDATE_JOB_LEADS",
            Self::AddQuoteRequest(_) => "ADD_QUOTE_REQUEST",
            Self::RespondToQuote { .. } => "RESPOND_TO_QUOTE",
            Self::AcceptQuoteResponse { .. } => "ACCEPT_QUOTE_RESPONSE",
            Self::PurchaseLead { .. } => "PURCHASE_LEAD",
            Self::ExpressInterest { .. } => "EXPRESS_INTEREST",
            Self::AcceptInterest { .. } => "ACCEPT_INTEREST",
            Self::HireTradesperson { .. } => "HIRE_TRADESPERSON",
            Self::DismissJob { .. } => "DISMISS_JOB",
            Self::AddUser(_) => "ADD_USER",
            Self::LoadUsers(_) => "LOAD_USERS",
            Self::SyncUser(_) => "SYNC_USER",
            Self::ParkAccount(_) => "PARK_ACCOUNT",
            Self::ReactivateAccount(_) => "REACTIVATE_ACCOUNT",
            Self::DeleteAccount(_) => "DELETE_ACCOUNT",
            Self::UpgradeMembership { .. } => "UPGRADE_MEMBERSHIP",
            Self::AddReview(_) => "ADD_REVIEW",
            Self::CreateConversation { .. } => "CREATE_CONVERSATION",
            Self::SendMessage { .. } => "SEND_MESSAGE",
            Self::MarkMessagesRead { .. } => "MARK_MESSAGES_READ",
            Self::Unknown => "UNKNOWN",
        }
    }
}
