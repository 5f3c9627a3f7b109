//! Read-only queries over [`AppState`] used by the screens.

use uuid::Uuid;

use tradelink_types::models::{Conversation, JobLead, User};

use crate::pricing;
use crate::state::AppState;

/// Conversations in which the user is either party.
pub fn conversations_for(state: &AppState, user_id: Uuid) -> Vec<&Conversation> {
    state
        .conversations
        .iter()
        .filter(|c| c.involves(user_id))
        .collect()
}

pub fn unread_total(state: &AppState, user_id: Uuid) -> u32 {
    conversations_for(state, user_id)
        .iter()
        .map(|c| c.unread_count)
        .sum()
}

/// Thread for a job between two users, whichever of them is the homeowner.
pub fn find_conversation(state: &AppState, job_id: Uuid, a: Uuid, b: Uuid) -> Option<&Conversation> {
    state
        .conversations
        .iter()
        .find(|c| c.matches(job_id, a, b) || c.matches(job_id, b, a))
}

/// Leads a user should see on the lead board: active, not dismissed by them,
/// and in the selected service category when a filter is set.
pub fn visible_leads_for(state: &AppState, user_id: Uuid) -> Vec<&JobLead> {
    state
        .job_leads
        .iter()
        .filter(|l| l.is_active)
        .filter(|l| {
            !l.dismissed_by
                .as_ref()
                .is_some_and(|ids| ids.contains(&user_id))
        })
        .filter(|l| match state.service_filter.as_deref() {
            Some(category) => l.category.eq_ignore_ascii_case(category),
            None => true,
        })
        .collect()
}

pub fn has_purchased(lead: &JobLead, user_id: Uuid) -> bool {
    lead.purchased_by.contains(&user_id)
}

/// What the next lead purchase would cost this user.
pub fn lead_price_for(user: &User) -> f64 {
    pricing::lead_price(user.membership())
}
