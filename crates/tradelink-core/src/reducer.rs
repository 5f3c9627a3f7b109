use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};
use uuid::Uuid;

use tradelink_types::models::{
    AccountStatus, Conversation, InterestStatus, Message, QuoteResponseStatus, Review, User,
    UserType,
};

use crate::action::Action;
use crate::pricing::{self, BASE_LEAD_PRICE};
use crate::state::{AppState, View};

/// Apply one action to the state, stamping any new records with the current time.
pub fn reduce(state: AppState, action: Action) -> AppState {
    reduce_at(state, action, Utc::now())
}

/// Same as [`reduce`] with an explicit clock reading.
///
/// Never fails: actions that reference unknown jobs, users or conversations
/// are logged and leave the state as it was.
pub fn reduce_at(mut state: AppState, action: Action, now: DateTime<Utc>) -> AppState {
    match action {
        Action::SetView(view) => state.current_view = view,
        Action::SetViewWithFilter { view, filter } => {
            state.current_view = view;
            state.service_filter = filter.filter(|f| !f.is_empty());
        }
        Action::SetUser(user) => state.current_user = user,
        Action::ShowAuthModal { mode, user_type } => {
            state.show_auth_modal = true;
            state.auth_mode = mode;
            state.user_type = user_type;
        }
        Action::HideAuthModal => state.show_auth_modal = false,

        Action::AddJobLead(lead) => state.job_leads.push(lead),
        Action::UpdateJobLeads(leads) => state.job_leads = leads,
        Action::AddQuoteRequest(quote) => state.quote_requests.push(quote),
        Action::RespondToQuote { quote_id, response } => {
            let tradesperson_id = response.tradesperson_id;
            let paid = response.paid_amount;
            if let Some(quote) = state.quote_requests.iter_mut().find(|q| q.id == quote_id) {
                quote.responses.push(response);
            }
            charge_if_funded(&mut state, tradesperson_id, paid);
        }
        Action::AcceptQuoteResponse { quote_id, response_id } => {
            let responses = state
                .quote_requests
                .iter_mut()
                .filter(|q| q.id == quote_id)
                .flat_map(|q| q.responses.iter_mut());
            for response in responses.filter(|r| r.id == response_id) {
                response.status = QuoteResponseStatus::Accepted;
            }
        }

        Action::PurchaseLead { lead_id, user_id } => purchase_lead(&mut state, lead_id, user_id),
        Action::ExpressInterest { lead_id, interest } => {
            if let Some(lead) = state.job_leads.iter_mut().find(|l| l.id == lead_id) {
                lead.interests.push(interest);
            }
        }
        Action::AcceptInterest { lead_id, interest_id } => {
            accept_interest(&mut state, lead_id, interest_id)
        }
        Action::HireTradesperson { job_id, tradesperson_id } => {
            if let Some(lead) = state.job_leads.iter_mut().find(|l| l.id == job_id) {
                lead.hired_tradesperson = Some(tradesperson_id);
                lead.is_active = false;
            }
        }
        Action::DismissJob { job_id, user_id } => {
            if let Some(lead) = state.job_leads.iter_mut().find(|l| l.id == job_id) {
                lead.dismissed_by.get_or_insert_with(Vec::new).push(user_id);
            }
        }

        Action::AddUser(user) => add_user(&mut state, user),
        Action::LoadUsers(users) => {
            state.users = users
                .into_iter()
                .filter(|u| u.account_status != Some(AccountStatus::Deleted))
                .collect();
        }
        Action::SyncUser(_) => {}
        Action::ParkAccount(user_id) => state.update_user(user_id, |u| {
            u.account_status = Some(AccountStatus::Parked);
            u.parked_date = Some(now);
        }),
        Action::ReactivateAccount(user_id) => state.update_user(user_id, |u| {
            u.account_status = Some(AccountStatus::Active);
            u.reactivated_date = Some(now);
        }),
        Action::DeleteAccount(user_id) => {
            state.users.retain(|u| u.id != user_id);
            if state.is_current_user(user_id) {
                state.current_user = None;
                state.current_view = View::Home;
            }
        }
        Action::UpgradeMembership { user_id, plan } => state.update_user(user_id, |u| {
            u.membership_type = Some(plan.membership());
            u.membership_expiry = Some(plan.expiry_from(now));
        }),

        Action::AddReview(review) => add_review(&mut state, review),

        Action::CreateConversation {
            job_id,
            homeowner_id,
            tradesperson_id,
        } => create_conversation(&mut state, job_id, homeowner_id, tradesperson_id, now),
        Action::SendMessage {
            job_id,
            sender_id,
            receiver_id,
            content,
        } => send_message(&mut state, job_id, sender_id, receiver_id, content, now),
        Action::MarkMessagesRead { conversation_id, .. } => {
            if let Some(conv) = state.conversations.iter_mut().find(|c| c.id == conversation_id) {
                for message in &mut conv.messages {
                    message.read = true;
                }
                if let Some(last) = conv.last_message.as_mut() {
                    last.read = true;
                }
                conv.unread_count = 0;
            }
        }

        Action::Unknown => debug!("Ignoring unrecognised action"),
    }

    state
}

fn purchase_lead(state: &mut AppState, lead_id: Uuid, user_id: Uuid) {
    let Some(lead) = state.job_leads.iter_mut().find(|l| l.id == lead_id) else {
        warn!("PURCHASE_LEAD - lead not found: {}", lead_id);
        return;
    };
    // Neither max_purchases nor repeat purchases are checked here.
    lead.purchased_by.push(user_id);

    let price = state
        .user(user_id)
        .map(|u| pricing::lead_price(u.membership()))
        .unwrap_or(BASE_LEAD_PRICE);

    state.update_user(user_id, |u| {
        if let Some(credits) = u.credits {
            u.credits = Some(pricing::deduct(credits, price));
        }
    });
}

fn accept_interest(state: &mut AppState, lead_id: Uuid, interest_id: Uuid) {
    let Some(interest) = state
        .job_leads
        .iter_mut()
        .filter(|l| l.id == lead_id)
        .flat_map(|l| l.interests.iter_mut())
        .find(|i| i.id == interest_id)
    else {
        warn!("ACCEPT_INTEREST - interest {} not found on lead {}", interest_id, lead_id);
        return;
    };

    interest.status = InterestStatus::Accepted;
    let (tradesperson_id, price) = (interest.tradesperson_id, interest.price);

    if price > 0.0 {
        charge_if_funded(state, tradesperson_id, price);
    }
}

/// Deduct `amount` only from a user holding a non-zero balance. An empty or
/// missing balance is left untouched rather than rejected.
fn charge_if_funded(state: &mut AppState, user_id: Uuid, amount: f64) {
    state.update_user(user_id, |u| {
        if let Some(credits) = u.credits.filter(|c| *c != 0.0) {
            u.credits = Some(pricing::deduct(credits, amount));
        }
    });
}

fn add_user(state: &mut AppState, user: User) {
    match state.users.iter_mut().find(|u| u.id == user.id) {
        Some(existing) => *existing = user,
        None => state.users.push(user),
    }
}

fn add_review(state: &mut AppState, review: Review) {
    let tradesperson_id = review.tradesperson_id;
    state.reviews.push(review);

    let ratings: Vec<f64> = state
        .reviews
        .iter()
        .filter(|r| r.tradesperson_id == tradesperson_id)
        .map(|r| f64::from(r.rating))
        .collect();
    let count = ratings.len();
    let average = ratings.iter().sum::<f64>() / count as f64;
    let rounded = (average * 10.0).round() / 10.0;

    state.update_user(tradesperson_id, |u| {
        u.rating = Some(rounded);
        u.reviews = Some(count as u32);
    });
}

fn create_conversation(
    state: &mut AppState,
    job_id: Uuid,
    homeowner_id: Uuid,
    tradesperson_id: Uuid,
    now: DateTime<Utc>,
) {
    let Some(job) = state.lead(job_id) else {
        warn!("CREATE_CONVERSATION - job not found: {}", job_id);
        return;
    };
    if state.user(homeowner_id).is_none() || state.user(tradesperson_id).is_none() {
        warn!(
            "CREATE_CONVERSATION - participant not found: homeowner={} tradesperson={}",
            homeowner_id, tradesperson_id
        );
        return;
    }
    if state
        .conversations
        .iter()
        .any(|c| c.matches(job_id, homeowner_id, tradesperson_id))
    {
        return;
    }

    let conversation = Conversation {
        id: Uuid::new_v4(),
        job_id,
        job_title: job.title.clone(),
        homeowner_id,
        tradesperson_id,
        messages: Vec::new(),
        created_at: now,
        unread_count: 0,
        last_message: None,
    };
    state.conversations.push(conversation);
}

fn send_message(
    state: &mut AppState,
    job_id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    content: String,
    now: DateTime<Utc>,
) {
    let (Some(sender), Some(_receiver)) = (state.user(sender_id), state.user(receiver_id)) else {
        error!(
            "SEND_MESSAGE - sender or receiver not found: sender={} receiver={}",
            sender_id, receiver_id
        );
        return;
    };

    let (homeowner_id, tradesperson_id) = match sender.user_type {
        UserType::Homeowner => (sender_id, receiver_id),
        UserType::Tradesperson => (receiver_id, sender_id),
    };

    let message = Message {
        id: Uuid::new_v4(),
        sender_id,
        sender_name: sender.name.clone(),
        content,
        timestamp: now,
        read: false,
    };
    // Unread counts are kept for the other party only.
    let bump = u32::from(!state.is_current_user(sender_id));

    if let Some(conv) = state
        .conversations
        .iter_mut()
        .find(|c| c.matches(job_id, homeowner_id, tradesperson_id))
    {
        conv.messages.push(message.clone());
        conv.last_message = Some(message);
        conv.unread_count += bump;
        return;
    }

    let Some(job) = state.lead(job_id) else {
        error!("SEND_MESSAGE - job not found: {}", job_id);
        return;
    };

    let conversation = Conversation {
        id: Uuid::new_v4(),
        job_id,
        job_title: job.title.clone(),
        homeowner_id,
        tradesperson_id,
        messages: vec![message.clone()],
        created_at: now,
        unread_count: bump,
        last_message: Some(message),
    };
    state.conversations.push(conversation);
}
