use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Enumerations --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Homeowner,
    Tradesperson,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Homeowner => "homeowner",
            Self::Tradesperson => "tradesperson",
        }
    }
}

/// Membership tier. Governs the lead-purchase discount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipType {
    #[default]
    None,
    Basic,
    Premium,
    #[serde(rename = "unlimited_5_year")]
    Unlimited5Year,
}

impl MembershipType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::Premium => "premium",
            Self::Unlimited5Year => "unlimited_5_year",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "basic" => Some(Self::Basic),
            "premium" => Some(Self::Premium),
            "unlimited_5_year" => Some(Self::Unlimited5Year),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Account lifecycle status.
///
/// `Deleted` is only ever read from the backend. In memory a deleted account
/// is represented by its absence from the user collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Parked,
    Deleted,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Parked => "parked",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "parked" => Some(Self::Parked),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestStatus {
    #[default]
    Pending,
    Accepted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteResponseStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

// -- Structured payloads --

/// Contact details unlocked by purchasing a lead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Area a tradesperson is willing to travel to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingArea {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_miles: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub postcodes: Vec<String>,
}

/// One provider check result, e.g. `DOCUMENT_AUTHENTICITY: PASS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCheck {
    #[serde(rename = "type")]
    pub check_type: String,
    pub result: String,
}

/// Persisted identity-verification bookkeeping.
///
/// Written at submission time and merged into when the provider calls back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    /// SHA-256 over the submitted images. The images themselves are not kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub webhook_checks: Vec<ProviderCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

// -- Entities --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    // Tradesperson-only fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trades: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_type: Option<MembershipType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_expiry: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<VerificationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_data: Option<VerificationData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_status: Option<AccountStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parked_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactivated_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_area: Option<WorkingArea>,
}

impl User {
    /// A bare profile with no tradesperson fields set.
    pub fn new(id: Uuid, name: impl Into<String>, email: impl Into<String>, user_type: UserType) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            user_type,
            avatar: None,
            location: None,
            trades: Vec::new(),
            rating: None,
            reviews: None,
            verified: None,
            credits: None,
            membership_type: None,
            membership_expiry: None,
            verification_status: None,
            verification_data: None,
            account_status: None,
            parked_date: None,
            reactivated_date: None,
            working_area: None,
        }
    }

    pub fn is_homeowner(&self) -> bool {
        self.user_type == UserType::Homeowner
    }

    pub fn is_tradesperson(&self) -> bool {
        self.user_type == UserType::Tradesperson
    }

    /// Unset membership reads as `none`.
    pub fn membership(&self) -> MembershipType {
        self.membership_type.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    pub id: Uuid,
    pub tradesperson_id: Uuid,
    pub tradesperson_name: String,
    pub message: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub status: InterestStatus,
    /// Credit cost charged to the tradesperson on acceptance.
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobLead {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    /// Free text, e.g. "£200 - £500".
    pub budget: String,
    pub urgency: Urgency,
    pub posted_by: Uuid,
    pub posted_date: DateTime<Utc>,
    pub contact_details: ContactDetails,
    /// Purchase order. The same user may appear more than once.
    #[serde(default)]
    pub purchased_by: Vec<Uuid>,
    pub max_purchases: u32,
    pub price: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub interests: Vec<Interest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hired_tradesperson: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissed_by: Option<Vec<Uuid>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub id: Uuid,
    pub tradesperson_id: Uuid,
    pub tradesperson_name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<String>,
    pub paid_amount: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: QuoteResponseStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub id: Uuid,
    pub homeowner_id: Uuid,
    pub homeowner_name: String,
    pub project_title: String,
    pub project_description: String,
    pub category: String,
    pub location: String,
    pub budget: String,
    pub urgency: Urgency,
    pub contact_details: ContactDetails,
    #[serde(default)]
    pub responses: Vec<QuoteResponse>,
    pub max_responses: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub job_id: Uuid,
    pub tradesperson_id: Uuid,
    pub homeowner_id: Uuid,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Messages are immutable apart from the `read` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// Thread scoped to one (job, homeowner, tradesperson) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub homeowner_id: Uuid,
    pub tradesperson_id: Uuid,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub unread_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
}

impl Conversation {
    pub fn matches(&self, job_id: Uuid, homeowner_id: Uuid, tradesperson_id: Uuid) -> bool {
        self.job_id == job_id && self.homeowner_id == homeowner_id && self.tradesperson_id == tradesperson_id
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.homeowner_id == user_id || self.tradesperson_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_wire_names() {
        let json = serde_json::to_string(&MembershipType::Unlimited5Year).unwrap();
        assert_eq!(json, "\"unlimited_5_year\"");
        assert_eq!(MembershipType::parse("premium"), Some(MembershipType::Premium));
        assert_eq!(MembershipType::parse("gold"), None);
    }

    #[test]
    fn user_type_field_is_named_type() {
        let user = User::new(Uuid::nil(), "Sarah", "sarah@example.com", UserType::Homeowner);
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["type"], "homeowner");
        assert!(value.get("credits").is_none());
    }

    #[test]
    fn unset_membership_reads_as_none() {
        let user = User::new(Uuid::nil(), "Mike", "mike@example.com", UserType::Tradesperson);
        assert_eq!(user.membership(), MembershipType::None);
    }

    #[test]
    fn lead_defaults_to_active() {
        let json = serde_json::json!({
            "id": Uuid::nil(),
            "title": "Fix tap",
            "description": "Dripping tap",
            "category": "Plumbing",
            "location": "Leeds",
            "budget": "£50",
            "urgency": "Low",
            "posted_by": Uuid::nil(),
            "posted_date": "2024-01-15T00:00:00Z",
            "contact_details": { "name": "A", "email": "a@example.com" },
            "max_purchases": 6,
            "price": 9.99
        });
        let lead: JobLead = serde_json::from_value(json).unwrap();
        assert!(lead.is_active);
        assert!(lead.purchased_by.is_empty());
        assert!(lead.dismissed_by.is_none());
    }
}
