//! Database row types. These map directly to SQLite rows; JSON columns stay
//! as text until converted into tradelink-types models.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use tradelink_types::models::{
    AccountStatus, JobLead, MembershipType, QuoteRequest, Urgency, User, UserType,
    VerificationStatus,
};

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub user_type: String,
    pub avatar: Option<String>,
    pub location: Option<String>,
    pub trades: String,
    pub rating: Option<f64>,
    pub reviews: Option<i64>,
    pub verified: Option<bool>,
    pub credits: Option<f64>,
    pub membership_type: Option<String>,
    pub membership_expiry: Option<String>,
    pub verification_status: Option<String>,
    pub verification_data: Option<String>,
    pub account_status: String,
    pub parked_date: Option<String>,
    pub reactivated_date: Option<String>,
    pub working_area: Option<String>,
    pub created_at: String,
}

pub struct CredentialRow {
    pub user_id: String,
    pub email: String,
    pub password: String,
}

pub struct JobLeadRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub budget: String,
    pub urgency: String,
    pub posted_by: String,
    pub posted_date: String,
    pub contact_details: String,
    pub purchased_by: String,
    pub max_purchases: i64,
    pub price: f64,
    pub interests: String,
    pub is_active: bool,
}

pub struct QuoteRequestRow {
    pub id: String,
    pub homeowner_id: String,
    pub homeowner_name: String,
    pub project_title: String,
    pub project_description: String,
    pub category: String,
    pub location: String,
    pub budget: String,
    pub urgency: String,
    pub contact_details: String,
    pub responses: String,
    pub max_responses: i64,
    pub created_at: String,
}

/// Parse either an RFC 3339 timestamp or SQLite's `datetime('now')` format,
/// which has no timezone and is UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .with_context(|| format!("invalid timestamp '{}'", s))
}

fn parse_opt_timestamp(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    s.map(parse_timestamp).transpose()
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    s.parse().with_context(|| format!("invalid id '{}'", s))
}

fn parse_urgency(s: &str) -> Result<Urgency> {
    Urgency::parse(s).ok_or_else(|| anyhow!("invalid urgency '{}'", s))
}

impl UserRow {
    pub fn into_user(self) -> Result<User> {
        let user_type = match self.user_type.as_str() {
            "homeowner" => UserType::Homeowner,
            "tradesperson" => UserType::Tradesperson,
            other => return Err(anyhow!("invalid user type '{}' on user {}", other, self.id)),
        };

        Ok(User {
            id: parse_uuid(&self.id)?,
            name: self.name,
            email: self.email,
            user_type,
            avatar: self.avatar,
            location: self.location,
            trades: serde_json::from_str(&self.trades).context("trades column")?,
            rating: self.rating,
            reviews: self.reviews.map(|r| r.max(0) as u32),
            verified: self.verified,
            credits: self.credits,
            membership_type: self.membership_type.as_deref().and_then(MembershipType::parse),
            membership_expiry: parse_opt_timestamp(self.membership_expiry.as_deref())?,
            verification_status: self
                .verification_status
                .as_deref()
                .and_then(VerificationStatus::parse),
            verification_data: self
                .verification_data
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .context("verification_data column")?,
            account_status: AccountStatus::parse(&self.account_status),
            parked_date: parse_opt_timestamp(self.parked_date.as_deref())?,
            reactivated_date: parse_opt_timestamp(self.reactivated_date.as_deref())?,
            working_area: self
                .working_area
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .context("working_area column")?,
        })
    }
}

impl JobLeadRow {
    pub fn into_lead(self) -> Result<JobLead> {
        Ok(JobLead {
            id: parse_uuid(&self.id)?,
            title: self.title,
            description: self.description,
            category: self.category,
            location: self.location,
            budget: self.budget,
            urgency: parse_urgency(&self.urgency)?,
            posted_by: parse_uuid(&self.posted_by)?,
            posted_date: parse_timestamp(&self.posted_date)?,
            contact_details: serde_json::from_str(&self.contact_details)
                .context("contact_details column")?,
            purchased_by: serde_json::from_str(&self.purchased_by).context("purchased_by column")?,
            max_purchases: self.max_purchases.max(0) as u32,
            price: self.price,
            is_active: self.is_active,
            interests: serde_json::from_str(&self.interests).context("interests column")?,
            hired_tradesperson: None,
            dismissed_by: None,
        })
    }
}

impl QuoteRequestRow {
    pub fn into_quote(self) -> Result<QuoteRequest> {
        Ok(QuoteRequest {
            id: parse_uuid(&self.id)?,
            homeowner_id: parse_uuid(&self.homeowner_id)?,
            homeowner_name: self.homeowner_name,
            project_title: self.project_title,
            project_description: self.project_description,
            category: self.category,
            location: self.location,
            budget: self.budget,
            urgency: parse_urgency(&self.urgency)?,
            contact_details: serde_json::from_str(&self.contact_details)
                .context("contact_details column")?,
            responses: serde_json::from_str(&self.responses).context("responses column")?,
            max_responses: self.max_responses.max(0) as u32,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_timestamp_formats() {
        let a = parse_timestamp("2024-01-15T10:00:00Z").unwrap();
        let b = parse_timestamp("2024-01-15 10:00:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_timestamp("yesterday").is_err());
    }
}
