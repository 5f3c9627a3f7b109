//! Demo data used when no backend is configured.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use tradelink_types::models::{
    ContactDetails, Interest, InterestStatus, JobLead, MembershipType, Urgency, User, UserType,
};

use crate::pricing::BASE_LEAD_PRICE;
use crate::state::AppState;

pub const HOMEOWNER_SARAH: Uuid = Uuid::from_u128(0x1001);
pub const HOMEOWNER_DAVID: Uuid = Uuid::from_u128(0x1002);
pub const HOMEOWNER_EMMA: Uuid = Uuid::from_u128(0x1003);
pub const TRADE_ALEX: Uuid = Uuid::from_u128(0x2001);
pub const TRADE_MAYA: Uuid = Uuid::from_u128(0x2002);
pub const TRADE_MIKE: Uuid = Uuid::from_u128(0x2003);

pub const LEAD_KITCHEN: Uuid = Uuid::from_u128(0x3001);
pub const LEAD_PLUMBING: Uuid = Uuid::from_u128(0x3002);
pub const LEAD_GARDEN: Uuid = Uuid::from_u128(0x3003);

const MAX_PURCHASES: u32 = 6;

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn homeowner(id: Uuid, name: &str, email: &str, location: &str) -> User {
    let mut user = User::new(id, name, email, UserType::Homeowner);
    user.location = Some(location.to_string());
    user
}

#[allow(clippy::too_many_arguments)]
fn tradesperson(
    id: Uuid,
    name: &str,
    email: &str,
    trades: &[&str],
    rating: f64,
    reviews: u32,
    credits: f64,
    membership: MembershipType,
    expiry: Option<DateTime<Utc>>,
) -> User {
    let mut user = User::new(id, name, email, UserType::Tradesperson);
    user.trades = trades.iter().map(|t| t.to_string()).collect();
    user.rating = Some(rating);
    user.reviews = Some(reviews);
    user.verified = Some(true);
    user.credits = Some(credits);
    user.membership_type = Some(membership);
    user.membership_expiry = expiry;
    user
}

#[allow(clippy::too_many_arguments)]
fn lead(
    id: Uuid,
    title: &str,
    description: &str,
    category: &str,
    location: &str,
    budget: &str,
    urgency: Urgency,
    posted_by: Uuid,
    posted: DateTime<Utc>,
    contact: (&str, &str, &str),
) -> JobLead {
    JobLead {
        id,
        title: title.into(),
        description: description.into(),
        category: category.into(),
        location: location.into(),
        budget: budget.into(),
        urgency,
        posted_by,
        posted_date: posted,
        contact_details: ContactDetails {
            name: contact.0.into(),
            email: contact.1.into(),
            phone: Some(contact.2.into()),
        },
        purchased_by: Vec::new(),
        max_purchases: MAX_PURCHASES,
        price: BASE_LEAD_PRICE,
        is_active: true,
        interests: Vec::new(),
        hired_tradesperson: None,
        dismissed_by: None,
    }
}

pub fn demo_users() -> Vec<User> {
    vec![
        homeowner(HOMEOWNER_SARAH, "Sarah Johnson", "sarah.j@email.com", "North London"),
        homeowner(HOMEOWNER_DAVID, "David Chen", "david.chen@email.com", "Central London"),
        homeowner(HOMEOWNER_EMMA, "Emma Thompson", "emma.t@email.com", "West London"),
        tradesperson(
            TRADE_ALEX,
            "Alex Thompson",
            "alex.t@email.com",
            &["Plumber", "Heating Engineer"],
            4.9,
            142,
            25.50,
            MembershipType::Basic,
            Some(day(2024, 12, 31)),
        ),
        tradesperson(
            TRADE_MAYA,
            "Maya Patel",
            "maya.p@email.com",
            &["Electrician"],
            4.8,
            108,
            45.75,
            MembershipType::Premium,
            Some(day(2024, 11, 30)),
        ),
        tradesperson(
            TRADE_MIKE,
            "Mike Wilson",
            "mike.w@email.com",
            &["Builder", "General Contractor"],
            4.7,
            89,
            15.25,
            MembershipType::None,
            None,
        ),
    ]
}

pub fn demo_leads() -> Vec<JobLead> {
    let mut kitchen = lead(
        LEAD_KITCHEN,
        "Kitchen Renovation - Full Remodel",
        "Looking for a skilled professional to completely renovate our kitchen. Includes new cabinets, countertops, flooring, and appliances. Modern design preferred.",
        "Construction",
        "North London",
        "£15,000 - £25,000",
        Urgency::Medium,
        HOMEOWNER_SARAH,
        day(2024, 1, 15),
        ("Sarah Johnson", "sarah.j@email.com", "07700 900123"),
    );
    kitchen.purchased_by = vec![TRADE_ALEX, TRADE_MAYA];
    kitchen.interests.push(Interest {
        id: Uuid::from_u128(0x4001),
        tradesperson_id: TRADE_MIKE,
        tradesperson_name: "Mike Wilson".into(),
        message: "I have 15 years experience in kitchen renovations and would love to discuss your project.".into(),
        date: day(2024, 1, 16),
        status: InterestStatus::Accepted,
        price: 5.99,
    });

    let plumbing = lead(
        LEAD_PLUMBING,
        "Emergency Plumbing - Burst Pipe",
        "Urgent! Burst pipe in bathroom causing water damage. Need immediate professional assistance.",
        "Plumbing",
        "Central London",
        "£200 - £500",
        Urgency::High,
        HOMEOWNER_DAVID,
        day(2024, 1, 16),
        ("David Chen", "david.chen@email.com", "07700 900456"),
    );

    let mut garden = lead(
        LEAD_GARDEN,
        "Garden Landscaping Project",
        "Transform our back garden with new patio, flower beds, and lawn. Looking for creative landscaping ideas.",
        "Landscaping",
        "West London",
        "£5,000 - £8,000",
        Urgency::Low,
        HOMEOWNER_EMMA,
        day(2024, 1, 14),
        ("Emma Thompson", "emma.t@email.com", "07700 900789"),
    );
    garden.purchased_by = vec![TRADE_ALEX];

    vec![kitchen, plumbing, garden]
}

/// Initial state with the demo users and leads loaded.
pub fn demo_state() -> AppState {
    AppState {
        users: demo_users(),
        job_leads: demo_leads(),
        ..AppState::default()
    }
}
