use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    ContactDetails, ProviderCheck, Urgency, UserType, VerificationData, VerificationStatus,
    WorkingArea,
};

// -- JWT Claims --

/// JWT claims shared by tradelink-api (issuing + middleware) and
/// tradelink-client (which only carries the token).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

/// Profile attributes supplied at sign-up. The server turns them into the
/// `users` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileAttributes {
    pub name: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trades: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_area: Option<WorkingArea>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub profile: ProfileAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Returned by both sign-up and sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

// -- Leads and quotes --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateJobLeadRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub budget: String,
    pub urgency: Urgency,
    pub contact_details: ContactDetails,
    #[serde(default)]
    pub max_purchases: Option<u32>,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateQuoteRequest {
    pub project_title: String,
    pub project_description: String,
    pub category: String,
    pub location: String,
    pub budget: String,
    pub urgency: Urgency,
    pub contact_details: ContactDetails,
    #[serde(default)]
    pub max_responses: Option<u32>,
}

// -- Identity verification --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Passport,
    DrivingLicence,
    NationalId,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::DrivingLicence => "driving_licence",
            Self::NationalId => "national_id",
        }
    }

    /// Passports only have a photo page.
    pub fn needs_back_image(self) -> bool {
        !matches!(self, Self::Passport)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub address: String,
    pub postcode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub user_id: Uuid,
    pub document_type: DocumentType,
    pub front_image_base64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_image_base64: Option<String>,
    pub selfie_image_base64: String,
    pub personal_details: PersonalDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VerificationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationStatusResponse {
    pub status: Option<VerificationStatus>,
    pub verified: bool,
    pub data: Option<VerificationData>,
}

/// Callback body posted by the verification provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderWebhook {
    #[serde(default)]
    pub event: Option<ProviderEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub resource: Option<ProviderResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResource {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub checks: Vec<ProviderCheck>,
}

// -- Errors --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
