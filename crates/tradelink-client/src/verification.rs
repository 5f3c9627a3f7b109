//! Identity-verification submission: a step-by-step form that collects the
//! document, a selfie and personal details, then hands them to the gateway.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, warn};
use uuid::Uuid;

use tradelink_types::api::{DocumentType, PersonalDetails, VerificationRequest, VerificationResponse};

use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::session::Session;

const MISSING_IMAGES: &str = "Please upload all required images.";
const MISSING_DETAILS: &str = "Please fill in all required personal details.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerificationStep {
    #[default]
    DocumentType,
    UploadId,
    Selfie,
    PersonalDetails,
}

impl VerificationStep {
    fn next(self) -> Option<Self> {
        match self {
            Self::DocumentType => Some(Self::UploadId),
            Self::UploadId => Some(Self::Selfie),
            Self::Selfie => Some(Self::PersonalDetails),
            Self::PersonalDetails => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            Self::DocumentType => None,
            Self::UploadId => Some(Self::DocumentType),
            Self::Selfie => Some(Self::UploadId),
            Self::PersonalDetails => Some(Self::Selfie),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VerificationForm {
    pub document_type: Option<DocumentType>,
    pub front_image: Option<Vec<u8>>,
    pub back_image: Option<Vec<u8>>,
    pub selfie_image: Option<Vec<u8>>,
    pub full_name: String,
    pub date_of_birth: String,
    pub address: String,
    pub postcode: String,
    step: VerificationStep,
}

impl VerificationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> VerificationStep {
        self.step
    }

    /// Whether the current step has everything it needs.
    pub fn can_proceed(&self) -> bool {
        match self.step {
            VerificationStep::DocumentType => self.document_type.is_some(),
            VerificationStep::UploadId => self.has_document_images(),
            VerificationStep::Selfie => self.selfie_image.is_some(),
            VerificationStep::PersonalDetails => self.has_personal_details(),
        }
    }

    /// Move to the next step. The last step stays put.
    pub fn next(&mut self) -> Result<VerificationStep, ClientError> {
        if !self.can_proceed() {
            return Err(ClientError::Validation(self.step_error().into()));
        }
        if let Some(step) = self.step.next() {
            self.step = step;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> VerificationStep {
        if let Some(step) = self.step.previous() {
            self.step = step;
        }
        self.step
    }

    fn step_error(&self) -> &'static str {
        match self.step {
            VerificationStep::DocumentType => "Please choose a document type.",
            VerificationStep::UploadId | VerificationStep::Selfie => MISSING_IMAGES,
            VerificationStep::PersonalDetails => MISSING_DETAILS,
        }
    }

    fn has_document_images(&self) -> bool {
        let Some(doc) = self.document_type else {
            return false;
        };
        self.front_image.is_some() && (!doc.needs_back_image() || self.back_image.is_some())
    }

    fn has_personal_details(&self) -> bool {
        [&self.full_name, &self.date_of_birth, &self.address, &self.postcode]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// Check the whole form regardless of the current step.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.document_type.is_none() {
            return Err(ClientError::Validation("Please choose a document type.".into()));
        }
        if !self.has_document_images() || self.selfie_image.is_none() {
            return Err(ClientError::Validation(MISSING_IMAGES.into()));
        }
        if !self.has_personal_details() {
            return Err(ClientError::Validation(MISSING_DETAILS.into()));
        }
        Ok(())
    }

    /// First word is the first name, everything after it the last name.
    pub fn split_name(&self) -> (String, String) {
        let mut words = self.full_name.split_whitespace();
        let first = words.next().unwrap_or_default().to_string();
        let last = words.collect::<Vec<_>>().join(" ");
        (first, last)
    }

    pub fn build_request(&self, user_id: Uuid) -> Result<VerificationRequest, ClientError> {
        self.validate()?;
        let (first_name, last_name) = self.split_name();
        let encode = |bytes: &Option<Vec<u8>>| bytes.as_ref().map(|b| STANDARD.encode(b));

        // validate() guarantees the required images are present.
        let missing = || ClientError::Validation(MISSING_IMAGES.into());
        let document_type = self.document_type.ok_or_else(missing)?;
        let back_image_base64 = if document_type.needs_back_image() {
            encode(&self.back_image)
        } else {
            None
        };

        Ok(VerificationRequest {
            user_id,
            document_type,
            front_image_base64: encode(&self.front_image).ok_or_else(missing)?,
            back_image_base64,
            selfie_image_base64: encode(&self.selfie_image).ok_or_else(missing)?,
            personal_details: PersonalDetails {
                first_name,
                last_name,
                date_of_birth: self.date_of_birth.trim().to_string(),
                address: self.address.trim().to_string(),
                postcode: self.postcode.trim().to_string(),
            },
        })
    }

    /// Submit for `user_id` and refresh that user's profile on success.
    pub async fn submit<G: Gateway>(
        &self,
        session: &Session<G>,
        user_id: Uuid,
    ) -> Result<VerificationResponse, ClientError> {
        let request = self.build_request(user_id)?;
        let response = session.gateway().invoke_verification(&request).await?;
        if !response.success {
            let reason = response
                .error
                .unwrap_or_else(|| "Verification submission failed. Please try again.".into());
            warn!("Verification for {} rejected: {}", user_id, reason);
            return Err(ClientError::Backend(reason));
        }

        info!(
            "Verification submitted for {} (session {:?})",
            user_id, response.session_id
        );
        session.refresh_user(user_id).await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use tradelink_core::Store;
    use tradelink_types::api::ProfileAttributes;
    use tradelink_types::events::AuthEvent;
    use tradelink_types::models::{UserType, VerificationStatus};

    use super::*;
    use crate::session::ReadBackPolicy;
    use crate::testing::MockGateway;

    fn complete_form(document_type: DocumentType) -> VerificationForm {
        VerificationForm {
            document_type: Some(document_type),
            front_image: Some(b"front".to_vec()),
            back_image: Some(b"back".to_vec()),
            selfie_image: Some(b"selfie".to_vec()),
            full_name: "Alex van der Berg".into(),
            date_of_birth: "1988-04-12".into(),
            address: "1 High Street, London".into(),
            postcode: "N1 1AA".into(),
            ..Default::default()
        }
    }

    fn session_with_user() -> (Session<MockGateway>, Uuid) {
        let gateway = MockGateway::default();
        let id = gateway.register(
            "alex@example.com",
            "correct-horse",
            ProfileAttributes {
                name: "Alex van der Berg".into(),
                user_type: UserType::Tradesperson,
                location: None,
                trades: vec!["Plumber".into()],
                working_area: None,
            },
        );
        (Session::new(gateway, Store::default(), ReadBackPolicy::default()), id)
    }

    #[test]
    fn steps_gate_on_their_inputs() {
        let mut form = VerificationForm::new();
        assert!(matches!(form.next(), Err(ClientError::Validation(_))));

        form.document_type = Some(DocumentType::DrivingLicence);
        assert_eq!(form.next().unwrap(), VerificationStep::UploadId);

        form.front_image = Some(vec![1]);
        assert!(!form.can_proceed());
        form.back_image = Some(vec![2]);
        assert_eq!(form.next().unwrap(), VerificationStep::Selfie);

        let err = form.next().unwrap_err();
        assert_eq!(err.to_string(), MISSING_IMAGES);
        form.selfie_image = Some(vec![3]);
        assert_eq!(form.next().unwrap(), VerificationStep::PersonalDetails);

        assert!(!form.can_proceed());
        assert_eq!(form.back(), VerificationStep::Selfie);
        assert_eq!(form.back(), VerificationStep::UploadId);
    }

    #[test]
    fn passport_needs_no_back_image() {
        let mut form = complete_form(DocumentType::Passport);
        form.back_image = None;
        form.validate().unwrap();

        let request = form.build_request(Uuid::new_v4()).unwrap();
        assert_eq!(request.back_image_base64, None);
        assert_eq!(request.front_image_base64, STANDARD.encode(b"front"));

        form.document_type = Some(DocumentType::NationalId);
        assert_eq!(form.validate().unwrap_err().to_string(), MISSING_IMAGES);
    }

    #[test]
    fn full_name_splits_on_the_first_word() {
        let form = complete_form(DocumentType::Passport);
        assert_eq!(form.split_name(), ("Alex".into(), "van der Berg".into()));

        let single = VerificationForm {
            full_name: "  Cher ".into(),
            ..Default::default()
        };
        assert_eq!(single.split_name(), ("Cher".into(), String::new()));
    }

    #[tokio::test]
    async fn submit_refreshes_the_user() {
        let (session, id) = session_with_user();
        let mut events = session.on_auth_state_change();

        let response = complete_form(DocumentType::DrivingLicence)
            .submit(&session, id)
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.status, Some(VerificationStatus::Pending));

        let sent = session.gateway().verification_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].personal_details.last_name, "van der Berg");
        assert_eq!(sent[0].back_image_base64, Some(STANDARD.encode(b"back")));

        let current = session.store().snapshot().current_user.unwrap();
        assert_eq!(current.id, id);
        assert_eq!(current.verification_status, Some(VerificationStatus::Pending));
        assert_eq!(events.recv().await.unwrap(), AuthEvent::UserUpdated { user_id: id });
    }

    #[tokio::test]
    async fn invalid_forms_never_reach_the_gateway() {
        let (session, id) = session_with_user();
        let mut form = complete_form(DocumentType::Passport);
        form.postcode = " ".into();

        let err = form.submit(&session, id).await.unwrap_err();
        assert_eq!(err.to_string(), MISSING_DETAILS);
        assert_eq!(session.gateway().calls(), 0);
    }

    #[tokio::test]
    async fn provider_failure_leaves_the_store_alone() {
        let (session, id) = session_with_user();
        session.gateway().fail_verification("provider unavailable");

        let err = complete_form(DocumentType::Passport)
            .submit(&session, id)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Backend(ref m) if m == "provider unavailable"));
        assert!(session.store().snapshot().current_user.is_none());
    }
}
