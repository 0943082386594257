use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeZone;

use crate::conversation::collaborators::{
    ApplicationWriter, BookingConfirmation, BookingError, CoachError, CostEstimator,
    DocumentVerification, DocumentVerifier, EstimateError, ExtractionError, InterviewCoach,
    InterviewFeedback, LanguageError, LanguageServices, LawyerDesk, PortalReceipt,
    ProfileExtractor, VerificationError, VisaForm, WriterError,
};
use crate::conversation::costs::ProcessingEstimate;
use crate::conversation::domain::{
    ApplicantProfile, CountryCode, EducationLevel, InterviewSession, LanguageCode, ProfileUpdate,
    UserId, VisaType,
};
use crate::conversation::service::{Collaborators, ConversationService};
use crate::conversation::store::{SessionPolicy, SessionStore};

pub(super) fn user() -> UserId {
    UserId("+15551230001".to_string())
}

pub(super) fn canada() -> CountryCode {
    CountryCode::new("canada")
}

/// The reference applicant: scores 64 for Canada, mid band, first route
/// express-entry.
pub(super) fn complete_profile() -> ApplicantProfile {
    ApplicantProfile {
        age: Some(30),
        education: Some(EducationLevel::Bachelor),
        work_experience_years: Some(5),
        preferred_country: Some(canada()),
        financial_capacity: Some(15_000),
        visa_type: None,
        verified_documents: Default::default(),
    }
}

pub(super) fn complete_update() -> ProfileUpdate {
    ProfileUpdate {
        age: Some(30),
        education: Some(EducationLevel::Bachelor),
        work_experience_years: Some(5),
        preferred_country: Some(canada()),
        financial_capacity: Some(15_000),
    }
}

/// Detection keys off a leading inverted exclamation mark so tests can send
/// "Spanish" inbound text; translation tags the text when enabled and fails
/// when not, exercising the untranslated fallback.
pub(super) struct StubLanguage {
    pub(super) translate_ok: bool,
}

impl Default for StubLanguage {
    fn default() -> Self {
        Self { translate_ok: true }
    }
}

#[async_trait]
impl LanguageServices for StubLanguage {
    async fn detect(&self, text: &str) -> Result<LanguageCode, LanguageError> {
        if text.starts_with('¡') || text.starts_with('¿') {
            Ok(LanguageCode::Es)
        } else {
            Ok(LanguageCode::En)
        }
    }

    async fn translate(&self, text: &str, target: LanguageCode) -> Result<String, LanguageError> {
        if self.translate_ok {
            Ok(format!("[{}] {text}", target.code()))
        } else {
            Err(LanguageError::Unavailable("translator offline".to_string()))
        }
    }
}

/// Pops one scripted update per turn; an exhausted script extracts nothing.
#[derive(Default)]
pub(super) struct ScriptedExtractor {
    updates: Mutex<VecDeque<ProfileUpdate>>,
}

impl ScriptedExtractor {
    pub(super) fn with(updates: Vec<ProfileUpdate>) -> Self {
        Self {
            updates: Mutex::new(updates.into()),
        }
    }
}

#[async_trait]
impl ProfileExtractor for ScriptedExtractor {
    async fn extract(&self, _message: &str) -> Result<ProfileUpdate, ExtractionError> {
        let mut updates = self.updates.lock().expect("script mutex poisoned");
        Ok(updates.pop_front().unwrap_or_default())
    }
}

pub(super) struct FailingExtractor;

#[async_trait]
impl ProfileExtractor for FailingExtractor {
    async fn extract(&self, _message: &str) -> Result<ProfileUpdate, ExtractionError> {
        Err(ExtractionError::Unavailable("model offline".to_string()))
    }
}

/// Treats the whole message as the name of a valid document.
pub(super) struct EchoVerifier;

#[async_trait]
impl DocumentVerifier for EchoVerifier {
    async fn verify(&self, payload: &str) -> Result<DocumentVerification, VerificationError> {
        Ok(DocumentVerification {
            is_valid: true,
            document_type: payload.trim().to_string(),
            message: "Document verification successful! ✅".to_string(),
        })
    }
}

#[derive(Default)]
pub(super) struct RecordingWriter {
    pub(super) submitted: Mutex<Vec<VisaForm>>,
}

#[async_trait]
impl ApplicationWriter for RecordingWriter {
    async fn cover_letter(
        &self,
        _profile: &ApplicantProfile,
        visa_type: VisaType,
        country: &CountryCode,
    ) -> Result<String, WriterError> {
        Ok(format!(
            "Dear Visa Officer, please consider my {} application to {country}.",
            visa_type.slug()
        ))
    }

    async fn fill_form(
        &self,
        profile: &ApplicantProfile,
        visa_type: VisaType,
    ) -> Result<VisaForm, WriterError> {
        let mut fields = BTreeMap::new();
        if let Some(age) = profile.age {
            fields.insert("age".to_string(), age.to_string());
        }
        Ok(VisaForm { visa_type, fields })
    }

    async fn submit(&self, form: &VisaForm) -> Result<PortalReceipt, WriterError> {
        self.submitted
            .lock()
            .expect("form mutex poisoned")
            .push(form.clone());
        Ok(PortalReceipt {
            accepted: true,
            submission_id: Some("sub-0001".to_string()),
        })
    }
}

pub(super) struct FailingWriter;

#[async_trait]
impl ApplicationWriter for FailingWriter {
    async fn cover_letter(
        &self,
        _profile: &ApplicantProfile,
        _visa_type: VisaType,
        _country: &CountryCode,
    ) -> Result<String, WriterError> {
        Err(WriterError::Unavailable("generator offline".to_string()))
    }

    async fn fill_form(
        &self,
        _profile: &ApplicantProfile,
        _visa_type: VisaType,
    ) -> Result<VisaForm, WriterError> {
        Err(WriterError::Unavailable("generator offline".to_string()))
    }

    async fn submit(&self, _form: &VisaForm) -> Result<PortalReceipt, WriterError> {
        Err(WriterError::Unavailable("generator offline".to_string()))
    }
}

pub(super) struct StaticCoach;

#[async_trait]
impl InterviewCoach for StaticCoach {
    async fn open_session(
        &self,
        _profile: &ApplicantProfile,
        visa_type: VisaType,
        country: &CountryCode,
    ) -> Result<InterviewSession, CoachError> {
        Ok(InterviewSession {
            session_id: "mock-001".to_string(),
            questions: vec![
                format!("Why did you choose {country}?"),
                format!("How does a {} route fit your plans?", visa_type.slug()),
            ],
            instructions: "Please respond to each question clearly and concisely.".to_string(),
        })
    }

    async fn evaluate(
        &self,
        _session: &InterviewSession,
        _answer: &str,
    ) -> Result<InterviewFeedback, CoachError> {
        Ok(InterviewFeedback {
            rating: Some(7),
            feedback: vec!["Clear and relevant.".to_string()],
            suggestions: vec!["Mention your savings plan.".to_string()],
        })
    }
}

pub(super) struct StaticEstimator;

#[async_trait]
impl CostEstimator for StaticEstimator {
    async fn processing_time(
        &self,
        _country: &CountryCode,
        _visa_type: VisaType,
    ) -> Result<ProcessingEstimate, EstimateError> {
        Ok(ProcessingEstimate::with_weeks(6))
    }
}

pub(super) struct StaticDesk;

#[async_trait]
impl LawyerDesk for StaticDesk {
    async fn book(
        &self,
        _profile: &ApplicantProfile,
        _country: Option<&CountryCode>,
        _request: &str,
    ) -> Result<BookingConfirmation, BookingError> {
        Ok(BookingConfirmation {
            reference: "bk-0001".to_string(),
            lawyer_name: "A. Counsel".to_string(),
            scheduled_for: chrono::Utc
                .with_ymd_and_hms(2026, 9, 1, 10, 0, 0)
                .single()
                .expect("valid booking slot"),
        })
    }
}

pub(super) fn collaborators(extractor: Arc<dyn ProfileExtractor>) -> Collaborators {
    Collaborators {
        language: Arc::new(StubLanguage::default()),
        extractor,
        documents: Arc::new(EchoVerifier),
        applications: Arc::new(RecordingWriter::default()),
        interviews: Arc::new(StaticCoach),
        costs: Arc::new(StaticEstimator),
        lawyers: Arc::new(StaticDesk),
    }
}

pub(super) fn service_with(collaborators: Collaborators) -> ConversationService {
    let store = Arc::new(SessionStore::new(SessionPolicy::default()));
    ConversationService::new(store, collaborators, Duration::from_secs(5))
}

pub(super) fn scripted_service(updates: Vec<ProfileUpdate>) -> ConversationService {
    service_with(collaborators(Arc::new(ScriptedExtractor::with(updates))))
}
