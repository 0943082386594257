//! Capability contracts for everything the assistant relays rather than
//! computes: translation, field extraction, OCR verification, letter and
//! form generation, interview coaching, cost estimation, lawyer booking,
//! and outbound delivery.
//!
//! Implementations live at the service boundary and are injected into the
//! dispatcher at construction. The dispatcher treats every call as fallible
//! and bounds it with a timeout; retries, if any, belong to the
//! implementation's own contract.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::costs::ProcessingEstimate;
use super::domain::{
    ApplicantProfile, CountryCode, InterviewSession, LanguageCode, ProfileUpdate, UserId, VisaType,
};

/// Language detection and translation for inbound and outbound text.
#[async_trait]
pub trait LanguageServices: Send + Sync {
    /// Best-effort ISO 639-1 detection; implementations should prefer
    /// returning an error over guessing wildly, the dispatcher falls back
    /// to the default language.
    async fn detect(&self, text: &str) -> Result<LanguageCode, LanguageError>;

    async fn translate(&self, text: &str, target: LanguageCode) -> Result<String, LanguageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LanguageError {
    #[error("target language {0} is not supported")]
    UnsupportedLanguage(String),
    #[error("language service unavailable: {0}")]
    Unavailable(String),
}

/// Pulls structured profile fields out of free-text chat messages.
#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    /// Best-effort extraction; an empty update is a valid result.
    async fn extract(&self, message: &str) -> Result<ProfileUpdate, ExtractionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("extraction service unavailable: {0}")]
    Unavailable(String),
    #[error("extractor returned fields outside the profile schema: {0}")]
    UnknownFields(String),
}

/// Verdict from the document OCR/validation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVerification {
    pub is_valid: bool,
    /// Checklist name of the recognized document, e.g. "Valid Passport".
    pub document_type: String,
    pub message: String,
}

#[async_trait]
pub trait DocumentVerifier: Send + Sync {
    async fn verify(&self, payload: &str) -> Result<DocumentVerification, VerificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("document processing unavailable: {0}")]
    Unavailable(String),
    #[error("unreadable document payload")]
    UnreadablePayload,
}

/// Auto-filled application form keyed by the destination portal's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisaForm {
    pub visa_type: VisaType,
    pub fields: BTreeMap<String, String>,
}

/// Acknowledgement from an embassy portal submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalReceipt {
    pub accepted: bool,
    pub submission_id: Option<String>,
}

/// Cover-letter generation, form auto-fill, and portal submission.
#[async_trait]
pub trait ApplicationWriter: Send + Sync {
    async fn cover_letter(
        &self,
        profile: &ApplicantProfile,
        visa_type: VisaType,
        country: &CountryCode,
    ) -> Result<String, WriterError>;

    async fn fill_form(
        &self,
        profile: &ApplicantProfile,
        visa_type: VisaType,
    ) -> Result<VisaForm, WriterError>;

    async fn submit(&self, form: &VisaForm) -> Result<PortalReceipt, WriterError>;
}

#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error("no form template for visa type {0}")]
    MissingTemplate(String),
    #[error("generation service unavailable: {0}")]
    Unavailable(String),
    #[error("portal rejected the submission: {0}")]
    PortalRejected(String),
}

/// Structured feedback on one mock-interview answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewFeedback {
    /// 1–10 where available; generators may decline to rate.
    pub rating: Option<u8>,
    pub feedback: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Mock-interview session generation and answer evaluation.
#[async_trait]
pub trait InterviewCoach: Send + Sync {
    async fn open_session(
        &self,
        profile: &ApplicantProfile,
        visa_type: VisaType,
        country: &CountryCode,
    ) -> Result<InterviewSession, CoachError>;

    async fn evaluate(
        &self,
        session: &InterviewSession,
        answer: &str,
    ) -> Result<InterviewFeedback, CoachError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    #[error("interview service unavailable: {0}")]
    Unavailable(String),
}

/// Live processing-time estimation; the fee schedule itself is local.
#[async_trait]
pub trait CostEstimator: Send + Sync {
    async fn processing_time(
        &self,
        country: &CountryCode,
        visa_type: VisaType,
    ) -> Result<ProcessingEstimate, EstimateError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    #[error("estimation service unavailable: {0}")]
    Unavailable(String),
}

/// Confirmed consultation booking with an immigration lawyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub reference: String,
    pub lawyer_name: String,
    pub scheduled_for: chrono::DateTime<chrono::Utc>,
}

#[async_trait]
pub trait LawyerDesk: Send + Sync {
    async fn book(
        &self,
        profile: &ApplicantProfile,
        country: Option<&CountryCode>,
        request: &str,
    ) -> Result<BookingConfirmation, BookingError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("no lawyers available for {0}")]
    NoAvailability(String),
    #[error("booking service unavailable: {0}")]
    Unavailable(String),
}

/// Outbound best-effort delivery on the messaging channel. Used by the
/// boundary layer after the dispatcher produces a reply.
#[async_trait]
pub trait MessageDelivery: Send + Sync {
    async fn deliver(&self, user_id: &UserId, text: &str) -> Result<(), DeliveryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery transport unavailable: {0}")]
    Transport(String),
}
