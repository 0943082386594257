//! Staged WhatsApp conversation handling: session state, stage dispatch,
//! eligibility scoring, document checklists, and the fee schedule.

pub mod checklist;
pub mod collaborators;
pub mod costs;
pub mod domain;
pub mod eligibility;
mod reply;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use checklist::{generate as generate_checklist, DocumentChecklist};
pub use collaborators::{
    ApplicationWriter, BookingConfirmation, CostEstimator, DocumentVerification, DocumentVerifier,
    InterviewCoach, InterviewFeedback, LanguageServices, LawyerDesk, MessageDelivery,
    PortalReceipt, ProfileExtractor, VisaForm,
};
pub use costs::{estimate as estimate_costs, FeeCategory, ProcessingEstimate, VisaCostEstimate};
pub use domain::{
    ApplicantProfile, ConversationStage, ConversationState, CountryCode, EducationLevel,
    InterviewSession, LanguageCode, ProfileField, ProfileUpdate, SelectionTier, UserId, VisaType,
};
pub use eligibility::{score, CountryRequirements, EligibilityError, ScoreBreakdown, ScoreResult};
pub use router::conversation_router;
pub use service::{Collaborators, ConversationService, TurnError};
pub use store::{SessionLease, SessionPolicy, SessionStore};
