use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use super::checklist;
use super::collaborators::{
    ApplicationWriter, BookingError, CoachError, CostEstimator, DocumentVerifier, EstimateError,
    ExtractionError, InterviewCoach, LanguageServices, LawyerDesk, ProfileExtractor,
    VerificationError, WriterError,
};
use super::costs::{self, ProcessingEstimate};
use super::domain::{ConversationStage, ConversationState, CountryCode, LanguageCode, UserId, VisaType};
use super::eligibility::{self, EligibilityError};
use super::reply;
use super::store::SessionStore;

/// External capabilities the dispatcher depends on, injected at
/// construction so nothing in the conversation core is process-global.
pub struct Collaborators {
    pub language: Arc<dyn LanguageServices>,
    pub extractor: Arc<dyn ProfileExtractor>,
    pub documents: Arc<dyn DocumentVerifier>,
    pub applications: Arc<dyn ApplicationWriter>,
    pub interviews: Arc<dyn InterviewCoach>,
    pub costs: Arc<dyn CostEstimator>,
    pub lawyers: Arc<dyn LawyerDesk>,
}

/// Error raised inside a single conversation turn. Never shown to the user;
/// the dispatcher logs it and falls back to a generic apology.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error(transparent)]
    Writer(#[from] WriterError),
    #[error(transparent)]
    Coach(#[from] CoachError),
    #[error(transparent)]
    Estimate(#[from] EstimateError),
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error("collaborator call '{0}' timed out")]
    Timeout(&'static str),
    #[error("conversation state is missing {0}")]
    StateIncomplete(&'static str),
}

/// The staged conversation dispatcher.
///
/// One call to [`ConversationService::handle_message`] is one turn: load the
/// session, re-detect language, run the current stage's handler, localize the
/// reply, and commit. A failed turn is logged, answered with an apology, and
/// left uncommitted so the next turn retries from the last good state.
pub struct ConversationService {
    store: Arc<SessionStore>,
    collaborators: Collaborators,
    call_timeout: Duration,
}

impl ConversationService {
    pub fn new(
        store: Arc<SessionStore>,
        collaborators: Collaborators,
        call_timeout: Duration,
    ) -> Self {
        Self {
            store,
            collaborators,
            call_timeout,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Sole entry point for the boundary layer. Always yields a
    /// chat-appropriate reply, even in failure.
    pub async fn handle_message(&self, message: &str, user_id: &UserId) -> String {
        let mut lease = self.store.begin(user_id).await;

        lease.state.language = self.detect_language(message).await;

        let stage = lease.state.stage;
        match self.dispatch(message, &mut lease.state).await {
            Ok(text) => {
                let text = self.localize(text, lease.state.language).await;
                debug!(user = %user_id, stage_before = stage.label(), stage_after = lease.state.stage.label(), "turn committed");
                lease.commit();
                text
            }
            Err(err) => {
                error!(
                    user = %user_id,
                    stage = stage.label(),
                    error = %err,
                    "turn failed; state left unpersisted"
                );
                reply::apology()
            }
        }
    }

    async fn dispatch(
        &self,
        message: &str,
        state: &mut ConversationState,
    ) -> Result<String, TurnError> {
        match state.stage {
            ConversationStage::Initial => self.handle_initial(state),
            ConversationStage::CollectingInfo => self.handle_collecting_info(message, state).await,
            ConversationStage::DocumentVerification => {
                self.handle_document_verification(message, state).await
            }
            ConversationStage::VisaApplication => self.handle_visa_application(state).await,
            ConversationStage::InterviewPrep => self.handle_interview_prep(message, state).await,
            ConversationStage::CostCalculation => self.handle_cost_calculation(state).await,
            ConversationStage::LawyerBooking => self.handle_lawyer_booking(message, state).await,
        }
    }

    /// Message content is ignored on first contact; the welcome prompt asks
    /// for the five required fields and collection begins next turn.
    fn handle_initial(&self, state: &mut ConversationState) -> Result<String, TurnError> {
        state.stage = ConversationStage::CollectingInfo;
        Ok(reply::welcome())
    }

    async fn handle_collecting_info(
        &self,
        message: &str,
        state: &mut ConversationState,
    ) -> Result<String, TurnError> {
        let update = match self
            .bounded(
                "profile extraction",
                self.collaborators.extractor.extract(message),
            )
            .await
        {
            Ok(update) => update,
            Err(err) => {
                warn!(error = %err, "field extraction degraded; asking the user to rephrase");
                return Ok(reply::extraction_retry(
                    &state.profile.missing_fields(),
                    &state.profile,
                ));
            }
        };

        state.profile.apply(update);

        let missing = state.profile.missing_fields();
        if !missing.is_empty() {
            return Ok(reply::missing_fields(&missing, &state.profile));
        }

        let country = match state.profile.preferred_country.clone() {
            Some(country) => country,
            None => return Ok(reply::missing_fields(&missing, &state.profile)),
        };

        let result = match eligibility::score(&state.profile, &country) {
            Ok(result) => result,
            Err(EligibilityError::UnsupportedCountry(_)) => {
                // Recoverable within the conversation: clear the field and
                // re-ask rather than dead-ending the session.
                state.profile.preferred_country = None;
                return Ok(reply::unsupported_country(&country));
            }
            Err(err) => return Err(err.into()),
        };

        let first_route = result
            .eligible_visa_types
            .first()
            .copied()
            .unwrap_or(VisaType::StudyPermit);
        state.profile.visa_type = Some(first_route);

        let checklist = checklist::generate(&country, first_route);
        state.stage = ConversationStage::DocumentVerification;
        Ok(reply::eligibility_summary(&result, &checklist))
    }

    async fn handle_document_verification(
        &self,
        message: &str,
        state: &mut ConversationState,
    ) -> Result<String, TurnError> {
        let (country, visa_type) = Self::selected_route(state)?;
        let checklist = checklist::generate(&country, visa_type);

        let verification = match self
            .bounded(
                "document verification",
                self.collaborators.documents.verify(message),
            )
            .await
        {
            Ok(verification) => verification,
            Err(err) => {
                warn!(error = %err, "document verification degraded");
                return Ok(reply::verification_unavailable());
            }
        };

        if verification.is_valid {
            state
                .profile
                .verified_documents
                .insert(verification.document_type.clone());
        }

        let remaining = checklist.remaining(&state.profile.verified_documents);
        if remaining.is_empty() {
            state.stage = ConversationStage::VisaApplication;
            return Ok(reply::documents_complete());
        }

        Ok(reply::verification_status(&verification, &remaining))
    }

    async fn handle_visa_application(
        &self,
        state: &mut ConversationState,
    ) -> Result<String, TurnError> {
        let (country, visa_type) = Self::selected_route(state)?;

        // The letter is generated for the applicant's records; only its
        // completion is reported in chat.
        let _cover_letter = self
            .bounded(
                "cover letter generation",
                self.collaborators
                    .applications
                    .cover_letter(&state.profile, visa_type, &country),
            )
            .await?;

        let form = self
            .bounded(
                "form auto-fill",
                self.collaborators
                    .applications
                    .fill_form(&state.profile, visa_type),
            )
            .await?;

        let receipt = self
            .bounded("portal submission", self.collaborators.applications.submit(&form))
            .await?;

        let session = self
            .bounded(
                "interview session setup",
                self.collaborators
                    .interviews
                    .open_session(&state.profile, visa_type, &country),
            )
            .await?;

        state.interview = Some(session);
        state.stage = ConversationStage::InterviewPrep;
        Ok(reply::application_processed(&receipt))
    }

    async fn handle_interview_prep(
        &self,
        message: &str,
        state: &mut ConversationState,
    ) -> Result<String, TurnError> {
        if let Some(session) = state.interview.clone() {
            let feedback = self
                .bounded(
                    "answer evaluation",
                    self.collaborators.interviews.evaluate(&session, message),
                )
                .await?;
            return Ok(reply::interview_feedback(&feedback));
        }

        let (country, visa_type) = Self::selected_route(state)?;
        let session = self
            .bounded(
                "interview session setup",
                self.collaborators
                    .interviews
                    .open_session(&state.profile, visa_type, &country),
            )
            .await?;

        let text = reply::interview_questions(&session);
        state.interview = Some(session);
        Ok(text)
    }

    async fn handle_cost_calculation(
        &self,
        state: &mut ConversationState,
    ) -> Result<String, TurnError> {
        let (country, visa_type) = Self::selected_route(state)?;

        let processing = match self
            .bounded(
                "processing-time estimate",
                self.collaborators.costs.processing_time(&country, visa_type),
            )
            .await
        {
            Ok(processing) => processing,
            Err(err) => {
                warn!(error = %err, "processing-time estimate degraded; using fallback");
                ProcessingEstimate::fallback()
            }
        };

        let estimate = costs::estimate(&country, visa_type, processing);
        Ok(reply::cost_breakdown(&estimate))
    }

    async fn handle_lawyer_booking(
        &self,
        message: &str,
        state: &mut ConversationState,
    ) -> Result<String, TurnError> {
        let confirmation = self
            .bounded(
                "lawyer booking",
                self.collaborators.lawyers.book(
                    &state.profile,
                    state.profile.preferred_country.as_ref(),
                    message,
                ),
            )
            .await?;
        Ok(reply::booking_confirmation(&confirmation))
    }

    /// Stages past information collection require a chosen destination and
    /// route; their absence is a programming error, not user input.
    fn selected_route(state: &ConversationState) -> Result<(CountryCode, VisaType), TurnError> {
        let country = state
            .profile
            .preferred_country
            .clone()
            .ok_or(TurnError::StateIncomplete("a preferred country"))?;
        let visa_type = state
            .profile
            .visa_type
            .ok_or(TurnError::StateIncomplete("a selected visa route"))?;
        Ok((country, visa_type))
    }

    /// Re-detect the user's language each turn; detection problems fall back
    /// to the default rather than failing the turn.
    async fn detect_language(&self, message: &str) -> LanguageCode {
        match tokio::time::timeout(self.call_timeout, self.collaborators.language.detect(message))
            .await
        {
            Ok(Ok(language)) => language,
            Ok(Err(err)) => {
                warn!(error = %err, "language detection degraded; defaulting");
                LanguageCode::default()
            }
            Err(_) => {
                warn!("language detection timed out; defaulting");
                LanguageCode::default()
            }
        }
    }

    /// Translate the reply into the user's language when they differ. Any
    /// localization failure returns the untranslated reply; a turn is never
    /// failed over translation.
    async fn localize(&self, text: String, target: LanguageCode) -> String {
        let detected = match tokio::time::timeout(
            self.call_timeout,
            self.collaborators.language.detect(&text),
        )
        .await
        {
            Ok(Ok(language)) => language,
            _ => LanguageCode::default(),
        };

        if detected == target {
            return text;
        }

        match tokio::time::timeout(
            self.call_timeout,
            self.collaborators.language.translate(&text, target),
        )
        .await
        {
            Ok(Ok(translated)) => translated,
            Ok(Err(err)) => {
                warn!(error = %err, target = target.code(), "localization failed; replying untranslated");
                text
            }
            Err(_) => {
                warn!(target = target.code(), "localization timed out; replying untranslated");
                text
            }
        }
    }

    async fn bounded<T, E>(
        &self,
        operation: &'static str,
        call: impl std::future::Future<Output = Result<T, E>>,
    ) -> Result<T, TurnError>
    where
        TurnError: From<E>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.map_err(TurnError::from),
            Err(_) => Err(TurnError::Timeout(operation)),
        }
    }
}
