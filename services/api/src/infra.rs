//! Offline collaborator implementations and shared HTTP state.
//!
//! Everything here is deterministic and network-free so the service, the CLI
//! demo, and the tests behave identically wherever they run. Hosted
//! providers (translation, LLM extraction, OCR) slot in by implementing the
//! same traits from `visa_ai::conversation::collaborators`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use visa_ai::conversation::collaborators::{
    ApplicationWriter, BookingConfirmation, BookingError, CoachError, CostEstimator,
    DeliveryError, DocumentVerification, DocumentVerifier, EstimateError, ExtractionError,
    InterviewCoach, InterviewFeedback, LanguageError, LanguageServices, LawyerDesk,
    MessageDelivery, PortalReceipt, ProfileExtractor, VerificationError, VisaForm, WriterError,
};
use visa_ai::conversation::costs::{fee_category, FeeCategory, ProcessingEstimate};
use visa_ai::conversation::{
    generate_checklist, ApplicantProfile, Collaborators, CountryCode, EducationLevel,
    InterviewSession, LanguageCode, ProfileUpdate, UserId, VisaType,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Bundle of the offline implementations, used by `serve` and `demo`.
pub(crate) fn offline_collaborators() -> Collaborators {
    Collaborators {
        language: Arc::new(ScriptRangeLanguage),
        extractor: Arc::new(KeywordExtractor),
        documents: Arc::new(ChecklistNameVerifier::new()),
        applications: Arc::new(TemplateWriter::default()),
        interviews: Arc::new(ScriptedCoach::default()),
        costs: Arc::new(FeeScheduleEstimator),
        lawyers: Arc::new(RosterDesk::default()),
    }
}

/// Unicode-script language detection; translation is the identity until a
/// hosted translation provider is configured.
pub(crate) struct ScriptRangeLanguage;

#[async_trait]
impl LanguageServices for ScriptRangeLanguage {
    async fn detect(&self, text: &str) -> Result<LanguageCode, LanguageError> {
        for ch in text.chars() {
            match ch {
                '\u{0600}'..='\u{06FF}' => return Ok(LanguageCode::Ar),
                '\u{0900}'..='\u{097F}' => return Ok(LanguageCode::Hi),
                '\u{4E00}'..='\u{9FFF}' => return Ok(LanguageCode::Zh),
                '¡' | '¿' | 'ñ' | 'Ñ' => return Ok(LanguageCode::Es),
                'ç' | 'à' | 'è' | 'ê' | 'ô' | 'û' => return Ok(LanguageCode::Fr),
                _ => {}
            }
        }
        Ok(LanguageCode::En)
    }

    async fn translate(&self, text: &str, _target: LanguageCode) -> Result<String, LanguageError> {
        Ok(text.to_string())
    }
}

/// Keyword and number heuristics over free text. A hosted model can replace
/// this wholesale; the dispatcher only sees `ProfileUpdate`s either way.
pub(crate) struct KeywordExtractor;

#[async_trait]
impl ProfileExtractor for KeywordExtractor {
    async fn extract(&self, message: &str) -> Result<ProfileUpdate, ExtractionError> {
        Ok(extract_fields(message))
    }
}

fn extract_fields(message: &str) -> ProfileUpdate {
    let lowered = message.to_ascii_lowercase();
    let mut update = ProfileUpdate::default();

    for slug in [
        "high-school",
        "high school",
        "diploma",
        "bachelor",
        "master",
        "phd",
        "doctorate",
    ] {
        if lowered.contains(slug) {
            update.education = EducationLevel::parse(slug);
            break;
        }
    }

    for country in ["canada", "australia", "united kingdom", "uk"] {
        if contains_word(&lowered, country) {
            let normalized = if country == "united kingdom" { "uk" } else { country };
            update.preferred_country = Some(CountryCode::new(normalized));
            break;
        }
    }

    let words: Vec<&str> = lowered
        .split(|ch: char| ch.is_whitespace() || ch == ',' || ch == '.')
        .filter(|word| !word.is_empty())
        .collect();

    for (index, word) in words.iter().enumerate() {
        let bare = word.trim_start_matches('$').replace('_', "");
        let Ok(value) = bare.parse::<u32>() else {
            continue;
        };

        let previous = index.checked_sub(1).map(|i| words[i]);
        let next = words.get(index + 1).copied();
        let after_next = words.get(index + 2).copied();

        let is_money = word.starts_with('$') || value >= 1_000;
        let is_age = previous == Some("age")
            || (next.map(|w| w.starts_with("year")).unwrap_or(false)
                && after_next == Some("old"));
        let is_experience =
            next.map(|w| w.starts_with("year")).unwrap_or(false) && after_next != Some("old");

        if is_age && u8::try_from(value).is_ok() {
            update.age = Some(value as u8);
        } else if is_experience && value <= 60 {
            update.work_experience_years = Some(value as u8);
        } else if is_money {
            update.financial_capacity = Some(value);
        } else if update.age.is_none() && (16..=80).contains(&value) {
            update.age = Some(value as u8);
        }
    }

    update
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.split_whitespace().any(|word| {
        word.trim_matches(|ch: char| !ch.is_alphanumeric()) == needle
    }) || haystack.contains(needle) && needle.contains(' ')
}

/// Recognizes checklist document names inside a message. Stands in for the
/// OCR pipeline, which reports the same verdict shape.
pub(crate) struct ChecklistNameVerifier {
    known_documents: Vec<&'static str>,
}

impl ChecklistNameVerifier {
    pub(crate) fn new() -> Self {
        let mut known_documents: Vec<&'static str> = Vec::new();
        for country in ["canada", "australia", "uk"] {
            let country = CountryCode::new(country);
            for visa_type in [
                VisaType::ExpressEntry,
                VisaType::StudyPermit,
                VisaType::WorkPermit,
                VisaType::VisitorVisa,
            ] {
                for document in generate_checklist(&country, visa_type).documents {
                    if !known_documents.contains(&document) {
                        known_documents.push(document);
                    }
                }
            }
        }
        Self { known_documents }
    }
}

#[async_trait]
impl DocumentVerifier for ChecklistNameVerifier {
    async fn verify(&self, payload: &str) -> Result<DocumentVerification, VerificationError> {
        let lowered = payload.to_ascii_lowercase();
        let matched = self
            .known_documents
            .iter()
            .find(|document| lowered.contains(&document.to_ascii_lowercase()));

        match matched {
            Some(document) => Ok(DocumentVerification {
                is_valid: true,
                document_type: (*document).to_string(),
                message: "Document verification successful! ✅".to_string(),
            }),
            None => Ok(DocumentVerification {
                is_valid: false,
                document_type: String::new(),
                message: "Document verification failed. 🚫 Please name the document you're sending and retake the photo in good light.".to_string(),
            }),
        }
    }
}

static SUBMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_submission_id() -> String {
    let id = SUBMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("sub-{id:06}")
}

/// Fills letters and forms from fixed templates and accepts every portal
/// submission with a sequential receipt.
#[derive(Default)]
pub(crate) struct TemplateWriter;

#[async_trait]
impl ApplicationWriter for TemplateWriter {
    async fn cover_letter(
        &self,
        profile: &ApplicantProfile,
        visa_type: VisaType,
        country: &CountryCode,
    ) -> Result<String, WriterError> {
        let education = profile
            .education
            .map(|level| level.label())
            .unwrap_or("unspecified");
        let years = profile.work_experience_years.unwrap_or(0);
        Ok(format!(
            "Dear Visa Officer,\n\nI am applying for the {} route to {country}. \
             I hold a {education} qualification and bring {years} years of professional experience. \
             I would welcome the opportunity to contribute to {country}.\n\nSincerely,\nThe Applicant",
            visa_type.slug()
        ))
    }

    async fn fill_form(
        &self,
        profile: &ApplicantProfile,
        visa_type: VisaType,
    ) -> Result<VisaForm, WriterError> {
        let mut fields = std::collections::BTreeMap::new();
        if let Some(age) = profile.age {
            fields.insert("applicant_age".to_string(), age.to_string());
        }
        if let Some(level) = profile.education {
            fields.insert("highest_qualification".to_string(), level.label().to_string());
        }
        if let Some(years) = profile.work_experience_years {
            fields.insert("work_experience_years".to_string(), years.to_string());
        }
        if let Some(capacity) = profile.financial_capacity {
            fields.insert("bank_balance".to_string(), capacity.to_string());
        }
        if let Some(country) = &profile.preferred_country {
            fields.insert("destination".to_string(), country.to_string());
        }
        Ok(VisaForm { visa_type, fields })
    }

    async fn submit(&self, form: &VisaForm) -> Result<PortalReceipt, WriterError> {
        info!(visa_type = form.visa_type.slug(), "submitting application to portal");
        Ok(PortalReceipt {
            accepted: true,
            submission_id: Some(next_submission_id()),
        })
    }
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Serves question sets per fee bucket and grades answers on length bands.
#[derive(Default)]
pub(crate) struct ScriptedCoach;

fn question_set(category: FeeCategory) -> &'static [&'static str] {
    match category {
        FeeCategory::Student => &[
            "Why did you choose this institution and program?",
            "How will this course of study advance your career at home?",
            "Who is funding your studies, and how?",
        ],
        FeeCategory::Work => &[
            "Describe your current role and responsibilities.",
            "Why does this position require your specific experience?",
            "What are your plans once the work contract ends?",
        ],
        FeeCategory::Tourist => &[
            "What places do you plan to visit, and for how long?",
            "What ties will bring you back to your home country?",
        ],
        FeeCategory::Business => &[
            "What is the purpose of your business activities abroad?",
            "How is your venture funded?",
            "What exceptional achievements support your application?",
        ],
    }
}

#[async_trait]
impl InterviewCoach for ScriptedCoach {
    async fn open_session(
        &self,
        _profile: &ApplicantProfile,
        visa_type: VisaType,
        country: &CountryCode,
    ) -> Result<InterviewSession, CoachError> {
        let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let mut questions: Vec<String> = question_set(fee_category(visa_type))
            .iter()
            .map(|question| question.to_string())
            .collect();
        questions.push(format!("Why {country} rather than somewhere else?"));

        Ok(InterviewSession {
            session_id: format!("interview-{id:06}"),
            questions,
            instructions:
                "Please respond to each question clearly and concisely. Your responses will be evaluated for content and delivery."
                    .to_string(),
        })
    }

    async fn evaluate(
        &self,
        _session: &InterviewSession,
        answer: &str,
    ) -> Result<InterviewFeedback, CoachError> {
        let word_count = answer.split_whitespace().count();
        let (rating, feedback, suggestions) = if word_count < 5 {
            (
                4,
                vec!["The answer is too short to assess substance.".to_string()],
                vec!["Aim for two or three full sentences.".to_string()],
            )
        } else if word_count <= 60 {
            (
                7,
                vec!["Clear and to the point.".to_string()],
                vec!["Add one concrete example to strengthen it.".to_string()],
            )
        } else {
            (
                8,
                vec!["Thorough and detailed.".to_string()],
                vec!["Practice trimming it to under a minute.".to_string()],
            )
        };

        Ok(InterviewFeedback {
            rating: Some(rating),
            feedback,
            suggestions,
        })
    }
}

/// Deterministic processing-time lookup per destination.
pub(crate) struct FeeScheduleEstimator;

#[async_trait]
impl CostEstimator for FeeScheduleEstimator {
    async fn processing_time(
        &self,
        country: &CountryCode,
        _visa_type: VisaType,
    ) -> Result<ProcessingEstimate, EstimateError> {
        let weeks = match country.as_str() {
            "canada" => 8,
            "australia" => 10,
            "uk" => 6,
            _ => 8,
        };
        Ok(ProcessingEstimate::with_weeks(weeks))
    }
}

static BOOKING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Round-robins consultations across a fixed roster, three days out.
#[derive(Default)]
pub(crate) struct RosterDesk;

const LAWYER_ROSTER: &[&str] = &["Amara Osei", "Daniel Roy", "Priya Natarajan"];

#[async_trait]
impl LawyerDesk for RosterDesk {
    async fn book(
        &self,
        _profile: &ApplicantProfile,
        _country: Option<&CountryCode>,
        _request: &str,
    ) -> Result<BookingConfirmation, BookingError> {
        let sequence = BOOKING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let lawyer = LAWYER_ROSTER[(sequence as usize - 1) % LAWYER_ROSTER.len()];

        Ok(BookingConfirmation {
            reference: format!("bk-{sequence:06}"),
            lawyer_name: lawyer.to_string(),
            scheduled_for: chrono::Utc::now() + chrono::Duration::days(3),
        })
    }
}

/// Logs outbound messages and keeps them for assertions; the hosted
/// messaging transport implements the same trait.
#[derive(Default, Clone)]
pub(crate) struct LoggingDelivery {
    sent: Arc<Mutex<Vec<(UserId, String)>>>,
}

impl LoggingDelivery {
    #[cfg(test)]
    pub(crate) fn sent(&self) -> Vec<(UserId, String)> {
        self.sent.lock().expect("delivery mutex poisoned").clone()
    }
}

#[async_trait]
impl MessageDelivery for LoggingDelivery {
    async fn deliver(&self, user_id: &UserId, text: &str) -> Result<(), DeliveryError> {
        info!(user = %user_id, chars = text.len(), "delivering reply");
        self.sent
            .lock()
            .expect("delivery mutex poisoned")
            .push((user_id.clone(), text.to_string()));
        Ok(())
    }
}
