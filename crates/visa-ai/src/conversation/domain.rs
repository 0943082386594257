use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for the messaging channel's opaque user handle
/// (a phone-number-like string for WhatsApp).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Languages the assistant can converse in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[default]
    En,
    Es,
    Fr,
    Zh,
    Hi,
    Ar,
}

impl LanguageCode {
    pub const fn code(self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Es => "es",
            LanguageCode::Fr => "fr",
            LanguageCode::Zh => "zh",
            LanguageCode::Hi => "hi",
            LanguageCode::Ar => "ar",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            LanguageCode::En => "English",
            LanguageCode::Es => "Spanish",
            LanguageCode::Fr => "French",
            LanguageCode::Zh => "Chinese",
            LanguageCode::Hi => "Hindi",
            LanguageCode::Ar => "Arabic",
        }
    }

    /// Parse an ISO 639-1 code; codes outside the supported set yield `None`
    /// and callers fall back to [`LanguageCode::En`].
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Some(LanguageCode::En),
            "es" => Some(LanguageCode::Es),
            "fr" => Some(LanguageCode::Fr),
            "zh" => Some(LanguageCode::Zh),
            "hi" => Some(LanguageCode::Hi),
            "ar" => Some(LanguageCode::Ar),
            _ => None,
        }
    }
}

/// Highest completed education level, ordered from high school up to PhD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EducationLevel {
    HighSchool,
    Diploma,
    Bachelor,
    Master,
    Phd,
}

impl EducationLevel {
    pub const fn label(self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "high-school",
            EducationLevel::Diploma => "diploma",
            EducationLevel::Bachelor => "bachelor",
            EducationLevel::Master => "master",
            EducationLevel::Phd => "phd",
        }
    }

    /// Parse a level slug. Unrecognized levels are rejected here, at the
    /// merge boundary, so the scoring table stays total over the enum.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high-school" | "high school" | "highschool" => Some(EducationLevel::HighSchool),
            "diploma" => Some(EducationLevel::Diploma),
            "bachelor" | "bachelors" | "bachelor's" => Some(EducationLevel::Bachelor),
            "master" | "masters" | "master's" => Some(EducationLevel::Master),
            "phd" | "doctorate" => Some(EducationLevel::Phd),
            _ => None,
        }
    }
}

/// Lower-cased destination country code. Kept open rather than enumerated so
/// unsupported destinations surface as a hard scoring error instead of being
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct CountryCode(String);

impl From<String> for CountryCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl CountryCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visa categories known to the rules tables.
///
/// Selection and document rules dispatch on the explicit classifications
/// below; adding a variant forces both matches to be revisited, where the
/// reference implementation matched on name substrings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisaType {
    ExpressEntry,
    ProvincialNominee,
    StudyPermit,
    WorkPermit,
    SkilledIndependent,
    SkilledNominated,
    TemporarySkillShortage,
    SkilledWorker,
    GlobalTalent,
    Student,
    TemporaryVisa,
    VisitorVisa,
}

/// Competitiveness band used when a score lands in the middle eligibility
/// tier: flagship routes are withheld below the top band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTier {
    Flagship,
    Standard,
}

impl VisaType {
    pub const fn slug(self) -> &'static str {
        match self {
            VisaType::ExpressEntry => "express-entry",
            VisaType::ProvincialNominee => "provincial-nominee",
            VisaType::StudyPermit => "study-permit",
            VisaType::WorkPermit => "work-permit",
            VisaType::SkilledIndependent => "skilled-independent",
            VisaType::SkilledNominated => "skilled-nominated",
            VisaType::TemporarySkillShortage => "temporary-skill-shortage",
            VisaType::SkilledWorker => "skilled-worker",
            VisaType::GlobalTalent => "global-talent",
            VisaType::Student => "student",
            VisaType::TemporaryVisa => "temporary-visa",
            VisaType::VisitorVisa => "visitor-visa",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        [
            VisaType::ExpressEntry,
            VisaType::ProvincialNominee,
            VisaType::StudyPermit,
            VisaType::WorkPermit,
            VisaType::SkilledIndependent,
            VisaType::SkilledNominated,
            VisaType::TemporarySkillShortage,
            VisaType::SkilledWorker,
            VisaType::GlobalTalent,
            VisaType::Student,
            VisaType::TemporaryVisa,
            VisaType::VisitorVisa,
        ]
        .into_iter()
        .find(|visa| visa.slug() == normalized)
    }

    pub const fn selection_tier(self) -> SelectionTier {
        match self {
            VisaType::SkilledIndependent | VisaType::GlobalTalent => SelectionTier::Flagship,
            _ => SelectionTier::Standard,
        }
    }

    /// Visitor-class visas skip the education and employment document blocks.
    pub const fn requires_career_documents(self) -> bool {
        !matches!(self, VisaType::VisitorVisa)
    }
}

/// One of the five fields the assistant must collect before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Age,
    Education,
    WorkExperience,
    PreferredCountry,
    FinancialCapacity,
}

impl ProfileField {
    pub const fn label(self) -> &'static str {
        match self {
            ProfileField::Age => "age",
            ProfileField::Education => "highest education level",
            ProfileField::WorkExperience => "years of work experience",
            ProfileField::PreferredCountry => "preferred country",
            ProfileField::FinancialCapacity => "savings / financial capacity",
        }
    }
}

/// Structured data accumulated about one applicant across turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub age: Option<u8>,
    pub education: Option<EducationLevel>,
    pub work_experience_years: Option<u8>,
    pub preferred_country: Option<CountryCode>,
    pub financial_capacity: Option<u32>,
    pub visa_type: Option<VisaType>,
    pub verified_documents: BTreeSet<String>,
}

/// Validated partial update produced by the extraction collaborator.
///
/// `deny_unknown_fields` rejects stray keys at the deserialization boundary,
/// so nothing outside this schema can ever reach the stored profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub education: Option<EducationLevel>,
    #[serde(default)]
    pub work_experience_years: Option<u8>,
    #[serde(default)]
    pub preferred_country: Option<CountryCode>,
    #[serde(default)]
    pub financial_capacity: Option<u32>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.age.is_none()
            && self.education.is_none()
            && self.work_experience_years.is_none()
            && self.preferred_country.is_none()
            && self.financial_capacity.is_none()
    }
}

impl ApplicantProfile {
    /// Merge an update field by field. Fields absent from the update keep
    /// their current value; present fields overwrite.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(age) = update.age {
            self.age = Some(age);
        }
        if let Some(education) = update.education {
            self.education = Some(education);
        }
        if let Some(years) = update.work_experience_years {
            self.work_experience_years = Some(years);
        }
        if let Some(country) = update.preferred_country {
            self.preferred_country = Some(country);
        }
        if let Some(capacity) = update.financial_capacity {
            self.financial_capacity = Some(capacity);
        }
    }

    pub fn missing_fields(&self) -> Vec<ProfileField> {
        let mut missing = Vec::new();
        if self.age.is_none() {
            missing.push(ProfileField::Age);
        }
        if self.education.is_none() {
            missing.push(ProfileField::Education);
        }
        if self.work_experience_years.is_none() {
            missing.push(ProfileField::WorkExperience);
        }
        if self.preferred_country.is_none() {
            missing.push(ProfileField::PreferredCountry);
        }
        if self.financial_capacity.is_none() {
            missing.push(ProfileField::FinancialCapacity);
        }
        missing
    }

    /// A profile is complete once all five required fields are present;
    /// completeness gates the transition out of information collection.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Named step in the scripted conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStage {
    #[default]
    Initial,
    CollectingInfo,
    DocumentVerification,
    VisaApplication,
    InterviewPrep,
    CostCalculation,
    LawyerBooking,
}

impl ConversationStage {
    pub const fn label(self) -> &'static str {
        match self {
            ConversationStage::Initial => "initial",
            ConversationStage::CollectingInfo => "collecting_info",
            ConversationStage::DocumentVerification => "document_verification",
            ConversationStage::VisaApplication => "visa_application",
            ConversationStage::InterviewPrep => "interview_prep",
            ConversationStage::CostCalculation => "cost_calculation",
            ConversationStage::LawyerBooking => "lawyer_booking",
        }
    }
}

/// Mock-interview session attached to the state once the application stage
/// completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewSession {
    pub session_id: String,
    pub questions: Vec<String>,
    pub instructions: String,
}

/// Everything the dispatcher tracks for one user across turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub stage: ConversationStage,
    pub profile: ApplicantProfile,
    pub language: LanguageCode,
    pub interview: Option<InterviewSession>,
}
