use crate::conversation::domain::{CountryCode, EducationLevel, VisaType};

/// Immutable per-country thresholds the scoring rules evaluate against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRequirements {
    pub min_age: u8,
    pub max_age: u8,
    pub min_education: EducationLevel,
    pub min_work_experience_years: u8,
    /// Minimum liquid funds in the destination country's currency.
    pub min_financial_capacity: u32,
    /// Ordered from most to least competitive route.
    pub visa_types: Vec<VisaType>,
}

impl CountryRequirements {
    /// Look up the requirements entry for a destination. Countries without
    /// an entry are unsupported and must be treated as a hard error by
    /// callers, never defaulted.
    pub fn for_country(country: &CountryCode) -> Option<Self> {
        match country.as_str() {
            "canada" => Some(Self {
                min_age: 18,
                max_age: 45,
                min_education: EducationLevel::Bachelor,
                min_work_experience_years: 3,
                min_financial_capacity: 12_500,
                visa_types: vec![
                    VisaType::ExpressEntry,
                    VisaType::ProvincialNominee,
                    VisaType::StudyPermit,
                    VisaType::WorkPermit,
                ],
            }),
            "australia" => Some(Self {
                min_age: 18,
                max_age: 45,
                min_education: EducationLevel::Bachelor,
                min_work_experience_years: 3,
                min_financial_capacity: 20_000,
                visa_types: vec![
                    VisaType::SkilledIndependent,
                    VisaType::SkilledNominated,
                    VisaType::TemporarySkillShortage,
                ],
            }),
            "uk" => Some(Self {
                min_age: 18,
                max_age: 50,
                min_education: EducationLevel::Bachelor,
                min_work_experience_years: 2,
                min_financial_capacity: 15_000,
                visa_types: vec![
                    VisaType::SkilledWorker,
                    VisaType::GlobalTalent,
                    VisaType::Student,
                ],
            }),
            _ => None,
        }
    }

    pub fn supported_countries() -> [&'static str; 3] {
        ["canada", "australia", "uk"]
    }
}
