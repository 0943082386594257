//! Deterministic eligibility scoring against per-country requirement tables.

mod requirements;
mod rules;

pub use requirements::CountryRequirements;

use crate::conversation::domain::{
    ApplicantProfile, CountryCode, ProfileField, SelectionTier, VisaType,
};
use serde::{Deserialize, Serialize};

/// Per-factor sub-scores, each normalized to 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub age: f64,
    pub education: f64,
    pub work_experience: f64,
    pub financial: f64,
}

impl ScoreBreakdown {
    /// Recompose the weighted total from the sub-scores.
    pub fn weighted_total(&self) -> f64 {
        self.age * rules::AGE_WEIGHT
            + self.education * rules::EDUCATION_WEIGHT
            + self.work_experience * rules::WORK_EXPERIENCE_WEIGHT
            + self.financial * rules::FINANCIAL_WEIGHT
    }
}

/// Outcome of scoring one applicant against one destination country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Weighted composite, rounded to the nearest integer in 0–100.
    pub score: u8,
    pub breakdown: ScoreBreakdown,
    /// Ordered recommendation; a subset of the country's routes for the two
    /// upper bands, the universal fallback pair below 60.
    pub eligible_visa_types: Vec<VisaType>,
}

#[derive(Debug, thiserror::Error)]
pub enum EligibilityError {
    #[error("country {0} is not supported")]
    UnsupportedCountry(CountryCode),
    #[error("profile is missing required fields: {}", format_fields(.0))]
    IncompleteProfile(Vec<ProfileField>),
}

fn format_fields(fields: &[ProfileField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Score an applicant for a destination country.
///
/// Pure over the profile and the static requirement tables; a country with
/// no requirements entry is a hard error, never a defaulted score.
pub fn score(
    profile: &ApplicantProfile,
    country: &CountryCode,
) -> Result<ScoreResult, EligibilityError> {
    let requirements = CountryRequirements::for_country(country)
        .ok_or_else(|| EligibilityError::UnsupportedCountry(country.clone()))?;

    let (Some(age), Some(education), Some(years), Some(capacity)) = (
        profile.age,
        profile.education,
        profile.work_experience_years,
        profile.financial_capacity,
    ) else {
        return Err(EligibilityError::IncompleteProfile(profile.missing_fields()));
    };

    let breakdown = ScoreBreakdown {
        age: rules::age_score(age, &requirements),
        education: rules::education_score(education),
        work_experience: rules::work_experience_score(years, &requirements),
        financial: rules::financial_score(capacity, &requirements),
    };

    let score = breakdown.weighted_total().round() as u8;

    Ok(ScoreResult {
        score,
        breakdown,
        eligible_visa_types: eligible_visa_types(score, &requirements),
    })
}

/// Band the composite score into a visa recommendation.
///
/// Below 60 the recommendation is the fixed fallback pair regardless of the
/// country's own route list; these are redirection suggestions, not entries
/// in the country table.
fn eligible_visa_types(score: u8, requirements: &CountryRequirements) -> Vec<VisaType> {
    if score >= 80 {
        requirements.visa_types.clone()
    } else if score >= 60 {
        requirements
            .visa_types
            .iter()
            .copied()
            .filter(|visa| visa.selection_tier() != SelectionTier::Flagship)
            .collect()
    } else {
        vec![VisaType::StudyPermit, VisaType::TemporaryVisa]
    }
}
