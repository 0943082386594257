use super::requirements::CountryRequirements;
use crate::conversation::domain::EducationLevel;

pub(crate) const AGE_WEIGHT: f64 = 0.25;
pub(crate) const EDUCATION_WEIGHT: f64 = 0.30;
pub(crate) const WORK_EXPERIENCE_WEIGHT: f64 = 0.25;
pub(crate) const FINANCIAL_WEIGHT: f64 = 0.20;

/// Years of experience beyond which no further credit accrues.
const WORK_EXPERIENCE_CAP_YEARS: f64 = 15.0;

/// Financial credit saturates at this multiple of the country minimum.
const FINANCIAL_CAP_MULTIPLIER: f64 = 3.0;

/// Ages outside the admissible window score zero; inside it the score falls
/// linearly with distance from the window midpoint, favoring applicants in
/// the middle of the range without a hard ceiling at the boundaries.
pub(crate) fn age_score(age: u8, requirements: &CountryRequirements) -> f64 {
    if age < requirements.min_age || age > requirements.max_age {
        return 0.0;
    }

    let range = f64::from(requirements.max_age - requirements.min_age);
    let midpoint = f64::from(requirements.min_age) + range / 2.0;
    let distance = (f64::from(age) - midpoint).abs();
    100.0 - (distance / range) * 100.0
}

/// Fixed ordinal table over the five recognized levels.
pub(crate) fn education_score(level: EducationLevel) -> f64 {
    match level {
        EducationLevel::HighSchool => 60.0,
        EducationLevel::Diploma => 70.0,
        EducationLevel::Bachelor => 80.0,
        EducationLevel::Master => 90.0,
        EducationLevel::Phd => 100.0,
    }
}

pub(crate) fn work_experience_score(years: u8, requirements: &CountryRequirements) -> f64 {
    if years < requirements.min_work_experience_years {
        return 0.0;
    }

    let capped = f64::from(years).min(WORK_EXPERIENCE_CAP_YEARS);
    (capped / WORK_EXPERIENCE_CAP_YEARS) * 100.0
}

pub(crate) fn financial_score(capacity: u32, requirements: &CountryRequirements) -> f64 {
    if capacity < requirements.min_financial_capacity {
        return 0.0;
    }

    let ceiling = f64::from(requirements.min_financial_capacity) * FINANCIAL_CAP_MULTIPLIER;
    let capped = f64::from(capacity).min(ceiling);
    (capped / ceiling) * 100.0
}
