//! Fixed fee schedule behind the cost-calculation stage.
//!
//! Amounts are rough USD estimates for planning conversations, not quotes;
//! the advisory note attached to every estimate says as much.

use serde::{Deserialize, Serialize};

use super::domain::{CountryCode, VisaType};

/// Fee bucket a visa route bills under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeCategory {
    Student,
    Work,
    Tourist,
    Business,
}

/// Map a route onto its fee bucket. Explicit per variant so a new visa type
/// cannot silently inherit a bucket.
pub fn fee_category(visa_type: VisaType) -> FeeCategory {
    match visa_type {
        VisaType::StudyPermit | VisaType::Student => FeeCategory::Student,
        VisaType::WorkPermit
        | VisaType::ExpressEntry
        | VisaType::ProvincialNominee
        | VisaType::SkilledIndependent
        | VisaType::SkilledNominated
        | VisaType::TemporarySkillShortage
        | VisaType::SkilledWorker => FeeCategory::Work,
        VisaType::VisitorVisa | VisaType::TemporaryVisa => FeeCategory::Tourist,
        VisaType::GlobalTalent => FeeCategory::Business,
    }
}

/// Single line in a cost breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CostLine {
    pub label: &'static str,
    pub amount: u32,
}

/// Confidence attached to a processing-time estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateConfidence {
    High,
    Medium,
    Low,
}

impl EstimateConfidence {
    pub const fn label(self) -> &'static str {
        match self {
            EstimateConfidence::High => "high",
            EstimateConfidence::Medium => "medium",
            EstimateConfidence::Low => "low",
        }
    }
}

/// Expected processing duration for the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingEstimate {
    pub estimated_weeks: u8,
    pub confidence: EstimateConfidence,
}

impl ProcessingEstimate {
    /// Used when no live estimate is available.
    pub const fn fallback() -> Self {
        Self {
            estimated_weeks: 8,
            confidence: EstimateConfidence::Medium,
        }
    }

    pub const fn with_weeks(weeks: u8) -> Self {
        let confidence = if weeks <= 4 {
            EstimateConfidence::High
        } else if weeks <= 8 {
            EstimateConfidence::Medium
        } else {
            EstimateConfidence::Low
        };

        Self {
            estimated_weeks: weeks,
            confidence,
        }
    }
}

/// Itemized estimate for one application route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisaCostEstimate {
    pub breakdown: Vec<CostLine>,
    pub total: u32,
    pub processing: ProcessingEstimate,
    pub note: &'static str,
}

/// Build the fee schedule for a route and destination.
pub fn estimate(
    country: &CountryCode,
    visa_type: VisaType,
    processing: ProcessingEstimate,
) -> VisaCostEstimate {
    let category = fee_category(visa_type);

    let breakdown = vec![
        CostLine {
            label: "Visa Application Fee",
            amount: visa_fee(category),
        },
        CostLine {
            label: "Processing Fee",
            amount: processing_fee(country),
        },
        CostLine {
            label: "Service Fee",
            amount: service_fee(category),
        },
        CostLine {
            label: "Documentation Costs",
            amount: DOCUMENTATION_BASE_COST,
        },
        CostLine {
            label: "Estimated Travel Costs",
            amount: travel_estimate(country),
        },
        CostLine {
            label: "Legal Consultation Fees",
            amount: legal_fee(category),
        },
    ];

    let total = breakdown.iter().map(|line| line.amount).sum();

    VisaCostEstimate {
        breakdown,
        total,
        processing,
        note: "Costs are estimates and may vary based on individual circumstances and embassy requirements.",
    }
}

const DOCUMENTATION_BASE_COST: u32 = 100;

const fn visa_fee(category: FeeCategory) -> u32 {
    match category {
        FeeCategory::Student => 160,
        FeeCategory::Work => 190,
        FeeCategory::Tourist => 140,
        FeeCategory::Business => 250,
    }
}

const fn service_fee(category: FeeCategory) -> u32 {
    match category {
        FeeCategory::Student => 50,
        FeeCategory::Work => 75,
        FeeCategory::Tourist => 40,
        FeeCategory::Business => 100,
    }
}

const fn legal_fee(category: FeeCategory) -> u32 {
    match category {
        FeeCategory::Student => 200,
        FeeCategory::Work => 500,
        FeeCategory::Tourist => 150,
        FeeCategory::Business => 800,
    }
}

fn processing_fee(country: &CountryCode) -> u32 {
    match country.as_str() {
        "canada" => 85,
        "australia" => 95,
        "uk" => 120,
        _ => 100,
    }
}

fn travel_estimate(country: &CountryCode) -> u32 {
    const BASE_TRAVEL_COST: f64 = 500.0;
    let multiplier = match country.as_str() {
        "canada" => 1.2,
        "australia" => 1.4,
        "uk" => 1.3,
        _ => 1.0,
    };
    (BASE_TRAVEL_COST * multiplier).round() as u32
}
