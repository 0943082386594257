use super::common::canada;
use crate::conversation::costs::{
    estimate, fee_category, EstimateConfidence, FeeCategory, ProcessingEstimate,
};
use crate::conversation::domain::{CountryCode, VisaType};

#[test]
fn routes_map_onto_explicit_fee_buckets() {
    assert_eq!(fee_category(VisaType::StudyPermit), FeeCategory::Student);
    assert_eq!(fee_category(VisaType::Student), FeeCategory::Student);
    assert_eq!(fee_category(VisaType::ExpressEntry), FeeCategory::Work);
    assert_eq!(fee_category(VisaType::SkilledWorker), FeeCategory::Work);
    assert_eq!(fee_category(VisaType::VisitorVisa), FeeCategory::Tourist);
    assert_eq!(fee_category(VisaType::GlobalTalent), FeeCategory::Business);
}

#[test]
fn work_permit_to_canada_totals_the_schedule() {
    let costs = estimate(
        &canada(),
        VisaType::WorkPermit,
        ProcessingEstimate::fallback(),
    );

    // 190 visa + 85 processing + 75 service + 100 documentation
    // + 600 travel + 500 legal.
    assert_eq!(costs.total, 1_550);
    assert_eq!(costs.breakdown.len(), 6);
    assert_eq!(
        costs.total,
        costs.breakdown.iter().map(|line| line.amount).sum::<u32>()
    );
}

#[test]
fn unknown_countries_use_the_default_processing_and_travel_rates() {
    let costs = estimate(
        &CountryCode::new("narnia"),
        VisaType::VisitorVisa,
        ProcessingEstimate::fallback(),
    );
    // 140 + 100 + 40 + 100 + 500 + 150.
    assert_eq!(costs.total, 1_030);
}

#[test]
fn estimates_are_deterministic() {
    let processing = ProcessingEstimate::with_weeks(6);
    let first = estimate(&canada(), VisaType::StudyPermit, processing);
    let second = estimate(&canada(), VisaType::StudyPermit, processing);
    assert_eq!(first, second);
}

#[test]
fn processing_confidence_bands_on_weeks() {
    assert_eq!(
        ProcessingEstimate::with_weeks(4).confidence,
        EstimateConfidence::High
    );
    assert_eq!(
        ProcessingEstimate::with_weeks(8).confidence,
        EstimateConfidence::Medium
    );
    assert_eq!(
        ProcessingEstimate::with_weeks(9).confidence,
        EstimateConfidence::Low
    );
    assert_eq!(
        ProcessingEstimate::fallback(),
        ProcessingEstimate::with_weeks(8)
    );
}
