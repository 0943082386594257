//! Document checklist composition for a country / visa-type pair.
//!
//! Checklists are advisory, so generation is permissive: unknown countries
//! contribute an empty country block and visa types without a specific table
//! contribute nothing. The output order is the display order and no
//! de-duplication is performed.

use serde::Serialize;

use super::domain::{CountryCode, VisaType};

/// Ordered document list plus advisory notes for one application route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentChecklist {
    pub country: CountryCode,
    pub visa_type: VisaType,
    pub documents: Vec<&'static str>,
    pub notes: Vec<&'static str>,
}

impl DocumentChecklist {
    /// Documents not yet present in `verified`, preserving checklist order.
    /// Membership is by exact string match.
    pub fn remaining(&self, verified: &std::collections::BTreeSet<String>) -> Vec<&'static str> {
        self.documents
            .iter()
            .copied()
            .filter(|document| !verified.contains(*document))
            .collect()
    }
}

/// Compose the checklist for a destination and route.
pub fn generate(country: &CountryCode, visa_type: VisaType) -> DocumentChecklist {
    let mut documents: Vec<&'static str> = base_documents().to_vec();

    if visa_type.requires_career_documents() {
        documents.extend_from_slice(education_documents());
        documents.extend_from_slice(work_documents());
    }

    documents.extend_from_slice(visa_specific_documents(visa_type));
    documents.extend_from_slice(country_specific_documents(country));

    DocumentChecklist {
        country: country.clone(),
        visa_type,
        documents,
        notes: advisory_notes().to_vec(),
    }
}

const fn base_documents() -> &'static [&'static str] {
    &[
        "Valid Passport",
        "Passport-size Photographs",
        "Proof of Financial Capacity",
        "Police Clearance Certificate",
    ]
}

const fn education_documents() -> &'static [&'static str] {
    &[
        "Educational Certificates",
        "Transcripts",
        "Course Completion Certificates",
    ]
}

const fn work_documents() -> &'static [&'static str] {
    &["Resume/CV", "Employment Letters", "Pay Stubs", "Tax Returns"]
}

fn visa_specific_documents(visa_type: VisaType) -> &'static [&'static str] {
    match visa_type {
        VisaType::ExpressEntry => &[
            "Language Test Results",
            "Skills Assessment Report",
            "Provincial Nomination (if applicable)",
        ],
        VisaType::StudyPermit => &[
            "Acceptance Letter from Institution",
            "Study Plan",
            "Language Test Results",
        ],
        VisaType::WorkPermit => &[
            "Job Offer Letter",
            "Labor Market Impact Assessment",
            "Professional Certifications",
        ],
        _ => &[],
    }
}

fn country_specific_documents(country: &CountryCode) -> &'static [&'static str] {
    match country.as_str() {
        "canada" => &[
            "Biometrics",
            "Medical Examination Report",
            "IMM 5645 Family Information Form",
        ],
        "australia" => &[
            "Form 80 Personal Particulars",
            "Health Insurance Evidence",
            "Skills Assessment (if applicable)",
        ],
        "uk" => &[
            "TB Test Certificate",
            "Bank Statements (6 months)",
            "Appendix 2 Financial Requirement Form",
        ],
        _ => &[],
    }
}

const fn advisory_notes() -> &'static [&'static str] {
    &[
        "All documents must be in English or officially translated",
        "Financial documents should not be older than 3 months",
        "Certificates must be notarized copies",
        "Electronic copies must be in color and high resolution",
    ]
}
