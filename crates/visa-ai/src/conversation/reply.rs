//! User-visible reply text. Everything the assistant says is assembled here
//! so the stage handlers stay focused on state transitions.

use std::fmt::Write as _;

use super::checklist::DocumentChecklist;
use super::collaborators::{
    BookingConfirmation, DocumentVerification, InterviewFeedback, PortalReceipt,
};
use super::costs::VisaCostEstimate;
use super::domain::{ApplicantProfile, CountryCode, InterviewSession, ProfileField};
use super::eligibility::{CountryRequirements, ScoreResult};

pub(crate) fn welcome() -> String {
    concat!(
        "Welcome to the Immigration Assistant! 🌍\n\n",
        "I'll help you with your immigration process. Let's start by gathering some information.\n\n",
        "Please provide the following details:\n",
        "1. Your age\n",
        "2. Highest education level\n",
        "3. Years of work experience\n",
        "4. Preferred country for immigration\n",
        "5. Current savings/financial capacity\n\n",
        "You can provide these details one by one or all at once.",
    )
    .to_string()
}

pub(crate) fn missing_fields(missing: &[ProfileField], profile: &ApplicantProfile) -> String {
    let mut reply = String::from("Please provide the following information:\n");
    for field in missing {
        let _ = writeln!(reply, "- {}", field.label());
    }
    reply.push_str("\nCurrent information:\n");
    reply.push_str(&known_fields(profile));
    reply
}

fn known_fields(profile: &ApplicantProfile) -> String {
    let mut known = String::new();
    if let Some(age) = profile.age {
        let _ = writeln!(known, "- age: {age}");
    }
    if let Some(education) = profile.education {
        let _ = writeln!(known, "- education: {}", education.label());
    }
    if let Some(years) = profile.work_experience_years {
        let _ = writeln!(known, "- work experience: {years} years");
    }
    if let Some(country) = &profile.preferred_country {
        let _ = writeln!(known, "- preferred country: {country}");
    }
    if let Some(capacity) = profile.financial_capacity {
        let _ = writeln!(known, "- financial capacity: {capacity}");
    }
    if known.is_empty() {
        known.push_str("- nothing yet\n");
    }
    known
}

pub(crate) fn eligibility_summary(result: &ScoreResult, checklist: &DocumentChecklist) -> String {
    let mut reply = String::new();
    let _ = writeln!(
        reply,
        "Here is your eligibility assessment for {}: 📊\n",
        checklist.country
    );
    let _ = writeln!(reply, "Overall score: {}/100", result.score);
    let _ = writeln!(reply, "- Age: {:.0}/100", result.breakdown.age);
    let _ = writeln!(reply, "- Education: {:.0}/100", result.breakdown.education);
    let _ = writeln!(
        reply,
        "- Work experience: {:.0}/100",
        result.breakdown.work_experience
    );
    let _ = writeln!(reply, "- Finances: {:.0}/100", result.breakdown.financial);

    reply.push_str("\nRecommended visa routes:\n");
    for visa in &result.eligible_visa_types {
        let _ = writeln!(reply, "- {}", visa.slug());
    }

    let _ = writeln!(
        reply,
        "\nDocument checklist for {} ({}):",
        checklist.visa_type.slug(),
        checklist.country
    );
    for document in &checklist.documents {
        let _ = writeln!(reply, "- {document}");
    }

    reply.push_str("\nPlease note:\n");
    for note in &checklist.notes {
        let _ = writeln!(reply, "- {note}");
    }

    reply.push_str("\nSend me a photo of each document and I'll verify it.");
    reply
}

pub(crate) fn unsupported_country(country: &CountryCode) -> String {
    format!(
        "I'm afraid I can't assess eligibility for \"{country}\" yet. I currently support: {}. Which of these would you like to explore?",
        CountryRequirements::supported_countries().join(", ")
    )
}

pub(crate) fn extraction_retry(missing: &[ProfileField], profile: &ApplicantProfile) -> String {
    let mut reply =
        String::from("I had trouble reading that message. Could you rephrase it for me?\n\n");
    reply.push_str(&missing_fields(missing, profile));
    reply
}

pub(crate) fn verification_status(
    verification: &DocumentVerification,
    remaining: &[&'static str],
) -> String {
    let mut reply = format!("Document verification status:\n{}\n", verification.message);
    reply.push_str("\nRemaining required documents:\n");
    for document in remaining {
        let _ = writeln!(reply, "- {document}");
    }
    reply
}

pub(crate) fn verification_unavailable() -> String {
    "I couldn't process that document right now. Please try again with a clearer image.".to_string()
}

pub(crate) fn documents_complete() -> String {
    "All required documents have been verified! ✅ We can now proceed with your visa application."
        .to_string()
}

pub(crate) fn application_processed(receipt: &PortalReceipt) -> String {
    let submission = if receipt.accepted { "✅" } else { "❌" };
    format!(
        "Your visa application has been processed! 📝\n\n\
         Cover Letter: Generated ✅\n\
         Application Form: Completed ✅\n\
         Portal Submission: {submission}\n\n\
         Next Step: Interview Preparation\n\
         I've prepared some interview questions for you. Would you like to start the mock interview?"
    )
}

pub(crate) fn interview_questions(session: &InterviewSession) -> String {
    let mut reply = format!("{}\n\n", session.instructions);
    for (index, question) in session.questions.iter().enumerate() {
        let _ = writeln!(reply, "{}. {question}", index + 1);
    }
    reply.push_str("\nReply with your answer to the first question.");
    reply
}

pub(crate) fn interview_feedback(feedback: &InterviewFeedback) -> String {
    let mut reply = String::from("Here's my feedback on that answer:\n");
    if let Some(rating) = feedback.rating {
        let _ = writeln!(reply, "Rating: {rating}/10");
    }
    for point in &feedback.feedback {
        let _ = writeln!(reply, "- {point}");
    }
    if !feedback.suggestions.is_empty() {
        reply.push_str("\nSuggestions:\n");
        for suggestion in &feedback.suggestions {
            let _ = writeln!(reply, "- {suggestion}");
        }
    }
    reply
}

pub(crate) fn cost_breakdown(estimate: &VisaCostEstimate) -> String {
    let mut reply = String::from("Estimated costs for your application: 💰\n");
    for line in &estimate.breakdown {
        let _ = writeln!(reply, "- {}: ${}", line.label, line.amount);
    }
    let _ = writeln!(reply, "\nTotal: ${}", estimate.total);
    let _ = writeln!(
        reply,
        "Estimated processing time: {} weeks ({} confidence)",
        estimate.processing.estimated_weeks,
        estimate.processing.confidence.label()
    );
    reply.push_str(estimate.note);
    reply
}

pub(crate) fn booking_confirmation(confirmation: &BookingConfirmation) -> String {
    format!(
        "You're booked! 🗓️\n\nLawyer: {}\nWhen: {}\nReference: {}\n\nYou'll receive a reminder before the consultation.",
        confirmation.lawyer_name,
        confirmation.scheduled_for.format("%Y-%m-%d %H:%M UTC"),
        confirmation.reference
    )
}

pub(crate) fn apology() -> String {
    "I apologize, but I encountered an error. Please try again.".to_string()
}
