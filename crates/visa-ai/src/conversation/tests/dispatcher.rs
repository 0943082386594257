use std::sync::Arc;

use super::common::*;
use crate::conversation::checklist;
use crate::conversation::domain::{
    ConversationStage, ConversationState, LanguageCode, ProfileUpdate, UserId, VisaType,
};
use crate::conversation::service::ConversationService;

async fn seed_state(
    service: &ConversationService,
    user: &UserId,
    build: impl FnOnce(&mut ConversationState),
) {
    let mut lease = service.store().begin(user).await;
    build(&mut lease.state);
    lease.commit();
}

#[tokio::test]
async fn fresh_user_gets_the_welcome_and_moves_to_collecting() {
    let service = scripted_service(Vec::new());

    let reply = service.handle_message("hi", &user()).await;

    assert!(reply.contains("Welcome to the Immigration Assistant"));
    let state = service.store().peek(&user()).expect("state persisted");
    assert_eq!(state.stage, ConversationStage::CollectingInfo);
}

#[tokio::test]
async fn partial_information_lists_missing_fields_and_known_values() {
    let service = scripted_service(vec![ProfileUpdate {
        age: Some(30),
        ..Default::default()
    }]);

    service.handle_message("hi", &user()).await;
    let reply = service.handle_message("I'm 30 years old", &user()).await;

    assert!(reply.contains("Please provide the following information"));
    assert!(reply.contains("highest education level"));
    assert!(reply.contains("- age: 30"));

    let state = service.store().peek(&user()).expect("state persisted");
    assert_eq!(state.stage, ConversationStage::CollectingInfo);
    assert_eq!(state.profile.age, Some(30));
}

#[tokio::test]
async fn complete_information_scores_and_advances_to_documents() {
    let service = scripted_service(vec![complete_update()]);

    service.handle_message("hi", &user()).await;
    let reply = service
        .handle_message("30, bachelor, 5 years, canada, 15000", &user())
        .await;

    assert!(reply.contains("Overall score: 64/100"));
    assert!(reply.contains("express-entry"));
    assert!(reply.contains("Valid Passport"));

    let state = service.store().peek(&user()).expect("state persisted");
    assert_eq!(state.stage, ConversationStage::DocumentVerification);
    assert_eq!(state.profile.visa_type, Some(VisaType::ExpressEntry));
}

#[tokio::test]
async fn unsupported_country_is_reasked_and_the_turn_still_commits() {
    let mut update = complete_update();
    update.preferred_country = Some(crate::conversation::domain::CountryCode::new("narnia"));
    let service = scripted_service(vec![update]);

    service.handle_message("hi", &user()).await;
    let reply = service.handle_message("narnia please", &user()).await;

    assert!(reply.contains("canada, australia, uk"));

    let state = service.store().peek(&user()).expect("state persisted");
    assert_eq!(state.stage, ConversationStage::CollectingInfo);
    assert_eq!(state.profile.preferred_country, None);
    assert_eq!(state.profile.age, Some(30));
}

#[tokio::test]
async fn extraction_outage_degrades_to_a_retry_prompt() {
    let service = service_with(collaborators(Arc::new(FailingExtractor)));

    service.handle_message("hi", &user()).await;
    let reply = service.handle_message("age 30", &user()).await;

    assert!(reply.contains("I had trouble reading that message"));
    let state = service.store().peek(&user()).expect("state persisted");
    assert_eq!(state.stage, ConversationStage::CollectingInfo);
}

#[tokio::test]
async fn document_verification_reports_remaining_items() {
    let service = scripted_service(Vec::new());
    seed_state(&service, &user(), |state| {
        state.stage = ConversationStage::DocumentVerification;
        state.profile = complete_profile();
        state.profile.visa_type = Some(VisaType::ExpressEntry);
    })
    .await;

    let reply = service.handle_message("Valid Passport", &user()).await;

    assert!(reply.contains("Document verification status"));
    assert!(reply.contains("Remaining required documents"));
    assert!(reply.contains("Transcripts"));

    let state = service.store().peek(&user()).expect("state persisted");
    assert_eq!(state.stage, ConversationStage::DocumentVerification);
    assert!(state.profile.verified_documents.contains("Valid Passport"));
}

#[tokio::test]
async fn verifying_the_final_document_advances_to_the_application() {
    let service = scripted_service(Vec::new());
    let checklist = checklist::generate(&canada(), VisaType::ExpressEntry);
    let (last, rest) = checklist
        .documents
        .split_last()
        .expect("checklist is never empty");

    seed_state(&service, &user(), |state| {
        state.stage = ConversationStage::DocumentVerification;
        state.profile = complete_profile();
        state.profile.visa_type = Some(VisaType::ExpressEntry);
        state.profile.verified_documents =
            rest.iter().map(|document| document.to_string()).collect();
    })
    .await;

    let reply = service.handle_message(last, &user()).await;

    assert!(reply.contains("All required documents have been verified"));
    let state = service.store().peek(&user()).expect("state persisted");
    assert_eq!(state.stage, ConversationStage::VisaApplication);
}

#[tokio::test]
async fn visa_application_submits_and_opens_an_interview() {
    let service = scripted_service(Vec::new());
    seed_state(&service, &user(), |state| {
        state.stage = ConversationStage::VisaApplication;
        state.profile = complete_profile();
        state.profile.visa_type = Some(VisaType::ExpressEntry);
    })
    .await;

    let reply = service.handle_message("let's do it", &user()).await;

    assert!(reply.contains("Portal Submission: ✅"));
    assert!(reply.contains("Interview Preparation"));

    let state = service.store().peek(&user()).expect("state persisted");
    assert_eq!(state.stage, ConversationStage::InterviewPrep);
    let session = state.interview.expect("session attached");
    assert_eq!(session.session_id, "mock-001");
}

#[tokio::test]
async fn collaborator_failure_yields_an_apology_and_no_persistence() {
    let mut collaborators = collaborators(Arc::new(ScriptedExtractor::default()));
    collaborators.applications = Arc::new(FailingWriter);
    let service = service_with(collaborators);

    seed_state(&service, &user(), |state| {
        state.stage = ConversationStage::VisaApplication;
        state.profile = complete_profile();
        state.profile.visa_type = Some(VisaType::ExpressEntry);
    })
    .await;

    let reply = service.handle_message("let's do it", &user()).await;

    assert_eq!(reply, "I apologize, but I encountered an error. Please try again.");
    let state = service.store().peek(&user()).expect("seeded state survives");
    assert_eq!(state.stage, ConversationStage::VisaApplication);
    assert!(state.interview.is_none());
}

#[tokio::test]
async fn interview_prep_asks_questions_then_evaluates_answers() {
    let service = scripted_service(Vec::new());
    seed_state(&service, &user(), |state| {
        state.stage = ConversationStage::InterviewPrep;
        state.profile = complete_profile();
        state.profile.visa_type = Some(VisaType::ExpressEntry);
    })
    .await;

    let questions = service.handle_message("ready", &user()).await;
    assert!(questions.contains("1. Why did you choose canada?"));

    let state = service.store().peek(&user()).expect("state persisted");
    assert!(state.interview.is_some());

    let feedback = service.handle_message("Because of the weather", &user()).await;
    assert!(feedback.contains("Rating: 7/10"));
    assert!(feedback.contains("Clear and relevant."));
}

#[tokio::test]
async fn cost_calculation_itemizes_the_schedule() {
    let service = scripted_service(Vec::new());
    seed_state(&service, &user(), |state| {
        state.stage = ConversationStage::CostCalculation;
        state.profile = complete_profile();
        state.profile.visa_type = Some(VisaType::ExpressEntry);
    })
    .await;

    let reply = service.handle_message("how much?", &user()).await;

    assert!(reply.contains("Visa Application Fee: $190"));
    assert!(reply.contains("Total: $1550"));
    assert!(reply.contains("6 weeks (medium confidence)"));
}

#[tokio::test]
async fn lawyer_booking_returns_the_confirmation() {
    let service = scripted_service(Vec::new());
    seed_state(&service, &user(), |state| {
        state.stage = ConversationStage::LawyerBooking;
        state.profile = complete_profile();
    })
    .await;

    let reply = service.handle_message("book me in", &user()).await;

    assert!(reply.contains("A. Counsel"));
    assert!(reply.contains("bk-0001"));
}

#[tokio::test]
async fn inbound_language_is_redetected_and_replies_are_translated() {
    let service = scripted_service(Vec::new());

    let reply = service.handle_message("¡Hola!", &user()).await;

    assert!(reply.starts_with("[es] "));
    assert!(reply.contains("Welcome to the Immigration Assistant"));

    let state = service.store().peek(&user()).expect("state persisted");
    assert_eq!(state.language, LanguageCode::Es);
}

#[tokio::test]
async fn localization_failure_falls_back_to_the_untranslated_reply() {
    let mut collaborators = collaborators(Arc::new(ScriptedExtractor::default()));
    collaborators.language = Arc::new(StubLanguage {
        translate_ok: false,
    });
    let service = service_with(collaborators);

    let reply = service.handle_message("¡Hola!", &user()).await;

    assert!(!reply.starts_with("[es]"));
    assert!(reply.contains("Welcome to the Immigration Assistant"));
}
